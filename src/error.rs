//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// One rejected request field, as returned in the `errors` list of a 400 body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("não encontrado: {0}")]
    NotFound(String),
    #[error("dados inválidos")]
    Validation(Vec<FieldError>),
    #[error("nada para atualizar")]
    NothingToUpdate,
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("conflito: {0}")]
    Conflict(String),
    #[error("requisição inválida: {0}")]
    BadRequest(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::NothingToUpdate | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config_error",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation_error",
            AppError::NothingToUpdate => "nothing_to_update",
            AppError::Db(_) => "database_error",
            AppError::Conflict(_) => "conflict",
            AppError::BadRequest(_) => "bad_request",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Server-side failures are logged in full and answered with a generic message.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "erro interno do servidor".to_string()
        } else {
            self.to_string()
        };
        let code = self.code().to_string();
        let errors = match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        };
        (status, Json(ErrorBody { code, message, errors })).into_response()
    }
}
