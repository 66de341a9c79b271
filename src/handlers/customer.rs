//! Customer CRUD handlers: list, read, create, update, delete.

use crate::error::AppError;
use crate::model::{Customer, ListQuery};
use crate::service::CustomerService;
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::{Map, Value};

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest("id inválido".into()))
}

fn body_to_map(payload: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, AppError> {
    let Json(value) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("o corpo deve ser um objeto JSON".into())),
    }
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Customer>>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let rows = CustomerService::list(state.store.as_ref(), &query).await?;
    Ok(Json(rows))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<Json<Customer>, AppError> {
    let id = parse_id(&id_str)?;
    let row = CustomerService::read(state.store.as_ref(), id).await?;
    Ok(Json(row))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(payload)?;
    let today = Utc::now().date_naive();
    let row = CustomerService::create(state.store.as_ref(), &body, state.default_owner_id, today).await?;
    tracing::info!(id = row.id, code = %row.code, "customer created");
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Customer>, AppError> {
    let id = parse_id(&id_str)?;
    let body = body_to_map(payload)?;
    let row = CustomerService::update(state.store.as_ref(), id, &body).await?;
    Ok(Json(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id_str)?;
    CustomerService::delete(state.store.as_ref(), id).await?;
    tracing::info!(id, "customer deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Fallback for unmatched routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("rota".into())
}
