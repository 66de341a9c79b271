//! HTTP client library: wrappers over the customer API and the ViaCEP address lookup.

mod api;
mod viacep;

pub use api::ApiClient;
pub use viacep::{Address, ViaCepClient, VIACEP_BASE_URL};

use crate::error::FieldError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        errors: Vec<FieldError>,
    },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}
