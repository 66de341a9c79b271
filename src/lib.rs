//! Cadastro: customer registry REST backend.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use client::{Address, ApiClient, ClientError, ViaCepClient};
pub use config::{AppConfig, StorageBackend};
pub use error::{AppError, ConfigError, FieldError};
pub use model::{Customer, ListQuery};
pub use routes::app;
pub use service::CustomerService;
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_tables, CustomerStore, MemoryStore, PgStore};
