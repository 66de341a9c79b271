//! Storage for customer rows.
//!
//! [`PgStore`] runs one parameterized statement per operation; [`MemoryStore`] keeps rows in
//! process for development and tests. Both honor the same filter, ordering and uniqueness rules.

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::{ensure_database_exists, ensure_tables, PgStore};

use crate::error::AppError;
use crate::model::{Customer, CustomerFields, ListFilter};
use async_trait::async_trait;

#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Rows matching the filter, highest id first.
    async fn list(&self, filter: &ListFilter) -> Result<Vec<Customer>, AppError>;

    async fn get(&self, id: i64) -> Result<Option<Customer>, AppError>;

    /// One past the highest id currently stored.
    async fn next_sequence(&self) -> Result<i64, AppError>;

    /// Inserts a row; unsupplied columns are stored as NULL.
    /// Returns [`AppError::Conflict`] when the code is already taken.
    async fn insert(&self, fields: &CustomerFields) -> Result<Customer, AppError>;

    /// Applies only the supplied columns. None when the id does not exist.
    async fn update(&self, id: i64, fields: &CustomerFields) -> Result<Option<Customer>, AppError>;

    /// True when a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Cheap round trip used by the readiness check.
    async fn ping(&self) -> Result<(), AppError>;
}
