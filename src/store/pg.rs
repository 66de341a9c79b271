//! PostgreSQL-backed store and database bootstrap.

use super::CustomerStore;
use crate::error::AppError;
use crate::model::{Customer, CustomerFields, ListFilter, CUSTOMER_TABLE};
use crate::sql::{self, qualified_table, QueryBuf};
use async_trait::async_trait;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    table: String,
}

impl PgStore {
    pub fn new(pool: PgPool, schema: &str) -> Self {
        PgStore {
            pool,
            table: qualified_table(schema, CUSTOMER_TABLE),
        }
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<Customer>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = sqlx::query_as_with::<_, Customer, _>(&q.sql, q.arguments()?)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique_violation)?;
        Ok(row)
    }
}

/// Unique violations can only come from `codigo`.
fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return AppError::Conflict("código já cadastrado".into());
        }
    }
    AppError::Db(e)
}

#[async_trait]
impl CustomerStore for PgStore {
    async fn list(&self, filter: &ListFilter) -> Result<Vec<Customer>, AppError> {
        let q = sql::select_list(&self.table, filter);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = sqlx::query_as_with::<_, Customer, _>(&q.sql, q.arguments()?)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get(&self, id: i64) -> Result<Option<Customer>, AppError> {
        self.fetch_optional(&sql::select_by_id(&self.table, id)).await
    }

    async fn next_sequence(&self) -> Result<i64, AppError> {
        let q = sql::next_sequence(&self.table);
        tracing::debug!(sql = %q.sql, "query");
        let seq: i64 = sqlx::query_scalar(&q.sql).fetch_one(&self.pool).await?;
        Ok(seq)
    }

    async fn insert(&self, fields: &CustomerFields) -> Result<Customer, AppError> {
        self.fetch_optional(&sql::insert(&self.table, fields))
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn update(&self, id: i64, fields: &CustomerFields) -> Result<Option<Customer>, AppError> {
        let q = sql::update(&self.table, id, fields).ok_or(AppError::NothingToUpdate)?;
        self.fetch_optional(&q).await
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let q = sql::delete(&self.table, id);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let result = sqlx::query_with(&q.sql, q.arguments()?)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Create the schema if needed, then the customer table.
pub async fn ensure_tables(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", sql::quoted(schema)))
        .execute(pool)
        .await?;
    let table = qualified_table(schema, CUSTOMER_TABLE);
    sqlx::query(&sql::create_table(&table)).execute(pool).await?;
    tracing::info!(table = %table, "customer table ready");
    Ok(())
}

/// Connects to the `postgres` maintenance database and creates the target database if missing.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", sql::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "created database");
    }
    Ok(())
}

/// Splits `DATABASE_URL` into the maintenance-database URL and the target database name.
/// A URL without a database path yields an empty name.
fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let authority_start = url
        .find("://")
        .map(|i| i + 3)
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no scheme".into()))?;
    let rest = url.get(authority_start..).unwrap_or("");
    let (authority, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i + 1..]),
        None => (rest.split('?').next().unwrap_or(""), ""),
    };
    let db_name = path.split('?').next().unwrap_or("").trim();
    let base = url.get(..authority_start).unwrap_or("");
    Ok((format!("{}{}/postgres", base, authority), db_name.to_string()))
}
