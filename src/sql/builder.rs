//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for the customer table.

use crate::error::AppError;
use crate::model::{Column, CustomerFields, ListFilter};
use crate::sql::BindValue;
use sqlx::postgres::PgArguments;
use sqlx::Arguments;

/// Quote identifier for PostgreSQL (safe: only from code, never from requests).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

/// Columns read back for every row. NUMERIC is cast so it decodes as f64.
const SELECT_COLUMNS: &str = "id, id_usuario, codigo, nome, cpf_cnpj, cep, logradouro, endereco, numero, \
bairro, cidade, uf, complemento, fone, limite_credito::float8 AS limite_credito, validade, created_at, updated_at";

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: BindValue) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Bind every parameter in order.
    pub fn arguments(&self) -> Result<PgArguments, AppError> {
        let mut args = PgArguments::default();
        for p in &self.params {
            args.add(p.clone()).map_err(sqlx::Error::Encode)?;
        }
        Ok(args)
    }
}

/// Escape LIKE metacharacters so user input only ever matches literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// SELECT with optional filters, newest first. Params bound in filter order.
pub fn select_list(table: &str, filter: &ListFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    if let Some(code) = &filter.code {
        let n = q.push_param(BindValue::Text(code.clone()));
        where_parts.push(format!("codigo = ${}", n));
    }
    if let Some(name) = &filter.name_contains {
        let n = q.push_param(BindValue::Text(like_pattern(name)));
        where_parts.push(format!("nome ILIKE ${}", n));
    }
    if let Some(city) = &filter.city_contains {
        let n = q.push_param(BindValue::Text(like_pattern(city)));
        where_parts.push(format!("cidade ILIKE ${}", n));
    }
    if let Some(cep) = &filter.postal_code {
        let n = q.push_param(BindValue::Text(cep.clone()));
        where_parts.push(format!("cep = ${}", n));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY id DESC",
        SELECT_COLUMNS, table, where_clause
    );
    q
}

pub fn select_by_id(table: &str, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(BindValue::BigInt(id));
    q.sql = format!("SELECT {} FROM {} WHERE id = $1", SELECT_COLUMNS, table);
    q
}

/// Next value for generated customer codes: one past the highest id, 1 on an empty table.
pub fn next_sequence(table: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT COALESCE(MAX(id), 0) + 1 FROM {}", table);
    q
}

/// INSERT every writable column; ones the request did not supply are bound as typed NULLs.
pub fn insert(table: &str, fields: &CustomerFields) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (column, value) in fields.complete() {
        let n = q.push_param(value);
        cols.push(column.sql_name());
        placeholders.push(format!("${}", n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table,
        cols.join(", "),
        placeholders.join(", "),
        SELECT_COLUMNS
    );
    q
}

/// UPDATE by id: SET only supplied columns. None when nothing was supplied.
pub fn update(table: &str, id: i64, fields: &CustomerFields) -> Option<QueryBuf> {
    if fields.is_empty() {
        return None;
    }
    let mut q = QueryBuf::new();
    let mut sets = Vec::with_capacity(fields.len() + 1);
    for (column, value) in fields.iter() {
        let n = q.push_param(value.clone());
        sets.push(format!("{} = ${}", column.sql_name(), n));
    }
    sets.push("updated_at = NOW()".to_string());
    let id_param = q.push_param(BindValue::BigInt(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE id = ${} RETURNING {}",
        table,
        sets.join(", "),
        id_param,
        SELECT_COLUMNS
    );
    Some(q)
}

pub fn delete(table: &str, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(BindValue::BigInt(id));
    q.sql = format!("DELETE FROM {} WHERE id = $1", table);
    q
}

/// DDL for the customer table. Idempotent.
pub fn create_table(table: &str) -> String {
    let columns = Column::ALL
        .iter()
        .map(|c| {
            let ty = match c {
                Column::OwnerId => "BIGINT NOT NULL",
                Column::Code => "TEXT NOT NULL UNIQUE",
                Column::Name => "TEXT NOT NULL",
                Column::CreditLimit => "NUMERIC(14, 2)",
                Column::ValidUntil => "DATE",
                _ => "TEXT",
            };
            format!("    {} {}", c.sql_name(), ty)
        })
        .collect::<Vec<_>>()
        .join(",\n");
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    id BIGSERIAL PRIMARY KEY,\n{},\n    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),\n    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()\n)",
        table, columns
    )
}
