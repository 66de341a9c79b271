//! Customer CRUD on top of a [`CustomerStore`].

use crate::error::AppError;
use crate::model::{Column, Customer, ListFilter, ListQuery};
use crate::service::code::{format_code, MAX_CODE_ATTEMPTS};
use crate::service::RequestValidator;
use crate::sql::BindValue;
use crate::store::CustomerStore;
use chrono::NaiveDate;
use serde_json::{Map, Value};

pub struct CustomerService;

impl CustomerService {
    pub async fn list(store: &dyn CustomerStore, query: &ListQuery) -> Result<Vec<Customer>, AppError> {
        let filter = ListFilter::from_query(query);
        store.list(&filter).await
    }

    pub async fn read(store: &dyn CustomerStore, id: i64) -> Result<Customer, AppError> {
        store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("cliente {}", id)))
    }

    /// Validate, assign a code when none was given, and insert.
    /// A generated code that collides is regenerated from a later sequence.
    pub async fn create(
        store: &dyn CustomerStore,
        body: &Map<String, Value>,
        default_owner_id: i64,
        today: NaiveDate,
    ) -> Result<Customer, AppError> {
        let mut fields = RequestValidator::create(body, default_owner_id)?;
        if fields.contains(Column::Code) {
            return store.insert(&fields).await;
        }

        let mut attempt = 1;
        let mut sequence = store.next_sequence().await?;
        loop {
            let code = format_code(today, sequence);
            fields.set(Column::Code, BindValue::Text(code.clone()));
            match store.insert(&fields).await {
                Err(AppError::Conflict(_)) if attempt < MAX_CODE_ATTEMPTS => {
                    tracing::warn!(code = %code, attempt, "generated customer code already taken, retrying");
                    attempt += 1;
                    // The taken code may belong to a row that MAX(id) does not reflect.
                    sequence = store.next_sequence().await?.max(sequence + 1);
                }
                result => return result,
            }
        }
    }

    /// Apply only the supplied fields. An empty update never reaches storage.
    pub async fn update(
        store: &dyn CustomerStore,
        id: i64,
        body: &Map<String, Value>,
    ) -> Result<Customer, AppError> {
        let fields = RequestValidator::update(body)?;
        if fields.is_empty() {
            return Err(AppError::NothingToUpdate);
        }
        store
            .update(id, &fields)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("cliente {}", id)))
    }

    pub async fn delete(store: &dyn CustomerStore, id: i64) -> Result<(), AppError> {
        if store.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("cliente {}", id)))
        }
    }
}
