//! In-process store. Rows live behind a `tokio::sync::RwLock`; ids are never reused.

use super::CustomerStore;
use crate::error::AppError;
use crate::model::{Column, Customer, CustomerFields, ListFilter};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    rows: BTreeMap<i64, Customer>,
    last_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn code_taken(inner: &Inner, code: &str, except: Option<i64>) -> bool {
    inner
        .rows
        .values()
        .any(|row| row.code == code && Some(row.id) != except)
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn list(&self, filter: &ListFilter) -> Result<Vec<Customer>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .values()
            .rev()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Customer>, AppError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn next_sequence(&self) -> Result<i64, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.keys().next_back().copied().unwrap_or(0) + 1)
    }

    async fn insert(&self, fields: &CustomerFields) -> Result<Customer, AppError> {
        let mut inner = self.inner.write().await;
        let code = fields
            .get(Column::Code)
            .and_then(|v| v.as_text())
            .unwrap_or_default()
            .to_string();
        if code_taken(&inner, &code, None) {
            return Err(AppError::Conflict("código já cadastrado".into()));
        }
        let now = Utc::now();
        let mut row = Customer {
            id: inner.last_id + 1,
            owner_id: 0,
            code,
            name: String::new(),
            tax_id: None,
            postal_code: None,
            street: None,
            address: None,
            number: None,
            district: None,
            city: None,
            state: None,
            complement: None,
            phone: None,
            credit_limit: None,
            valid_until: None,
            created_at: now,
            updated_at: now,
        };
        for (column, value) in fields.iter() {
            row.apply(column, value);
        }
        inner.last_id = row.id;
        inner.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, fields: &CustomerFields) -> Result<Option<Customer>, AppError> {
        if fields.is_empty() {
            return Err(AppError::NothingToUpdate);
        }
        let mut inner = self.inner.write().await;
        if let Some(code) = fields.get(Column::Code).and_then(|v| v.as_text()) {
            if code_taken(&inner, code, Some(id)) {
                return Err(AppError::Conflict("código já cadastrado".into()));
            }
        }
        let Some(row) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };
        for (column, value) in fields.iter() {
            row.apply(column, value);
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::BindValue;

    fn fields(name: &str, code: &str, city: Option<&str>) -> CustomerFields {
        let mut f = CustomerFields::new();
        f.set(Column::OwnerId, BindValue::BigInt(1));
        f.set(Column::Code, BindValue::Text(code.into()));
        f.set(Column::Name, BindValue::Text(name.into()));
        if let Some(city) = city {
            f.set(Column::City, BindValue::Text(city.into()));
        }
        f
    }

    #[tokio::test]
    async fn ids_increase_and_are_not_reused() {
        let store = MemoryStore::new();
        assert_eq!(store.next_sequence().await.unwrap(), 1);
        let a = store.insert(&fields("A", "C1", None)).await.unwrap();
        let b = store.insert(&fields("B", "C2", None)).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert!(store.delete(b.id).await.unwrap());
        let c = store.insert(&fields("C", "C3", None)).await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn duplicate_code_is_a_conflict() {
        let store = MemoryStore::new();
        store.insert(&fields("A", "C1", None)).await.unwrap();
        let err = store.insert(&fields("B", "C1", None)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_filters_by_city_newest_first() {
        let store = MemoryStore::new();
        store.insert(&fields("A", "C1", Some("Rio de Janeiro"))).await.unwrap();
        store.insert(&fields("B", "C2", Some("São Paulo"))).await.unwrap();
        store.insert(&fields("C", "C3", Some("Rio Branco"))).await.unwrap();
        let filter = ListFilter {
            city_contains: Some("rio".into()),
            ..ListFilter::default()
        };
        let ids: Vec<_> = store.list(&filter).await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_none() {
        let store = MemoryStore::new();
        let mut f = CustomerFields::new();
        f.set(Column::Name, BindValue::Text("X".into()));
        assert!(store.update(42, &f).await.unwrap().is_none());
    }
}
