//! Normalized field values and their binding to PostgreSQL parameters.

use crate::model::ColumnKind;
use chrono::NaiveDate;
use sqlx::encode::{Encode, IsNull};
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::{Database, Type};

/// A value that can be bound to a PostgreSQL query. NULLs keep the type of the column they target.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Null(ColumnKind),
    BigInt(i64),
    Text(String),
    Float(f64),
    Date(NaiveDate),
}

impl BindValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            BindValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            BindValue::BigInt(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            BindValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            BindValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    fn kind(&self) -> ColumnKind {
        match self {
            BindValue::Null(kind) => *kind,
            BindValue::BigInt(_) => ColumnKind::BigInt,
            BindValue::Text(_) => ColumnKind::Text,
            BindValue::Float(_) => ColumnKind::Numeric,
            BindValue::Date(_) => ColumnKind::Date,
        }
    }
}

fn type_info_for(kind: ColumnKind) -> PgTypeInfo {
    match kind {
        ColumnKind::BigInt => <i64 as Type<Postgres>>::type_info(),
        ColumnKind::Text => <String as Type<Postgres>>::type_info(),
        ColumnKind::Numeric => <f64 as Type<Postgres>>::type_info(),
        ColumnKind::Date => <NaiveDate as Type<Postgres>>::type_info(),
    }
}

impl<'q> Encode<'q, Postgres> for BindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        match self {
            BindValue::Null(_) => Ok(IsNull::Yes),
            BindValue::BigInt(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf),
            BindValue::Text(s) => <&str as Encode<Postgres>>::encode_by_ref(&s.as_str(), buf),
            BindValue::Float(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf),
            BindValue::Date(d) => <NaiveDate as Encode<Postgres>>::encode_by_ref(d, buf),
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(type_info_for(self.kind()))
    }
}

impl Type<Postgres> for BindValue {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }
}
