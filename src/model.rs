//! Customer row, its columns, and list filters.

use crate::sql::BindValue;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Table backing the registry.
pub const CUSTOMER_TABLE: &str = "clientes";

/// A stored customer. JSON keys follow the registry's field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "idUsuario")]
    #[sqlx(rename = "id_usuario")]
    pub owner_id: i64,
    #[serde(rename = "Codigo")]
    #[sqlx(rename = "codigo")]
    pub code: String,
    #[serde(rename = "Nome")]
    #[sqlx(rename = "nome")]
    pub name: String,
    #[serde(rename = "CPF_CNPJ")]
    #[sqlx(rename = "cpf_cnpj")]
    pub tax_id: Option<String>,
    #[serde(rename = "CEP")]
    #[sqlx(rename = "cep")]
    pub postal_code: Option<String>,
    #[serde(rename = "Logradouro")]
    #[sqlx(rename = "logradouro")]
    pub street: Option<String>,
    #[serde(rename = "Endereco")]
    #[sqlx(rename = "endereco")]
    pub address: Option<String>,
    #[serde(rename = "Numero")]
    #[sqlx(rename = "numero")]
    pub number: Option<String>,
    #[serde(rename = "Bairro")]
    #[sqlx(rename = "bairro")]
    pub district: Option<String>,
    #[serde(rename = "Cidade")]
    #[sqlx(rename = "cidade")]
    pub city: Option<String>,
    #[serde(rename = "UF")]
    #[sqlx(rename = "uf")]
    pub state: Option<String>,
    #[serde(rename = "Complemento")]
    #[sqlx(rename = "complemento")]
    pub complement: Option<String>,
    #[serde(rename = "Fone")]
    #[sqlx(rename = "fone")]
    pub phone: Option<String>,
    #[serde(rename = "LimiteCredito")]
    #[sqlx(rename = "limite_credito")]
    pub credit_limit: Option<f64>,
    #[serde(rename = "Validade")]
    #[sqlx(rename = "validade")]
    pub valid_until: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How a column is typed in storage; decides how values and NULLs are bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    BigInt,
    Text,
    Numeric,
    Date,
}

/// Every column a request may write, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    OwnerId,
    Code,
    Name,
    TaxId,
    PostalCode,
    Street,
    Address,
    Number,
    District,
    City,
    State,
    Complement,
    Phone,
    CreditLimit,
    ValidUntil,
}

impl Column {
    pub const ALL: [Column; 15] = [
        Column::OwnerId,
        Column::Code,
        Column::Name,
        Column::TaxId,
        Column::PostalCode,
        Column::Street,
        Column::Address,
        Column::Number,
        Column::District,
        Column::City,
        Column::State,
        Column::Complement,
        Column::Phone,
        Column::CreditLimit,
        Column::ValidUntil,
    ];

    /// Key used in request and response bodies.
    pub fn key(self) -> &'static str {
        match self {
            Column::OwnerId => "idUsuario",
            Column::Code => "Codigo",
            Column::Name => "Nome",
            Column::TaxId => "CPF_CNPJ",
            Column::PostalCode => "CEP",
            Column::Street => "Logradouro",
            Column::Address => "Endereco",
            Column::Number => "Numero",
            Column::District => "Bairro",
            Column::City => "Cidade",
            Column::State => "UF",
            Column::Complement => "Complemento",
            Column::Phone => "Fone",
            Column::CreditLimit => "LimiteCredito",
            Column::ValidUntil => "Validade",
        }
    }

    /// Column name in the `clientes` table.
    pub fn sql_name(self) -> &'static str {
        match self {
            Column::OwnerId => "id_usuario",
            Column::Code => "codigo",
            Column::Name => "nome",
            Column::TaxId => "cpf_cnpj",
            Column::PostalCode => "cep",
            Column::Street => "logradouro",
            Column::Address => "endereco",
            Column::Number => "numero",
            Column::District => "bairro",
            Column::City => "cidade",
            Column::State => "uf",
            Column::Complement => "complemento",
            Column::Phone => "fone",
            Column::CreditLimit => "limite_credito",
            Column::ValidUntil => "validade",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::OwnerId => ColumnKind::BigInt,
            Column::CreditLimit => ColumnKind::Numeric,
            Column::ValidUntil => ColumnKind::Date,
            _ => ColumnKind::Text,
        }
    }
}

/// Query string accepted by `GET /clientes`. Also sent as-is by the API client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cep: Option<String>,
}

/// Normalized list filter: empty values dropped, CEP reduced to digits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub code: Option<String>,
    pub name_contains: Option<String>,
    pub city_contains: Option<String>,
    pub postal_code: Option<String>,
}

impl ListFilter {
    pub fn from_query(query: &ListQuery) -> Self {
        fn non_empty(v: &Option<String>) -> Option<String> {
            v.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
        }
        ListFilter {
            code: non_empty(&query.codigo),
            name_contains: non_empty(&query.nome),
            city_contains: non_empty(&query.cidade),
            postal_code: non_empty(&query.cep).map(|c| crate::service::digits_only(&c)),
        }
    }

    /// Same predicate the SQL builder renders, for stores that filter in process.
    pub fn matches(&self, customer: &Customer) -> bool {
        fn contains(haystack: Option<&str>, needle: &str) -> bool {
            haystack
                .map(|h| h.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false)
        }
        if let Some(code) = &self.code {
            if customer.code != *code {
                return false;
            }
        }
        if let Some(name) = &self.name_contains {
            if !contains(Some(&customer.name), name) {
                return false;
            }
        }
        if let Some(city) = &self.city_contains {
            if !contains(customer.city.as_deref(), city) {
                return false;
            }
        }
        if let Some(cep) = &self.postal_code {
            if customer.postal_code.as_deref() != Some(cep.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Normalized values for the columns a request supplied, kept in table order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerFields {
    values: Vec<(Column, BindValue)>,
}

impl CustomerFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column, replacing any previous value.
    pub fn set(&mut self, column: Column, value: BindValue) {
        match self.values.binary_search_by_key(&column, |(c, _)| *c) {
            Ok(i) => self.values[i].1 = value,
            Err(i) => self.values.insert(i, (column, value)),
        }
    }

    pub fn get(&self, column: Column) -> Option<&BindValue> {
        self.values
            .binary_search_by_key(&column, |(c, _)| *c)
            .ok()
            .map(|i| &self.values[i].1)
    }

    pub fn contains(&self, column: Column) -> bool {
        self.get(column).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, &BindValue)> {
        self.values.iter().map(|(c, v)| (*c, v))
    }

    /// Value for every column, NULL where the request supplied nothing.
    pub fn complete(&self) -> impl Iterator<Item = (Column, BindValue)> + '_ {
        Column::ALL.into_iter().map(move |c| {
            let value = self.get(c).cloned().unwrap_or(BindValue::Null(c.kind()));
            (c, value)
        })
    }
}

impl Customer {
    /// Writes one normalized value into the row. NOT NULL columns ignore NULLs.
    pub fn apply(&mut self, column: Column, value: &BindValue) {
        let text = || value.as_text().map(str::to_string);
        match column {
            Column::OwnerId => {
                if let Some(n) = value.as_i64() {
                    self.owner_id = n;
                }
            }
            Column::Code => {
                if let Some(s) = text() {
                    self.code = s;
                }
            }
            Column::Name => {
                if let Some(s) = text() {
                    self.name = s;
                }
            }
            Column::TaxId => self.tax_id = text(),
            Column::PostalCode => self.postal_code = text(),
            Column::Street => self.street = text(),
            Column::Address => self.address = text(),
            Column::Number => self.number = text(),
            Column::District => self.district = text(),
            Column::City => self.city = text(),
            Column::State => self.state = text(),
            Column::Complement => self.complement = text(),
            Column::Phone => self.phone = text(),
            Column::CreditLimit => self.credit_limit = value.as_f64(),
            Column::ValidUntil => self.valid_until = value.as_date(),
        }
    }
}
