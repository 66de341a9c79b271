//! Request normalization for customer bodies.
//!
//! A body is either fully normalized into [`CustomerFields`] or rejected with every
//! field error found; nothing is applied partially.

use crate::error::{AppError, FieldError};
use crate::model::{Column, CustomerFields};
use crate::sql::BindValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

/// Number of digits in a normalized CEP.
pub const CEP_LENGTH: usize = 8;

/// Maximum length of a UF after trimming.
pub const UF_MAX_LENGTH: usize = 2;

/// Whether a body is being checked for creation or for a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Update,
}

/// Keep only ASCII digits.
pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Digit-only CEP, or None if it does not have exactly eight digits.
pub fn normalize_cep(raw: &str) -> Option<String> {
    let digits = digits_only(raw);
    (digits.len() == CEP_LENGTH).then_some(digits)
}

pub struct RequestValidator;

impl RequestValidator {
    /// Normalize a creation body. `Codigo` may be left out; the caller generates it.
    pub fn create(body: &Map<String, Value>, default_owner_id: i64) -> Result<CustomerFields, AppError> {
        let mut fields = normalize(body, Mode::Create)?;
        if !fields.contains(Column::OwnerId) {
            fields.set(Column::OwnerId, BindValue::BigInt(default_owner_id));
        }
        Ok(fields)
    }

    /// Normalize a partial update. Only supplied columns end up in the result.
    pub fn update(body: &Map<String, Value>) -> Result<CustomerFields, AppError> {
        normalize(body, Mode::Update)
    }
}

fn normalize(body: &Map<String, Value>, mode: Mode) -> Result<CustomerFields, AppError> {
    let mut fields = CustomerFields::new();
    let mut errors = Vec::new();

    if mode == Mode::Create && !body.contains_key(Column::Name.key()) {
        errors.push(FieldError::new(Column::Name.key(), "Nome é obrigatório"));
    }

    for column in Column::ALL {
        let Some(raw) = body.get(column.key()) else { continue };
        match normalize_field(column, raw, mode) {
            Ok(Some(value)) => fields.set(column, value),
            Ok(None) => {}
            Err(message) => errors.push(FieldError::new(column.key(), message)),
        }
    }

    if errors.is_empty() {
        Ok(fields)
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Ok(None) means the field counts as not supplied.
fn normalize_field(column: Column, raw: &Value, mode: Mode) -> Result<Option<BindValue>, &'static str> {
    match column {
        Column::OwnerId => owner_id(raw).map(Some),
        Column::Code => code(raw, mode),
        Column::Name => name(raw).map(Some),
        Column::PostalCode => postal_code(raw).map(Some),
        Column::State => state(raw).map(Some),
        Column::CreditLimit => credit_limit(raw).map(Some),
        Column::ValidUntil => valid_until(raw).map(Some),
        Column::TaxId
        | Column::Street
        | Column::Address
        | Column::Number
        | Column::District
        | Column::City
        | Column::Complement
        | Column::Phone => plain_text(column, raw).map(Some),
    }
}

fn owner_id(raw: &Value) -> Result<BindValue, &'static str> {
    const MESSAGE: &str = "idUsuario deve ser um número inteiro";
    match raw {
        Value::Number(n) => n.as_i64().map(BindValue::BigInt).ok_or(MESSAGE),
        Value::String(s) => s.trim().parse().map(BindValue::BigInt).map_err(|_| MESSAGE),
        _ => Err(MESSAGE),
    }
}

fn code(raw: &Value, mode: Mode) -> Result<Option<BindValue>, &'static str> {
    let text = match raw {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err("Código inválido"),
    };
    match (text.is_empty(), mode) {
        (false, _) => Ok(Some(BindValue::Text(text))),
        (true, Mode::Create) => Ok(None),
        (true, Mode::Update) => Err("Código não pode ser vazio"),
    }
}

fn name(raw: &Value) -> Result<BindValue, &'static str> {
    match raw {
        Value::String(s) if !s.trim().is_empty() => Ok(BindValue::Text(s.trim().to_string())),
        _ => Err("Nome é obrigatório"),
    }
}

fn postal_code(raw: &Value) -> Result<BindValue, &'static str> {
    let text = match raw {
        Value::Null => return Ok(BindValue::Null(Column::PostalCode.kind())),
        Value::String(s) if s.is_empty() => return Ok(BindValue::Null(Column::PostalCode.kind())),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return Err("CEP deve ter 8 dígitos"),
    };
    normalize_cep(&text).map(BindValue::Text).ok_or("CEP deve ter 8 dígitos")
}

fn state(raw: &Value) -> Result<BindValue, &'static str> {
    match raw {
        Value::Null => Ok(BindValue::Null(Column::State.kind())),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.chars().count() > UF_MAX_LENGTH {
                return Err("UF deve ter no máximo 2 letras");
            }
            if trimmed.is_empty() {
                return Ok(BindValue::Null(Column::State.kind()));
            }
            let upper: String = trimmed.to_uppercase().chars().take(UF_MAX_LENGTH).collect();
            Ok(BindValue::Text(upper))
        }
        _ => Err("UF deve ter no máximo 2 letras"),
    }
}

/// Exclusive bound of a `NUMERIC(14, 2)` column.
const CREDIT_LIMIT_BOUND: f64 = 1e12;

/// Rounded to cents so every backend stores the same value.
fn credit_limit(raw: &Value) -> Result<BindValue, &'static str> {
    const MESSAGE: &str = "Limite de crédito inválido";
    let parsed = match raw {
        Value::Null => return Ok(BindValue::Null(Column::CreditLimit.kind())),
        Value::String(s) if s.trim().is_empty() => return Ok(BindValue::Null(Column::CreditLimit.kind())),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| MESSAGE)?,
        Value::Number(n) => n.as_f64().ok_or(MESSAGE)?,
        _ => return Err(MESSAGE),
    };
    let cents = (parsed * 100.0).round() / 100.0;
    if cents.is_finite() && cents.abs() < CREDIT_LIMIT_BOUND {
        Ok(BindValue::Float(cents))
    } else {
        Err(MESSAGE)
    }
}

fn valid_until(raw: &Value) -> Result<BindValue, &'static str> {
    match raw {
        Value::Null => Ok(BindValue::Null(Column::ValidUntil.kind())),
        Value::String(s) if s.trim().is_empty() => Ok(BindValue::Null(Column::ValidUntil.kind())),
        Value::String(s) => parse_iso_date(s.trim()).map(BindValue::Date).ok_or("Data inválida"),
        _ => Err("Data inválida"),
    }
}

/// ISO-8601 calendar date; date-times are accepted and keep only their date.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map(|dt| dt.date())
        .ok()
}

fn plain_text(column: Column, raw: &Value) -> Result<BindValue, &'static str> {
    match raw {
        Value::Null => Ok(BindValue::Null(column.kind())),
        Value::String(s) => Ok(BindValue::Text(s.clone())),
        Value::Number(n) => Ok(BindValue::Text(n.to_string())),
        _ => Err("valor deve ser texto"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnKind;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("object expected"),
        }
    }

    fn field_names(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn punctuated_cep_matches_bare_cep() {
        for raw in ["01001-000", "01.001-000", " 01001000 ", "01001 000"] {
            assert_eq!(normalize_cep(raw).as_deref(), Some("01001000"), "{raw}");
        }
        assert_eq!(normalize_cep("1234-567"), None);
        assert_eq!(normalize_cep("123456789"), None);
    }

    #[test]
    fn create_requires_name() {
        let err = RequestValidator::create(&body(json!({ "Cidade": "Rio" })), 1).unwrap_err();
        assert_eq!(field_names(err), vec!["Nome"]);

        let err = RequestValidator::create(&body(json!({ "Nome": "   " })), 1).unwrap_err();
        assert_eq!(field_names(err), vec!["Nome"]);
    }

    #[test]
    fn create_normalizes_fields_and_defaults_owner() {
        let fields = RequestValidator::create(
            &body(json!({
                "Nome": "  Ana Souza ",
                "CEP": "01001-000",
                "UF": " sp ",
                "LimiteCredito": "1500.50",
                "Validade": "2025-12-31",
                "Numero": 42,
                "Desconhecido": "ignored"
            })),
            7,
        )
        .unwrap();
        assert_eq!(fields.get(Column::Name), Some(&BindValue::Text("Ana Souza".into())));
        assert_eq!(fields.get(Column::PostalCode), Some(&BindValue::Text("01001000".into())));
        assert_eq!(fields.get(Column::State), Some(&BindValue::Text("SP".into())));
        assert_eq!(fields.get(Column::CreditLimit), Some(&BindValue::Float(1500.5)));
        assert_eq!(
            fields.get(Column::ValidUntil),
            Some(&BindValue::Date(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()))
        );
        assert_eq!(fields.get(Column::Number), Some(&BindValue::Text("42".into())));
        assert_eq!(fields.get(Column::OwnerId), Some(&BindValue::BigInt(7)));
        assert!(!fields.contains(Column::Code));
    }

    #[test]
    fn explicit_owner_wins_over_default() {
        let fields = RequestValidator::create(&body(json!({ "Nome": "Ana", "idUsuario": "3" })), 1).unwrap();
        assert_eq!(fields.get(Column::OwnerId), Some(&BindValue::BigInt(3)));
    }

    #[test]
    fn empty_optional_values_become_null() {
        let fields = RequestValidator::create(
            &body(json!({ "Nome": "Ana", "CEP": "", "LimiteCredito": "", "Validade": null, "Codigo": "" })),
            1,
        )
        .unwrap();
        assert_eq!(fields.get(Column::PostalCode), Some(&BindValue::Null(ColumnKind::Text)));
        assert_eq!(fields.get(Column::CreditLimit), Some(&BindValue::Null(ColumnKind::Numeric)));
        assert_eq!(fields.get(Column::ValidUntil), Some(&BindValue::Null(ColumnKind::Date)));
        assert!(!fields.contains(Column::Code));
    }

    #[test]
    fn every_invalid_field_is_reported() {
        let err = RequestValidator::create(
            &body(json!({
                "CEP": "123",
                "UF": "SPX",
                "LimiteCredito": "muito",
                "Validade": "31/12/2025",
                "idUsuario": 1.5
            })),
            1,
        )
        .unwrap_err();
        assert_eq!(
            field_names(err),
            vec!["Nome", "idUsuario", "CEP", "UF", "LimiteCredito", "Validade"]
        );
    }

    #[test]
    fn update_keeps_only_supplied_fields() {
        let fields = RequestValidator::update(&body(json!({ "Nome": "X" }))).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get(Column::Name), Some(&BindValue::Text("X".into())));

        assert!(RequestValidator::update(&body(json!({}))).unwrap().is_empty());
        assert!(RequestValidator::update(&body(json!({ "Outro": 1 }))).unwrap().is_empty());
    }

    #[test]
    fn update_rejects_blank_code_and_name() {
        let err = RequestValidator::update(&body(json!({ "Codigo": " ", "Nome": "" }))).unwrap_err();
        assert_eq!(field_names(err), vec!["Codigo", "Nome"]);
    }

    #[test]
    fn iso_dates_accept_date_times() {
        let expected = NaiveDate::from_ymd_opt(2024, 2, 29);
        assert_eq!(parse_iso_date("2024-02-29"), expected);
        assert_eq!(parse_iso_date("2024-02-29T10:00:00Z"), expected);
        assert_eq!(parse_iso_date("2024-02-29T10:00:00.123"), expected);
        assert_eq!(parse_iso_date("2023-02-29"), None);
    }

    #[test]
    fn credit_limit_rejects_non_finite() {
        assert!(credit_limit(&json!("NaN")).is_err());
        assert!(credit_limit(&json!(true)).is_err());
        assert_eq!(credit_limit(&json!(10)), Ok(BindValue::Float(10.0)));
    }

    #[test]
    fn credit_limit_fits_the_column() {
        assert!(credit_limit(&json!(1e15)).is_err());
        assert!(credit_limit(&json!("-1000000000000")).is_err());
        assert!(credit_limit(&json!(999_999_999_999.999)).is_err());
        assert_eq!(
            credit_limit(&json!(999_999_999_999.99_f64)),
            Ok(BindValue::Float(999_999_999_999.99))
        );
        assert_eq!(credit_limit(&json!("10.126")), Ok(BindValue::Float(10.13)));
    }
}
