//! CustomerService: validation, code generation, and CRUD over a store.

pub mod code;
mod crud;
mod validation;
pub use crud::CustomerService;
pub use validation::{digits_only, normalize_cep, parse_iso_date, RequestValidator, CEP_LENGTH};
