//! ViaCEP lookup: resolves a CEP into the registry's address fields.

use super::ClientError;
use crate::service::normalize_cep;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const VIACEP_BASE_URL: &str = "https://viacep.com.br";

/// Address fields filled from a CEP, keyed like the customer body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "Logradouro")]
    pub street: String,
    #[serde(rename = "Bairro")]
    pub district: String,
    #[serde(rename = "Cidade")]
    pub city: String,
    #[serde(rename = "UF")]
    pub state: String,
    #[serde(rename = "Complemento")]
    pub complement: String,
}

#[derive(Debug, Deserialize)]
struct ViaCepPayload {
    #[serde(default)]
    logradouro: Option<String>,
    #[serde(default)]
    bairro: Option<String>,
    #[serde(default)]
    localidade: Option<String>,
    #[serde(default)]
    uf: Option<String>,
    #[serde(default)]
    complemento: Option<String>,
    /// `true` (or `"true"`) when the CEP does not exist.
    #[serde(default)]
    erro: Option<Value>,
}

impl ViaCepPayload {
    fn is_error(&self) -> bool {
        match &self.erro {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(Value::String(s)) => !s.is_empty() && s != "false",
            Some(_) => true,
        }
    }

    fn into_address(self) -> Address {
        Address {
            street: self.logradouro.unwrap_or_default(),
            district: self.bairro.unwrap_or_default(),
            city: self.localidade.unwrap_or_default(),
            state: self.uf.unwrap_or_default(),
            complement: self.complemento.unwrap_or_default(),
        }
    }
}

#[derive(Clone)]
pub struct ViaCepClient {
    client: Client,
    base_url: String,
}

impl ViaCepClient {
    pub fn new() -> Result<Self, ClientError> {
        Self::with_base_url(VIACEP_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(ViaCepClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// None when the input is not an 8-digit CEP or ViaCEP does not know it.
    pub async fn lookup(&self, cep: &str) -> Result<Option<Address>, ClientError> {
        let Some(cep) = normalize_cep(cep) else {
            return Ok(None);
        };
        let url = format!("{}/ws/{}/json/", self.base_url, cep);
        tracing::debug!(url = %url, "viacep lookup");
        let payload: ViaCepPayload = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if payload.is_error() {
            return Ok(None);
        }
        Ok(Some(payload.into_address()))
    }
}
