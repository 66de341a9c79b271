//! Client for the `/clientes` API. Bodies are passed through unmodified.

use super::ClientError;
use crate::error::ErrorBody;
use crate::model::{Customer, ListQuery};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for the API served at `base_url` (e.g. `http://localhost:3000`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ApiClient { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Customer>, ClientError> {
        let response = self.client.get(self.url("/clientes")).query(query).send().await?;
        json_or_error(response).await
    }

    pub async fn get(&self, id: i64) -> Result<Customer, ClientError> {
        let response = self.client.get(self.url(&format!("/clientes/{id}"))).send().await?;
        json_or_error(response).await
    }

    pub async fn create(&self, body: &Value) -> Result<Customer, ClientError> {
        let response = self.client.post(self.url("/clientes")).json(body).send().await?;
        json_or_error(response).await
    }

    pub async fn update(&self, id: i64, body: &Value) -> Result<Customer, ClientError> {
        let response = self
            .client
            .put(self.url(&format!("/clientes/{id}")))
            .json(body)
            .send()
            .await?;
        json_or_error(response).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        let response = self.client.delete(self.url(&format!("/clientes/{id}"))).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(api_error(response).await)
        }
    }
}

async fn json_or_error<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if response.status().is_success() {
        Ok(response.json().await?)
    } else {
        Err(api_error(response).await)
    }
}

/// Decode the server's JSON error body; fall back to the raw text.
async fn api_error(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => ClientError::Api {
            status,
            message: body.message,
            errors: body.errors.unwrap_or_default(),
        },
        Err(_) => ClientError::Api {
            status,
            message: text,
            errors: Vec::new(),
        },
    }
}
