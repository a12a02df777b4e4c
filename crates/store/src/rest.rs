//! HTTP client for the remote tabular rowstore.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{Row, RowFilter, StoreError, TableStore};

/// Remote rowstore backend.
///
/// Addresses `{base_url}/tables/{table}/rows`, authenticating with an
/// optional bearer api key. All four operations map 1:1 onto the remote
/// engine's envelopes.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct FetchEnvelope {
    rows: Vec<Row>,
}

#[derive(Deserialize)]
struct InsertEnvelope {
    inserted: Vec<Row>,
}

#[derive(Deserialize)]
struct PatchEnvelope {
    rows: Vec<Row>,
}

#[derive(Deserialize)]
struct DeleteEnvelope {
    deleted: u64,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    message: String,
}

impl RestStore {
    /// Creates a client against `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    fn rows_url(&self, table: &str) -> String {
        format!("{}/tables/{table}/rows", self.base_url)
    }

    fn request(&self, method: Method, url: String) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Turns a non-success response into a typed rejection.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map_or(body, |envelope| envelope.message);
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    fn query_value(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
impl TableStore for RestStore {
    async fn fetch_rows(&self, table: &str, filter: &RowFilter) -> Result<Vec<Row>, StoreError> {
        let mut request = self.request(Method::GET, self.rows_url(table));
        for (column, value) in filter.clauses() {
            request = request.query(&[(column, Self::query_value(value))]);
        }

        let response = Self::check(request.send().await?).await?;
        let envelope: FetchEnvelope = response
            .json()
            .await
            .map_err(|e| StoreError::MalformedResponse(e.to_string()))?;
        Ok(envelope.rows)
    }

    async fn insert_rows(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        let request = self
            .request(Method::POST, self.rows_url(table))
            .json(&json!({ "records": rows }));

        let response = Self::check(request.send().await?).await?;
        let envelope: InsertEnvelope = response
            .json()
            .await
            .map_err(|e| StoreError::MalformedResponse(e.to_string()))?;
        Ok(envelope.inserted)
    }

    async fn patch_rows(&self, table: &str, id: i64, fields: Row) -> Result<Vec<Row>, StoreError> {
        let url = format!("{}/{id}", self.rows_url(table));
        let request = self
            .request(Method::PATCH, url)
            .json(&json!({ "fields": fields }));

        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::RowNotFound {
                table: table.to_string(),
                id,
            });
        }

        let response = Self::check(response).await?;
        let envelope: PatchEnvelope = response
            .json()
            .await
            .map_err(|e| StoreError::MalformedResponse(e.to_string()))?;
        Ok(envelope.rows)
    }

    async fn delete_rows(&self, table: &str, ids: &[i64]) -> Result<u64, StoreError> {
        let request = self
            .request(Method::DELETE, self.rows_url(table))
            .json(&json!({ "ids": ids }));

        let response = Self::check(request.send().await?).await?;
        let envelope: DeleteEnvelope = response
            .json()
            .await
            .map_err(|e| StoreError::MalformedResponse(e.to_string()))?;
        Ok(envelope.deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let store = RestStore::new("https://rows.example/", None);
        assert_eq!(
            store.rows_url("companies"),
            "https://rows.example/tables/companies/rows"
        );
    }

    #[test]
    fn test_query_value_rendering() {
        assert_eq!(RestStore::query_value(&Value::String("a".into())), "a");
        assert_eq!(RestStore::query_value(&serde_json::json!(7)), "7");
        assert_eq!(RestStore::query_value(&serde_json::json!(true)), "true");
    }
}
