//! Row store over the BaaS PostgREST endpoint

use crate::config::BaasConfig;
use crate::error::StoreError;
use crate::query::{filter_params, Filter, Query};
use crate::row_store::{require_filters, RowStore};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use riskhub_core::Row;
use serde::Deserialize;
use tracing::{debug, warn};

/// Error document returned by PostgREST
#[derive(Debug, Default, Deserialize)]
struct PostgrestErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

/// HTTP row store authenticated with the service role key
///
/// The service role bypasses row-level security; organization scoping is
/// applied by the caller through filters.
#[derive(Debug, Clone)]
pub struct PostgrestStore {
    client: Client,
    config: BaasConfig,
}

impl PostgrestStore {
    /// Build a client with the configured timeout
    ///
    /// # Errors
    /// Fails if the TLS backend cannot be initialised.
    pub fn new(config: BaasConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Use an existing client (shared connection pool)
    #[must_use]
    pub fn with_client(client: Client, config: BaasConfig) -> Self {
        Self { client, config }
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.config.rest_url(table))
            .header("apikey", &self.config.service_role_key)
            .bearer_auth(&self.config.service_role_key)
    }

    async fn send(&self, table: &str, builder: RequestBuilder) -> Result<Response, StoreError> {
        let response = builder.send().await.map_err(|e| transport_error(table, &e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let body: PostgrestErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let mut message = body.message.unwrap_or_else(|| text.clone());
        if let Some(details) = body.details.filter(|d| !d.is_empty()) {
            message = format!("{message} ({details})");
        }
        if let Some(hint) = body.hint.filter(|h| !h.is_empty()) {
            message = format!("{message}; hint: {hint}");
        }
        warn!(table, status = status.as_u16(), code = ?body.code, "row store request failed");
        Err(StoreError::Backend {
            table: table.to_string(),
            status: status.as_u16(),
            code: body.code,
            message,
        })
    }

    async fn rows(&self, table: &str, response: Response) -> Result<Vec<Row>, StoreError> {
        response.json::<Vec<Row>>().await.map_err(|e| StoreError::Decode {
            table: table.to_string(),
            reason: e.to_string(),
        })
    }
}

fn transport_error(table: &str, err: &reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout {
            table: table.to_string(),
        }
    } else {
        StoreError::Transport(err.to_string())
    }
}

#[async_trait]
impl RowStore for PostgrestStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, StoreError> {
        debug!(table, filters = query.filters.len(), "select");
        let builder = self.request(Method::GET, table).query(&query.to_params());
        let response = self.send(table, builder).await?;
        self.rows(table, response).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        debug!(table, count = rows.len(), "insert");
        let builder = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&rows);
        let response = self.send(table, builder).await?;
        self.rows(table, response).await
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Row,
    ) -> Result<Vec<Row>, StoreError> {
        require_filters("update", table, filters)?;
        debug!(table, filters = filters.len(), "update");
        let builder = self
            .request(Method::PATCH, table)
            .query(&filter_params(filters))
            .header("Prefer", "return=representation")
            .json(&patch);
        let response = self.send(table, builder).await?;
        self.rows(table, response).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), StoreError> {
        require_filters("delete", table, filters)?;
        debug!(table, filters = filters.len(), "delete");
        let builder = self
            .request(Method::DELETE, table)
            .query(&filter_params(filters));
        self.send(table, builder).await?;
        Ok(())
    }
}
