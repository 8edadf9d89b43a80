//! HTTP JSON data source.
//!
//! Sends each region query to an endpoint that performs the actual search
//! (a headless-browser service, a scraping API, ...) and expects entity
//! records back as JSON.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{DataSourceError, DataSourceResult};
use crate::query::QueryDescriptor;
use crate::traits::source::DataSource;
use crate::types::entity::EntityRecord;

/// Accepted response bodies.
#[derive(Deserialize)]
#[serde(untagged)]
enum EntityPayload {
    Bare(Vec<EntityRecord>),
    Envelope { data: Vec<EntityRecord> },
}

pub struct HttpDataSource {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpDataSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            token: None,
        }
    }

    /// Authenticate requests with a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Use a preconfigured client (timeouts, proxies, ...).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Query-string parameters for one request.
fn query_params(query: &QueryDescriptor) -> Vec<(&'static str, String)> {
    vec![
        ("q", query.query_text()),
        ("category", query.category.clone()),
        ("radius", query.radius.to_string()),
        ("unit", query.unit.to_string()),
        ("lat", query.center.lat.to_string()),
        ("lon", query.center.lon.to_string()),
    ]
}

/// Decode a response body into records.
pub fn decode_entities(body: &[u8]) -> DataSourceResult<Vec<EntityRecord>> {
    let payload: EntityPayload = serde_json::from_slice(body)?;
    Ok(match payload {
        EntityPayload::Bare(records) => records,
        EntityPayload::Envelope { data } => data,
    })
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch_entities(&self, query: &QueryDescriptor) -> DataSourceResult<Vec<EntityRecord>> {
        let mut request = self.client.get(&self.endpoint).query(&query_params(query));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DataSourceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.bytes().await?;
        let records = decode_entities(&body)?;
        tracing::debug!(count = records.len(), query = %query.query_text(), "Fetched entities");
        Ok(records)
    }

    fn name(&self) -> &str {
        "http"
    }
}
