use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{ApiRequest, ApiResponse, Method, Transport};
use crate::config::ConnectorConfig;
use crate::error::ConnectorError;

/// reqwest-backed transport with optional bearer authentication.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    host: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(
        host: &str,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ConnectorError> {
        let host = host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(ConnectorError::NoHostGiven);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            host: host.to_string(),
            // An empty key means "no key"
            api_key: api_key.filter(|k| !k.is_empty()).map(str::to_string),
        })
    }

    pub fn from_config(config: &ConnectorConfig) -> Result<Self, ConnectorError> {
        Self::new(
            &config.host,
            config.api_key.as_deref(),
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.host, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ConnectorError> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &self.api_key {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        debug!(method = %request.method, path = %request.path, status, "Engine responded");

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            // Proxies in front of the engine may answer with plain text
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok(ApiResponse { status, body })
    }
}
