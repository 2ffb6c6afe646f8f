//! Inventory backend client
//!
//! The console only reads topology and writes audit events; everything else
//! the backend offers is out of reach from here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

use crate::config::BackendConfig;
use crate::error::AppError;
use crate::models::{AuditEvent, CustomerNodeDetails, HeadendSummary, Topology};

/// Read side of the inventory backend used by the topology console
#[async_trait]
pub trait TopologyService: Send + Sync {
    async fn list_headends(&self) -> Result<Vec<HeadendSummary>, AppError>;

    /// `Ok(None)` when the backend has no document for the headend
    async fn get_topology(&self, headend_id: &str) -> Result<Option<Topology>, AppError>;

    async fn get_customer_details(
        &self,
        customer_id: &str,
    ) -> Result<Option<CustomerNodeDetails>, AppError>;
}

/// Audit log sink
#[async_trait]
pub trait AuditService: Send + Sync {
    async fn log(&self, event: &AuditEvent) -> Result<(), AppError>;
}

/// reqwest-backed client for the inventory REST API
#[derive(Clone)]
pub struct InventoryClient {
    http_client: Client,
    base_url: Url,
    api_token: Option<String>,
}

impl InventoryClient {
    pub fn new(config: &BackendConfig) -> Result<Self, AppError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::ConfigError(format!("backend.base_url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::ConfigError(format!(
                "backend.base_url is not a base URL: {}",
                base_url
            )));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            api_token: config.api_token.clone().filter(|t| !t.is_empty()),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::ConfigError("backend.base_url is not a base URL".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// GET a JSON payload. 404 maps to `Value::Null`.
    async fn get_json(&self, segments: &[&str]) -> Result<Value, AppError> {
        let url = self.endpoint(segments)?;
        tracing::debug!("GET {}", url);

        let resp = self.authorized(self.http_client.get(url.clone())).send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Value::Null);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!("GET {} failed: HTTP {} {}", url, status, body);
            return Err(AppError::Upstream(format!("HTTP {}", status.as_u16())));
        }

        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| AppError::Upstream(format!("invalid JSON from {}: {}", url.path(), e)))?;
        Ok(unwrap_envelope(value))
    }
}

/// The backend wraps payloads as `{ success, message, data, timestamp }`;
/// bare payloads pass through unchanged.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.contains_key("data")
                && (map.contains_key("success")
                    || map.contains_key("message")
                    || map.contains_key("timestamp")) =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[async_trait]
impl TopologyService for InventoryClient {
    async fn list_headends(&self) -> Result<Vec<HeadendSummary>, AppError> {
        let value = self.get_json(&["api", "topology", "headends"]).await?;
        Ok(match value {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }

    async fn get_topology(&self, headend_id: &str) -> Result<Option<Topology>, AppError> {
        let value = self.get_json(&["api", "topology", headend_id]).await?;
        if !value.is_object() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| AppError::Upstream(format!("malformed topology document: {}", e)))
    }

    async fn get_customer_details(
        &self,
        customer_id: &str,
    ) -> Result<Option<CustomerNodeDetails>, AppError> {
        let value = self
            .get_json(&["api", "topology", "customer", customer_id])
            .await?;
        if !value.is_object() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| AppError::Upstream(format!("malformed customer details: {}", e)))
    }
}

#[async_trait]
impl AuditService for InventoryClient {
    async fn log(&self, event: &AuditEvent) -> Result<(), AppError> {
        let url = self.endpoint(&["api", "audit", "log"])?;
        let resp = self
            .authorized(self.http_client.post(url))
            .json(event)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::Upstream(format!(
                "audit log rejected: HTTP {}",
                resp.status().as_u16()
            )));
        }
        Ok(())
    }
}
