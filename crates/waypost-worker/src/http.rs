//! JSON-over-HTTP delivery handler.
//!
//! POSTs each sample to a fixed endpoint. Non-2xx responses are reported
//! failures (the sample stays queued); transport errors are handler errors.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use waypost_core::{Config, LocationQueueItem};

use crate::delivery::{DeliveryHandler, DeliveryOutcome};

#[derive(Clone, Debug)]
pub struct HttpDelivery {
    client: Client,
    endpoint: String,
    token: Option<String>,
    fallback_device_id: Option<String>,
}

impl HttpDelivery {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: None,
            fallback_device_id: None,
        })
    }

    /// Create a handler from `WAYPOST_DELIVERY_*` settings.
    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint = config
            .delivery_url
            .clone()
            .context("Missing delivery endpoint. Set WAYPOST_DELIVERY_URL")?;

        Ok(Self::new(endpoint, config.delivery_timeout)?.with_token(config.delivery_token.clone()))
    }

    /// Send `Authorization: Bearer {token}` with every request.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Device id attached to samples captured before one was known.
    pub fn with_fallback_device_id(mut self, device_id: Option<String>) -> Self {
        self.fallback_device_id = device_id;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DeliveryHandler for HttpDelivery {
    async fn deliver(&self, item: &LocationQueueItem) -> Result<DeliveryOutcome> {
        let body = item
            .clone()
            .with_device_id(self.fallback_device_id.as_deref());

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("Failed to send location sample")?;

        let status = response.status();
        if status.is_success() {
            return Ok(DeliveryOutcome::success());
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Ok(DeliveryOutcome::failure(format!(
            "status {}: {}",
            status.as_u16(),
            error_text
        )))
    }
}
