//! HTTP client for the WhatsApp Business Cloud API (Meta Graph API).

use crate::error::{WhatsAppError, WhatsAppResult};
use crate::transport::Transport;
use crate::types::WaConfig;
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::time::Duration;

/// [`Transport`] over the Graph API. One attempt per request.
#[derive(Debug, Clone)]
pub struct CloudApiClient {
    client: reqwest::Client,
    config: WaConfig,
}

impl CloudApiClient {
    pub fn new(config: &WaConfig) -> WhatsAppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec as u64))
            .connect_timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| WhatsAppError::network(format!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &WaConfig {
        &self.config
    }

    /// Build a Graph API URL: `{base}/{version}/{path}`.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_version,
            path.trim_start_matches('/')
        )
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(&format!("Bearer {}", self.config.access_token)) {
            headers.insert(AUTHORIZATION, v);
        }
        headers
    }
}

/// Interpret a Graph API reply. An empty 2xx body counts as `{"success": true}`.
pub(crate) fn read_reply(status: u16, body: &str) -> WhatsAppResult<Value> {
    if !(200..300).contains(&status) {
        return Err(WhatsAppError::from_api_response(status, body));
    }
    if body.trim().is_empty() {
        return Ok(serde_json::json!({ "success": true }));
    }
    serde_json::from_str(body).map_err(|e| {
        let mut err = WhatsAppError::new(
            crate::error::WhatsAppErrorCode::UnexpectedResponse,
            format!("JSON parse error: {}", e),
        );
        err.http_status = Some(status);
        err
    })
}

#[async_trait]
impl Transport for CloudApiClient {
    async fn post_json(&self, path: &str, body: &Value) -> WhatsAppResult<Value> {
        let url = self.url(path);
        debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .headers(self.auth_headers())
            .json(body)
            .send()
            .await
            .map_err(|e| WhatsAppError::network(e.to_string()))?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| WhatsAppError::network(format!("reading response body: {}", e)))?;
        debug!("POST {} -> {}", url, status);
        read_reply(status, &text)
    }
}
