//! Seam between the messaging layer and the network.

use crate::error::WhatsAppResult;
use async_trait::async_trait;
use serde_json::Value;

/// Carries an already-validated JSON body to the Graph API and returns the
/// parsed reply. `path` is relative to `{base}/{version}/`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, path: &str, body: &Value) -> WhatsAppResult<Value>;
}
