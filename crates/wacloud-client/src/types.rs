//! Client configuration.

use serde::{Deserialize, Serialize};

/// Cloud API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaConfig {
    /// Meta Graph API access token (long-lived or system-user token).
    pub access_token: String,
    /// Phone Number ID (the sending phone number registered in WhatsApp Business).
    pub phone_number_id: String,
    /// Graph API version (e.g. "v21.0").
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Base URL override (default: `https://graph.facebook.com`).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Webhook verify token (for incoming webhook verification).
    #[serde(default)]
    pub webhook_verify_token: Option<String>,
    /// App secret for webhook signature verification.
    #[serde(default)]
    pub app_secret: Option<String>,
    /// Timeout in seconds for API calls.
    #[serde(default = "default_timeout")]
    pub timeout_sec: u32,
}

fn default_api_version() -> String {
    "v21.0".to_string()
}
fn default_base_url() -> String {
    "https://graph.facebook.com".to_string()
}
fn default_timeout() -> u32 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_defaults() {
        let config: WaConfig = serde_json::from_value(json!({
            "accessToken": "EAAG",
            "phoneNumberId": "106540352242922"
        }))
        .unwrap();
        assert_eq!(config.api_version, "v21.0");
        assert_eq!(config.base_url, "https://graph.facebook.com");
        assert_eq!(config.timeout_sec, 30);
        assert!(config.app_secret.is_none());
    }

    #[test]
    fn test_config_round_trip_keys() {
        let config: WaConfig = serde_json::from_value(json!({
            "accessToken": "EAAG",
            "phoneNumberId": "106540352242922",
            "webhookVerifyToken": "verify-me"
        }))
        .unwrap();
        let value = serde_json::to_value(&config).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert!(!keys.contains(&"businessAccountId"));
        assert_eq!(value["webhookVerifyToken"], "verify-me");
        assert_eq!(value["timeoutSec"], 30);
    }
}
