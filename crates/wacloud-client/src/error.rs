//! Crate-level error types for the Cloud API client.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wacloud_schema::ValidationError;

/// Alias for `Result<T, WhatsAppError>`.
pub type WhatsAppResult<T> = Result<T, WhatsAppError>;

/// Uniform error type used across the client crate.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}{}", detail_suffix(.details))]
pub struct WhatsAppError {
    pub code: WhatsAppErrorCode,
    pub message: String,
    /// Sub-error detail from the upstream API or the violated path.
    pub details: Option<String>,
    /// HTTP status code if originated from an API call.
    pub http_status: Option<u16>,
}

fn detail_suffix(details: &Option<String>) -> String {
    details
        .as_deref()
        .map(|d| format!(" ({})", d))
        .unwrap_or_default()
}

/// Categorised error codes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WhatsAppErrorCode {
    // ── Auth ─────────────────────────────────────────────
    InvalidAccessToken,
    TokenExpired,
    InsufficientPermissions,
    // ── API ──────────────────────────────────────────────
    RateLimited,
    InvalidParameter,
    ResourceNotFound,
    // ── Messaging ────────────────────────────────────────
    RecipientNotOnWhatsApp,
    MessageUndeliverable,
    TemplateNotFound,
    MessageWindowExpired,
    // ── Webhooks ─────────────────────────────────────────
    WebhookVerificationFailed,
    InvalidSignature,
    // ── Payloads ─────────────────────────────────────────
    InvalidPayload,
    UnexpectedResponse,
    // ── Internal ─────────────────────────────────────────
    NetworkError,
    InternalError,
}

impl WhatsAppError {
    pub fn new(code: WhatsAppErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            http_status: None,
        }
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::new(WhatsAppErrorCode::NetworkError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(WhatsAppErrorCode::InternalError, msg)
    }

    /// A 2xx reply whose body did not match the expected schema.
    pub fn unexpected_response(err: ValidationError) -> Self {
        Self {
            code: WhatsAppErrorCode::UnexpectedResponse,
            message: format!("response rejected: {}", err.first()),
            details: (err.len() > 1).then(|| err.to_string()),
            http_status: None,
        }
    }

    /// Build from an upstream API JSON error body.
    pub fn from_api_response(status: u16, body: &str) -> Self {
        // Meta returns:  { "error": { "message": "...", "type": "...", "code": N, "error_subcode": N, "fbtrace_id": "..." } }
        match serde_json::from_str::<Value>(body) {
            Ok(v) => {
                let err = &v["error"];
                let message = err["message"]
                    .as_str()
                    .unwrap_or("Unknown API error")
                    .to_string();
                let api_code = err["code"].as_u64().unwrap_or(0);
                let subcode = err["error_subcode"].as_u64().unwrap_or(0);
                let details = format!(
                    "type={}, code={}, error_subcode={}, fbtrace_id={}",
                    err["type"].as_str().unwrap_or(""),
                    api_code,
                    subcode,
                    err["fbtrace_id"].as_str().unwrap_or(""),
                );
                Self {
                    code: Self::classify(status, api_code, subcode, &message),
                    message,
                    details: Some(details),
                    http_status: Some(status),
                }
            }
            Err(_) => Self {
                code: Self::classify(status, 0, 0, ""),
                message: "Unparseable API error".to_string(),
                details: Some(body.chars().take(500).collect()),
                http_status: Some(status),
            },
        }
    }

    fn classify(status: u16, api_code: u64, subcode: u64, msg: &str) -> WhatsAppErrorCode {
        match api_code {
            190 if subcode == 463 => return WhatsAppErrorCode::TokenExpired,
            190 => return WhatsAppErrorCode::InvalidAccessToken,
            10 | 200..=299 => return WhatsAppErrorCode::InsufficientPermissions,
            4 | 80007 | 130429 | 131048 | 131056 => return WhatsAppErrorCode::RateLimited,
            131026 => return WhatsAppErrorCode::MessageUndeliverable,
            131047 => return WhatsAppErrorCode::MessageWindowExpired,
            132001 => return WhatsAppErrorCode::TemplateNotFound,
            100 => return WhatsAppErrorCode::InvalidParameter,
            _ => {}
        }
        let lower = msg.to_lowercase();
        match status {
            401 if lower.contains("expired") => WhatsAppErrorCode::TokenExpired,
            401 => WhatsAppErrorCode::InvalidAccessToken,
            403 => WhatsAppErrorCode::InsufficientPermissions,
            404 => WhatsAppErrorCode::ResourceNotFound,
            429 => WhatsAppErrorCode::RateLimited,
            _ if lower.contains("template") && lower.contains("not found") => {
                WhatsAppErrorCode::TemplateNotFound
            }
            _ if lower.contains("recipient") || lower.contains("not on whatsapp") => {
                WhatsAppErrorCode::RecipientNotOnWhatsApp
            }
            _ => WhatsAppErrorCode::InternalError,
        }
    }
}

impl From<ValidationError> for WhatsAppError {
    fn from(err: ValidationError) -> Self {
        Self {
            code: WhatsAppErrorCode::InvalidPayload,
            message: err.first().to_string(),
            details: (err.len() > 1).then(|| err.to_string()),
            http_status: None,
        }
    }
}
