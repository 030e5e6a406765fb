//! Incoming webhook handling.
//!
//! Handles:
//! - Webhook verification challenge (`GET /webhook`)
//! - Signature validation of the raw body using the app secret
//! - Decoding the body into a typed [`WebhookEnvelope`]

use crate::error::{WhatsAppError, WhatsAppErrorCode, WhatsAppResult};
use crate::types::WaConfig;
use hmac::{Hmac, Mac};
use log::{debug, info, warn};
use sha2::Sha256;
use wacloud_schema::{decode_webhook_with, DecodeMode, WebhookEnvelope};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Check an `x-hub-signature-256` value (`sha256=<hex>`) against the raw
/// body. The comparison is constant-time.
pub fn verify_signature(app_secret: &str, signature_header: &str, body: &[u8]) -> bool {
    let Some(hex_digest) = signature_header.trim().strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(app_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Webhook processor.
pub struct WaWebhooks {
    verify_token: Option<String>,
    app_secret: Option<String>,
    mode: DecodeMode,
}

impl WaWebhooks {
    pub fn new(verify_token: Option<String>, app_secret: Option<String>) -> Self {
        Self {
            verify_token,
            app_secret,
            mode: DecodeMode::FailFast,
        }
    }

    pub fn from_config(config: &WaConfig) -> Self {
        Self::new(
            config.webhook_verify_token.clone(),
            config.app_secret.clone(),
        )
    }

    /// Report every violation of a rejected body instead of the first.
    pub fn collect_all(mut self) -> Self {
        self.mode = DecodeMode::CollectAll;
        self
    }

    // ─── Verification challenge ─────────────────────────────────────

    /// Handle the GET verification challenge.
    ///
    /// Returns the `hub.challenge` value if the token matches.
    pub fn verify_challenge(
        &self,
        mode: &str,
        token: &str,
        challenge: &str,
    ) -> WhatsAppResult<String> {
        let failed = |message: &str| WhatsAppError {
            code: WhatsAppErrorCode::WebhookVerificationFailed,
            message: message.into(),
            details: None,
            http_status: Some(403),
        };
        if mode != "subscribe" {
            return Err(failed("Invalid webhook mode (expected 'subscribe')"));
        }
        match self.verify_token.as_deref() {
            Some(expected) if expected == token => {
                info!("Webhook verification challenge accepted");
                Ok(challenge.to_string())
            }
            Some(_) => Err(failed("Verify token mismatch")),
            None => Err(failed("No webhook verify token configured")),
        }
    }

    // ─── Delivery ────────────────────────────────────────────────────

    /// Verify the signature (when an app secret is configured) and decode
    /// the raw POST body.
    pub fn process(
        &self,
        signature_header: Option<&str>,
        raw_body: &[u8],
    ) -> WhatsAppResult<WebhookEnvelope> {
        match (&self.app_secret, signature_header) {
            (Some(secret), Some(sig)) => {
                if !verify_signature(secret, sig, raw_body) {
                    return Err(WhatsAppError {
                        code: WhatsAppErrorCode::InvalidSignature,
                        message: "Webhook signature mismatch".into(),
                        details: None,
                        http_status: Some(401),
                    });
                }
            }
            (Some(_), None) => {
                return Err(WhatsAppError {
                    code: WhatsAppErrorCode::InvalidSignature,
                    message: format!("Missing {} header", SIGNATURE_HEADER),
                    details: None,
                    http_status: Some(401),
                });
            }
            (None, _) => warn!("No app_secret configured; skipping signature check"),
        }

        let envelope = decode_webhook_with(raw_body, self.mode)?;
        debug!(
            "webhook accepted: {} messages, {} statuses",
            envelope.messages().count(),
            envelope.statuses().count()
        );
        Ok(envelope)
    }
}
