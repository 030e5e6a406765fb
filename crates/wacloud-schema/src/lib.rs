//! # wacloud-schema: WhatsApp Cloud API payload schemas
//!
//! Typed, path-qualified validation for everything that crosses the
//! WhatsApp Business Cloud API boundary. No I/O: every entry point is a pure
//! function over bytes or typed values.
//!
//! ## Capabilities
//!
//! - **Webhooks** – decode the `whatsapp_business_account` envelope and
//!   resolve each change by `field`: inbound messages (14 kinds, including a
//!   forward-compatible `unknown`), delivery statuses, template status,
//!   quality, components and category updates.
//! - **Outbound** – build text, media, location, contacts, template,
//!   interactive (reply buttons, lists, CTA URL) and reaction messages, plus
//!   read receipts and typing indicators, each checked against the same
//!   schema used to decode it.
//! - **Responses** – decode the send-message and action replies.
//! - **Errors** – every rejection is a [`ValidationError`] listing
//!   violations such as `entry[0].changes[0].value.messages[0].text.body:
//!   missing required field`, either the first one
//!   ([`DecodeMode::FailFast`]) or all of them ([`DecodeMode::CollectAll`]).

pub mod outbound;
pub mod response;
pub mod schema;
pub mod webhook;

// Re-exports
pub use outbound::builder::*;
pub use outbound::{OutboundContent, OutboundKind, OutboundMessage, ReadReceipt};
pub use response::{ActionResponse, SendMessageResponse};
pub use schema::{
    decode_slice, decode_value, DecodeMode, ErrorKind, FieldPath, Schema, ValidationError,
    Violation,
};
pub use webhook::{decode_webhook, decode_webhook_with, Change, ChangeField, WebhookEnvelope};
