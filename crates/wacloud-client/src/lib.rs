//! # wacloud-client: WhatsApp Business Cloud API transport
//!
//! Network side of [`wacloud_schema`]: every payload is validated by the
//! schema crate before it is sent and every reply is decoded by it after.
//!
//! ## Capabilities
//!
//! - **Messaging** – send any [`OutboundMessage`](wacloud_schema::OutboundMessage),
//!   mark messages as read, show typing indicators.
//! - **Webhooks** – answer the verification challenge, check
//!   `x-hub-signature-256`, decode deliveries into typed envelopes.
//! - **Transport** – a [`Transport`] seam with a reqwest implementation
//!   ([`CloudApiClient`]) attaching the bearer token.

pub mod api_client;
pub mod error;
pub mod messaging;
pub mod transport;
pub mod types;
pub mod webhooks;

// Re-exports
pub use api_client::CloudApiClient;
pub use error::{WhatsAppError, WhatsAppErrorCode, WhatsAppResult};
pub use messaging::WaMessaging;
pub use transport::Transport;
pub use types::WaConfig;
pub use webhooks::{verify_signature, WaWebhooks};
