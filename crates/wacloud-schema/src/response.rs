//! Bodies returned by the Cloud API for accepted requests.

use crate::schema::{Decoder, Schema};
use crate::webhook::messages::MESSAGING_PRODUCT;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseContact {
    /// Number as sent in `to`.
    pub input: String,
    pub wa_id: String,
}

impl Schema for ResponseContact {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let input = d.field(obj, "input");
        let wa_id = d.field(obj, "wa_id");
        Some(Self {
            input: input?,
            wa_id: wa_id?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMessage {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_status: Option<String>,
}

impl Schema for ResponseMessage {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let id = d.required(obj, "id", |d, v| d.non_empty_string(v));
        let message_status = d.opt_field(obj, "message_status");
        Some(Self {
            id: id?,
            message_status: message_status?,
        })
    }
}

/// Reply to `POST /{phone-number-id}/messages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendMessageResponse {
    pub messaging_product: String,
    pub contacts: Vec<ResponseContact>,
    pub messages: Vec<ResponseMessage>,
}

impl SendMessageResponse {
    /// The `wamid` assigned to the sent message.
    pub fn message_id(&self) -> Option<&str> {
        self.messages.first().map(|m| m.id.as_str())
    }
}

impl Schema for SendMessageResponse {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let product = d.required(obj, "messaging_product", |d, v| {
            d.literal(v, MESSAGING_PRODUCT)
        });
        let contacts = d.field(obj, "contacts");
        let messages = d.required(obj, "messages", |d, v| {
            d.bounded_array(v, 1, usize::MAX, |d, item| ResponseMessage::decode(d, item))
        });
        Some(Self {
            messaging_product: product?,
            contacts: contacts?,
            messages: messages?,
        })
    }
}

/// `{ "success": bool }` returned by read receipts and similar actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionResponse {
    pub success: bool,
}

impl Schema for ActionResponse {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        Some(Self {
            success: d.field(obj, "success")?,
        })
    }
}
