//! Outbound message payloads.
//!
//! An [`OutboundMessage`] serializes to the Cloud API `/messages` body:
//!
//! ```json
//! { "messaging_product": "whatsapp", "recipient_type": "individual",
//!   "to": "...", "type": "<kind>", "<kind>": { ... } }
//! ```
//!
//! Every builder in [`builder`] validates the serialized form with the same
//! [`Schema`] used to decode it, so a payload that leaves this crate has
//! already passed every bound, enum domain and URL check.

pub mod builder;
pub mod content;
pub mod interactive;
pub mod template;

use crate::schema::{
    decode_value, serialize_tagged, wire_enum, DecodeMode, Decoder, ErrorKind, FieldPath, Object,
    Schema, ValidationError, WireEnum,
};
use crate::webhook::messages::MESSAGING_PRODUCT;
use serde::{Serialize, Serializer};
use serde_json::Value;

pub use content::{
    ContactCard, DocumentContent, DocumentRef, LocationContent, MediaContent, MediaRef,
    MediaSource, ReactionContent, ReplyContext, TextContent,
};
pub use interactive::InteractiveContent;
pub use template::TemplateContent;

pub const RECIPIENT_TYPE: &str = "individual";

wire_enum! {
    /// Sendable message kinds.
    pub enum OutboundKind {
        Text => "text",
        Image => "image",
        Video => "video",
        Audio => "audio",
        Document => "document",
        Sticker => "sticker",
        Location => "location",
        Contacts => "contacts",
        Template => "template",
        Interactive => "interactive",
        Reaction => "reaction",
    }
}

/// Kind-specific part of an [`OutboundMessage`].
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundContent {
    Text(TextContent),
    Image(MediaContent),
    Video(MediaContent),
    Audio(MediaRef),
    Document(DocumentContent),
    Sticker(MediaRef),
    Location(LocationContent),
    Contacts(Vec<ContactCard>),
    Template(TemplateContent),
    Interactive(InteractiveContent),
    Reaction(ReactionContent),
}

impl OutboundContent {
    pub fn kind(&self) -> OutboundKind {
        match self {
            Self::Text(_) => OutboundKind::Text,
            Self::Image(_) => OutboundKind::Image,
            Self::Video(_) => OutboundKind::Video,
            Self::Audio(_) => OutboundKind::Audio,
            Self::Document(_) => OutboundKind::Document,
            Self::Sticker(_) => OutboundKind::Sticker,
            Self::Location(_) => OutboundKind::Location,
            Self::Contacts(_) => OutboundKind::Contacts,
            Self::Template(_) => OutboundKind::Template,
            Self::Interactive(_) => OutboundKind::Interactive,
            Self::Reaction(_) => OutboundKind::Reaction,
        }
    }

    /// Resolve `type` and decode the same-named member. Members named after
    /// other kinds are rejected.
    fn decode_from(d: &mut Decoder, obj: &Object) -> Option<Self> {
        let kind = d.discriminator::<OutboundKind>(obj, "type")?;
        let key = kind.as_wire();
        let content = match kind {
            OutboundKind::Text => d.field(obj, key).map(Self::Text),
            OutboundKind::Image => d.field(obj, key).map(Self::Image),
            OutboundKind::Video => d.field(obj, key).map(Self::Video),
            OutboundKind::Audio => d.field(obj, key).map(Self::Audio),
            OutboundKind::Document => d.field(obj, key).map(Self::Document),
            OutboundKind::Sticker => d.field(obj, key).map(Self::Sticker),
            OutboundKind::Location => d.field(obj, key).map(Self::Location),
            OutboundKind::Contacts => d
                .required(obj, key, |d, v| {
                    d.bounded_array(v, 1, usize::MAX, |d, card| ContactCard::decode(d, card))
                })
                .map(Self::Contacts),
            OutboundKind::Template => d.field(obj, key).map(Self::Template),
            OutboundKind::Interactive => d.field(obj, key).map(Self::Interactive),
            OutboundKind::Reaction => d.field(obj, key).map(Self::Reaction),
        };
        let others: Vec<&str> = OutboundKind::VARIANTS
            .iter()
            .copied()
            .filter(|k| *k != key)
            .collect();
        let clean = d.forbid(obj, &others);
        clean.and(content)
    }
}

impl Serialize for OutboundContent {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let tag = self.kind().as_wire();
        match self {
            Self::Text(c) => serialize_tagged(s, tag, Some((tag, c))),
            Self::Image(c) | Self::Video(c) => serialize_tagged(s, tag, Some((tag, c))),
            Self::Audio(c) | Self::Sticker(c) => serialize_tagged(s, tag, Some((tag, c))),
            Self::Document(c) => serialize_tagged(s, tag, Some((tag, c))),
            Self::Location(c) => serialize_tagged(s, tag, Some((tag, c))),
            Self::Contacts(c) => serialize_tagged(s, tag, Some((tag, c))),
            Self::Template(c) => serialize_tagged(s, tag, Some((tag, c))),
            Self::Interactive(c) => serialize_tagged(s, tag, Some((tag, c))),
            Self::Reaction(c) => serialize_tagged(s, tag, Some((tag, c))),
        }
    }
}

/// A message addressed to one recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    /// Recipient phone number or WhatsApp id.
    pub to: String,
    /// Message being quoted, if any.
    pub context: Option<ReplyContext>,
    pub content: OutboundContent,
}

impl OutboundMessage {
    pub fn new(to: impl Into<String>, content: OutboundContent) -> Self {
        Self {
            to: to.into(),
            context: None,
            content,
        }
    }

    pub fn kind(&self) -> OutboundKind {
        self.content.kind()
    }

    /// Serialize and check the payload against its schema.
    pub fn validate(&self, mode: DecodeMode) -> Result<(), ValidationError> {
        let value = to_wire_value(self)?;
        decode_value::<OutboundMessage>(&value, mode).map(|_| ())
    }
}

impl Serialize for OutboundMessage {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            messaging_product: &'static str,
            recipient_type: &'static str,
            to: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            context: Option<&'a ReplyContext>,
            #[serde(flatten)]
            content: &'a OutboundContent,
        }

        Wire {
            messaging_product: MESSAGING_PRODUCT,
            recipient_type: RECIPIENT_TYPE,
            to: &self.to,
            context: self.context.as_ref(),
            content: &self.content,
        }
        .serialize(s)
    }
}

impl Schema for OutboundMessage {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let product = d.required(obj, "messaging_product", |d, v| {
            d.literal(v, MESSAGING_PRODUCT)
        });
        let recipient = d.required(obj, "recipient_type", |d, v| d.literal(v, RECIPIENT_TYPE));
        let to = d.required(obj, "to", |d, v| d.non_empty_string(v));
        let context = d.opt_field(obj, "context");
        let content = OutboundContent::decode_from(d, obj);
        product?;
        recipient?;
        Some(Self {
            to: to?,
            context: context?,
            content: content?,
        })
    }
}

// ─── Chat actions ───────────────────────────────────────────────────

/// Marks an inbound message as read, optionally showing a typing
/// indicator to the sender.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadReceipt {
    pub message_id: String,
    pub typing_indicator: bool,
}

impl Serialize for ReadReceipt {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Typing {
            #[serde(rename = "type")]
            kind: &'static str,
        }

        #[derive(Serialize)]
        struct Wire<'a> {
            messaging_product: &'static str,
            status: &'static str,
            message_id: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            typing_indicator: Option<Typing>,
        }

        Wire {
            messaging_product: MESSAGING_PRODUCT,
            status: "read",
            message_id: &self.message_id,
            typing_indicator: self.typing_indicator.then_some(Typing { kind: "text" }),
        }
        .serialize(s)
    }
}

impl Schema for ReadReceipt {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let product = d.required(obj, "messaging_product", |d, v| {
            d.literal(v, MESSAGING_PRODUCT)
        });
        let status = d.required(obj, "status", |d, v| d.literal(v, "read"));
        let message_id = d.required(obj, "message_id", |d, v| d.non_empty_string(v));
        let typing = d.optional(obj, "typing_indicator", |d, v| {
            let typing = d.object(v)?;
            d.required(typing, "type", |d, v| d.literal(v, "text"))
        });
        product?;
        status?;
        Some(Self {
            message_id: message_id?,
            typing_indicator: typing?.is_some(),
        })
    }
}

pub(crate) fn to_wire_value<T: Serialize>(payload: &T) -> Result<Value, ValidationError> {
    serde_json::to_value(payload).map_err(|e| {
        ValidationError::single(
            FieldPath::root(),
            ErrorKind::InvalidJson {
                message: e.to_string(),
            },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Constraint;
    use serde_json::json;

    fn text_message() -> OutboundMessage {
        OutboundMessage::new(
            "16315551234",
            OutboundContent::Text(TextContent {
                body: "hello".into(),
                preview_url: None,
            }),
        )
    }

    #[test]
    fn test_envelope_wire_shape() {
        let value = serde_json::to_value(text_message()).unwrap();
        assert_eq!(
            value,
            json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "16315551234",
                "type": "text",
                "text": { "body": "hello" }
            })
        );
    }

    #[test]
    fn test_context_is_serialized_when_replying() {
        let mut msg = text_message();
        msg.context = Some(ReplyContext {
            message_id: "wamid.prev".into(),
        });
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["context"], json!({ "message_id": "wamid.prev" }));
        let back: OutboundMessage = decode_value(&value, DecodeMode::FailFast).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_foreign_content_key_rejected() {
        let value = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": "1",
            "type": "text",
            "text": { "body": "hi" },
            "image": { "id": "x" }
        });
        let err = decode_value::<OutboundMessage>(&value, DecodeMode::FailFast).unwrap_err();
        assert_eq!(err.first().path.to_string(), "image");
        assert_eq!(
            err.first().kind,
            ErrorKind::constraint(Constraint::UnexpectedField {
                field: "image".into()
            })
        );
    }

    #[test]
    fn test_empty_recipient_rejected() {
        let mut msg = text_message();
        msg.to = String::new();
        let err = msg.validate(DecodeMode::FailFast).unwrap_err();
        assert_eq!(err.first().path.to_string(), "to");
    }

    #[test]
    fn test_collect_all_reports_envelope_and_content() {
        let mut msg = text_message();
        msg.to = String::new();
        msg.content = OutboundContent::Text(TextContent {
            body: String::new(),
            preview_url: None,
        });
        let err = msg.validate(DecodeMode::CollectAll).unwrap_err();
        let paths: Vec<String> = err.violations().iter().map(|v| v.path.to_string()).collect();
        assert_eq!(paths, vec!["to", "text.body"]);
    }

    #[test]
    fn test_read_receipt_shapes() {
        let receipt = ReadReceipt {
            message_id: "wamid.1".into(),
            typing_indicator: false,
        };
        assert_eq!(
            serde_json::to_value(&receipt).unwrap(),
            json!({ "messaging_product": "whatsapp", "status": "read", "message_id": "wamid.1" })
        );

        let typing = ReadReceipt {
            typing_indicator: true,
            ..receipt
        };
        let value = serde_json::to_value(&typing).unwrap();
        assert_eq!(value["typing_indicator"], json!({ "type": "text" }));
        let back: ReadReceipt = decode_value(&value, DecodeMode::FailFast).unwrap();
        assert_eq!(back, typing);
    }
}
