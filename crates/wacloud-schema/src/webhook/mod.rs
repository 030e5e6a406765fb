//! Inbound webhook envelope and the top-level `field` resolver.

pub mod messages;
pub mod templates;

use crate::schema::{decode_slice, wire_enum, DecodeMode, Decoder, Schema, ValidationError};
use log::debug;
use serde::Serialize;
use serde_json::Value;

pub use messages::{Message, MessageContent, MessageKind, MessagesValue, Status, StatusKind};
pub use templates::{
    TemplateCategoryUpdate, TemplateComponentsUpdate, TemplateQualityUpdate, TemplateStatusChange,
    TemplateStatusUpdate,
};

pub const ACCOUNT_OBJECT: &str = "whatsapp_business_account";

wire_enum! {
    /// Webhook families multiplexed through the envelope.
    pub enum ChangeField {
        Messages => "messages",
        MessageTemplateStatusUpdate => "message_template_status_update",
        MessageTemplateComponentsUpdate => "message_template_components_update",
        TemplateCategoryUpdate => "template_category_update",
    }
}

/// One discriminated event record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum Change {
    Messages(MessagesValue),
    MessageTemplateStatusUpdate(TemplateStatusChange),
    MessageTemplateComponentsUpdate(TemplateComponentsUpdate),
    TemplateCategoryUpdate(TemplateCategoryUpdate),
}

impl Change {
    pub fn field(&self) -> ChangeField {
        match self {
            Self::Messages(_) => ChangeField::Messages,
            Self::MessageTemplateStatusUpdate(_) => ChangeField::MessageTemplateStatusUpdate,
            Self::MessageTemplateComponentsUpdate(_) => {
                ChangeField::MessageTemplateComponentsUpdate
            }
            Self::TemplateCategoryUpdate(_) => ChangeField::TemplateCategoryUpdate,
        }
    }

    pub fn as_messages(&self) -> Option<&MessagesValue> {
        match self {
            Self::Messages(v) => Some(v),
            _ => None,
        }
    }
}

impl Schema for Change {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let field = d.discriminator::<ChangeField>(obj, "field")?;
        d.required(obj, "value", |d, v| match field {
            ChangeField::Messages => MessagesValue::decode(d, v).map(Self::Messages),
            ChangeField::MessageTemplateStatusUpdate => {
                TemplateStatusChange::decode(d, v).map(Self::MessageTemplateStatusUpdate)
            }
            ChangeField::MessageTemplateComponentsUpdate => {
                TemplateComponentsUpdate::decode(d, v).map(Self::MessageTemplateComponentsUpdate)
            }
            ChangeField::TemplateCategoryUpdate => {
                TemplateCategoryUpdate::decode(d, v).map(Self::TemplateCategoryUpdate)
            }
        })
    }
}

/// One business account's worth of changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub id: String,
    /// Present on template-family entries only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    pub changes: Vec<Change>,
}

impl Schema for Entry {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let id = d.field(obj, "id");
        let time = d.opt_field(obj, "time");
        let changes = d.field(obj, "changes");
        Some(Self {
            id: id?,
            time: time?,
            changes: changes?,
        })
    }
}

/// Outermost wrapper of every webhook delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookEnvelope {
    pub object: String,
    #[serde(rename = "entry")]
    pub entries: Vec<Entry>,
}

impl WebhookEnvelope {
    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.entries.iter().flat_map(|e| e.changes.iter())
    }

    /// Every inbound message across all entries and changes.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.changes()
            .filter_map(Change::as_messages)
            .flat_map(|v| v.messages().iter())
    }

    /// Every delivery status across all entries and changes.
    pub fn statuses(&self) -> impl Iterator<Item = &Status> {
        self.changes()
            .filter_map(Change::as_messages)
            .flat_map(|v| v.statuses().iter())
    }
}

impl Schema for WebhookEnvelope {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let object = d.required(obj, "object", |d, v| d.literal(v, ACCOUNT_OBJECT));
        let entries = d.field(obj, "entry");
        Some(Self {
            object: object?,
            entries: entries?,
        })
    }
}

/// Decode a raw webhook body, stopping at the first violation.
pub fn decode_webhook(bytes: &[u8]) -> Result<WebhookEnvelope, ValidationError> {
    decode_webhook_with(bytes, DecodeMode::FailFast)
}

pub fn decode_webhook_with(
    bytes: &[u8],
    mode: DecodeMode,
) -> Result<WebhookEnvelope, ValidationError> {
    let result = decode_slice::<WebhookEnvelope>(bytes, mode);
    match &result {
        Ok(envelope) => debug!(
            "decoded webhook: {} entries, {} changes",
            envelope.entries.len(),
            envelope.changes().count()
        ),
        Err(e) => debug!("rejected webhook ({} violations): {}", e.len(), e.first()),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Constraint, ErrorKind};
    use serde_json::json;

    fn envelope(changes: Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "object": "whatsapp_business_account",
            "entry": [{ "id": "1", "changes": changes }]
        }))
        .unwrap()
    }

    #[test]
    fn test_decode_text_scenario() {
        let body = envelope(json!([{
            "field": "messages",
            "value": {
                "messaging_product": "whatsapp",
                "metadata": { "display_phone_number": "1", "phone_number_id": "2" },
                "messages": [{
                    "from": "16315551234", "id": "wamid.X", "timestamp": "1603059201",
                    "type": "text", "text": { "body": "hi" }
                }]
            }
        }]));
        let envelope = decode_webhook(&body).unwrap();
        let msg = envelope.messages().next().unwrap();
        assert_eq!(msg.kind(), "text");
        assert_eq!(msg.text_body(), Some("hi"));
        assert_eq!(envelope.entries[0].time, None);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let body = envelope(json!([{ "field": "account_update", "value": {} }]));
        let err = decode_webhook(&body).unwrap_err();
        assert_eq!(err.first().path.to_string(), "entry[0].changes[0].field");
        assert_eq!(
            err.first().kind,
            ErrorKind::UnknownUnionVariant {
                found: Some("account_update".into()),
                expected: <ChangeField as crate::schema::WireEnum>::VARIANTS,
            }
        );
    }

    #[test]
    fn test_dedicated_quality_field_is_rejected() {
        let body = envelope(json!([{
            "field": "message_template_quality_update",
            "value": { "previous_quality_score": "GREEN", "new_quality_score": "RED" }
        }]));
        let err = decode_webhook(&body).unwrap_err();
        assert_eq!(err.first().path.to_string(), "entry[0].changes[0].field");
        assert!(matches!(
            &err.first().kind,
            ErrorKind::UnknownUnionVariant { found: Some(f), expected }
                if f == "message_template_quality_update" && expected.len() == 4
        ));
    }

    #[test]
    fn test_absent_field_is_rejected() {
        let body = envelope(json!([{ "value": {} }]));
        let err = decode_webhook(&body).unwrap_err();
        assert!(matches!(
            err.first().kind,
            ErrorKind::UnknownUnionVariant { found: None, .. }
        ));
    }

    #[test]
    fn test_wrong_object_literal() {
        let body = serde_json::to_vec(&json!({ "object": "page", "entry": [] })).unwrap();
        let err = decode_webhook(&body).unwrap_err();
        assert_eq!(err.first().path.to_string(), "object");
        assert_eq!(
            err.first().kind,
            ErrorKind::constraint(Constraint::Literal {
                expected: ACCOUNT_OBJECT,
                found: "page".into()
            })
        );
    }

    #[test]
    fn test_empty_entries_are_valid() {
        let body = serde_json::to_vec(&json!({
            "object": "whatsapp_business_account",
            "entry": []
        }))
        .unwrap();
        assert!(decode_webhook(&body).unwrap().entries.is_empty());
    }

    #[test]
    fn test_collect_all_reports_each_change() {
        let body = envelope(json!([
            { "field": "messages", "value": { "messaging_product": "whatsapp" } },
            { "field": "template_category_update", "value": {
                "message_template_id": "not-a-number",
                "message_template_name": "t",
                "message_template_language": "en",
                "correct_category": "UTILITY",
                "new_category": "MARKETING"
            }}
        ]));
        let err = decode_webhook_with(&body, DecodeMode::CollectAll).unwrap_err();
        let paths: Vec<String> = err.violations().iter().map(|v| v.path.to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "entry[0].changes[0].value.metadata",
                "entry[0].changes[0].value",
                "entry[0].changes[1].value",
            ]
        );
        assert!(matches!(
            err.violations()[2].kind,
            ErrorKind::UnionExhausted { .. }
        ));
    }
}
