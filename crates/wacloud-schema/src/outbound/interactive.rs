//! Interactive outbound messages: reply buttons, lists and CTA URL buttons.

use super::content::{DocumentRef, MediaRef};
use crate::schema::{serialize_tagged, wire_enum, Decoder, Object, Schema, WireEnum};
use serde::{Serialize, Serializer};
use serde_json::Value;

pub const MAX_HEADER_TEXT: usize = 60;
pub const MAX_BODY_TEXT: usize = 1024;
pub const MAX_FOOTER_TEXT: usize = 60;
pub const MAX_REPLY_BUTTONS: usize = 3;
pub const MAX_BUTTON_ID: usize = 256;
pub const MAX_BUTTON_TITLE: usize = 20;
pub const MAX_LIST_BUTTON: usize = 20;
pub const MAX_SECTIONS: usize = 10;
pub const MAX_SECTION_TITLE: usize = 24;
pub const MAX_ROWS: usize = 10;
pub const MAX_ROW_ID: usize = 200;
pub const MAX_ROW_TITLE: usize = 24;
pub const MAX_ROW_DESCRIPTION: usize = 72;
pub const MAX_CTA_DISPLAY_TEXT: usize = 20;

wire_enum! {
    pub enum InteractiveKind {
        Button => "button",
        List => "list",
        CtaUrl => "cta_url",
    }
}

wire_enum! {
    pub enum HeaderKind {
        Text => "text",
        Image => "image",
        Video => "video",
        Document => "document",
    }
}

/// `{ "text": ... }` block used for bodies and footers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub text: String,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    fn decode_max(d: &mut Decoder, value: &Value, max: usize) -> Option<Self> {
        let obj = d.object(value)?;
        Some(Self {
            text: d.required(obj, "text", |d, v| d.bounded_string(v, 1, max))?,
        })
    }
}

/// Header of a button or CTA URL message.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaHeader {
    Text(String),
    Image(MediaRef),
    Video(MediaRef),
    Document(DocumentRef),
}

impl MediaHeader {
    pub fn kind(&self) -> HeaderKind {
        match self {
            Self::Text(_) => HeaderKind::Text,
            Self::Image(_) => HeaderKind::Image,
            Self::Video(_) => HeaderKind::Video,
            Self::Document(_) => HeaderKind::Document,
        }
    }
}

impl Serialize for MediaHeader {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let tag = self.kind().as_wire();
        match self {
            Self::Text(v) => serialize_tagged(s, tag, Some((tag, v))),
            Self::Image(v) | Self::Video(v) => serialize_tagged(s, tag, Some((tag, v))),
            Self::Document(v) => serialize_tagged(s, tag, Some((tag, v))),
        }
    }
}

impl Schema for MediaHeader {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let kind = d.discriminator::<HeaderKind>(obj, "type")?;
        let key = kind.as_wire();
        match kind {
            HeaderKind::Text => d
                .required(obj, key, |d, v| d.bounded_string(v, 1, MAX_HEADER_TEXT))
                .map(Self::Text),
            HeaderKind::Image => d.field(obj, key).map(Self::Image),
            HeaderKind::Video => d.field(obj, key).map(Self::Video),
            HeaderKind::Document => d.field(obj, key).map(Self::Document),
        }
    }
}

/// Text-only header, the one kind lists allow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "text")]
pub struct TextHeader {
    pub text: String,
}

impl Schema for TextHeader {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let tag = d.required(obj, "type", |d, v| d.literal(v, "text"));
        let text = d.required(obj, "text", |d, v| d.bounded_string(v, 1, MAX_HEADER_TEXT));
        tag?;
        Some(Self { text: text? })
    }
}

/// Common `header`/`body`/`footer` members.
fn decode_frame<H: Schema>(
    d: &mut Decoder,
    obj: &Object,
) -> Option<(Option<H>, TextBlock, Option<TextBlock>)> {
    let header = d.opt_field(obj, "header");
    let body = d.required(obj, "body", |d, v| TextBlock::decode_max(d, v, MAX_BODY_TEXT));
    let footer = d.optional(obj, "footer", |d, v| {
        TextBlock::decode_max(d, v, MAX_FOOTER_TEXT)
    });
    Some((header?, body?, footer?))
}

// ─── Reply buttons ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyButtonBody {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "reply")]
pub struct ReplyButton {
    pub reply: ReplyButtonBody,
}

impl ReplyButton {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            reply: ReplyButtonBody {
                id: id.into(),
                title: title.into(),
            },
        }
    }
}

impl Schema for ReplyButton {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let tag = d.required(obj, "type", |d, v| d.literal(v, "reply"));
        let reply = d.required(obj, "reply", |d, v| {
            let reply = d.object(v)?;
            let id = d.required(reply, "id", |d, v| d.bounded_string(v, 1, MAX_BUTTON_ID));
            let title =
                d.required(reply, "title", |d, v| d.bounded_string(v, 1, MAX_BUTTON_TITLE));
            Some(ReplyButtonBody {
                id: id?,
                title: title?,
            })
        });
        tag?;
        Some(Self { reply: reply? })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonAction {
    pub buttons: Vec<ReplyButton>,
}

impl Schema for ButtonAction {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        Some(Self {
            buttons: d.required(obj, "buttons", |d, v| {
                d.bounded_array(v, 1, MAX_REPLY_BUTTONS, |d, item| ReplyButton::decode(d, item))
            })?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonInteractive {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<MediaHeader>,
    pub body: TextBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<TextBlock>,
    pub action: ButtonAction,
}

impl ButtonInteractive {
    pub fn new(body: impl Into<String>, buttons: Vec<ReplyButton>) -> Self {
        Self {
            header: None,
            body: TextBlock::new(body),
            footer: None,
            action: ButtonAction { buttons },
        }
    }
}

impl Schema for ButtonInteractive {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let frame = decode_frame(d, obj);
        let action = d.field(obj, "action");
        let (header, body, footer) = frame?;
        Some(Self {
            header,
            body,
            footer,
            action: action?,
        })
    }
}

// ─── List ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ListRow {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
        }
    }
}

impl Schema for ListRow {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let id = d.required(obj, "id", |d, v| d.bounded_string(v, 1, MAX_ROW_ID));
        let title = d.required(obj, "title", |d, v| d.bounded_string(v, 1, MAX_ROW_TITLE));
        let description = d.optional(obj, "description", |d, v| {
            d.bounded_string(v, 0, MAX_ROW_DESCRIPTION)
        });
        Some(Self {
            id: id?,
            title: title?,
            description: description?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub rows: Vec<ListRow>,
}

impl Schema for ListSection {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let title = d.optional(obj, "title", |d, v| d.bounded_string(v, 0, MAX_SECTION_TITLE));
        let rows = d.required(obj, "rows", |d, v| {
            d.bounded_array(v, 1, MAX_ROWS, |d, item| ListRow::decode(d, item))
        });
        Some(Self {
            title: title?,
            rows: rows?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListAction {
    /// Label of the button that opens the list.
    pub button: String,
    pub sections: Vec<ListSection>,
}

impl Schema for ListAction {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let button = d.required(obj, "button", |d, v| d.bounded_string(v, 1, MAX_LIST_BUTTON));
        let sections = d.required(obj, "sections", |d, v| {
            d.bounded_array(v, 1, MAX_SECTIONS, |d, item| ListSection::decode(d, item))
        });
        Some(Self {
            button: button?,
            sections: sections?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListInteractive {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<TextHeader>,
    pub body: TextBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<TextBlock>,
    pub action: ListAction,
}

impl Schema for ListInteractive {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let frame = decode_frame(d, obj);
        let action = d.field(obj, "action");
        let (header, body, footer) = frame?;
        Some(Self {
            header,
            body,
            footer,
            action: action?,
        })
    }
}

// ─── CTA URL ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtaUrlParameters {
    pub display_text: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", rename = "cta_url")]
pub struct CtaUrlAction {
    pub parameters: CtaUrlParameters,
}

impl Schema for CtaUrlAction {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let name = d.required(obj, "name", |d, v| d.literal(v, "cta_url"));
        let parameters = d.required(obj, "parameters", |d, v| {
            let params = d.object(v)?;
            let display_text = d.required(params, "display_text", |d, v| {
                d.bounded_string(v, 1, MAX_CTA_DISPLAY_TEXT)
            });
            let url = d.required(params, "url", |d, v| d.url(v));
            Some(CtaUrlParameters {
                display_text: display_text?,
                url: url?,
            })
        });
        name?;
        Some(Self {
            parameters: parameters?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtaUrlInteractive {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<MediaHeader>,
    pub body: TextBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<TextBlock>,
    pub action: CtaUrlAction,
}

impl CtaUrlInteractive {
    pub fn new(
        body: impl Into<String>,
        display_text: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            header: None,
            body: TextBlock::new(body),
            footer: None,
            action: CtaUrlAction {
                parameters: CtaUrlParameters {
                    display_text: display_text.into(),
                    url: url.into(),
                },
            },
        }
    }
}

impl Schema for CtaUrlInteractive {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let frame = decode_frame(d, obj);
        let action = d.field(obj, "action");
        let (header, body, footer) = frame?;
        Some(Self {
            header,
            body,
            footer,
            action: action?,
        })
    }
}

// ─── Union ──────────────────────────────────────────────────────────

/// `interactive` object of an outbound message, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractiveContent {
    Button(ButtonInteractive),
    List(ListInteractive),
    CtaUrl(CtaUrlInteractive),
}

impl InteractiveContent {
    pub fn kind(&self) -> InteractiveKind {
        match self {
            Self::Button(_) => InteractiveKind::Button,
            Self::List(_) => InteractiveKind::List,
            Self::CtaUrl(_) => InteractiveKind::CtaUrl,
        }
    }
}

impl Schema for InteractiveContent {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        match d.discriminator::<InteractiveKind>(obj, "type")? {
            InteractiveKind::Button => ButtonInteractive::decode(d, value).map(Self::Button),
            InteractiveKind::List => ListInteractive::decode(d, value).map(Self::List),
            InteractiveKind::CtaUrl => CtaUrlInteractive::decode(d, value).map(Self::CtaUrl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::content::MediaSource;
    use crate::schema::{decode_value, Constraint, DecodeMode, ErrorKind};
    use serde_json::json;

    fn buttons(n: usize) -> Vec<ReplyButton> {
        (1..=n)
            .map(|i| ReplyButton::new(format!("btn-{}", i), format!("Option {}", i)))
            .collect()
    }

    #[test]
    fn test_button_wire_shape() {
        let mut content = ButtonInteractive::new("Pick one", buttons(2));
        content.header = Some(MediaHeader::Image(MediaSource::id("media-1").into()));
        let value = serde_json::to_value(InteractiveContent::Button(content)).unwrap();
        assert_eq!(value["type"], "button");
        assert_eq!(value["header"], json!({ "type": "image", "image": { "id": "media-1" } }));
        assert_eq!(
            value["action"]["buttons"][1],
            json!({ "type": "reply", "reply": { "id": "btn-2", "title": "Option 2" } })
        );
    }

    #[test]
    fn test_three_buttons_ok_four_rejected() {
        let ok = serde_json::to_value(InteractiveContent::Button(ButtonInteractive::new(
            "Pick",
            buttons(3),
        )))
        .unwrap();
        assert!(decode_value::<InteractiveContent>(&ok, DecodeMode::FailFast).is_ok());

        let too_many = serde_json::to_value(InteractiveContent::Button(ButtonInteractive::new(
            "Pick",
            buttons(4),
        )))
        .unwrap();
        let err = decode_value::<InteractiveContent>(&too_many, DecodeMode::FailFast).unwrap_err();
        assert_eq!(err.first().path.to_string(), "action.buttons");
        assert_eq!(
            err.first().kind,
            ErrorKind::constraint(Constraint::MaxItems { max: 3, actual: 4 })
        );
    }

    #[test]
    fn test_button_title_limit() {
        let content = ButtonInteractive::new(
            "Pick",
            vec![ReplyButton::new("a", "This title is far too long")],
        );
        let value = serde_json::to_value(InteractiveContent::Button(content)).unwrap();
        let err = decode_value::<InteractiveContent>(&value, DecodeMode::FailFast).unwrap_err();
        assert_eq!(err.first().path.to_string(), "action.buttons[0].reply.title");
    }

    #[test]
    fn test_list_rows_limit() {
        let rows: Vec<ListRow> = (0..11).map(|i| ListRow::new(format!("r{}", i), "Row")).collect();
        let content = ListInteractive {
            header: Some(TextHeader {
                text: "Menu".into(),
            }),
            body: TextBlock::new("Choose"),
            footer: None,
            action: ListAction {
                button: "Open".into(),
                sections: vec![ListSection { title: None, rows }],
            },
        };
        let value = serde_json::to_value(InteractiveContent::List(content)).unwrap();
        assert_eq!(value["header"], json!({ "type": "text", "text": "Menu" }));
        let err = decode_value::<InteractiveContent>(&value, DecodeMode::FailFast).unwrap_err();
        assert_eq!(err.first().path.to_string(), "action.sections[0].rows");
    }

    #[test]
    fn test_list_header_must_be_text() {
        let value = json!({
            "type": "list",
            "header": { "type": "image", "image": { "id": "1" } },
            "body": { "text": "Choose" },
            "action": { "button": "Open", "sections": [{ "rows": [{ "id": "a", "title": "A" }] }] }
        });
        let err = decode_value::<InteractiveContent>(&value, DecodeMode::FailFast).unwrap_err();
        assert_eq!(err.first().path.to_string(), "header.type");
    }

    #[test]
    fn test_cta_url_shape_and_url_check() {
        let content = CtaUrlInteractive::new("Track your order", "Track", "https://example.com/t/1");
        let value = serde_json::to_value(InteractiveContent::CtaUrl(content.clone())).unwrap();
        assert_eq!(value["type"], "cta_url");
        assert_eq!(value["action"]["name"], "cta_url");
        let back = decode_value::<InteractiveContent>(&value, DecodeMode::FailFast).unwrap();
        assert_eq!(back, InteractiveContent::CtaUrl(content));

        let bad = CtaUrlInteractive::new("Track", "Track", "example.com/t/1");
        let value = serde_json::to_value(InteractiveContent::CtaUrl(bad)).unwrap();
        let err = decode_value::<InteractiveContent>(&value, DecodeMode::FailFast).unwrap_err();
        assert_eq!(err.first().path.to_string(), "action.parameters.url");
    }

    #[test]
    fn test_unknown_interactive_type() {
        let err = decode_value::<InteractiveContent>(
            &json!({ "type": "product_list", "body": { "text": "x" } }),
            DecodeMode::FailFast,
        )
        .unwrap_err();
        assert!(matches!(
            err.first().kind,
            ErrorKind::UnknownUnionVariant { .. }
        ));
    }
}
