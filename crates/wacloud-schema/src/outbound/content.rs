//! Content objects for non-interactive outbound messages.

use crate::schema::{wire_enum, Constraint, Decoder, Object, Schema};
use crate::webhook::messages::{ContactName, ContactOrg};
use serde::Serialize;
use serde_json::Value;

pub const MAX_TEXT_BODY: usize = 4096;
pub const MAX_CAPTION: usize = 1024;

// ─── Media ──────────────────────────────────────────────────────────

const SOURCE_FIELDS: &[&str] = &["id", "link"];

/// Where the platform fetches media from: an uploaded media id or a public
/// link. Exactly one is sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaSource {
    Id(String),
    Link(String),
}

impl MediaSource {
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn link(link: impl Into<String>) -> Self {
        Self::Link(link.into())
    }

    pub(crate) fn decode_from(d: &mut Decoder, obj: &Object) -> Option<Self> {
        match (obj.contains_key("id"), obj.contains_key("link")) {
            (true, false) => d.required(obj, "id", |d, v| d.non_empty_string(v)).map(Self::Id),
            (false, true) => d.required(obj, "link", |d, v| d.url(v)).map(Self::Link),
            _ => {
                d.report_constraint(Constraint::ExactlyOneOf {
                    fields: SOURCE_FIELDS,
                });
                None
            }
        }
    }
}

/// Audio, sticker and media parameters: a source and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaRef {
    #[serde(flatten)]
    pub source: MediaSource,
}

impl From<MediaSource> for MediaRef {
    fn from(source: MediaSource) -> Self {
        Self { source }
    }
}

impl Schema for MediaRef {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        Some(Self {
            source: MediaSource::decode_from(d, obj)?,
        })
    }
}

/// Image or video with an optional caption.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaContent {
    #[serde(flatten)]
    pub source: MediaSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl Schema for MediaContent {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let source = MediaSource::decode_from(d, obj);
        let caption = d.optional(obj, "caption", |d, v| d.bounded_string(v, 0, MAX_CAPTION));
        Some(Self {
            source: source?,
            caption: caption?,
        })
    }
}

/// Document reference used in headers and template parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRef {
    #[serde(flatten)]
    pub source: MediaSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl Schema for DocumentRef {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let source = MediaSource::decode_from(d, obj);
        let filename = d.opt_field(obj, "filename");
        Some(Self {
            source: source?,
            filename: filename?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentContent {
    #[serde(flatten)]
    pub source: MediaSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl Schema for DocumentContent {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let source = MediaSource::decode_from(d, obj);
        let caption = d.optional(obj, "caption", |d, v| d.bounded_string(v, 0, MAX_CAPTION));
        let filename = d.opt_field(obj, "filename");
        Some(Self {
            source: source?,
            caption: caption?,
            filename: filename?,
        })
    }
}

// ─── Text / location / reaction ─────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<bool>,
}

impl Schema for TextContent {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let body = d.required(obj, "body", |d, v| d.bounded_string(v, 1, MAX_TEXT_BODY));
        let preview_url = d.opt_field(obj, "preview_url");
        Some(Self {
            body: body?,
            preview_url: preview_url?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationContent {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Schema for LocationContent {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let latitude = d.field(obj, "latitude");
        let longitude = d.field(obj, "longitude");
        let name = d.opt_field(obj, "name");
        let address = d.opt_field(obj, "address");
        Some(Self {
            latitude: latitude?,
            longitude: longitude?,
            name: name?,
            address: address?,
        })
    }
}

/// Reaction to a previous message. An empty `emoji` removes the reaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReactionContent {
    pub message_id: String,
    pub emoji: String,
}

impl Schema for ReactionContent {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let message_id = d.required(obj, "message_id", |d, v| d.non_empty_string(v));
        let emoji = d.field(obj, "emoji");
        Some(Self {
            message_id: message_id?,
            emoji: emoji?,
        })
    }
}

/// Quote a previous message when sending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyContext {
    pub message_id: String,
}

impl Schema for ReplyContext {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        Some(Self {
            message_id: d.required(obj, "message_id", |d, v| d.non_empty_string(v))?,
        })
    }
}

// ─── Contact cards ──────────────────────────────────────────────────

wire_enum! {
    /// Label on a card address, e-mail or URL.
    pub enum ContactLabel {
        Home => "HOME",
        Work => "WORK",
    }
}

wire_enum! {
    pub enum PhoneLabel {
        Cell => "CELL",
        Main => "MAIN",
        Iphone => "IPHONE",
        Home => "HOME",
        Work => "WORK",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CardAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub label: Option<ContactLabel>,
}

impl Schema for CardAddress {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let street = d.opt_field(obj, "street");
        let city = d.opt_field(obj, "city");
        let state = d.opt_field(obj, "state");
        let zip = d.opt_field(obj, "zip");
        let country = d.opt_field(obj, "country");
        let country_code = d.opt_field(obj, "country_code");
        let label = d.opt_field(obj, "type");
        Some(Self {
            street: street?,
            city: city?,
            state: state?,
            zip: zip?,
            country: country?,
            country_code: country_code?,
            label: label?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CardEmail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub label: Option<ContactLabel>,
}

impl Schema for CardEmail {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let email = d.optional(obj, "email", |d, v| d.email(v));
        let label = d.opt_field(obj, "type");
        Some(Self {
            email: email?,
            label: label?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CardPhone {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wa_id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub label: Option<PhoneLabel>,
}

impl Schema for CardPhone {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let phone = d.opt_field(obj, "phone");
        let wa_id = d.opt_field(obj, "wa_id");
        let label = d.opt_field(obj, "type");
        Some(Self {
            phone: phone?,
            wa_id: wa_id?,
            label: label?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CardUrl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub label: Option<ContactLabel>,
}

impl Schema for CardUrl {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let url = d.optional(obj, "url", |d, v| d.url(v));
        let label = d.opt_field(obj, "type");
        Some(Self {
            url: url?,
            label: label?,
        })
    }
}

/// Contact card sent to a customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactCard {
    pub name: ContactName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<ContactOrg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phones: Option<Vec<CardPhone>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<CardEmail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<CardUrl>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<CardAddress>>,
    /// `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
}

impl ContactCard {
    pub fn new(formatted_name: impl Into<String>) -> Self {
        Self {
            name: ContactName::new(formatted_name),
            org: None,
            phones: None,
            emails: None,
            urls: None,
            addresses: None,
            birthday: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>, label: PhoneLabel) -> Self {
        self.phones.get_or_insert_with(Vec::new).push(CardPhone {
            phone: Some(phone.into()),
            wa_id: None,
            label: Some(label),
        });
        self
    }

    pub fn with_email(mut self, email: impl Into<String>, label: ContactLabel) -> Self {
        self.emails.get_or_insert_with(Vec::new).push(CardEmail {
            email: Some(email.into()),
            label: Some(label),
        });
        self
    }
}

impl Schema for ContactCard {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let name = d.field(obj, "name");
        let org = d.opt_field(obj, "org");
        let phones = d.opt_field(obj, "phones");
        let emails = d.opt_field(obj, "emails");
        let urls = d.opt_field(obj, "urls");
        let addresses = d.opt_field(obj, "addresses");
        let birthday = d.opt_field(obj, "birthday");
        Some(Self {
            name: name?,
            org: org?,
            phones: phones?,
            emails: emails?,
            urls: urls?,
            addresses: addresses?,
            birthday: birthday?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{decode_value, DecodeMode, ErrorKind};
    use serde_json::json;

    #[test]
    fn test_media_source_exactly_one() {
        let both = decode_value::<MediaContent>(
            &json!({ "id": "123", "link": "https://example.com/a.png" }),
            DecodeMode::FailFast,
        )
        .unwrap_err();
        assert_eq!(
            both.first().kind,
            ErrorKind::constraint(Constraint::ExactlyOneOf {
                fields: SOURCE_FIELDS
            })
        );

        let neither =
            decode_value::<MediaRef>(&json!({}), DecodeMode::FailFast).unwrap_err();
        assert!(neither.first().path.is_root());
    }

    #[test]
    fn test_media_link_must_be_url() {
        let err = decode_value::<MediaRef>(&json!({ "link": "a.png" }), DecodeMode::FailFast)
            .unwrap_err();
        assert_eq!(err.first().path.to_string(), "link");
    }

    #[test]
    fn test_media_source_serializes_flat() {
        let content = MediaContent {
            source: MediaSource::link("https://example.com/a.png"),
            caption: Some("look".into()),
        };
        assert_eq!(
            serde_json::to_value(&content).unwrap(),
            json!({ "link": "https://example.com/a.png", "caption": "look" })
        );
    }

    #[test]
    fn test_caption_limit() {
        let caption = "x".repeat(MAX_CAPTION + 1);
        let err = decode_value::<MediaContent>(
            &json!({ "id": "1", "caption": caption }),
            DecodeMode::FailFast,
        )
        .unwrap_err();
        assert_eq!(err.first().path.to_string(), "caption");
    }

    #[test]
    fn test_contact_card_labels_and_email() {
        let err = decode_value::<ContactCard>(
            &json!({
                "name": { "formatted_name": "Ops" },
                "phones": [{ "phone": "+1 555", "type": "PAGER" }],
                "emails": [{ "email": "nope" }]
            }),
            DecodeMode::CollectAll,
        )
        .unwrap_err();
        let paths: Vec<String> = err.violations().iter().map(|v| v.path.to_string()).collect();
        assert_eq!(paths, vec!["phones[0].type", "emails[0].email"]);
    }

    #[test]
    fn test_contact_card_builder_helpers() {
        let card = ContactCard::new("Front desk")
            .with_phone("+15550100", PhoneLabel::Work)
            .with_email("desk@example.com", ContactLabel::Work);
        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(value["phones"][0]["type"], "WORK");
        let back: ContactCard = decode_value(&value, DecodeMode::FailFast).unwrap();
        assert_eq!(back, card);
    }
}
