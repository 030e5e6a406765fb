//! `messages` webhook family: inbound messages, delivery statuses and the
//! value object that carries them.

use crate::schema::{wire_enum, Constraint, Decoder, Numeric, Schema, WireEnum};
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Serialize, Serializer};
use serde_json::Value;

pub const MESSAGING_PRODUCT: &str = "whatsapp";

// ─── Shared ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub display_phone_number: String,
    pub phone_number_id: String,
}

impl Schema for Metadata {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let display_phone_number = d.field(obj, "display_phone_number");
        let phone_number_id = d.field(obj, "phone_number_id");
        Some(Self {
            display_phone_number: display_phone_number?,
            phone_number_id: phone_number_id?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub name: String,
}

impl Schema for Profile {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        Some(Self {
            name: d.field(obj, "name")?,
        })
    }
}

/// Sender profile attached to the value object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contact {
    pub profile: Profile,
    pub wa_id: String,
}

impl Schema for Contact {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let profile = d.field(obj, "profile");
        let wa_id = d.field(obj, "wa_id");
        Some(Self {
            profile: profile?,
            wa_id: wa_id?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorData {
    pub details: String,
}

impl Schema for ErrorData {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        Some(Self {
            details: d.field(obj, "details")?,
        })
    }
}

/// Platform error attached to a message, status or value object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorObject {
    pub code: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_data: Option<ErrorData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl Schema for ErrorObject {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let code = d.field(obj, "code");
        let title = d.opt_field(obj, "title");
        let message = d.opt_field(obj, "message");
        let error_data = d.opt_field(obj, "error_data");
        let href = d.opt_field(obj, "href");
        Some(Self {
            code: code?,
            title: title?,
            message: message?,
            error_data: error_data?,
            href: href?,
        })
    }
}

fn unix_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let secs = raw.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp(secs, 0)
}

// ─── Message content ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBody {
    pub body: String,
}

impl Schema for TextBody {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        Some(Self {
            body: d.field(obj, "body")?,
        })
    }
}

/// Received image, video, audio, document or sticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Media {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
}

impl Schema for Media {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let id = d.field(obj, "id");
        let mime_type = d.opt_field(obj, "mime_type");
        let sha256 = d.opt_field(obj, "sha256");
        let caption = d.opt_field(obj, "caption");
        let filename = d.opt_field(obj, "filename");
        let voice = d.opt_field(obj, "voice");
        let url = d.opt_field(obj, "url");
        let animated = d.opt_field(obj, "animated");
        Some(Self {
            id: id?,
            mime_type: mime_type?,
            sha256: sha256?,
            caption: caption?,
            filename: filename?,
            voice: voice?,
            url: url?,
            animated: animated?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub latitude: Numeric,
    pub longitude: Numeric,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Schema for Location {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let latitude = d.field(obj, "latitude");
        let longitude = d.field(obj, "longitude");
        let name = d.opt_field(obj, "name");
        let address = d.opt_field(obj, "address");
        let url = d.opt_field(obj, "url");
        Some(Self {
            latitude: latitude?,
            longitude: longitude?,
            name: name?,
            address: address?,
            url: url?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactName {
    pub formatted_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl ContactName {
    pub fn new(formatted_name: impl Into<String>) -> Self {
        Self {
            formatted_name: formatted_name.into(),
            first_name: None,
            last_name: None,
            middle_name: None,
            suffix: None,
            prefix: None,
        }
    }
}

impl Schema for ContactName {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let formatted_name = d.field(obj, "formatted_name");
        let first_name = d.opt_field(obj, "first_name");
        let last_name = d.opt_field(obj, "last_name");
        let middle_name = d.opt_field(obj, "middle_name");
        let suffix = d.opt_field(obj, "suffix");
        let prefix = d.opt_field(obj, "prefix");
        Some(Self {
            formatted_name: formatted_name?,
            first_name: first_name?,
            last_name: last_name?,
            middle_name: middle_name?,
            suffix: suffix?,
            prefix: prefix?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactOrg {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Schema for ContactOrg {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let company = d.opt_field(obj, "company");
        let department = d.opt_field(obj, "department");
        let title = d.opt_field(obj, "title");
        Some(Self {
            company: company?,
            department: department?,
            title: title?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactPhone {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wa_id: Option<String>,
}

impl Schema for ContactPhone {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let phone = d.opt_field(obj, "phone");
        let kind = d.opt_field(obj, "type");
        let wa_id = d.opt_field(obj, "wa_id");
        Some(Self {
            phone: phone?,
            kind: kind?,
            wa_id: wa_id?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactEmail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Schema for ContactEmail {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let email = d.opt_field(obj, "email");
        let kind = d.opt_field(obj, "type");
        Some(Self {
            email: email?,
            kind: kind?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactUrl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Schema for ContactUrl {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let url = d.opt_field(obj, "url");
        let kind = d.opt_field(obj, "type");
        Some(Self {
            url: url?,
            kind: kind?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactAddress {
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
    pub kind: Option<String>,
}

impl Schema for ContactAddress {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let street = d.opt_field(obj, "street");
        let city = d.opt_field(obj, "city");
        let state = d.opt_field(obj, "state");
        let zip = d.opt_field(obj, "zip");
        let country = d.opt_field(obj, "country");
        let country_code = d.opt_field(obj, "country_code");
        let kind = d.opt_field(obj, "type");
        Some(Self {
            street: street?,
            city: city?,
            state: state?,
            zip: zip?,
            country: country?,
            country_code: country_code?,
            kind: kind?,
        })
    }
}

/// Contact card shared by the customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedContact {
    pub name: ContactName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<ContactOrg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phones: Option<Vec<ContactPhone>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<ContactEmail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<ContactUrl>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<ContactAddress>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
}

impl Schema for SharedContact {
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

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonReply {
    pub id: String,
    pub title: String,
}

impl Schema for ButtonReply {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let id = d.field(obj, "id");
        let title = d.field(obj, "title");
        Some(Self {
            id: id?,
            title: title?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListReply {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Schema for ListReply {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let id = d.field(obj, "id");
        let title = d.field(obj, "title");
        let description = d.opt_field(obj, "description");
        Some(Self {
            id: id?,
            title: title?,
            description: description?,
        })
    }
}

wire_enum! {
    pub enum InteractiveReplyKind {
        ButtonReply => "button_reply",
        ListReply => "list_reply",
    }
}

/// Reply to an interactive button or list message.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractiveReply {
    ButtonReply(ButtonReply),
    ListReply(ListReply),
}

impl InteractiveReply {
    pub fn kind(&self) -> InteractiveReplyKind {
        match self {
            Self::ButtonReply(_) => InteractiveReplyKind::ButtonReply,
            Self::ListReply(_) => InteractiveReplyKind::ListReply,
        }
    }

    /// Id of the chosen button or row.
    pub fn reply_id(&self) -> &str {
        match self {
            Self::ButtonReply(r) => &r.id,
            Self::ListReply(r) => &r.id,
        }
    }
}

impl Schema for InteractiveReply {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let kind = d.discriminator::<InteractiveReplyKind>(obj, "type")?;
        match kind {
            InteractiveReplyKind::ButtonReply => {
                d.field(obj, "button_reply").map(Self::ButtonReply)
            }
            InteractiveReplyKind::ListReply => d.field(obj, "list_reply").map(Self::ListReply),
        }
    }
}

impl Serialize for InteractiveReply {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let tag = self.kind().as_wire();
        match self {
            Self::ButtonReply(r) => crate::schema::serialize_tagged(s, tag, Some((tag, r))),
            Self::ListReply(r) => crate::schema::serialize_tagged(s, tag, Some((tag, r))),
        }
    }
}

/// Quick-reply button tapped on a template message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickReplyButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl Schema for QuickReplyButton {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let text = d.field(obj, "text");
        let payload = d.opt_field(obj, "payload");
        Some(Self {
            text: text?,
            payload: payload?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reaction {
    pub message_id: String,
    pub emoji: String,
}

impl Schema for Reaction {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let message_id = d.field(obj, "message_id");
        let emoji = d.field(obj, "emoji");
        Some(Self {
            message_id: message_id?,
            emoji: emoji?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductItem {
    pub product_retailer_id: String,
    pub quantity: Numeric,
    pub item_price: Numeric,
    pub currency: String,
}

impl Schema for ProductItem {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let product_retailer_id = d.field(obj, "product_retailer_id");
        let quantity = d.field(obj, "quantity");
        let item_price = d.field(obj, "item_price");
        let currency = d.field(obj, "currency");
        Some(Self {
            product_retailer_id: product_retailer_id?,
            quantity: quantity?,
            item_price: item_price?,
            currency: currency?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub catalog_id: String,
    pub product_items: Vec<ProductItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Order {
    /// Sum of `quantity * item_price` over all items, when every value parses.
    pub fn total(&self) -> Option<f64> {
        self.product_items.iter().try_fold(0.0, |acc, item| {
            Some(acc + item.quantity.as_f64()? * item.item_price.as_f64()?)
        })
    }
}

impl Schema for Order {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let catalog_id = d.field(obj, "catalog_id");
        let product_items = d.field(obj, "product_items");
        let text = d.opt_field(obj, "text");
        Some(Self {
            catalog_id: catalog_id?,
            product_items: product_items?,
            text: text?,
        })
    }
}

/// Number change, identity change and similar platform notices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemNotice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wa_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_wa_id: Option<String>,
}

impl Schema for SystemNotice {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let body = d.opt_field(obj, "body");
        let kind = d.opt_field(obj, "type");
        let wa_id = d.opt_field(obj, "wa_id");
        let customer = d.opt_field(obj, "customer");
        let identity = d.opt_field(obj, "identity");
        let user = d.opt_field(obj, "user");
        let new_wa_id = d.opt_field(obj, "new_wa_id");
        Some(Self {
            body: body?,
            kind: kind?,
            wa_id: wa_id?,
            customer: customer?,
            identity: identity?,
            user: user?,
            new_wa_id: new_wa_id?,
        })
    }
}

// ─── Cross-cutting message fields ───────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferredProduct {
    pub catalog_id: String,
    pub product_retailer_id: String,
}

impl Schema for ReferredProduct {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let catalog_id = d.field(obj, "catalog_id");
        let product_retailer_id = d.field(obj, "product_retailer_id");
        Some(Self {
            catalog_id: catalog_id?,
            product_retailer_id: product_retailer_id?,
        })
    }
}

/// Reply / forward context.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwarded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequently_forwarded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referred_product: Option<ReferredProduct>,
}

impl Schema for MessageContext {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let forwarded = d.opt_field(obj, "forwarded");
        let frequently_forwarded = d.opt_field(obj, "frequently_forwarded");
        let from = d.opt_field(obj, "from");
        let id = d.opt_field(obj, "id");
        let referred_product = d.opt_field(obj, "referred_product");
        Some(Self {
            forwarded: forwarded?,
            frequently_forwarded: frequently_forwarded?,
            from: from?,
            id: id?,
            referred_product: referred_product?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WelcomeMessage {
    pub text: String,
}

impl Schema for WelcomeMessage {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        Some(Self {
            text: d.field(obj, "text")?,
        })
    }
}

/// Click-to-WhatsApp ad or post that started the conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Referral {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctwa_clid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<WelcomeMessage>,
}

impl Schema for Referral {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let source_url = d.opt_field(obj, "source_url");
        let source_id = d.opt_field(obj, "source_id");
        let source_type = d.opt_field(obj, "source_type");
        let headline = d.opt_field(obj, "headline");
        let body = d.opt_field(obj, "body");
        let media_type = d.opt_field(obj, "media_type");
        let image_url = d.opt_field(obj, "image_url");
        let video_url = d.opt_field(obj, "video_url");
        let thumbnail_url = d.opt_field(obj, "thumbnail_url");
        let ctwa_clid = d.opt_field(obj, "ctwa_clid");
        let welcome_message = d.opt_field(obj, "welcome_message");
        Some(Self {
            source_url: source_url?,
            source_id: source_id?,
            source_type: source_type?,
            headline: headline?,
            body: body?,
            media_type: media_type?,
            image_url: image_url?,
            video_url: video_url?,
            thumbnail_url: thumbnail_url?,
            ctwa_clid: ctwa_clid?,
            welcome_message: welcome_message?,
        })
    }
}

// ─── Message ────────────────────────────────────────────────────────

wire_enum! {
    /// Inbound message kinds this crate understands.
    pub enum MessageKind {
        Text => "text",
        Image => "image",
        Video => "video",
        Audio => "audio",
        Document => "document",
        Sticker => "sticker",
        Location => "location",
        Contacts => "contacts",
        Interactive => "interactive",
        Button => "button",
        Reaction => "reaction",
        Order => "order",
        System => "system",
        Unknown => "unknown",
    }
}

/// Keys that carry kind-specific content; at most the selected one may appear.
const CONTENT_KEYS: &[&str] = &[
    "text",
    "image",
    "video",
    "audio",
    "document",
    "sticker",
    "location",
    "contacts",
    "interactive",
    "button",
    "reaction",
    "order",
    "system",
];

/// Kind-specific part of a [`Message`].
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(TextBody),
    Image(Media),
    Video(Media),
    Audio(Media),
    Document(Media),
    Sticker(Media),
    Location(Location),
    Contacts(Vec<SharedContact>),
    Interactive(InteractiveReply),
    Button(QuickReplyButton),
    Reaction(Reaction),
    Order(Order),
    System(SystemNotice),
    /// `type: "unknown"`, a newer kind this crate does not model, or no
    /// `type` at all. `raw_type` keeps the unrecognised wire value.
    Unknown { raw_type: Option<String> },
}

impl MessageContent {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Text(_) => MessageKind::Text,
            Self::Image(_) => MessageKind::Image,
            Self::Video(_) => MessageKind::Video,
            Self::Audio(_) => MessageKind::Audio,
            Self::Document(_) => MessageKind::Document,
            Self::Sticker(_) => MessageKind::Sticker,
            Self::Location(_) => MessageKind::Location,
            Self::Contacts(_) => MessageKind::Contacts,
            Self::Interactive(_) => MessageKind::Interactive,
            Self::Button(_) => MessageKind::Button,
            Self::Reaction(_) => MessageKind::Reaction,
            Self::Order(_) => MessageKind::Order,
            Self::System(_) => MessageKind::System,
            Self::Unknown { .. } => MessageKind::Unknown,
        }
    }

    /// Wire `type`, including the raw value of an unrecognised kind.
    pub fn wire_type(&self) -> &str {
        match self {
            Self::Unknown {
                raw_type: Some(raw),
            } => raw,
            other => other.kind().as_wire(),
        }
    }

    pub fn media(&self) -> Option<&Media> {
        match self {
            Self::Image(m) | Self::Video(m) | Self::Audio(m) | Self::Document(m) | Self::Sticker(m) => {
                Some(m)
            }
            _ => None,
        }
    }

    fn decode_kind(d: &mut Decoder, obj: &crate::schema::Object, kind: MessageKind) -> Option<Self> {
        let key = kind.as_wire();
        let content = match kind {
            MessageKind::Text => d.field(obj, key).map(Self::Text),
            MessageKind::Image => d.field(obj, key).map(Self::Image),
            MessageKind::Video => d.field(obj, key).map(Self::Video),
            MessageKind::Audio => d.field(obj, key).map(Self::Audio),
            MessageKind::Document => d.field(obj, key).map(Self::Document),
            MessageKind::Sticker => d.field(obj, key).map(Self::Sticker),
            MessageKind::Location => d.field(obj, key).map(Self::Location),
            MessageKind::Contacts => d.field(obj, key).map(Self::Contacts),
            MessageKind::Interactive => d.field(obj, key).map(Self::Interactive),
            MessageKind::Button => d.field(obj, key).map(Self::Button),
            MessageKind::Reaction => d.field(obj, key).map(Self::Reaction),
            MessageKind::Order => d.field(obj, key).map(Self::Order),
            MessageKind::System => d.field(obj, key).map(Self::System),
            MessageKind::Unknown => return Some(Self::Unknown { raw_type: None }),
        };
        let others: Vec<&str> = CONTENT_KEYS.iter().copied().filter(|k| *k != key).collect();
        let clean = d.forbid(obj, &others);
        clean.and(content)
    }
}

impl Serialize for MessageContent {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        use crate::schema::serialize_tagged;
        let tag = self.wire_type();
        match self {
            Self::Text(c) => serialize_tagged(s, tag, Some((tag, c))),
            Self::Image(c) | Self::Video(c) | Self::Audio(c) | Self::Document(c) | Self::Sticker(c) => {
                serialize_tagged(s, tag, Some((tag, c)))
            }
            Self::Location(c) => serialize_tagged(s, tag, Some((tag, c))),
            Self::Contacts(c) => serialize_tagged(s, tag, Some((tag, c))),
            Self::Interactive(c) => serialize_tagged(s, tag, Some((tag, c))),
            Self::Button(c) => serialize_tagged(s, tag, Some((tag, c))),
            Self::Reaction(c) => serialize_tagged(s, tag, Some((tag, c))),
            Self::Order(c) => serialize_tagged(s, tag, Some((tag, c))),
            Self::System(c) => serialize_tagged(s, tag, Some((tag, c))),
            Self::Unknown { .. } => serialize_tagged::<S, ()>(s, tag, None),
        }
    }
}

/// One inbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub from: String,
    pub id: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub content: MessageContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<MessageContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral: Option<Referral>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorObject>>,
}

impl Message {
    /// Wire `type` of this message.
    pub fn kind(&self) -> &str {
        self.content.wire_type()
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        unix_timestamp(&self.timestamp)
    }

    pub fn text_body(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(t) => Some(&t.body),
            _ => None,
        }
    }

    /// True when this message is a reply to (or forward of) another.
    pub fn is_reply(&self) -> bool {
        self.context.as_ref().is_some_and(|c| c.id.is_some())
    }
}

impl Schema for Message {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let from = d.field(obj, "from");
        let id = d.field(obj, "id");
        let timestamp = d.field(obj, "timestamp");
        let raw_type: Option<Option<String>> = d.opt_field(obj, "type");
        let content = raw_type.and_then(|raw| match raw {
            None => {
                warn!("message at {} has no type; keeping common fields only", d.path());
                Some(MessageContent::Unknown { raw_type: None })
            }
            Some(raw) => match MessageKind::from_wire(&raw) {
                Some(kind) => MessageContent::decode_kind(d, obj, kind),
                None => {
                    warn!("unrecognised message type `{}` at {}", raw, d.path());
                    Some(MessageContent::Unknown {
                        raw_type: Some(raw),
                    })
                }
            },
        });
        let group_id = d.opt_field(obj, "group_id");
        let context = d.opt_field(obj, "context");
        let referral = d.opt_field(obj, "referral");
        let errors = d.opt_field(obj, "errors");
        Some(Self {
            from: from?,
            id: id?,
            timestamp: timestamp?,
            content: content?,
            group_id: group_id?,
            context: context?,
            referral: referral?,
            errors: errors?,
        })
    }
}

// ─── Status ─────────────────────────────────────────────────────────

wire_enum! {
    pub enum StatusKind {
        Read => "read",
        Delivered => "delivered",
        Sent => "sent",
        Failed => "failed",
        Deleted => "deleted",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationOrigin {
    #[serde(rename = "type")]
    pub kind: String,
}

impl Schema for ConversationOrigin {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        Some(Self {
            kind: d.field(obj, "type")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<ConversationOrigin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_timestamp: Option<String>,
}

impl Schema for Conversation {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let id = d.field(obj, "id");
        let origin = d.opt_field(obj, "origin");
        let expiration_timestamp = d.opt_field(obj, "expiration_timestamp");
        Some(Self {
            id: id?,
            origin: origin?,
            expiration_timestamp: expiration_timestamp?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pricing {
    pub pricing_model: String,
    pub billable: bool,
    pub category: String,
}

impl Schema for Pricing {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let pricing_model = d.field(obj, "pricing_model");
        let billable = d.field(obj, "billable");
        let category = d.field(obj, "category");
        Some(Self {
            pricing_model: pricing_model?,
            billable: billable?,
            category: category?,
        })
    }
}

/// Delivery status of a message previously sent by the business.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub id: String,
    pub recipient_id: String,
    pub status: StatusKind,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Conversation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorObject>>,
}

impl Status {
    pub fn at(&self) -> Option<DateTime<Utc>> {
        unix_timestamp(&self.timestamp)
    }
}

impl Schema for Status {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let id = d.field(obj, "id");
        let recipient_id = d.field(obj, "recipient_id");
        let status = d.field(obj, "status");
        let timestamp = d.field(obj, "timestamp");
        let conversation = d.opt_field(obj, "conversation");
        let pricing = d.opt_field(obj, "pricing");
        let errors = d.opt_field(obj, "errors");
        Some(Self {
            id: id?,
            recipient_id: recipient_id?,
            status: status?,
            timestamp: timestamp?,
            conversation: conversation?,
            pricing: pricing?,
            errors: errors?,
        })
    }
}

// ─── Value ──────────────────────────────────────────────────────────

/// `value` of a `messages` change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagesValue {
    pub messaging_product: String,
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<Contact>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<Status>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorObject>>,
}

impl MessagesValue {
    pub fn messages(&self) -> &[Message] {
        self.messages.as_deref().unwrap_or_default()
    }

    pub fn statuses(&self) -> &[Status] {
        self.statuses.as_deref().unwrap_or_default()
    }

    /// Profile name of the sender with the given WhatsApp id.
    pub fn sender_name(&self, wa_id: &str) -> Option<&str> {
        self.contacts
            .as_deref()?
            .iter()
            .find(|c| c.wa_id == wa_id)
            .map(|c| c.profile.name.as_str())
    }
}

const MESSAGES_VALUE_PAYLOADS: &[&str] = &["messages", "statuses", "errors"];

impl Schema for MessagesValue {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let messaging_product = d.required(obj, "messaging_product", |d, v| {
            d.literal(v, MESSAGING_PRODUCT)
        });
        let metadata = d.field(obj, "metadata");
        let contacts = d.opt_field(obj, "contacts");
        let messages = d.opt_field(obj, "messages");
        let statuses = d.opt_field(obj, "statuses");
        let errors = d.opt_field(obj, "errors");
        let has_payload = MESSAGES_VALUE_PAYLOADS.iter().any(|k| obj.contains_key(*k));
        if !has_payload {
            d.report_constraint(Constraint::AtLeastOneOf {
                fields: MESSAGES_VALUE_PAYLOADS,
            });
        }
        let value = Self {
            messaging_product: messaging_product?,
            metadata: metadata?,
            contacts: contacts?,
            messages: messages?,
            statuses: statuses?,
            errors: errors?,
        };
        has_payload.then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{decode_value, DecodeMode, ErrorKind};
    use serde_json::json;

    fn message(extra: Value) -> Value {
        let mut base = json!({
            "from": "16315551234",
            "id": "wamid.X",
            "timestamp": "1603059201"
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        base
    }

    #[test]
    fn test_text_message() {
        let msg: Message = decode_value(
            &message(json!({ "type": "text", "text": { "body": "hi" } })),
            DecodeMode::FailFast,
        )
        .unwrap();
        assert_eq!(msg.kind(), "text");
        assert_eq!(msg.text_body(), Some("hi"));
        assert_eq!(msg.sent_at().unwrap().timestamp(), 1_603_059_201);
    }

    #[test]
    fn test_type_requires_matching_content() {
        let err = decode_value::<Message>(
            &message(json!({ "type": "text", "image": { "id": "m1" } })),
            DecodeMode::CollectAll,
        )
        .unwrap_err();
        let paths: Vec<String> = err.violations().iter().map(|v| v.path.to_string()).collect();
        assert_eq!(paths, vec!["text", "image"]);
        assert_eq!(err.violations()[0].kind, ErrorKind::MissingField);
    }

    #[test]
    fn test_unrecognised_type_falls_back() {
        let msg: Message = decode_value(
            &message(json!({
                "type": "ephemeral",
                "errors": [{ "code": 131051, "title": "Message type unknown" }]
            })),
            DecodeMode::FailFast,
        )
        .unwrap();
        assert_eq!(msg.kind(), "ephemeral");
        assert_eq!(msg.content.kind(), MessageKind::Unknown);
        assert_eq!(msg.errors.as_ref().unwrap()[0].code, 131051);
    }

    #[test]
    fn test_missing_type_falls_back() {
        let msg: Message = decode_value(&message(json!({})), DecodeMode::FailFast).unwrap();
        assert_eq!(msg.content, MessageContent::Unknown { raw_type: None });
        assert_eq!(msg.kind(), "unknown");
    }

    #[test]
    fn test_interactive_reply_is_closed() {
        let err = decode_value::<Message>(
            &message(json!({
                "type": "interactive",
                "interactive": { "type": "nfm_reply", "nfm_reply": {} }
            })),
            DecodeMode::FailFast,
        )
        .unwrap_err();
        assert_eq!(err.first().path.to_string(), "interactive.type");
        assert!(matches!(
            err.first().kind,
            ErrorKind::UnknownUnionVariant { .. }
        ));
    }

    #[test]
    fn test_order_accepts_mixed_numbers() {
        let msg: Message = decode_value(
            &message(json!({
                "type": "order",
                "order": {
                    "catalog_id": "cat-1",
                    "product_items": [
                        { "product_retailer_id": "sku-1", "quantity": "2", "item_price": 10.5, "currency": "USD" },
                        { "product_retailer_id": "sku-2", "quantity": 1, "item_price": "4", "currency": "USD" }
                    ]
                }
            })),
            DecodeMode::FailFast,
        )
        .unwrap();
        let MessageContent::Order(order) = &msg.content else {
            panic!("expected order content");
        };
        assert_eq!(order.total(), Some(25.0));
    }

    #[test]
    fn test_serializes_back_to_wire_shape() {
        let input = message(json!({
            "type": "reaction",
            "reaction": { "message_id": "wamid.Y", "emoji": "👍" },
            "context": { "id": "wamid.Y" }
        }));
        let msg: Message = decode_value(&input, DecodeMode::FailFast).unwrap();
        assert!(msg.is_reply());
        assert_eq!(serde_json::to_value(&msg).unwrap(), input);
    }

    #[test]
    fn test_messages_value_requires_payload() {
        let err = decode_value::<MessagesValue>(
            &json!({
                "messaging_product": "whatsapp",
                "metadata": { "display_phone_number": "1", "phone_number_id": "2" }
            }),
            DecodeMode::FailFast,
        )
        .unwrap_err();
        assert_eq!(
            err.first().kind,
            ErrorKind::constraint(Constraint::AtLeastOneOf {
                fields: MESSAGES_VALUE_PAYLOADS
            })
        );
        assert!(err.first().path.is_root());
    }

    #[test]
    fn test_status_with_pricing() {
        let status: Status = decode_value(
            &json!({
                "id": "wamid.Z",
                "recipient_id": "16315551234",
                "status": "sent",
                "timestamp": "1603059201",
                "conversation": { "id": "c1", "origin": { "type": "service" } },
                "pricing": { "pricing_model": "CBP", "billable": true, "category": "service" }
            }),
            DecodeMode::FailFast,
        )
        .unwrap();
        assert_eq!(status.status, StatusKind::Sent);
        assert!(status.pricing.unwrap().billable);
        assert_eq!(status.conversation.unwrap().origin.unwrap().kind, "service");
    }
}
