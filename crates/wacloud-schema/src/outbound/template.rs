//! Template message content and its parameter union.

use super::content::{DocumentRef, MediaRef};
use crate::schema::{serialize_tagged, wire_enum, Decoder, Schema, WireEnum};
use serde::{Serialize, Serializer};
use serde_json::Value;

wire_enum! {
    pub enum ComponentKind {
        Header => "header",
        Body => "body",
        Button => "button",
    }
}

wire_enum! {
    pub enum ButtonSubType {
        QuickReply => "quick_reply",
        Url => "url",
    }
}

wire_enum! {
    pub enum ParameterKind {
        Text => "text",
        Currency => "currency",
        DateTime => "date_time",
        Image => "image",
        Document => "document",
        Video => "video",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyParam {
    pub fallback_value: String,
    /// ISO 4217 code.
    pub code: String,
    /// Amount multiplied by 1000.
    pub amount_1000: i64,
}

impl Schema for CurrencyParam {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let fallback_value = d.field(obj, "fallback_value");
        let code = d.field(obj, "code");
        let amount_1000 = d.field(obj, "amount_1000");
        Some(Self {
            fallback_value: fallback_value?,
            code: code?,
            amount_1000: amount_1000?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateTimeParam {
    pub fallback_value: String,
}

impl Schema for DateTimeParam {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        Some(Self {
            fallback_value: d.field(obj, "fallback_value")?,
        })
    }
}

/// Value substituted into a template placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateParameter {
    Text(String),
    Currency(CurrencyParam),
    DateTime(DateTimeParam),
    Image(MediaRef),
    Document(DocumentRef),
    Video(MediaRef),
}

impl TemplateParameter {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn kind(&self) -> ParameterKind {
        match self {
            Self::Text(_) => ParameterKind::Text,
            Self::Currency(_) => ParameterKind::Currency,
            Self::DateTime(_) => ParameterKind::DateTime,
            Self::Image(_) => ParameterKind::Image,
            Self::Document(_) => ParameterKind::Document,
            Self::Video(_) => ParameterKind::Video,
        }
    }
}

impl Serialize for TemplateParameter {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let tag = self.kind().as_wire();
        match self {
            Self::Text(v) => serialize_tagged(s, tag, Some((tag, v))),
            Self::Currency(v) => serialize_tagged(s, tag, Some((tag, v))),
            Self::DateTime(v) => serialize_tagged(s, tag, Some((tag, v))),
            Self::Image(v) | Self::Video(v) => serialize_tagged(s, tag, Some((tag, v))),
            Self::Document(v) => serialize_tagged(s, tag, Some((tag, v))),
        }
    }
}

impl Schema for TemplateParameter {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let kind = d.discriminator::<ParameterKind>(obj, "type")?;
        let key = kind.as_wire();
        match kind {
            ParameterKind::Text => d.field(obj, key).map(Self::Text),
            ParameterKind::Currency => d.field(obj, key).map(Self::Currency),
            ParameterKind::DateTime => d.field(obj, key).map(Self::DateTime),
            ParameterKind::Image => d.field(obj, key).map(Self::Image),
            ParameterKind::Document => d.field(obj, key).map(Self::Document),
            ParameterKind::Video => d.field(obj, key).map(Self::Video),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateComponent {
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub parameters: Vec<TemplateParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<ButtonSubType>,
    /// Position of the button this component fills.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
}

impl TemplateComponent {
    pub fn body(parameters: Vec<TemplateParameter>) -> Self {
        Self {
            kind: ComponentKind::Body,
            parameters,
            sub_type: None,
            index: None,
        }
    }

    pub fn header(parameters: Vec<TemplateParameter>) -> Self {
        Self {
            kind: ComponentKind::Header,
            ..Self::body(parameters)
        }
    }

    pub fn button(sub_type: ButtonSubType, index: i64, parameters: Vec<TemplateParameter>) -> Self {
        Self {
            kind: ComponentKind::Button,
            parameters,
            sub_type: Some(sub_type),
            index: Some(index),
        }
    }
}

impl Schema for TemplateComponent {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let kind = d.field(obj, "type");
        let parameters = d.field(obj, "parameters");
        let sub_type = d.opt_field(obj, "sub_type");
        let index = d.opt_field(obj, "index");
        Some(Self {
            kind: kind?,
            parameters: parameters?,
            sub_type: sub_type?,
            index: index?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateLanguage {
    pub code: String,
}

impl Schema for TemplateLanguage {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        Some(Self {
            code: d.required(obj, "code", |d, v| d.non_empty_string(v))?,
        })
    }
}

/// Pre-approved template plus its placeholder values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateContent {
    pub name: String,
    pub language: TemplateLanguage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<TemplateComponent>>,
}

impl TemplateContent {
    pub fn new(name: impl Into<String>, language_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: TemplateLanguage {
                code: language_code.into(),
            },
            components: None,
        }
    }

    pub fn with_component(mut self, component: TemplateComponent) -> Self {
        self.components.get_or_insert_with(Vec::new).push(component);
        self
    }
}

impl Schema for TemplateContent {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let name = d.required(obj, "name", |d, v| d.non_empty_string(v));
        let language = d.field(obj, "language");
        let components = d.opt_field(obj, "components");
        Some(Self {
            name: name?,
            language: language?,
            components: components?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::content::MediaSource;
    use crate::schema::{decode_value, DecodeMode, ErrorKind};
    use serde_json::json;

    #[test]
    fn test_template_wire_shape() {
        let template = TemplateContent::new("order_ready", "en_US")
            .with_component(TemplateComponent::header(vec![TemplateParameter::Image(
                MediaSource::link("https://example.com/banner.png").into(),
            )]))
            .with_component(TemplateComponent::body(vec![
                TemplateParameter::text("A-1001"),
                TemplateParameter::Currency(CurrencyParam {
                    fallback_value: "$12.50".into(),
                    code: "USD".into(),
                    amount_1000: 12_500,
                }),
            ]))
            .with_component(TemplateComponent::button(
                ButtonSubType::Url,
                0,
                vec![TemplateParameter::text("A-1001")],
            ));
        let value = serde_json::to_value(&template).unwrap();
        assert_eq!(
            value["components"][0]["parameters"][0],
            json!({ "type": "image", "image": { "link": "https://example.com/banner.png" } })
        );
        assert_eq!(value["components"][1]["parameters"][0], json!({ "type": "text", "text": "A-1001" }));
        assert_eq!(value["components"][2]["sub_type"], "url");

        let back: TemplateContent = decode_value(&value, DecodeMode::FailFast).unwrap();
        assert_eq!(back, template);
    }

    #[test]
    fn test_parameter_requires_same_named_field() {
        let err = decode_value::<TemplateParameter>(
            &json!({ "type": "currency", "text": "12.50" }),
            DecodeMode::FailFast,
        )
        .unwrap_err();
        assert_eq!(err.first().path.to_string(), "currency");
        assert_eq!(err.first().kind, ErrorKind::MissingField);
    }

    #[test]
    fn test_unknown_component_type() {
        let err = decode_value::<TemplateComponent>(
            &json!({ "type": "footer", "parameters": [] }),
            DecodeMode::FailFast,
        )
        .unwrap_err();
        assert_eq!(err.first().path.to_string(), "type");
    }
}
