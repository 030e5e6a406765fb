//! Template lifecycle webhooks: status, quality, components and category
//! updates.

use crate::schema::{wire_enum, CandidateFailure, Decoder, ErrorKind, Object, Schema};
use serde::Serialize;
use serde_json::Value;

wire_enum! {
    pub enum TemplateStatusEvent {
        Approved => "APPROVED",
        Archived => "ARCHIVED",
        Deleted => "DELETED",
        Disabled => "DISABLED",
        Flagged => "FLAGGED",
        InAppeal => "IN_APPEAL",
        LimitExceeded => "LIMIT_EXCEEDED",
        Locked => "LOCKED",
        Paused => "PAUSED",
        Pending => "PENDING",
        Reinstated => "REINSTATED",
        PendingDeletion => "PENDING_DELETION",
        Rejected => "REJECTED",
    }
}

wire_enum! {
    pub enum TemplateRejectionReason {
        AbusiveContent => "ABUSIVE_CONTENT",
        CategoryNotAvailable => "CATEGORY_NOT_AVAILABLE",
        IncorrectCategory => "INCORRECT_CATEGORY",
        InvalidFormat => "INVALID_FORMAT",
        NoReason => "NONE",
        Promotional => "PROMOTIONAL",
        Scam => "SCAM",
        TagContentMismatch => "TAG_CONTENT_MISMATCH",
    }
}

wire_enum! {
    pub enum TemplatePauseTitle {
        FirstPause => "FIRST_PAUSE",
        SecondPause => "SECOND_PAUSE",
        RateLimitingPause => "RATE_LIMITING_PAUSE",
        Unpause => "UNPAUSE",
        Disabled => "DISABLED",
    }
}

wire_enum! {
    pub enum QualityScore {
        Green => "GREEN",
        Red => "RED",
        Yellow => "YELLOW",
        Unknown => "UNKNOWN",
    }
}

wire_enum! {
    pub enum TemplateCategory {
        Authentication => "AUTHENTICATION",
        Marketing => "MARKETING",
        Utility => "UTILITY",
    }
}

wire_enum! {
    pub enum TemplateButtonType {
        Catalog => "CATALOG",
        CopyCode => "COPY_CODE",
        Extension => "EXTENSION",
        Flow => "FLOW",
        Mpm => "MPM",
        OrderDetails => "ORDER_DETAILS",
        Otp => "OTP",
        PhoneNumber => "PHONE_NUMBER",
        Postback => "POSTBACK",
        Reminder => "REMINDER",
        SendLocation => "SEND_LOCATION",
        Spm => "SPM",
        QuickReply => "QUICK_REPLY",
        Url => "URL",
        VoiceCall => "VOICE_CALL",
    }
}

/// Fields every template event carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateIdentity {
    pub message_template_id: i64,
    pub message_template_name: String,
    pub message_template_language: String,
}

impl TemplateIdentity {
    fn decode_from(d: &mut Decoder, obj: &Object) -> Option<Self> {
        let message_template_id = d.field(obj, "message_template_id");
        let message_template_name = d.field(obj, "message_template_name");
        let message_template_language = d.field(obj, "message_template_language");
        Some(Self {
            message_template_id: message_template_id?,
            message_template_name: message_template_name?,
            message_template_language: message_template_language?,
        })
    }
}

// ─── Status ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisableInfo {
    pub disable_date: i64,
}

impl Schema for DisableInfo {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        Some(Self {
            disable_date: d.field(obj, "disable_date")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherInfo {
    pub title: TemplatePauseTitle,
    pub description: String,
}

impl Schema for OtherInfo {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let title = d.field(obj, "title");
        let description = d.field(obj, "description");
        Some(Self {
            title: title?,
            description: description?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateStatusUpdate {
    pub event: TemplateStatusEvent,
    #[serde(flatten)]
    pub template: TemplateIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<TemplateRejectionReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_info: Option<DisableInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_info: Option<OtherInfo>,
}

impl Schema for TemplateStatusUpdate {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let event = d.field(obj, "event");
        let template = TemplateIdentity::decode_from(d, obj);
        let reason = d.opt_field(obj, "reason");
        let disable_info = d.opt_field(obj, "disable_info");
        let other_info = d.opt_field(obj, "other_info");
        Some(Self {
            event: event?,
            template: template?,
            reason: reason?,
            disable_info: disable_info?,
            other_info: other_info?,
        })
    }
}

// ─── Quality ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateQualityUpdate {
    pub previous_quality_score: QualityScore,
    pub new_quality_score: QualityScore,
    #[serde(flatten)]
    pub template: TemplateIdentity,
}

impl TemplateQualityUpdate {
    pub fn degraded(&self) -> bool {
        fn rank(score: QualityScore) -> u8 {
            match score {
                QualityScore::Green => 3,
                QualityScore::Yellow => 2,
                QualityScore::Red => 1,
                QualityScore::Unknown => 0,
            }
        }
        let (before, after) = (rank(self.previous_quality_score), rank(self.new_quality_score));
        after > 0 && before > after
    }
}

impl Schema for TemplateQualityUpdate {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let previous_quality_score = d.field(obj, "previous_quality_score");
        let new_quality_score = d.field(obj, "new_quality_score");
        let template = TemplateIdentity::decode_from(d, obj);
        Some(Self {
            previous_quality_score: previous_quality_score?,
            new_quality_score: new_quality_score?,
            template: template?,
        })
    }
}

/// `value` of a `message_template_status_update` change.
///
/// The platform reports both approval events and quality-score changes
/// under this field with no tag; an `event` member selects the status shape,
/// otherwise the quality shape is tried.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TemplateStatusChange {
    Status(TemplateStatusUpdate),
    Quality(TemplateQualityUpdate),
}

impl Schema for TemplateStatusChange {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        d.object(value)?;
        let status = match d.attempt(|d| TemplateStatusUpdate::decode(d, value)) {
            Ok(v) => return Some(Self::Status(v)),
            Err(violations) => violations,
        };
        let quality = match d.attempt(|d| TemplateQualityUpdate::decode(d, value)) {
            Ok(v) => return Some(Self::Quality(v)),
            Err(violations) => violations,
        };
        d.report(ErrorKind::UnionExhausted {
            candidates: vec![
                CandidateFailure {
                    candidate: "status_update",
                    violations: status,
                },
                CandidateFailure {
                    candidate: "quality_update",
                    violations: quality,
                },
            ],
        });
        None
    }
}

// ─── Components ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateButton {
    pub message_template_button_type: TemplateButtonType,
    pub message_template_button_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_template_button_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_template_button_phone_number: Option<String>,
}

impl Schema for TemplateButton {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let kind = d.field(obj, "message_template_button_type");
        let text = d.field(obj, "message_template_button_text");
        let url = d.opt_field(obj, "message_template_button_url");
        let phone = d.opt_field(obj, "message_template_button_phone_number");
        Some(Self {
            message_template_button_type: kind?,
            message_template_button_text: text?,
            message_template_button_url: url?,
            message_template_button_phone_number: phone?,
        })
    }
}

/// Rendered text of an edited template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateComponentsUpdate {
    #[serde(flatten)]
    pub template: TemplateIdentity,
    /// Body text.
    pub message_template_element: String,
    /// Header text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_template_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_template_footer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_template_buttons: Option<Vec<TemplateButton>>,
}

impl Schema for TemplateComponentsUpdate {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let template = TemplateIdentity::decode_from(d, obj);
        let element = d.field(obj, "message_template_element");
        let title = d.opt_field(obj, "message_template_title");
        let footer = d.opt_field(obj, "message_template_footer");
        let buttons = d.opt_field(obj, "message_template_buttons");
        Some(Self {
            template: template?,
            message_template_element: element?,
            message_template_title: title?,
            message_template_footer: footer?,
            message_template_buttons: buttons?,
        })
    }
}

// ─── Category ───────────────────────────────────────────────────────

/// Category change announced ahead of time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryImpending {
    #[serde(flatten)]
    pub template: TemplateIdentity,
    pub correct_category: TemplateCategory,
    pub new_category: TemplateCategory,
}

/// Category change that has taken effect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCompleted {
    #[serde(flatten)]
    pub template: TemplateIdentity,
    pub previous_category: TemplateCategory,
    pub new_category: TemplateCategory,
}

/// `value` of a `template_category_update` change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TemplateCategoryUpdate {
    Impending(CategoryImpending),
    Completed(CategoryCompleted),
}

impl TemplateCategoryUpdate {
    pub fn template(&self) -> &TemplateIdentity {
        match self {
            Self::Impending(v) => &v.template,
            Self::Completed(v) => &v.template,
        }
    }

    pub fn new_category(&self) -> TemplateCategory {
        match self {
            Self::Impending(v) => v.new_category,
            Self::Completed(v) => v.new_category,
        }
    }
}

impl CategoryImpending {
    fn decode_strict(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let template = TemplateIdentity::decode_from(d, obj);
        let correct_category = d.field(obj, "correct_category");
        let new_category = d.field(obj, "new_category");
        let exclusive = d.forbid(obj, &["previous_category"]);
        exclusive?;
        Some(Self {
            template: template?,
            correct_category: correct_category?,
            new_category: new_category?,
        })
    }
}

impl CategoryCompleted {
    fn decode_strict(d: &mut Decoder, value: &Value) -> Option<Self> {
        let obj = d.object(value)?;
        let template = TemplateIdentity::decode_from(d, obj);
        let previous_category = d.field(obj, "previous_category");
        let new_category = d.field(obj, "new_category");
        let exclusive = d.forbid(obj, &["correct_category"]);
        exclusive?;
        Some(Self {
            template: template?,
            previous_category: previous_category?,
            new_category: new_category?,
        })
    }
}

impl Schema for TemplateCategoryUpdate {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        d.object(value)?;
        let impending = match d.attempt(|d| CategoryImpending::decode_strict(d, value)) {
            Ok(v) => return Some(Self::Impending(v)),
            Err(violations) => violations,
        };
        let completed = match d.attempt(|d| CategoryCompleted::decode_strict(d, value)) {
            Ok(v) => return Some(Self::Completed(v)),
            Err(violations) => violations,
        };
        d.report(ErrorKind::UnionExhausted {
            candidates: vec![
                CandidateFailure {
                    candidate: "impending",
                    violations: impending,
                },
                CandidateFailure {
                    candidate: "completed",
                    violations: completed,
                },
            ],
        });
        None
    }
}
