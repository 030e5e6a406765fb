//! One constructor per sendable kind. Each returns a payload that has
//! already passed validation, or the first violation found.

use super::content::{
    ContactCard, DocumentContent, LocationContent, MediaContent, MediaRef, MediaSource,
    ReactionContent, ReplyContext, TextContent,
};
use super::interactive::{
    ButtonInteractive, CtaUrlInteractive, InteractiveContent, ListInteractive,
};
use super::template::TemplateContent;
use super::{to_wire_value, OutboundContent, OutboundMessage, ReadReceipt};
use crate::schema::{decode_value, DecodeMode, ValidationError, WireEnum};
use log::debug;

/// Validate `content` addressed to `to`.
pub fn build_message(
    to: &str,
    content: OutboundContent,
) -> Result<OutboundMessage, ValidationError> {
    finish(OutboundMessage::new(to, content))
}

/// Like [`build_message`] but quoting `reply_to`.
pub fn build_reply(
    to: &str,
    reply_to: &str,
    content: OutboundContent,
) -> Result<OutboundMessage, ValidationError> {
    let mut msg = OutboundMessage::new(to, content);
    msg.context = Some(ReplyContext {
        message_id: reply_to.to_string(),
    });
    finish(msg)
}

fn finish(msg: OutboundMessage) -> Result<OutboundMessage, ValidationError> {
    match msg.validate(DecodeMode::FailFast) {
        Ok(()) => Ok(msg),
        Err(e) => {
            debug!(
                "rejected outbound {} message: {}",
                msg.kind().as_wire(),
                e.first()
            );
            Err(e)
        }
    }
}

// ─── Text & media ───────────────────────────────────────────────────

/// Build a text message.
pub fn build_text_message(
    to: &str,
    body: &str,
    preview_url: bool,
) -> Result<OutboundMessage, ValidationError> {
    build_message(
        to,
        OutboundContent::Text(TextContent {
            body: body.to_string(),
            preview_url: preview_url.then_some(true),
        }),
    )
}

/// Build an image message (by media ID or link).
pub fn build_image_message(
    to: &str,
    source: MediaSource,
    caption: Option<&str>,
) -> Result<OutboundMessage, ValidationError> {
    build_message(
        to,
        OutboundContent::Image(MediaContent {
            source,
            caption: caption.map(String::from),
        }),
    )
}

/// Build a video message.
pub fn build_video_message(
    to: &str,
    source: MediaSource,
    caption: Option<&str>,
) -> Result<OutboundMessage, ValidationError> {
    build_message(
        to,
        OutboundContent::Video(MediaContent {
            source,
            caption: caption.map(String::from),
        }),
    )
}

/// Build an audio message.
pub fn build_audio_message(
    to: &str,
    source: MediaSource,
) -> Result<OutboundMessage, ValidationError> {
    build_message(to, OutboundContent::Audio(MediaRef::from(source)))
}

/// Build a sticker message.
pub fn build_sticker_message(
    to: &str,
    source: MediaSource,
) -> Result<OutboundMessage, ValidationError> {
    build_message(to, OutboundContent::Sticker(MediaRef::from(source)))
}

/// Build a document message with an optional display filename.
pub fn build_document_message(
    to: &str,
    source: MediaSource,
    caption: Option<&str>,
    filename: Option<&str>,
) -> Result<OutboundMessage, ValidationError> {
    build_message(
        to,
        OutboundContent::Document(DocumentContent {
            source,
            caption: caption.map(String::from),
            filename: filename.map(String::from),
        }),
    )
}

// ─── Location & contacts ────────────────────────────────────────────

/// Build a location pin.
pub fn build_location_message(
    to: &str,
    latitude: f64,
    longitude: f64,
    name: Option<&str>,
    address: Option<&str>,
) -> Result<OutboundMessage, ValidationError> {
    build_message(
        to,
        OutboundContent::Location(LocationContent {
            latitude,
            longitude,
            name: name.map(String::from),
            address: address.map(String::from),
        }),
    )
}

/// Build a contacts message carrying one or more cards.
pub fn build_contacts_message(
    to: &str,
    cards: Vec<ContactCard>,
) -> Result<OutboundMessage, ValidationError> {
    build_message(to, OutboundContent::Contacts(cards))
}

// ─── Template & interactive ─────────────────────────────────────────

/// Build a template message.
pub fn build_template_message(
    to: &str,
    template: TemplateContent,
) -> Result<OutboundMessage, ValidationError> {
    build_message(to, OutboundContent::Template(template))
}

/// Build an interactive reply-button message (up to 3 buttons).
pub fn build_interactive_button_message(
    to: &str,
    content: ButtonInteractive,
) -> Result<OutboundMessage, ValidationError> {
    build_message(
        to,
        OutboundContent::Interactive(InteractiveContent::Button(content)),
    )
}

/// Build an interactive list message.
pub fn build_interactive_list_message(
    to: &str,
    content: ListInteractive,
) -> Result<OutboundMessage, ValidationError> {
    build_message(
        to,
        OutboundContent::Interactive(InteractiveContent::List(content)),
    )
}

/// Build an interactive call-to-action URL button.
pub fn build_interactive_cta_url_message(
    to: &str,
    content: CtaUrlInteractive,
) -> Result<OutboundMessage, ValidationError> {
    build_message(
        to,
        OutboundContent::Interactive(InteractiveContent::CtaUrl(content)),
    )
}

// ─── Reactions ──────────────────────────────────────────────────────

/// React to a message with an emoji.
pub fn build_reaction_message(
    to: &str,
    message_id: &str,
    emoji: &str,
) -> Result<OutboundMessage, ValidationError> {
    build_message(
        to,
        OutboundContent::Reaction(ReactionContent {
            message_id: message_id.to_string(),
            emoji: emoji.to_string(),
        }),
    )
}

/// Remove a previously sent reaction.
pub fn build_remove_reaction_message(
    to: &str,
    message_id: &str,
) -> Result<OutboundMessage, ValidationError> {
    build_reaction_message(to, message_id, "")
}

// ─── Chat actions ───────────────────────────────────────────────────

/// Mark a message as read.
pub fn build_read_receipt(message_id: &str) -> Result<ReadReceipt, ValidationError> {
    finish_receipt(ReadReceipt {
        message_id: message_id.to_string(),
        typing_indicator: false,
    })
}

/// Read receipt that also shows "typing…" to the sender.
pub fn build_typing_indicator(message_id: &str) -> Result<ReadReceipt, ValidationError> {
    finish_receipt(ReadReceipt {
        message_id: message_id.to_string(),
        typing_indicator: true,
    })
}

fn finish_receipt(receipt: ReadReceipt) -> Result<ReadReceipt, ValidationError> {
    let value = to_wire_value(&receipt)?;
    decode_value::<ReadReceipt>(&value, DecodeMode::FailFast).map(|_| receipt)
}
