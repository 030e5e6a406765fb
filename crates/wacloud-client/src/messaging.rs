//! Send validated messages and chat actions through a [`Transport`].

use crate::error::{WhatsAppError, WhatsAppResult};
use crate::transport::Transport;
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;
use wacloud_schema::outbound::OutboundMessage;
use wacloud_schema::schema::{decode_value, DecodeMode, Schema};
use wacloud_schema::{build_read_receipt, build_text_message, build_typing_indicator};
use wacloud_schema::{ActionResponse, SendMessageResponse};

/// Message sender bound to one business phone number.
pub struct WaMessaging<T> {
    transport: T,
    phone_number_id: String,
}

impl<T: Transport> WaMessaging<T> {
    pub fn new(transport: T, phone_number_id: impl Into<String>) -> Self {
        Self {
            transport,
            phone_number_id: phone_number_id.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn messages_path(&self) -> String {
        format!("{}/messages", self.phone_number_id)
    }

    async fn post<P: Serialize, R: Schema>(&self, payload: &P) -> WhatsAppResult<R> {
        let body = serde_json::to_value(payload)
            .map_err(|e| WhatsAppError::internal(format!("serializing payload: {}", e)))?;
        let reply: Value = self.transport.post_json(&self.messages_path(), &body).await?;
        decode_value::<R>(&reply, DecodeMode::FailFast).map_err(WhatsAppError::unexpected_response)
    }

    // ─── Messages ────────────────────────────────────────────────────

    /// Validate and send any outbound message.
    pub async fn send(&self, message: &OutboundMessage) -> WhatsAppResult<SendMessageResponse> {
        message.validate(DecodeMode::FailFast)?;
        let resp: SendMessageResponse = self.post(message).await?;
        info!(
            "sent {} message to {} ({})",
            message.kind(),
            message.to,
            resp.message_id().unwrap_or("no id")
        );
        Ok(resp)
    }

    /// Send a plain text message, optionally quoting `reply_to`.
    pub async fn send_text(
        &self,
        to: &str,
        body: &str,
        preview_url: bool,
        reply_to: Option<&str>,
    ) -> WhatsAppResult<SendMessageResponse> {
        let mut message = build_text_message(to, body, preview_url)?;
        if let Some(id) = reply_to {
            message.context = Some(wacloud_schema::outbound::ReplyContext {
                message_id: id.to_string(),
            });
        }
        self.send(&message).await
    }

    // ─── Chat actions ────────────────────────────────────────────────

    /// Mark an inbound message as read (blue ticks).
    pub async fn mark_as_read(&self, message_id: &str) -> WhatsAppResult<ActionResponse> {
        let receipt = build_read_receipt(message_id)?;
        let resp: ActionResponse = self.post(&receipt).await?;
        debug!("marked {} as read", message_id);
        Ok(resp)
    }

    /// Mark as read and show a typing indicator until the next reply.
    pub async fn send_typing_indicator(&self, message_id: &str) -> WhatsAppResult<ActionResponse> {
        let receipt = build_typing_indicator(message_id)?;
        let resp: ActionResponse = self.post(&receipt).await?;
        debug!("typing indicator shown for {}", message_id);
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WhatsAppErrorCode;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use wacloud_schema::outbound::{MediaSource, OutboundContent};
    use wacloud_schema::{build_image_message, build_message};

    /// Records every request and answers with a canned reply.
    struct MockTransport {
        reply: Value,
        requests: Mutex<Vec<(String, Value)>>,
    }

    impl MockTransport {
        fn replying(reply: Value) -> Self {
            Self {
                reply,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<(String, Value)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn post_json(&self, path: &str, body: &Value) -> WhatsAppResult<Value> {
            self.requests
                .lock()
                .unwrap()
                .push((path.to_string(), body.clone()));
            Ok(self.reply.clone())
        }
    }

    fn sent_reply() -> Value {
        json!({
            "messaging_product": "whatsapp",
            "contacts": [{ "input": "16505551234", "wa_id": "16505551234" }],
            "messages": [{ "id": "wamid.sent" }]
        })
    }

    #[tokio::test]
    async fn test_send_posts_validated_payload() {
        let wa = WaMessaging::new(MockTransport::replying(sent_reply()), "1065");
        let msg = build_image_message(
            "16505551234",
            MediaSource::link("https://example.com/a.png"),
            Some("look"),
        )
        .unwrap();
        let resp = wa.send(&msg).await.unwrap();
        assert_eq!(resp.message_id(), Some("wamid.sent"));

        let requests = wa.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "1065/messages");
        assert_eq!(
            requests[0].1["image"],
            json!({ "link": "https://example.com/a.png", "caption": "look" })
        );
    }

    #[tokio::test]
    async fn test_send_text_with_reply() {
        let wa = WaMessaging::new(MockTransport::replying(sent_reply()), "1065");
        wa.send_text("16505551234", "on my way", false, Some("wamid.q"))
            .await
            .unwrap();
        let body = &wa.transport().requests()[0].1;
        assert_eq!(body["context"]["message_id"], "wamid.q");
        assert_eq!(body["text"]["body"], "on my way");
    }

    #[tokio::test]
    async fn test_invalid_message_never_reaches_transport() {
        let wa = WaMessaging::new(MockTransport::replying(sent_reply()), "1065");
        let mut msg = build_message(
            "1",
            OutboundContent::Text(wacloud_schema::outbound::TextContent {
                body: "hi".into(),
                preview_url: None,
            }),
        )
        .unwrap();
        msg.content = OutboundContent::Text(wacloud_schema::outbound::TextContent {
            body: "x".repeat(5000),
            preview_url: None,
        });
        let err = wa.send(&msg).await.unwrap_err();
        assert_eq!(err.code, WhatsAppErrorCode::InvalidPayload);
        assert!(wa.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_unexpected_reply_shape() {
        let wa = WaMessaging::new(MockTransport::replying(json!({ "ok": 1 })), "1065");
        let err = wa
            .send_text("16505551234", "hi", false, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, WhatsAppErrorCode::UnexpectedResponse);
    }

    #[tokio::test]
    async fn test_mark_as_read_and_typing() {
        let wa = WaMessaging::new(MockTransport::replying(json!({ "success": true })), "1065");
        assert!(wa.mark_as_read("wamid.in").await.unwrap().success);
        assert!(wa.send_typing_indicator("wamid.in").await.unwrap().success);

        let requests = wa.transport().requests();
        assert_eq!(requests[0].1["status"], "read");
        assert!(requests[0].1.get("typing_indicator").is_none());
        assert_eq!(requests[1].1["typing_indicator"], json!({ "type": "text" }));
    }
}
