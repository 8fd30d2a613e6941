//! Chat transport collaborator
//!
//! Matches talk to players only through [`ChatTransport`] (outbound) and the
//! [`MessageBus`] (inbound).

pub mod bus;
pub mod client;
pub mod conversation;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use bus::{MessageBus, Registration};
pub use client::HttpChatClient;
pub use conversation::{Conversation, Elicit};

/// An inbound chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    pub author_id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub mentions: Vec<String>,
}

/// Quote of an earlier message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub id: String,
    pub mention: bool,
}

/// An outbound chat message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Reply>,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Quotes `message_id` without pinging its author
    pub fn replying_to(mut self, message_id: &str) -> Self {
        self.replies.push(Reply {
            id: message_id.to_string(),
            mention: false,
        });
        self
    }

    pub fn with_attachment(mut self, attachment: Option<String>) -> Self {
        self.attachments.extend(attachment);
        self
    }
}

impl From<&str> for OutgoingMessage {
    fn from(content: &str) -> Self {
        OutgoingMessage::text(content)
    }
}

impl From<String> for OutgoingMessage {
    fn from(content: String) -> Self {
        OutgoingMessage::text(content)
    }
}

/// Formats a user mention
pub fn mention(user_id: &str) -> String {
    format!("<@{}>", user_id)
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, channel_id: &str, message: OutgoingMessage) -> Result<()>;

    /// Uploads a file and returns a reference usable in `attachments`
    async fn upload_attachment(
        &self,
        contents: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outgoing_serialization_skips_empty_fields() {
        let json = serde_json::to_value(OutgoingMessage::text("hi")).unwrap();
        assert_eq!(json, serde_json::json!({ "content": "hi" }));

        let json = serde_json::to_value(
            OutgoingMessage::text("board")
                .replying_to("m1")
                .with_attachment(Some("a1".into())),
        )
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "content": "board",
                "attachments": ["a1"],
                "replies": [{ "id": "m1", "mention": false }]
            })
        );
    }

    #[test]
    fn test_inbound_defaults() {
        let msg: Message =
            serde_json::from_str(r#"{"id":"1","channel_id":"c","author_id":"u"}"#).unwrap();
        assert_eq!(msg.content, None);
        assert!(msg.mentions.is_empty());
    }
}
