//! Read-only view over an incoming update's JSON.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    domain::{ChatId, UserId},
    origin::{full_name, ForwardOrigin},
    prefs::MessageType,
};

const MESSAGE_KEYS: [&str; 4] = [
    "message",
    "edited_message",
    "channel_post",
    "edited_channel_post",
];

/// Sender of a message (`from`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Author {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
}

impl Author {
    pub fn user_id(&self) -> UserId {
        UserId(self.id)
    }

    pub fn full_name(&self) -> String {
        full_name(&self.first_name, self.last_name.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageInfo {
    pub message_id: i64,
    pub chat_id: ChatId,
    pub chat_type: Option<String>,
    pub author: Option<Author>,
    /// `text`, or `caption` for media.
    pub text: Option<String>,
    pub forward_origin: Option<ForwardOrigin>,
    pub message_type: MessageType,
}

impl MessageInfo {
    /// Extract from an update (or a bare message). `None` when no message with a
    /// chat can be found.
    pub fn from_json(update: &Value) -> Option<Self> {
        let msg = message_of(update);
        let chat = msg.get("chat")?;
        let chat_id = chat.get("id").and_then(Value::as_i64)?;

        let author = msg
            .get("from")
            .filter(|v| v.is_object())
            .and_then(|v| Author::deserialize(v).ok());

        let text = msg
            .get("text")
            .or_else(|| msg.get("caption"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let forward_origin = msg.get("forward_origin").and_then(ForwardOrigin::from_value);

        Some(Self {
            message_id: msg.get("message_id").and_then(Value::as_i64).unwrap_or_default(),
            chat_id: ChatId(chat_id),
            chat_type: chat.get("type").and_then(Value::as_str).map(str::to_string),
            author,
            text,
            message_type: classify(msg, forward_origin.is_some()),
            forward_origin,
        })
    }
}

/// The message object inside an update, or the value itself.
pub fn message_of(update: &Value) -> &Value {
    MESSAGE_KEYS
        .iter()
        .find_map(|k| update.get(*k).filter(|v| v.is_object()))
        .unwrap_or(update)
}

// Animations also carry a `document` field, so they are checked first.
const CLASSIFY_ORDER: [MessageType; 11] = [
    MessageType::Animation,
    MessageType::Text,
    MessageType::Photo,
    MessageType::Video,
    MessageType::Document,
    MessageType::Audio,
    MessageType::Sticker,
    MessageType::Voice,
    MessageType::Poll,
    MessageType::Location,
    MessageType::Contact,
];

/// Message type used for filter gating. Forwards are gated as forwards first;
/// unrecognized content falls under the text filter.
pub fn classify(msg: &Value, is_forward: bool) -> MessageType {
    if is_forward {
        return MessageType::Forward;
    }
    CLASSIFY_ORDER
        .into_iter()
        .find(|t| has_field(msg, t.as_str()))
        .unwrap_or(MessageType::Text)
}

/// Label for the compact summary. Checks text, photo, video, document and
/// sticker in that order.
pub fn summary_label(msg: &Value) -> &'static str {
    [
        MessageType::Text,
        MessageType::Photo,
        MessageType::Video,
        MessageType::Document,
        MessageType::Sticker,
    ]
    .into_iter()
    .find(|t| has_field(msg, t.as_str()))
    .map(|t| t.label())
    .unwrap_or("Other")
}

fn has_field(msg: &Value, key: &str) -> bool {
    msg.get(key).is_some_and(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_fields_from_update() {
        let update = json!({
            "update_id": 1,
            "message": {
                "message_id": 10,
                "date": 1700000000,
                "chat": {"id": 555, "type": "private", "first_name": "Ada"},
                "from": {"id": 555, "is_bot": false, "first_name": "Ada", "username": "ada"},
                "text": "hello"
            }
        });
        let info = MessageInfo::from_json(&update).unwrap();
        assert_eq!(info.message_id, 10);
        assert_eq!(info.chat_id, ChatId(555));
        assert_eq!(info.chat_type.as_deref(), Some("private"));
        assert_eq!(info.author.as_ref().map(|a| a.user_id()), Some(UserId(555)));
        assert_eq!(info.text.as_deref(), Some("hello"));
        assert_eq!(info.message_type, MessageType::Text);
        assert!(info.forward_origin.is_none());
    }

    #[test]
    fn finds_channel_posts_and_captions() {
        let update = json!({
            "update_id": 2,
            "channel_post": {
                "message_id": 3,
                "chat": {"id": -100200300400i64, "type": "channel", "title": "C"},
                "photo": [{"file_id": "x", "file_unique_id": "y", "width": 1, "height": 1}],
                "caption": "look"
            }
        });
        let info = MessageInfo::from_json(&update).unwrap();
        assert!(info.author.is_none());
        assert_eq!(info.text.as_deref(), Some("look"));
        assert_eq!(info.message_type, MessageType::Photo);
    }

    #[test]
    fn forwards_are_classified_as_forward() {
        let msg = json!({
            "message_id": 1,
            "chat": {"id": 1, "type": "private"},
            "text": "fwd",
            "forward_origin": {"type": "hidden_user", "date": 1, "sender_user_name": "X"}
        });
        let info = MessageInfo::from_json(&msg).unwrap();
        assert_eq!(info.message_type, MessageType::Forward);
        assert!(info.forward_origin.unwrap().is_hidden_user());
    }

    #[test]
    fn classifies_media_kinds() {
        assert_eq!(classify(&json!({"voice": {}}), false), MessageType::Voice);
        assert_eq!(classify(&json!({"poll": {}}), false), MessageType::Poll);
        assert_eq!(classify(&json!({"contact": {}}), false), MessageType::Contact);
        assert_eq!(classify(&json!({"dice": {}}), false), MessageType::Text);
        assert_eq!(
            classify(&json!({"animation": {}, "document": {}}), false),
            MessageType::Animation
        );
    }

    #[test]
    fn summary_label_checks_in_order() {
        assert_eq!(summary_label(&json!({"text": "x"})), "Text");
        assert_eq!(summary_label(&json!({"sticker": {}})), "Sticker");
        assert_eq!(summary_label(&json!({"document": {}, "video": {}})), "Video");
        assert_eq!(summary_label(&json!({"voice": {}})), "Other");
    }

    #[test]
    fn update_without_chat_is_rejected() {
        assert!(MessageInfo::from_json(&json!({"update_id": 1, "poll": {}})).is_none());
    }
}
