//! Raw update routing.
//!
//! Each update is read straight from the Bot API JSON into the core's incoming
//! types and handed to the `InfoBot`, which does its own error reporting. The
//! update itself travels along untouched.

use std::sync::Arc;

use serde_json::Value;

use mib_core::{
    domain::{ChatId, ChatKind, MessageId, MessageRef, UserId},
    messaging::types::{IncomingCallback, IncomingMessage},
};

use crate::router::AppState;

/// Which optional update kinds the bot inspects.
#[derive(Clone, Copy, Debug)]
pub struct UpdateKinds {
    pub edited_messages: bool,
    pub channel_posts: bool,
}

impl UpdateKinds {
    /// The `allowed_updates` list for `getUpdates`.
    pub fn allowed_updates(&self) -> Vec<&'static str> {
        let mut kinds = vec!["message", "callback_query"];
        if self.edited_messages {
            kinds.push("edited_message");
        }
        if self.channel_posts {
            kinds.extend(["channel_post", "edited_channel_post"]);
        }
        kinds
    }

    fn accepts(&self, key: &str) -> bool {
        match key {
            "edited_message" => self.edited_messages,
            "channel_post" | "edited_channel_post" => self.channel_posts,
            _ => true,
        }
    }
}

#[derive(Debug)]
pub enum Routed {
    Message(IncomingMessage),
    Callback(IncomingCallback),
}

/// (key, edited) for every update kind that carries a message.
const MESSAGE_KEYS: [(&str, bool); 4] = [
    ("message", false),
    ("edited_message", true),
    ("channel_post", false),
    ("edited_channel_post", true),
];

pub async fn dispatch(state: Arc<AppState>, update: Value) {
    let update_id = update.get("update_id").and_then(Value::as_i64);
    match route(update, state.kinds) {
        Some(Routed::Message(msg)) => state.bot.handle_message(msg).await,
        Some(Routed::Callback(cb)) => state.bot.handle_callback(cb).await,
        None => tracing::debug!(update_id, "ignoring update"),
    }
}

pub fn route(update: Value, kinds: UpdateKinds) -> Option<Routed> {
    if let Some(q) = update.get("callback_query") {
        return incoming_callback(q).map(Routed::Callback);
    }
    let (key, edited) = MESSAGE_KEYS
        .into_iter()
        .find(|(key, _)| update.get(key).is_some())?;
    if !kinds.accepts(key) {
        return None;
    }
    incoming_message(update, key, edited).map(Routed::Message)
}

/// Chat an update belongs to, so one chat's updates can be handled in order.
pub fn chat_key(update: &Value) -> Option<i64> {
    if let Some(q) = update.get("callback_query") {
        return q
            .pointer("/message/chat/id")
            .or_else(|| q.pointer("/from/id"))
            .and_then(Value::as_i64);
    }
    MESSAGE_KEYS
        .iter()
        .find_map(|(key, _)| update.get(key))
        .and_then(|m| m.pointer("/chat/id"))
        .and_then(Value::as_i64)
}

/// Edited messages and edited channel posts are reported, never re-run as commands.
fn incoming_message(update: Value, key: &str, edited: bool) -> Option<IncomingMessage> {
    let msg = &update[key];
    let Some(chat_id) = msg.pointer("/chat/id").and_then(Value::as_i64) else {
        tracing::warn!(kind = key, "message without chat id");
        return None;
    };
    let chat_kind = ChatKind::parse(msg.pointer("/chat/type").and_then(Value::as_str));
    let user_id = msg.pointer("/from/id").and_then(Value::as_i64).map(UserId);
    let sender_chat_id = msg.pointer("/sender_chat/id").and_then(Value::as_i64).map(ChatId);
    let text = if edited {
        None
    } else {
        msg.get("text").and_then(Value::as_str).map(str::to_string)
    };

    Some(IncomingMessage {
        chat_id: ChatId(chat_id),
        chat_kind,
        user_id,
        sender_chat_id,
        text,
        update,
    })
}

fn incoming_callback(q: &Value) -> Option<IncomingCallback> {
    let Some(callback_id) = q.get("id").and_then(Value::as_str) else {
        tracing::warn!("callback query without id");
        return None;
    };
    let user_id = UserId(q.pointer("/from/id").and_then(Value::as_i64)?);
    let chat_id = q.pointer("/message/chat/id").and_then(Value::as_i64).map(ChatId);
    let message_id = q
        .pointer("/message/message_id")
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
        .map(MessageId);

    Some(IncomingCallback {
        callback_id: callback_id.to_string(),
        user_id,
        chat_id,
        chat_kind: ChatKind::parse(q.pointer("/message/chat/type").and_then(Value::as_str)),
        message: chat_id
            .zip(message_id)
            .map(|(chat_id, message_id)| MessageRef { chat_id, message_id }),
        data: q.get("data").and_then(Value::as_str).map(str::to_string),
    })
}
