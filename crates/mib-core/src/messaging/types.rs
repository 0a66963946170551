use serde_json::Value;

use crate::domain::{ChatId, ChatKind, MessageRef, UserId};

/// A message (new, edited, or channel post) as the core needs it.
#[derive(Clone, Debug)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub chat_kind: ChatKind,
    pub user_id: Option<UserId>,
    /// `sender_chat` of the message: the channel itself for channel posts, the
    /// group for anonymous admins, or a linked channel.
    pub sender_chat_id: Option<ChatId>,
    pub text: Option<String>,
    /// The whole update exactly as the Bot API delivered it.
    pub update: Value,
}

impl IncomingMessage {
    /// Posted in the name of the chat itself. Only the chat's admins can do that.
    pub fn posted_as_chat(&self) -> bool {
        self.sender_chat_id == Some(self.chat_id)
    }
}

#[derive(Clone, Debug)]
pub struct IncomingCallback {
    pub callback_id: String,
    pub user_id: UserId,
    /// Chat of the message carrying the keyboard, when still accessible.
    pub chat_id: Option<ChatId>,
    pub chat_kind: ChatKind,
    pub message: Option<MessageRef>,
    pub data: Option<String>,
}

/// Capabilities of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub supports_edit: bool,
    pub max_message_len: usize,
}
