/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub i64);

/// Telegram message id within a chat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A message the bot can edit later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Kind of chat a session belongs to, parsed from Telegram's `chat.type`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
    Unknown,
}

impl ChatKind {
    pub fn parse(chat_type: Option<&str>) -> Self {
        match chat_type.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("private") => Self::Private,
            Some("group") => Self::Group,
            Some("supergroup") => Self::Supergroup,
            Some("channel") => Self::Channel,
            _ => Self::Unknown,
        }
    }

    /// Best guess when only the id is known: Telegram gives users positive ids
    /// and groups/channels negative ones.
    pub fn infer_from_id(chat_id: ChatId) -> Self {
        if chat_id.0 > 0 {
            Self::Private
        } else {
            Self::Supergroup
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Group => "group",
            Self::Supergroup => "supergroup",
            Self::Channel => "channel",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, Self::Private)
    }

    pub fn is_group_like(&self) -> bool {
        matches!(self, Self::Group | Self::Supergroup | Self::Channel)
    }
}
