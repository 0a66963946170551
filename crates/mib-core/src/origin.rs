//! Forward-origin classification.
//!
//! Telegram describes who originally sent a forwarded message with a tagged
//! object (`forward_origin.type`). The set of tags grows with the Bot API, so
//! anything outside the four known shapes lands in [`ForwardOrigin::Unknown`].

use serde::Deserialize;
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OriginUser {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl OriginUser {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, self.last_name.as_deref())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OriginChat {
    pub id: i64,
    pub title: Option<String>,
    pub username: Option<String>,
    #[serde(rename = "type")]
    pub chat_type: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OriginKind {
    User,
    HiddenUser,
    Chat,
    Channel,
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ForwardOrigin {
    User {
        date: Option<i64>,
        sender: OriginUser,
    },
    HiddenUser {
        date: Option<i64>,
        sender_name: String,
    },
    Chat {
        date: Option<i64>,
        chat: OriginChat,
        author_signature: Option<String>,
    },
    Channel {
        date: Option<i64>,
        chat: OriginChat,
        message_id: Option<i64>,
        author_signature: Option<String>,
    },
    Unknown {
        date: Option<i64>,
        tag: String,
    },
}

impl ForwardOrigin {
    /// Classify a `forward_origin` object. `None` when there is no `type` tag.
    pub fn from_value(v: &Value) -> Option<Self> {
        let tag = v.get("type")?.as_str()?;
        let date = v.get("date").and_then(Value::as_i64);
        let text = |key: &str| v.get(key).and_then(Value::as_str).map(str::to_string);

        let origin = match tag {
            "user" => Self::User {
                date,
                sender: payload(v, "sender_user"),
            },
            "hidden_user" => Self::HiddenUser {
                date,
                sender_name: text("sender_user_name").unwrap_or_default(),
            },
            "chat" => Self::Chat {
                date,
                chat: payload(v, "sender_chat"),
                author_signature: text("author_signature"),
            },
            "channel" => Self::Channel {
                date,
                chat: payload(v, "chat"),
                message_id: v.get("message_id").and_then(Value::as_i64),
                author_signature: text("author_signature"),
            },
            other => Self::Unknown {
                date,
                tag: other.to_string(),
            },
        };
        Some(origin)
    }

    pub fn kind(&self) -> OriginKind {
        match self {
            Self::User { .. } => OriginKind::User,
            Self::HiddenUser { .. } => OriginKind::HiddenUser,
            Self::Chat { .. } => OriginKind::Chat,
            Self::Channel { .. } => OriginKind::Channel,
            Self::Unknown { .. } => OriginKind::Unknown,
        }
    }

    /// The wire tag this origin was classified from.
    pub fn type_tag(&self) -> &str {
        match self {
            Self::User { .. } => "user",
            Self::HiddenUser { .. } => "hidden_user",
            Self::Chat { .. } => "chat",
            Self::Channel { .. } => "channel",
            Self::Unknown { tag, .. } => tag,
        }
    }

    pub fn date(&self) -> Option<i64> {
        match self {
            Self::User { date, .. }
            | Self::HiddenUser { date, .. }
            | Self::Chat { date, .. }
            | Self::Channel { date, .. }
            | Self::Unknown { date, .. } => *date,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    pub fn is_hidden_user(&self) -> bool {
        matches!(self, Self::HiddenUser { .. })
    }

    pub fn is_chat(&self) -> bool {
        matches!(self, Self::Chat { .. })
    }

    pub fn is_channel(&self) -> bool {
        matches!(self, Self::Channel { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }
}

fn payload<T: Default + for<'de> Deserialize<'de>>(v: &Value, key: &str) -> T {
    v.get(key)
        .and_then(|p| T::deserialize(p).ok())
        .unwrap_or_default()
}

pub(crate) fn full_name(first: &str, last: Option<&str>) -> String {
    match last.map(str::trim).filter(|s| !s.is_empty()) {
        Some(last) => format!("{first} {last}"),
        None => first.to_string(),
    }
}
