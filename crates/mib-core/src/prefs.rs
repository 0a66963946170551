//! Per-chat and per-user display preferences.
//!
//! `SessionData` is the stored record for one chat. Records read back from
//! storage (or imported) may be incomplete, so every load goes through
//! [`ensure_complete_session`], which merges a [`PartialSession`] against the
//! defaults for the chat kind.

use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ChatKind, UserId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Compact,
    Full,
    Raw,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 3] = [Self::Compact, Self::Full, Self::Raw];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Full => "full",
            Self::Raw => "raw",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Compact => "Compact",
            Self::Full => "Full",
            Self::Raw => "Raw JSON",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyOptions {
    pub mask_user_ids: bool,
    pub mask_phone_numbers: bool,
    pub mask_chat_ids: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPreferences {
    pub display_mode: DisplayMode,
    pub show_forward_info: bool,
    pub show_author_info: bool,
    pub privacy_options: PrivacyOptions,
}

/// Closed set of message kinds a chat can filter on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Photo,
    Video,
    Document,
    Audio,
    Sticker,
    Animation,
    Voice,
    Poll,
    Location,
    Contact,
    Forward,
}

impl MessageType {
    pub const ALL: [MessageType; 12] = [
        Self::Text,
        Self::Photo,
        Self::Video,
        Self::Document,
        Self::Audio,
        Self::Sticker,
        Self::Animation,
        Self::Voice,
        Self::Poll,
        Self::Location,
        Self::Contact,
        Self::Forward,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Document => "document",
            Self::Audio => "audio",
            Self::Sticker => "sticker",
            Self::Animation => "animation",
            Self::Voice => "voice",
            Self::Poll => "poll",
            Self::Location => "location",
            Self::Contact => "contact",
            Self::Forward => "forward",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Photo => "Photo",
            Self::Video => "Video",
            Self::Document => "Document",
            Self::Audio => "Audio",
            Self::Sticker => "Sticker",
            Self::Animation => "Animation",
            Self::Voice => "Voice",
            Self::Poll => "Poll",
            Self::Location => "Location",
            Self::Contact => "Contact",
            Self::Forward => "Forward",
        }
    }
}

/// Which message types the bot answers in a chat.
///
/// While `respond_to_all` is set, `enabled_types` is kept but not consulted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageFilters {
    pub enabled_types: BTreeMap<MessageType, bool>,
    pub respond_to_all: bool,
}

impl MessageFilters {
    pub fn is_type_enabled(&self, ty: MessageType) -> bool {
        self.enabled_types.get(&ty).copied().unwrap_or(true)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub view_preferences: ViewPreferences,
}

/// Stored per-chat record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub enabled: bool,
    pub view_preferences: ViewPreferences,
    pub message_filters: MessageFilters,
    pub use_per_user_preferences: bool,
    /// Sparse: only users who diverged from the group defaults.
    pub user_preferences: BTreeMap<i64, UserPreferences>,
}

// ============== Defaults ==============

pub fn default_message_filters() -> MessageFilters {
    MessageFilters {
        enabled_types: MessageType::ALL.into_iter().map(|t| (t, true)).collect(),
        respond_to_all: true,
    }
}

pub fn default_view_preferences(is_group: bool) -> ViewPreferences {
    ViewPreferences {
        display_mode: if is_group {
            DisplayMode::Raw
        } else {
            DisplayMode::Compact
        },
        show_forward_info: true,
        show_author_info: true,
        privacy_options: PrivacyOptions {
            mask_user_ids: false,
            mask_phone_numbers: true,
            mask_chat_ids: false,
        },
    }
}

/// Fresh record for a chat. The bot is opt-in everywhere except private chats.
pub fn default_session(kind: ChatKind) -> SessionData {
    SessionData {
        enabled: kind.is_private(),
        view_preferences: default_view_preferences(kind.is_group_like()),
        message_filters: default_message_filters(),
        use_per_user_preferences: false,
        user_preferences: BTreeMap::new(),
    }
}

// ============== Partial shapes ==============

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialPrivacyOptions {
    pub mask_user_ids: Option<bool>,
    pub mask_phone_numbers: Option<bool>,
    pub mask_chat_ids: Option<bool>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialViewPreferences {
    pub display_mode: Option<DisplayMode>,
    pub show_forward_info: Option<bool>,
    pub show_author_info: Option<bool>,
    pub privacy_options: Option<PartialPrivacyOptions>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialMessageFilters {
    pub enabled_types: Option<BTreeMap<MessageType, bool>>,
    pub respond_to_all: Option<bool>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialUserPreferences {
    pub view_preferences: Option<PartialViewPreferences>,
}

/// A possibly incomplete `SessionData`, as found in older or hand-edited records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialSession {
    pub enabled: Option<bool>,
    pub view_preferences: Option<PartialViewPreferences>,
    pub message_filters: Option<PartialMessageFilters>,
    pub use_per_user_preferences: Option<bool>,
    pub user_preferences: Option<BTreeMap<i64, PartialUserPreferences>>,
}

impl From<&PrivacyOptions> for PartialPrivacyOptions {
    fn from(p: &PrivacyOptions) -> Self {
        Self {
            mask_user_ids: Some(p.mask_user_ids),
            mask_phone_numbers: Some(p.mask_phone_numbers),
            mask_chat_ids: Some(p.mask_chat_ids),
        }
    }
}

impl From<&ViewPreferences> for PartialViewPreferences {
    fn from(v: &ViewPreferences) -> Self {
        Self {
            display_mode: Some(v.display_mode),
            show_forward_info: Some(v.show_forward_info),
            show_author_info: Some(v.show_author_info),
            privacy_options: Some((&v.privacy_options).into()),
        }
    }
}

impl From<&MessageFilters> for PartialMessageFilters {
    fn from(f: &MessageFilters) -> Self {
        Self {
            enabled_types: Some(f.enabled_types.clone()),
            respond_to_all: Some(f.respond_to_all),
        }
    }
}

impl From<&SessionData> for PartialSession {
    fn from(s: &SessionData) -> Self {
        Self {
            enabled: Some(s.enabled),
            view_preferences: Some((&s.view_preferences).into()),
            message_filters: Some((&s.message_filters).into()),
            use_per_user_preferences: Some(s.use_per_user_preferences),
            user_preferences: Some(
                s.user_preferences
                    .iter()
                    .map(|(id, u)| {
                        (
                            *id,
                            PartialUserPreferences {
                                view_preferences: Some((&u.view_preferences).into()),
                            },
                        )
                    })
                    .collect(),
            ),
        }
    }
}

// ============== Lenient reading ==============

impl PartialSession {
    /// Read a stored record field by field.
    ///
    /// Values of the wrong shape are skipped and their paths returned, so one
    /// bad field never costs the rest of the record. `null` counts as absent.
    pub fn from_value_lenient(v: &Value) -> (Self, Vec<String>) {
        let mut dropped = Vec::new();
        let partial = Self {
            enabled: field(v, "enabled", "", &mut dropped),
            view_preferences: v
                .get("viewPreferences")
                .filter(|x| !x.is_null())
                .and_then(|x| lenient_view(x, "viewPreferences", &mut dropped)),
            message_filters: v
                .get("messageFilters")
                .filter(|x| !x.is_null())
                .and_then(|x| lenient_filters(x, "messageFilters", &mut dropped)),
            use_per_user_preferences: field(v, "usePerUserPreferences", "", &mut dropped),
            user_preferences: v
                .get("userPreferences")
                .filter(|x| !x.is_null())
                .and_then(|x| lenient_users(x, "userPreferences", &mut dropped)),
        };
        (partial, dropped)
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn field<T: DeserializeOwned>(obj: &Value, key: &str, path: &str, dropped: &mut Vec<String>) -> Option<T> {
    let raw = obj.get(key).filter(|x| !x.is_null())?;
    match T::deserialize(raw) {
        Ok(v) => Some(v),
        Err(_) => {
            dropped.push(join(path, key));
            None
        }
    }
}

fn lenient_privacy(v: &Value, path: &str, dropped: &mut Vec<String>) -> Option<PartialPrivacyOptions> {
    if !v.is_object() {
        dropped.push(path.to_string());
        return None;
    }
    Some(PartialPrivacyOptions {
        mask_user_ids: field(v, "maskUserIds", path, dropped),
        mask_phone_numbers: field(v, "maskPhoneNumbers", path, dropped),
        mask_chat_ids: field(v, "maskChatIds", path, dropped),
    })
}

fn lenient_view(v: &Value, path: &str, dropped: &mut Vec<String>) -> Option<PartialViewPreferences> {
    if !v.is_object() {
        dropped.push(path.to_string());
        return None;
    }
    let privacy_path = join(path, "privacyOptions");
    Some(PartialViewPreferences {
        display_mode: field(v, "displayMode", path, dropped),
        show_forward_info: field(v, "showForwardInfo", path, dropped),
        show_author_info: field(v, "showAuthorInfo", path, dropped),
        privacy_options: v
            .get("privacyOptions")
            .filter(|x| !x.is_null())
            .and_then(|x| lenient_privacy(x, &privacy_path, dropped)),
    })
}

fn lenient_filters(v: &Value, path: &str, dropped: &mut Vec<String>) -> Option<PartialMessageFilters> {
    if !v.is_object() {
        dropped.push(path.to_string());
        return None;
    }
    let types_path = join(path, "enabledTypes");
    let enabled_types = match v.get("enabledTypes").filter(|x| !x.is_null()) {
        None => None,
        Some(Value::Object(map)) => {
            let mut types = BTreeMap::new();
            for (key, raw) in map {
                match (MessageType::parse(key), raw.as_bool()) {
                    (Some(ty), Some(on)) => {
                        types.insert(ty, on);
                    }
                    _ => dropped.push(join(&types_path, key)),
                }
            }
            Some(types)
        }
        Some(_) => {
            dropped.push(types_path);
            None
        }
    };
    Some(PartialMessageFilters {
        enabled_types,
        respond_to_all: field(v, "respondToAll", path, dropped),
    })
}

fn lenient_users(
    v: &Value,
    path: &str,
    dropped: &mut Vec<String>,
) -> Option<BTreeMap<i64, PartialUserPreferences>> {
    let Some(map) = v.as_object() else {
        dropped.push(path.to_string());
        return None;
    };
    let mut users = BTreeMap::new();
    for (key, raw) in map {
        let user_path = join(path, key);
        let (Ok(id), true) = (key.parse::<i64>(), raw.is_object()) else {
            dropped.push(user_path);
            continue;
        };
        let view_path = join(&user_path, "viewPreferences");
        let view_preferences = raw
            .get("viewPreferences")
            .filter(|x| !x.is_null())
            .and_then(|x| lenient_view(x, &view_path, dropped));
        users.insert(id, PartialUserPreferences { view_preferences });
    }
    Some(users)
}

// ============== Resolver ==============

fn complete_privacy(partial: Option<&PartialPrivacyOptions>, base: PrivacyOptions) -> PrivacyOptions {
    let Some(p) = partial else {
        return base;
    };
    PrivacyOptions {
        mask_user_ids: p.mask_user_ids.unwrap_or(base.mask_user_ids),
        mask_phone_numbers: p.mask_phone_numbers.unwrap_or(base.mask_phone_numbers),
        mask_chat_ids: p.mask_chat_ids.unwrap_or(base.mask_chat_ids),
    }
}

pub fn complete_view_preferences(
    partial: Option<&PartialViewPreferences>,
    base: ViewPreferences,
) -> ViewPreferences {
    let Some(p) = partial else {
        return base;
    };
    ViewPreferences {
        display_mode: p.display_mode.unwrap_or(base.display_mode),
        show_forward_info: p.show_forward_info.unwrap_or(base.show_forward_info),
        show_author_info: p.show_author_info.unwrap_or(base.show_author_info),
        privacy_options: complete_privacy(p.privacy_options.as_ref(), base.privacy_options),
    }
}

pub fn complete_message_filters(partial: Option<&PartialMessageFilters>) -> MessageFilters {
    let mut filters = default_message_filters();
    let Some(p) = partial else {
        return filters;
    };
    if let Some(types) = &p.enabled_types {
        for (ty, enabled) in types {
            filters.enabled_types.insert(*ty, *enabled);
        }
    }
    if let Some(all) = p.respond_to_all {
        filters.respond_to_all = all;
    }
    filters
}

/// Fill every missing field of `partial` from the defaults for `chat_type`.
///
/// Present values win even when they are `false`. Idempotent.
pub fn ensure_complete_session(partial: &PartialSession, chat_type: Option<&str>) -> SessionData {
    ensure_complete_session_for(partial, ChatKind::parse(chat_type))
}

pub fn ensure_complete_session_for(partial: &PartialSession, kind: ChatKind) -> SessionData {
    let defaults = default_session(kind);
    let view_preferences =
        complete_view_preferences(partial.view_preferences.as_ref(), defaults.view_preferences);

    // User overrides inherit missing fields from the kind defaults, not from the
    // group's current view, so completing twice cannot drift.
    let user_preferences = partial
        .user_preferences
        .as_ref()
        .map(|users| {
            users
                .iter()
                .map(|(id, u)| {
                    (
                        *id,
                        UserPreferences {
                            view_preferences: complete_view_preferences(
                                u.view_preferences.as_ref(),
                                defaults.view_preferences,
                            ),
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    SessionData {
        enabled: partial.enabled.unwrap_or(defaults.enabled),
        view_preferences,
        message_filters: complete_message_filters(partial.message_filters.as_ref()),
        use_per_user_preferences: partial
            .use_per_user_preferences
            .unwrap_or(defaults.use_per_user_preferences),
        user_preferences,
    }
}

/// Preferences that apply to `user_id` in this chat. Pure read.
pub fn effective_preferences(session: &SessionData, user_id: Option<UserId>) -> &ViewPreferences {
    if !session.use_per_user_preferences {
        return &session.view_preferences;
    }
    let Some(user_id) = user_id else {
        return &session.view_preferences;
    };
    session
        .user_preferences
        .get(&user_id.0)
        .map(|u| &u.view_preferences)
        .unwrap_or(&session.view_preferences)
}

/// Preferences a settings change by `user_id` should edit.
///
/// In per-user mode the caller's entry is created from the group view on first
/// divergence; otherwise the group view itself is returned.
pub fn preferences_for_update(
    session: &mut SessionData,
    user_id: Option<UserId>,
) -> &mut ViewPreferences {
    match user_id {
        Some(user_id) if session.use_per_user_preferences => {
            let group = session.view_preferences;
            &mut session
                .user_preferences
                .entry(user_id.0)
                .or_insert(UserPreferences {
                    view_preferences: group,
                })
                .view_preferences
        }
        _ => &mut session.view_preferences,
    }
}

/// Drop the caller's override. Returns whether one existed.
pub fn reset_user_preferences(session: &mut SessionData, user_id: UserId) -> bool {
    session.user_preferences.remove(&user_id.0).is_some()
}

/// Whether a message of type `ty` should be answered.
///
/// Deny only on an explicit `false`: missing filters, `respond_to_all`, or a
/// missing entry all let the message through.
pub fn should_process_message_type(filters: Option<&MessageFilters>, ty: MessageType) -> bool {
    let Some(filters) = filters else {
        return true;
    };
    if filters.respond_to_all {
        return true;
    }
    filters.is_type_enabled(ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_partials() -> Vec<PartialSession> {
        let mut types = BTreeMap::new();
        types.insert(MessageType::Photo, false);

        let mut users = BTreeMap::new();
        users.insert(
            7,
            PartialUserPreferences {
                view_preferences: Some(PartialViewPreferences {
                    display_mode: Some(DisplayMode::Full),
                    ..Default::default()
                }),
            },
        );
        users.insert(8, PartialUserPreferences::default());

        vec![
            PartialSession::default(),
            PartialSession {
                enabled: Some(false),
                ..Default::default()
            },
            PartialSession {
                view_preferences: Some(PartialViewPreferences {
                    show_author_info: Some(false),
                    privacy_options: Some(PartialPrivacyOptions {
                        mask_chat_ids: Some(true),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                message_filters: Some(PartialMessageFilters {
                    enabled_types: Some(types),
                    respond_to_all: Some(false),
                }),
                ..Default::default()
            },
            PartialSession {
                use_per_user_preferences: Some(true),
                user_preferences: Some(users),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn default_filters_enable_everything() {
        let f = default_message_filters();
        assert!(f.respond_to_all);
        assert_eq!(f.enabled_types.len(), 12);
        assert!(f.enabled_types.values().all(|v| *v));
    }

    #[test]
    fn default_view_depends_on_group() {
        assert_eq!(default_view_preferences(true).display_mode, DisplayMode::Raw);
        let private = default_view_preferences(false);
        assert_eq!(private.display_mode, DisplayMode::Compact);
        assert!(private.show_forward_info);
        assert!(private.show_author_info);
        assert!(private.privacy_options.mask_phone_numbers);
        assert!(!private.privacy_options.mask_user_ids);
        assert!(!private.privacy_options.mask_chat_ids);
    }

    #[test]
    fn private_chat_starts_enabled_in_compact_mode() {
        let s = ensure_complete_session(&PartialSession::default(), Some("private"));
        assert!(s.enabled);
        assert_eq!(s.view_preferences.display_mode, DisplayMode::Compact);
    }

    #[test]
    fn supergroup_starts_disabled_in_raw_mode() {
        let s = ensure_complete_session(&PartialSession::default(), Some("supergroup"));
        assert!(!s.enabled);
        assert_eq!(s.view_preferences.display_mode, DisplayMode::Raw);
    }

    #[test]
    fn explicit_false_values_survive_completion() {
        let partial = PartialSession {
            enabled: Some(false),
            view_preferences: Some(PartialViewPreferences {
                show_forward_info: Some(false),
                privacy_options: Some(PartialPrivacyOptions {
                    mask_phone_numbers: Some(false),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        let s = ensure_complete_session(&partial, Some("private"));
        assert!(!s.enabled);
        assert!(!s.view_preferences.show_forward_info);
        assert!(s.view_preferences.show_author_info);
        assert!(!s.view_preferences.privacy_options.mask_phone_numbers);
    }

    #[test]
    fn completion_is_idempotent() {
        for chat_type in [Some("private"), Some("group"), Some("channel"), None] {
            for partial in sample_partials() {
                let once = ensure_complete_session(&partial, chat_type);
                let twice = ensure_complete_session(&PartialSession::from(&once), chat_type);
                assert_eq!(once, twice, "chat_type={chat_type:?} partial={partial:?}");
            }
        }
    }

    #[test]
    fn completion_fills_missing_filter_entries() {
        let mut types = BTreeMap::new();
        types.insert(MessageType::Voice, false);
        let partial = PartialSession {
            message_filters: Some(PartialMessageFilters {
                enabled_types: Some(types),
                respond_to_all: None,
            }),
            ..Default::default()
        };
        let s = ensure_complete_session(&partial, Some("group"));
        assert!(s.message_filters.respond_to_all);
        assert_eq!(s.message_filters.enabled_types.len(), 12);
        assert_eq!(s.message_filters.enabled_types[&MessageType::Voice], false);
        assert_eq!(s.message_filters.enabled_types[&MessageType::Text], true);
    }

    #[test]
    fn group_preferences_apply_without_per_user_mode() {
        let mut s = default_session(ChatKind::Group);
        s.user_preferences.insert(
            5,
            UserPreferences {
                view_preferences: default_view_preferences(false),
            },
        );
        assert_eq!(effective_preferences(&s, Some(UserId(5))), &s.view_preferences);
        assert_eq!(effective_preferences(&s, None), &s.view_preferences);
    }

    #[test]
    fn per_user_preferences_win_when_present() {
        let mut s = default_session(ChatKind::Group);
        s.use_per_user_preferences = true;
        let mine = ViewPreferences {
            display_mode: DisplayMode::Full,
            ..default_view_preferences(false)
        };
        s.user_preferences.insert(
            5,
            UserPreferences {
                view_preferences: mine,
            },
        );

        assert_eq!(effective_preferences(&s, Some(UserId(5))), &mine);
        assert_eq!(effective_preferences(&s, Some(UserId(6))), &s.view_preferences);
        assert_eq!(effective_preferences(&s, None), &s.view_preferences);
        // Pure read.
        assert_eq!(s.user_preferences.len(), 1);
    }

    #[test]
    fn updates_diverge_lazily_in_per_user_mode() {
        let mut s = default_session(ChatKind::Supergroup);
        preferences_for_update(&mut s, Some(UserId(1))).show_author_info = false;
        assert!(!s.view_preferences.show_author_info);
        assert!(s.user_preferences.is_empty());

        s.view_preferences.show_author_info = true;
        s.use_per_user_preferences = true;
        preferences_for_update(&mut s, Some(UserId(1))).display_mode = DisplayMode::Compact;
        assert_eq!(s.view_preferences.display_mode, DisplayMode::Raw);
        assert_eq!(
            s.user_preferences[&1].view_preferences.display_mode,
            DisplayMode::Compact
        );

        assert!(reset_user_preferences(&mut s, UserId(1)));
        assert!(!reset_user_preferences(&mut s, UserId(1)));
    }

    #[test]
    fn filter_is_deny_by_explicit_false_only() {
        assert!(should_process_message_type(None, MessageType::Photo));

        let mut f = default_message_filters();
        f.enabled_types.insert(MessageType::Photo, false);
        assert!(should_process_message_type(Some(&f), MessageType::Photo));

        f.respond_to_all = false;
        assert!(!should_process_message_type(Some(&f), MessageType::Photo));
        assert!(should_process_message_type(Some(&f), MessageType::Text));

        f.enabled_types.remove(&MessageType::Text);
        assert!(should_process_message_type(Some(&f), MessageType::Text));
    }

    #[test]
    fn session_json_uses_camel_case_shape() {
        let mut s = default_session(ChatKind::Private);
        s.use_per_user_preferences = true;
        s.user_preferences.insert(
            42,
            UserPreferences {
                view_preferences: s.view_preferences,
            },
        );
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["viewPreferences"]["displayMode"], "compact");
        assert_eq!(v["viewPreferences"]["privacyOptions"]["maskPhoneNumbers"], true);
        assert_eq!(v["messageFilters"]["enabledTypes"]["forward"], true);
        assert_eq!(v["messageFilters"]["respondToAll"], true);
        assert_eq!(v["usePerUserPreferences"], true);
        assert!(v["userPreferences"]["42"]["viewPreferences"].is_object());

        let back: SessionData = serde_json::from_value(v).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn partial_session_tolerates_missing_fields() {
        let partial: PartialSession =
            serde_json::from_str(r#"{"viewPreferences":{"displayMode":"full"}}"#).unwrap();
        let s = ensure_complete_session(&partial, Some("group"));
        assert_eq!(s.view_preferences.display_mode, DisplayMode::Full);
        assert!(!s.enabled);
    }

    #[test]
    fn lenient_reading_skips_only_bad_fields() {
        let raw = serde_json::json!({
            "enabled": true,
            "viewPreferences": {"displayMode": "huge", "showAuthorInfo": false, "privacyOptions": 3},
            "messageFilters": {"enabledTypes": {"gif": true, "photo": false, "text": "yes"}, "respondToAll": false},
            "usePerUserPreferences": null,
            "userPreferences": {"abc": {}, "9": {"viewPreferences": {"displayMode": "full"}}}
        });
        let (partial, mut dropped) = PartialSession::from_value_lenient(&raw);
        dropped.sort();
        assert_eq!(
            dropped,
            vec![
                "messageFilters.enabledTypes.gif",
                "messageFilters.enabledTypes.text",
                "userPreferences.abc",
                "viewPreferences.displayMode",
                "viewPreferences.privacyOptions",
            ]
        );

        let s = ensure_complete_session_for(&partial, ChatKind::Group);
        assert!(s.enabled);
        assert_eq!(s.view_preferences.display_mode, DisplayMode::Raw);
        assert!(!s.view_preferences.show_author_info);
        assert!(!s.message_filters.respond_to_all);
        assert!(!s.message_filters.is_type_enabled(MessageType::Photo));
        assert!(s.message_filters.is_type_enabled(MessageType::Text));
        assert!(!s.use_per_user_preferences);
        assert_eq!(s.user_preferences[&9].view_preferences.display_mode, DisplayMode::Full);
        assert_eq!(s.user_preferences.len(), 1);
    }

    #[test]
    fn lenient_reading_matches_strict_on_valid_records() {
        for partial in sample_partials() {
            let raw = serde_json::to_value(&partial).unwrap();
            let (lenient, dropped) = PartialSession::from_value_lenient(&raw);
            assert!(dropped.is_empty(), "{dropped:?}");
            assert_eq!(lenient, partial);
        }
    }
}
