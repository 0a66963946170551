//! Callback-data tags used by inline keyboards.
//!
//! Raw callback strings are decoded once into [`CallbackAction`]; everything
//! past the adapter boundary matches on the enum.

use std::fmt;

use crate::prefs::{DisplayMode, MessageType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrivacyToggle {
    UserIds,
    ChatIds,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterAction {
    Type(MessageType),
    All,
    Save,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserPrefsAction {
    Toggle,
    View,
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminAction {
    Toggle,
    Export,
    Reset,
    UserPrefs,
    Filters,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    View(DisplayMode),
    ToggleForward,
    ToggleAuthor,
    Privacy(PrivacyToggle),
    Filter(FilterAction),
    UserPrefs(UserPrefsAction),
    Admin(AdminAction),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        let (group, arg) = data.split_once('_')?;
        let action = match (group, arg) {
            ("view", mode) => Self::View(DisplayMode::parse(mode)?),
            ("toggle", "forward") => Self::ToggleForward,
            ("toggle", "author") => Self::ToggleAuthor,
            ("privacy", "user_ids") => Self::Privacy(PrivacyToggle::UserIds),
            ("privacy", "chat_ids") => Self::Privacy(PrivacyToggle::ChatIds),
            ("filter", "all") => Self::Filter(FilterAction::All),
            ("filter", "save") => Self::Filter(FilterAction::Save),
            ("filter", ty) => Self::Filter(FilterAction::Type(MessageType::parse(ty)?)),
            ("userprefs", "toggle") => Self::UserPrefs(UserPrefsAction::Toggle),
            ("userprefs", "view") => Self::UserPrefs(UserPrefsAction::View),
            ("userprefs", "reset") => Self::UserPrefs(UserPrefsAction::Reset),
            ("admin", "toggle") => Self::Admin(AdminAction::Toggle),
            ("admin", "export") => Self::Admin(AdminAction::Export),
            ("admin", "reset") => Self::Admin(AdminAction::Reset),
            ("admin", "userprefs") => Self::Admin(AdminAction::UserPrefs),
            ("admin", "filters") => Self::Admin(AdminAction::Filters),
            _ => return None,
        };
        Some(action)
    }

    pub fn as_data(&self) -> String {
        match self {
            Self::View(mode) => format!("view_{}", mode.as_str()),
            Self::ToggleForward => "toggle_forward".to_string(),
            Self::ToggleAuthor => "toggle_author".to_string(),
            Self::Privacy(PrivacyToggle::UserIds) => "privacy_user_ids".to_string(),
            Self::Privacy(PrivacyToggle::ChatIds) => "privacy_chat_ids".to_string(),
            Self::Filter(FilterAction::Type(ty)) => format!("filter_{}", ty.as_str()),
            Self::Filter(FilterAction::All) => "filter_all".to_string(),
            Self::Filter(FilterAction::Save) => "filter_save".to_string(),
            Self::UserPrefs(a) => format!(
                "userprefs_{}",
                match a {
                    UserPrefsAction::Toggle => "toggle",
                    UserPrefsAction::View => "view",
                    UserPrefsAction::Reset => "reset",
                }
            ),
            Self::Admin(a) => format!(
                "admin_{}",
                match a {
                    AdminAction::Toggle => "toggle",
                    AdminAction::Export => "export",
                    AdminAction::Reset => "reset",
                    AdminAction::UserPrefs => "userprefs",
                    AdminAction::Filters => "filters",
                }
            ),
        }
    }

    /// Whether the action edits the caller's view (group view or own override).
    pub fn edits_view(&self) -> bool {
        matches!(
            self,
            Self::View(_) | Self::ToggleForward | Self::ToggleAuthor | Self::Privacy(_)
        )
    }

    /// Whether applying this changes chat-wide state, given the chat's
    /// per-user mode. Such actions need admin rights outside private chats.
    pub fn changes_chat_settings(&self, per_user_mode: bool) -> bool {
        match self {
            Self::Admin(_) | Self::Filter(_) => true,
            Self::UserPrefs(UserPrefsAction::Toggle) => true,
            Self::UserPrefs(_) => false,
            _ => !per_user_mode,
        }
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_data())
    }
}
