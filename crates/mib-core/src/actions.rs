//! Session changes driven by inline keyboard presses.

use crate::{
    callback::{AdminAction, CallbackAction, FilterAction, PrivacyToggle, UserPrefsAction},
    codec::export_command,
    domain::{ChatKind, UserId},
    formatting::escape_html,
    keyboard::Reply,
    panels::{
        admin_panel, describe_preferences, filter_panel, filter_summary, mode_panel,
        privacy_panel, userprefs_panel,
    },
    prefs::{default_session, effective_preferences, preferences_for_update, reset_user_preferences, SessionData},
    Result,
};

/// Who pressed the button and where.
#[derive(Clone, Copy, Debug)]
pub struct ActionContext {
    pub chat_kind: ChatKind,
    pub user_id: Option<UserId>,
    pub can_manage: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackOutcome {
    /// Toast shown on the button press.
    pub notice: String,
    /// Replacement for the message carrying the keyboard.
    pub refreshed: Option<Reply>,
    /// Additional message to send into the chat.
    pub extra: Option<Reply>,
    /// Whether the session must be written back.
    pub changed: bool,
}

impl CallbackOutcome {
    fn notice(notice: impl Into<String>) -> Self {
        Self {
            notice: notice.into(),
            ..Self::default()
        }
    }

    fn changed(notice: impl Into<String>, refreshed: Reply) -> Self {
        Self {
            notice: notice.into(),
            refreshed: Some(refreshed),
            changed: true,
            ..Self::default()
        }
    }
}

pub const DENIED_NOTICE: &str = "Only chat admins can change this.";

/// Whether `action` needs admin rights in this chat.
pub fn requires_manage(action: &CallbackAction, session: &SessionData, kind: ChatKind) -> bool {
    !kind.is_private() && action.changes_chat_settings(session.use_per_user_preferences)
}

/// Apply a keyboard action to the session. Denied actions leave it untouched.
pub fn apply_callback(
    action: CallbackAction,
    session: &mut SessionData,
    ctx: &ActionContext,
) -> Result<CallbackOutcome> {
    if requires_manage(&action, session, ctx.chat_kind) && !ctx.can_manage {
        return Ok(CallbackOutcome::notice(DENIED_NOTICE));
    }

    let per_user = session.use_per_user_preferences && ctx.user_id.is_some();
    let outcome = match action {
        CallbackAction::View(mode) => {
            let prefs = preferences_for_update(session, ctx.user_id);
            prefs.display_mode = mode;
            CallbackOutcome::changed(
                format!("Mode: {}", mode.label()),
                mode_panel(prefs, per_user),
            )
        }
        CallbackAction::ToggleForward => {
            let prefs = preferences_for_update(session, ctx.user_id);
            prefs.show_forward_info = !prefs.show_forward_info;
            let notice = format!(
                "Forward info {}",
                if prefs.show_forward_info { "shown" } else { "hidden" }
            );
            CallbackOutcome::changed(notice, mode_panel(prefs, per_user))
        }
        CallbackAction::ToggleAuthor => {
            let prefs = preferences_for_update(session, ctx.user_id);
            prefs.show_author_info = !prefs.show_author_info;
            let notice = format!(
                "Author info {}",
                if prefs.show_author_info { "shown" } else { "hidden" }
            );
            CallbackOutcome::changed(notice, mode_panel(prefs, per_user))
        }
        CallbackAction::Privacy(toggle) => {
            let prefs = preferences_for_update(session, ctx.user_id);
            let (flag, what) = match toggle {
                PrivacyToggle::UserIds => (&mut prefs.privacy_options.mask_user_ids, "User ID"),
                PrivacyToggle::ChatIds => (&mut prefs.privacy_options.mask_chat_ids, "Chat ID"),
            };
            *flag = !*flag;
            let notice = format!("{what} masking {}", if *flag { "on" } else { "off" });
            CallbackOutcome::changed(notice, privacy_panel(prefs))
        }
        CallbackAction::Filter(FilterAction::Type(ty)) => {
            let filters = &mut session.message_filters;
            let on = !filters.is_type_enabled(ty);
            filters.enabled_types.insert(ty, on);
            CallbackOutcome::changed(
                format!("{} {}", ty.label(), if on { "enabled" } else { "disabled" }),
                filter_panel(filters),
            )
        }
        CallbackAction::Filter(FilterAction::All) => {
            let filters = &mut session.message_filters;
            filters.respond_to_all = !filters.respond_to_all;
            CallbackOutcome::changed(
                format!(
                    "Respond to all {}",
                    if filters.respond_to_all { "on" } else { "off" }
                ),
                filter_panel(filters),
            )
        }
        CallbackAction::Filter(FilterAction::Save) => CallbackOutcome {
            notice: "Saved".to_string(),
            refreshed: Some(Reply::text(filter_summary(&session.message_filters))),
            ..CallbackOutcome::default()
        },
        CallbackAction::UserPrefs(UserPrefsAction::Toggle) => {
            session.use_per_user_preferences = !session.use_per_user_preferences;
            let notice = format!(
                "Per-user mode {}",
                if session.use_per_user_preferences { "on" } else { "off" }
            );
            CallbackOutcome::changed(notice, userprefs_panel(session, ctx.user_id))
        }
        CallbackAction::UserPrefs(UserPrefsAction::View) => {
            let prefs = effective_preferences(session, ctx.user_id);
            CallbackOutcome {
                notice: String::new(),
                extra: Some(Reply::text(describe_preferences("Your settings", prefs))),
                ..CallbackOutcome::default()
            }
        }
        CallbackAction::UserPrefs(UserPrefsAction::Reset) => {
            let removed = ctx
                .user_id
                .is_some_and(|u| reset_user_preferences(session, u));
            if removed {
                CallbackOutcome::changed(
                    "Your settings were reset",
                    userprefs_panel(session, ctx.user_id),
                )
            } else {
                CallbackOutcome::notice("You have no personal settings")
            }
        }
        CallbackAction::Admin(AdminAction::Toggle) => {
            session.enabled = !session.enabled;
            let notice = if session.enabled { "Bot enabled" } else { "Bot disabled" };
            CallbackOutcome::changed(notice, admin_panel(session))
        }
        CallbackAction::Admin(AdminAction::Export) => CallbackOutcome {
            notice: "Settings exported".to_string(),
            extra: Some(export_reply(session)?),
            ..CallbackOutcome::default()
        },
        CallbackAction::Admin(AdminAction::Reset) => {
            *session = default_session(ctx.chat_kind);
            CallbackOutcome::changed("Settings reset to defaults", admin_panel(session))
        }
        CallbackAction::Admin(AdminAction::UserPrefs) => CallbackOutcome {
            refreshed: Some(userprefs_panel(session, ctx.user_id)),
            ..CallbackOutcome::default()
        },
        CallbackAction::Admin(AdminAction::Filters) => CallbackOutcome {
            refreshed: Some(filter_panel(&session.message_filters)),
            ..CallbackOutcome::default()
        },
    };
    Ok(outcome)
}

/// The `/import <token>` command wrapped for copying.
pub fn export_reply(session: &SessionData) -> Result<Reply> {
    let command = export_command(session)?;
    Ok(Reply::text(format!(
        "📤 <b>Settings export</b>\nSend this in another chat:\n\n<code>{}</code>",
        escape_html(&command)
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::import_settings,
        prefs::{DisplayMode, MessageType},
    };

    fn ctx(kind: ChatKind, user: i64, can_manage: bool) -> ActionContext {
        ActionContext {
            chat_kind: kind,
            user_id: Some(UserId(user)),
            can_manage,
        }
    }

    #[test]
    fn view_change_edits_group_preferences_by_default() {
        let mut s = default_session(ChatKind::Private);
        let out = apply_callback(
            CallbackAction::View(DisplayMode::Full),
            &mut s,
            &ctx(ChatKind::Private, 7, true),
        )
        .unwrap();
        assert!(out.changed);
        assert_eq!(s.view_preferences.display_mode, DisplayMode::Full);
        assert!(s.user_preferences.is_empty());
        assert!(out.refreshed.unwrap().html.contains("Full"));
    }

    #[test]
    fn per_user_mode_creates_callers_entry_only() {
        let mut s = default_session(ChatKind::Supergroup);
        s.use_per_user_preferences = true;
        let out = apply_callback(
            CallbackAction::ToggleAuthor,
            &mut s,
            &ctx(ChatKind::Supergroup, 42, false),
        )
        .unwrap();
        assert!(out.changed);
        assert!(s.view_preferences.show_author_info);
        assert!(!s.user_preferences[&42].view_preferences.show_author_info);
        assert_eq!(s.user_preferences.len(), 1);
    }

    #[test]
    fn denied_actions_mutate_nothing() {
        let mut s = default_session(ChatKind::Group);
        let before = s.clone();
        for action in [
            CallbackAction::View(DisplayMode::Compact),
            CallbackAction::Privacy(PrivacyToggle::UserIds),
            CallbackAction::Filter(FilterAction::All),
            CallbackAction::UserPrefs(UserPrefsAction::Toggle),
            CallbackAction::Admin(AdminAction::Toggle),
            CallbackAction::Admin(AdminAction::Export),
        ] {
            let out = apply_callback(action, &mut s, &ctx(ChatKind::Group, 1, false)).unwrap();
            assert_eq!(out.notice, DENIED_NOTICE, "{action}");
            assert!(!out.changed);
            assert!(out.extra.is_none());
        }
        assert_eq!(s, before);
    }

    #[test]
    fn filter_buttons_flip_types_and_respond_to_all() {
        let mut s = default_session(ChatKind::Private);
        let c = ctx(ChatKind::Private, 1, true);
        apply_callback(CallbackAction::Filter(FilterAction::Type(MessageType::Sticker)), &mut s, &c).unwrap();
        apply_callback(CallbackAction::Filter(FilterAction::All), &mut s, &c).unwrap();
        assert!(!s.message_filters.is_type_enabled(MessageType::Sticker));
        assert!(!s.message_filters.respond_to_all);

        let out = apply_callback(CallbackAction::Filter(FilterAction::Save), &mut s, &c).unwrap();
        assert!(!out.changed);
        let summary = out.refreshed.unwrap();
        assert!(summary.keyboard.is_none());
        assert!(!summary.html.contains("Sticker"));
    }

    #[test]
    fn userprefs_reset_removes_only_callers_override() {
        let mut s = default_session(ChatKind::Group);
        s.use_per_user_preferences = true;
        apply_callback(CallbackAction::ToggleForward, &mut s, &ctx(ChatKind::Group, 1, false)).unwrap();
        apply_callback(CallbackAction::ToggleForward, &mut s, &ctx(ChatKind::Group, 2, false)).unwrap();
        assert_eq!(s.user_preferences.len(), 2);

        let c = ctx(ChatKind::Group, 1, false);
        let out = apply_callback(CallbackAction::UserPrefs(UserPrefsAction::Reset), &mut s, &c).unwrap();
        assert!(out.changed);
        assert!(!s.user_preferences.contains_key(&1));
        assert!(s.user_preferences.contains_key(&2));

        let again = apply_callback(CallbackAction::UserPrefs(UserPrefsAction::Reset), &mut s, &c).unwrap();
        assert!(!again.changed);
    }

    #[test]
    fn admin_export_emits_importable_command() {
        let mut s = default_session(ChatKind::Supergroup);
        s.view_preferences.display_mode = DisplayMode::Full;
        let out = apply_callback(
            CallbackAction::Admin(AdminAction::Export),
            &mut s,
            &ctx(ChatKind::Supergroup, 1, true),
        )
        .unwrap();
        let html = out.extra.unwrap().html;
        let start = html.find("<code>/import ").unwrap() + "<code>/import ".len();
        let end = html[start..].find("</code>").unwrap() + start;
        let settings = import_settings(&html[start..end]).unwrap();
        assert_eq!(settings.view_preferences.display_mode, DisplayMode::Full);
    }

    #[test]
    fn admin_reset_restores_kind_defaults() {
        let mut s = default_session(ChatKind::Supergroup);
        s.enabled = true;
        s.view_preferences.display_mode = DisplayMode::Compact;
        apply_callback(
            CallbackAction::Admin(AdminAction::Reset),
            &mut s,
            &ctx(ChatKind::Supergroup, 1, true),
        )
        .unwrap();
        assert_eq!(s, default_session(ChatKind::Supergroup));
    }
}
