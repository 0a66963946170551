//! Settings panels: HTML text plus the inline keyboard that drives it.

use crate::{
    callback::{AdminAction, CallbackAction, FilterAction, PrivacyToggle, UserPrefsAction},
    domain::{ChatKind, UserId},
    keyboard::{checked, toggled, InlineButton, InlineKeyboard, Reply},
    prefs::{effective_preferences, DisplayMode, MessageFilters, MessageType, SessionData, ViewPreferences},
};

const FILTERS_PER_ROW: usize = 3;

fn button(label: impl Into<String>, action: CallbackAction) -> InlineButton {
    InlineButton::new(label, action.as_data())
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

/// Display mode selector plus forward/author toggles.
pub fn mode_panel(prefs: &ViewPreferences, per_user: bool) -> Reply {
    let scope = if per_user { "your" } else { "chat" };
    let html = format!(
        "🖥 <b>Display settings</b> ({scope})\n\n\
         Mode: <b>{}</b>\n\
         Forward info: {}\n\
         Author info: {}",
        prefs.display_mode.label(),
        on_off(prefs.show_forward_info),
        on_off(prefs.show_author_info),
    );
    let modes = DisplayMode::ALL
        .into_iter()
        .map(|m| {
            button(
                checked(m.label(), prefs.display_mode == m),
                CallbackAction::View(m),
            )
        })
        .collect();
    let keyboard = InlineKeyboard::default().row(modes).row(vec![
        button(
            toggled("Forward info", prefs.show_forward_info),
            CallbackAction::ToggleForward,
        ),
        button(
            toggled("Author info", prefs.show_author_info),
            CallbackAction::ToggleAuthor,
        ),
    ]);
    Reply::with_keyboard(html, keyboard)
}

pub fn privacy_panel(prefs: &ViewPreferences) -> Reply {
    let p = &prefs.privacy_options;
    let html = format!(
        "🔒 <b>Privacy</b>\n\n\
         Mask user IDs: {}\n\
         Mask chat IDs: {}\n\
         Mask phone numbers: {} <i>(always on by default)</i>",
        on_off(p.mask_user_ids),
        on_off(p.mask_chat_ids),
        on_off(p.mask_phone_numbers),
    );
    let keyboard = InlineKeyboard::default().row(vec![
        button(
            toggled("User IDs", p.mask_user_ids),
            CallbackAction::Privacy(PrivacyToggle::UserIds),
        ),
        button(
            toggled("Chat IDs", p.mask_chat_ids),
            CallbackAction::Privacy(PrivacyToggle::ChatIds),
        ),
    ]);
    Reply::with_keyboard(html, keyboard)
}

pub fn filter_panel(filters: &MessageFilters) -> Reply {
    let html = format!(
        "🧰 <b>Message filters</b>\n\n\
         Respond to all: {}\n\
         {}",
        on_off(filters.respond_to_all),
        if filters.respond_to_all {
            "<i>Type toggles are kept but ignored until this is off.</i>"
        } else {
            "<i>Only checked types are answered.</i>"
        },
    );
    let mut keyboard = InlineKeyboard::default();
    for chunk in MessageType::ALL.chunks(FILTERS_PER_ROW) {
        keyboard = keyboard.row(
            chunk
                .iter()
                .map(|&ty| {
                    button(
                        checked(ty.label(), filters.is_type_enabled(ty)),
                        CallbackAction::Filter(FilterAction::Type(ty)),
                    )
                })
                .collect(),
        );
    }
    keyboard = keyboard.row(vec![
        button(
            toggled("Respond to all", filters.respond_to_all),
            CallbackAction::Filter(FilterAction::All),
        ),
        button("💾 Save", CallbackAction::Filter(FilterAction::Save)),
    ]);
    Reply::with_keyboard(html, keyboard)
}

/// One-line summary shown when the filter panel is closed.
pub fn filter_summary(filters: &MessageFilters) -> String {
    if filters.respond_to_all {
        return "✅ Filters saved: responding to all message types.".to_string();
    }
    let enabled: Vec<&str> = MessageType::ALL
        .into_iter()
        .filter(|&ty| filters.is_type_enabled(ty))
        .map(|ty| ty.label())
        .collect();
    if enabled.is_empty() {
        "✅ Filters saved: no message types enabled.".to_string()
    } else {
        format!("✅ Filters saved: {}.", enabled.join(", "))
    }
}

pub fn userprefs_panel(session: &SessionData, user_id: Option<UserId>) -> Reply {
    let has_override = user_id.is_some_and(|u| session.user_preferences.contains_key(&u.0));
    let html = format!(
        "👥 <b>Per-user preferences</b>\n\n\
         Per-user mode: {}\n\
         Users with own settings: {}\n\
         Your override: {}",
        on_off(session.use_per_user_preferences),
        session.user_preferences.len(),
        if has_override { "yes" } else { "no" },
    );
    let keyboard = InlineKeyboard::default()
        .row(vec![button(
            toggled("Per-user mode", session.use_per_user_preferences),
            CallbackAction::UserPrefs(UserPrefsAction::Toggle),
        )])
        .row(vec![
            button("👁 My settings", CallbackAction::UserPrefs(UserPrefsAction::View)),
            button("♻️ Reset mine", CallbackAction::UserPrefs(UserPrefsAction::Reset)),
        ]);
    Reply::with_keyboard(html, keyboard)
}

pub fn admin_panel(session: &SessionData) -> Reply {
    let html = format!(
        "🛠 <b>Admin</b>\n\n\
         Bot: {}\n\
         Per-user mode: {}\n\
         Respond to all: {}",
        if session.enabled { "enabled" } else { "disabled" },
        on_off(session.use_per_user_preferences),
        on_off(session.message_filters.respond_to_all),
    );
    let keyboard = InlineKeyboard::default()
        .row(vec![
            button(
                toggled("Bot enabled", session.enabled),
                CallbackAction::Admin(AdminAction::Toggle),
            ),
            button("📤 Export", CallbackAction::Admin(AdminAction::Export)),
        ])
        .row(vec![
            button("👥 User prefs", CallbackAction::Admin(AdminAction::UserPrefs)),
            button("🧰 Filters", CallbackAction::Admin(AdminAction::Filters)),
        ])
        .row(vec![button(
            "♻️ Reset to defaults",
            CallbackAction::Admin(AdminAction::Reset),
        )]);
    Reply::with_keyboard(html, keyboard)
}

/// Read-only description of a set of view preferences.
pub fn describe_preferences(title: &str, prefs: &ViewPreferences) -> String {
    let p = &prefs.privacy_options;
    format!(
        "<b>{title}</b>\n\
         Mode: <b>{}</b>\n\
         Forward info: {}\n\
         Author info: {}\n\
         Mask user IDs: {}\n\
         Mask chat IDs: {}\n\
         Mask phone numbers: {}",
        prefs.display_mode.label(),
        on_off(prefs.show_forward_info),
        on_off(prefs.show_author_info),
        on_off(p.mask_user_ids),
        on_off(p.mask_chat_ids),
        on_off(p.mask_phone_numbers),
    )
}

pub fn status_text(session: &SessionData, kind: ChatKind, user_id: Option<UserId>) -> String {
    let prefs = effective_preferences(session, user_id);
    format!(
        "Chat: <code>{}</code>\n\
         Bot: {}\n\
         Mode: <b>{}</b>\n\
         Per-user mode: {}",
        kind.as_str(),
        if session.enabled { "enabled" } else { "disabled" },
        prefs.display_mode.label(),
        on_off(session.use_per_user_preferences),
    )
}

pub fn help_text() -> &'static str {
    "<b>Commands</b>\n\
     /start - status and help\n\
     /help - this list\n\
     /mode - display mode, forward and author info\n\
     /privacy - ID masking\n\
     /filter - which message types get a reply\n\
     /userprefs - per-user preferences\n\
     /toggle - enable or disable the bot (admins)\n\
     /admin - admin panel (admins)\n\
     /export - settings as an /import command\n\
     /import &lt;token&gt; - apply exported settings"
}
