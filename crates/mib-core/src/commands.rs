//! Slash commands and what they do to a chat's session.

use crate::{
    actions::{export_reply, ActionContext, DENIED_NOTICE},
    codec::import_settings,
    keyboard::Reply,
    panels::{admin_panel, filter_panel, help_text, mode_panel, privacy_panel, status_text, userprefs_panel},
    prefs::{effective_preferences, SessionData},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Toggle,
    Mode,
    Filter,
    Privacy,
    UserPrefs,
    Admin,
    Export,
    Import(String),
    Unknown(String),
}

impl Command {
    /// Parse `/name`, `/name@bot` and an argument tail.
    ///
    /// `None` when `text` is not a command at all. A command addressed to a
    /// different bot than `own_username` comes back as `Unknown`.
    pub fn parse(text: &str, own_username: Option<&str>) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }
        let mut parts = text.splitn(2, char::is_whitespace);
        let first = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim().to_string();

        let (name, target) = match first.split_once('@') {
            Some((name, target)) => (name, Some(target)),
            None => (first, None),
        };
        let name = name.to_lowercase();
        if let (Some(target), Some(own)) = (target, own_username) {
            if !target.eq_ignore_ascii_case(own) {
                return Some(Self::Unknown(name));
            }
        }

        let cmd = match name.as_str() {
            "start" => Self::Start,
            "help" => Self::Help,
            "toggle" => Self::Toggle,
            "mode" => Self::Mode,
            "filter" => Self::Filter,
            "privacy" => Self::Privacy,
            "userprefs" => Self::UserPrefs,
            "admin" => Self::Admin,
            "export" => Self::Export,
            "import" => Self::Import(rest),
            _ => Self::Unknown(name),
        };
        Some(cmd)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::Toggle => "toggle",
            Self::Mode => "mode",
            Self::Filter => "filter",
            Self::Privacy => "privacy",
            Self::UserPrefs => "userprefs",
            Self::Admin => "admin",
            Self::Export => "export",
            Self::Import(_) => "import",
            Self::Unknown(name) => name,
        }
    }

    /// Outside private chats, these need an admin or the creator.
    pub fn requires_manage(&self) -> bool {
        matches!(self, Self::Toggle | Self::Admin | Self::Import(_))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// `None` for commands the bot stays silent on.
    pub reply: Option<Reply>,
    pub changed: bool,
}

impl CommandOutcome {
    fn reply(reply: Reply) -> Self {
        Self {
            reply: Some(reply),
            changed: false,
        }
    }

    fn changed(reply: Reply) -> Self {
        Self {
            reply: Some(reply),
            changed: true,
        }
    }
}

const IMPORT_USAGE: &str = "Usage: <code>/import &lt;token&gt;</code>\nGet a token with /export.";

pub fn run_command(cmd: &Command, session: &mut SessionData, ctx: &ActionContext) -> Result<CommandOutcome> {
    if cmd.requires_manage() && !ctx.chat_kind.is_private() && !ctx.can_manage {
        return Ok(CommandOutcome::reply(Reply::text(DENIED_NOTICE)));
    }

    let per_user = session.use_per_user_preferences && ctx.user_id.is_some();
    let outcome = match cmd {
        Command::Start => CommandOutcome::reply(Reply::text(format!(
            "👋 <b>Message Info Bot</b>\n\
             I reply to messages with what Telegram knows about them.\n\n\
             {}\n\n{}",
            status_text(session, ctx.chat_kind, ctx.user_id),
            help_text()
        ))),
        Command::Help => CommandOutcome::reply(Reply::text(help_text())),
        Command::Toggle => {
            session.enabled = !session.enabled;
            CommandOutcome::changed(Reply::text(if session.enabled {
                "✅ Bot enabled in this chat."
            } else {
                "⏸ Bot disabled in this chat."
            }))
        }
        Command::Mode => CommandOutcome::reply(mode_panel(
            effective_preferences(session, ctx.user_id),
            per_user,
        )),
        Command::Filter => CommandOutcome::reply(filter_panel(&session.message_filters)),
        Command::Privacy => CommandOutcome::reply(privacy_panel(effective_preferences(session, ctx.user_id))),
        Command::UserPrefs => CommandOutcome::reply(userprefs_panel(session, ctx.user_id)),
        Command::Admin => CommandOutcome::reply(admin_panel(session)),
        Command::Export => CommandOutcome::reply(export_reply(session)?),
        Command::Import(token) => {
            let token = token.trim();
            if token.is_empty() {
                return Ok(CommandOutcome::reply(Reply::text(IMPORT_USAGE)));
            }
            match import_settings(token) {
                Some(settings) => {
                    settings.apply_to(session);
                    CommandOutcome::changed(Reply::text("✅ Settings imported."))
                }
                None => CommandOutcome::reply(Reply::text(format!(
                    "❌ That token is not valid.\n{IMPORT_USAGE}"
                ))),
            }
        }
        Command::Unknown(_) => CommandOutcome::default(),
    };
    Ok(outcome)
}
