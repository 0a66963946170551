//! Rendering of the reply sent back for an inspected message.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    formatting::{escape_html, truncate_chars},
    masking::apply_privacy_mask,
    message::{message_of, summary_label, Author, MessageInfo},
    origin::{ForwardOrigin, OriginChat},
    prefs::{effective_preferences, should_process_message_type, DisplayMode, SessionData, ViewPreferences},
    Result,
};

pub const TEXT_PREVIEW_CHARS: usize = 100;

const USAGE_HINT: &str = "<i>Use /mode to switch between compact, full and raw JSON views.</i>";

/// Render a report for `update` under `prefs`.
///
/// Section order: forward origin, author, then the mode-dependent body. The
/// privacy mask runs over the assembled text.
pub fn render(
    update: &Value,
    prefs: &ViewPreferences,
    author: Option<&Author>,
    origin: Option<&ForwardOrigin>,
) -> Result<String> {
    let mut sections = Vec::new();

    if let Some(origin) = origin.filter(|_| prefs.show_forward_info) {
        sections.push(render_forward_origin(origin));
    }
    if let Some(author) = author.filter(|_| prefs.show_author_info) {
        sections.push(render_author(author));
    }

    match prefs.display_mode {
        DisplayMode::Compact => sections.push(render_compact(update)),
        DisplayMode::Full => {
            sections.push(render_compact(update));
            sections.push(render_json(update)?);
        }
        DisplayMode::Raw => sections.push(render_json(update)?),
    }

    Ok(apply_privacy_mask(
        &sections.join("\n\n"),
        &prefs.privacy_options,
    ))
}

/// Full pipeline for one incoming update: enabled check, type filter,
/// preference resolution, rendering. `None` means stay silent.
pub fn build_report(session: &SessionData, update: &Value) -> Result<Option<String>> {
    if !session.enabled {
        return Ok(None);
    }
    let Some(info) = MessageInfo::from_json(update) else {
        return Ok(None);
    };
    if !should_process_message_type(Some(&session.message_filters), info.message_type) {
        return Ok(None);
    }

    let prefs = effective_preferences(session, info.author.as_ref().map(Author::user_id));
    render(
        update,
        prefs,
        info.author.as_ref(),
        info.forward_origin.as_ref(),
    )
    .map(Some)
}

fn render_compact(update: &Value) -> String {
    let msg = message_of(update);
    let message_id = msg.get("message_id").and_then(Value::as_i64).unwrap_or_default();
    let chat_id = msg
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(Value::as_i64)
        .unwrap_or_default();
    let text = msg
        .get("text")
        .or_else(|| msg.get("caption"))
        .and_then(Value::as_str);

    let mut lines = vec![
        "📨 <b>Message Info</b>".to_string(),
        format!("<b>Type:</b> {}", summary_label(msg)),
    ];
    if let Some(text) = text {
        lines.push(format!(
            "<b>Text:</b> {}",
            escape_html(&truncate_chars(text, TEXT_PREVIEW_CHARS))
        ));
    }
    lines.push(format!("<b>Message ID:</b> <code>{message_id}</code>"));
    lines.push(format!("<b>Chat ID:</b> <code>{chat_id}</code>"));
    lines.push(String::new());
    lines.push(USAGE_HINT.to_string());
    lines.join("\n")
}

fn render_json(update: &Value) -> Result<String> {
    let pretty = serde_json::to_string_pretty(update)?;
    Ok(format!(
        "<pre><code class=\"language-json\">{}</code></pre>",
        escape_html(&pretty)
    ))
}

fn render_author(author: &Author) -> String {
    let mut name = escape_html(&author.full_name());
    if author.is_bot {
        name.push_str(" 🤖");
    }
    let mut lines = vec![
        "👤 <b>Author</b>".to_string(),
        format!("<b>Name:</b> {name}"),
    ];
    if let Some(username) = author.username.as_deref() {
        lines.push(format!("<b>Username:</b> @{}", escape_html(username)));
    }
    lines.push(format!("<b>User ID:</b> <code>{}</code>", author.id));
    if let Some(lang) = author.language_code.as_deref() {
        lines.push(format!("<b>Language:</b> {}", escape_html(lang)));
    }
    lines.join("\n")
}

fn render_forward_origin(origin: &ForwardOrigin) -> String {
    let mut lines = vec!["↪️ <b>Forwarded from</b>".to_string()];

    match origin {
        ForwardOrigin::User { sender, .. } => {
            lines.push(format!(
                "<b>User:</b> {}",
                with_username(&sender.full_name(), sender.username.as_deref())
            ));
            lines.push(format!("<b>User ID:</b> <code>{}</code>", sender.id));
            if sender.is_bot {
                lines.push("<i>Sent by a bot</i>".to_string());
            }
        }
        ForwardOrigin::HiddenUser { sender_name, .. } => {
            lines.push(format!("<b>Hidden user:</b> {}", escape_html(sender_name)));
            lines.push("<i>The account is hidden by its privacy settings</i>".to_string());
        }
        ForwardOrigin::Chat {
            chat,
            author_signature,
            ..
        } => {
            lines.push(format!("<b>Chat:</b> {}", chat_title(chat)));
            lines.push(format!("<b>Chat ID:</b> <code>{}</code>", chat.id));
            push_signature(&mut lines, author_signature.as_deref());
        }
        ForwardOrigin::Channel {
            chat,
            message_id,
            author_signature,
            ..
        } => {
            lines.push(format!("<b>Channel:</b> {}", chat_title(chat)));
            lines.push(format!("<b>Channel ID:</b> <code>{}</code>", chat.id));
            if let Some(id) = message_id {
                lines.push(format!("<b>Original message ID:</b> <code>{id}</code>"));
            }
            push_signature(&mut lines, author_signature.as_deref());
        }
        ForwardOrigin::Unknown { tag, .. } => {
            lines.push(format!("<b>Origin type:</b> <code>{}</code>", escape_html(tag)));
            lines.push("<i>This origin type is not recognized</i>".to_string());
        }
    }

    if let Some(date) = origin.date().and_then(format_unix_date) {
        lines.push(format!("<b>Date:</b> {date}"));
    }
    lines.join("\n")
}

fn chat_title(chat: &OriginChat) -> String {
    let title = chat.title.as_deref().unwrap_or("Untitled");
    with_username(title, chat.username.as_deref())
}

fn with_username(name: &str, username: Option<&str>) -> String {
    match username {
        Some(u) => format!("{} (@{})", escape_html(name), escape_html(u)),
        None => escape_html(name),
    }
}

fn push_signature(lines: &mut Vec<String>, signature: Option<&str>) {
    if let Some(sig) = signature {
        lines.push(format!("<b>Signature:</b> {}", escape_html(sig)));
    }
}

fn format_unix_date(ts: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(ts, 0).map(|d| d.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}
