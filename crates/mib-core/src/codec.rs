//! Settings export/import tokens.
//!
//! A token is the standard base64 encoding of a compact JSON object
//! `{"v": viewPreferences, "f": messageFilters, "u": usePerUserPreferences}`.
//! Decoding is strict about shape: a payload that parses as JSON but does not
//! describe those three fields is rejected.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::{
    prefs::{MessageFilters, MessageType, SessionData, ViewPreferences},
    Result,
};

pub const IMPORT_COMMAND: &str = "/import";

/// Upper bound on accepted token length; real tokens are a few hundred bytes.
const MAX_TOKEN_LEN: usize = 4096;

#[derive(Serialize)]
struct PayloadRef<'a> {
    v: &'a ViewPreferences,
    f: &'a MessageFilters,
    u: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Payload {
    v: ViewPreferences,
    f: MessageFilters,
    u: bool,
}

/// The subset of a session carried by a token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportedSettings {
    pub view_preferences: ViewPreferences,
    pub message_filters: MessageFilters,
    pub use_per_user_preferences: bool,
}

impl ImportedSettings {
    pub fn from_session(session: &SessionData) -> Self {
        Self {
            view_preferences: session.view_preferences,
            message_filters: session.message_filters.clone(),
            use_per_user_preferences: session.use_per_user_preferences,
        }
    }

    /// Overwrite the carried fields. `enabled` and per-user overrides are left alone.
    pub fn apply_to(self, session: &mut SessionData) {
        session.view_preferences = self.view_preferences;
        session.message_filters = self.message_filters;
        for ty in MessageType::ALL {
            session.message_filters.enabled_types.entry(ty).or_insert(true);
        }
        session.use_per_user_preferences = self.use_per_user_preferences;
    }
}

pub fn export_token(session: &SessionData) -> Result<String> {
    let payload = PayloadRef {
        v: &session.view_preferences,
        f: &session.message_filters,
        u: session.use_per_user_preferences,
    };
    let json = serde_json::to_string(&payload)?;
    Ok(STANDARD.encode(json))
}

/// Ready-to-send `/import <token>` command.
pub fn export_command(session: &SessionData) -> Result<String> {
    Ok(format!("{IMPORT_COMMAND} {}", export_token(session)?))
}

/// Decode a token. Any decode or shape failure yields `None`.
pub fn import_settings(token: &str) -> Option<ImportedSettings> {
    let token = token.trim();
    if token.is_empty() || token.len() > MAX_TOKEN_LEN {
        return None;
    }
    let bytes = STANDARD.decode(token).ok()?;
    let payload: Payload = serde_json::from_slice(&bytes).ok()?;
    Some(ImportedSettings {
        view_preferences: payload.v,
        message_filters: payload.f,
        use_per_user_preferences: payload.u,
    })
}
