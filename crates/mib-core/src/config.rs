use std::{env, path::PathBuf};

use crate::{errors::Error, Result};

const DEFAULT_SAFE_LIMIT: usize = 4000;
const MIN_SAFE_LIMIT: usize = 200;

/// Typed process configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    /// JSON file backing the session store; `None` keeps sessions in memory.
    pub session_file: Option<PathBuf>,

    /// Outbound HTML is split into chunks no longer than this (bytes).
    pub telegram_safe_limit: usize,

    pub inspect_edited_messages: bool,
    pub inspect_channel_posts: bool,
}

impl Config {
    /// Load from the process environment, after merging `.env` if present.
    pub fn load() -> Result<Self> {
        // Existing env vars take precedence over `.env` entries.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
            })?;

        let session_file = lookup("SESSION_FILE").and_then(non_empty).map(PathBuf::from);

        let telegram_safe_limit = lookup("TELEGRAM_SAFE_LIMIT")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_SAFE_LIMIT)
            .max(MIN_SAFE_LIMIT);

        let inspect_edited_messages = lookup("INSPECT_EDITED_MESSAGES")
            .map(|s| parse_bool(&s))
            .unwrap_or(true);
        let inspect_channel_posts = lookup("INSPECT_CHANNEL_POSTS")
            .map(|s| parse_bool(&s))
            .unwrap_or(true);

        Ok(Self {
            telegram_bot_token: telegram_bot_token.trim().to_string(),
            session_file,
            telegram_safe_limit,
            inspect_edited_messages,
            inspect_channel_posts,
        })
    }
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_token_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_lookup(lookup_from(&[("TELEGRAM_BOT_TOKEN", "   ")])).unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let cfg = Config::from_lookup(lookup_from(&[("TELEGRAM_BOT_TOKEN", " 123:abc ")])).unwrap();
        assert_eq!(cfg.telegram_bot_token, "123:abc");
        assert!(cfg.session_file.is_none());
        assert_eq!(cfg.telegram_safe_limit, 4000);
        assert!(cfg.inspect_edited_messages);
        assert!(cfg.inspect_channel_posts);
    }

    #[test]
    fn parses_optional_settings() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("SESSION_FILE", "/var/lib/mib/sessions.json"),
            ("TELEGRAM_SAFE_LIMIT", "50"),
            ("INSPECT_EDITED_MESSAGES", "off"),
            ("INSPECT_CHANNEL_POSTS", "YES"),
        ]))
        .unwrap();
        assert_eq!(
            cfg.session_file,
            Some(PathBuf::from("/var/lib/mib/sessions.json"))
        );
        assert_eq!(cfg.telegram_safe_limit, 200);
        assert!(!cfg.inspect_edited_messages);
        assert!(cfg.inspect_channel_posts);
    }
}
