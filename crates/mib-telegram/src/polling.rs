//! Long polling over raw `getUpdates`.
//!
//! Updates stay `serde_json::Value`s from the wire to the report, so fields
//! and forward origins teloxide does not model reach the user as Telegram sent
//! them.

use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use serde_json::{json, Value};

/// Seconds Telegram may hold a `getUpdates` call open.
pub const POLL_TIMEOUT_SECS: u64 = 30;

/// Pause after a failed poll before trying again.
pub const ERROR_BACKOFF: Duration = Duration::from_secs(3);

pub struct RawPoller {
    http: reqwest::Client,
    url: String,
    offset: Option<i64>,
    allowed_updates: Vec<&'static str>,
}

impl RawPoller {
    pub fn new(token: &str, allowed_updates: Vec<&'static str>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .build()
            .context("building http client")?;
        Ok(Self {
            http,
            url: format!("https://api.telegram.org/bot{token}/getUpdates"),
            offset: None,
            allowed_updates,
        })
    }

    /// One long poll. Returned updates are confirmed on the next call.
    pub async fn poll(&mut self) -> anyhow::Result<Vec<Value>> {
        let mut body = json!({
            "timeout": POLL_TIMEOUT_SECS,
            "allowed_updates": self.allowed_updates,
        });
        if let Some(offset) = self.offset {
            body["offset"] = json!(offset);
        }

        // The URL carries the bot token; keep it out of errors.
        let resp = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("getUpdates request failed: {}", e.without_url()))?;
        let v: Value = resp
            .json()
            .await
            .map_err(|e| anyhow!("getUpdates response unreadable: {}", e.without_url()))?;

        let updates = parse_response(v)?;
        if let Some(next) = next_offset(&updates) {
            self.offset = Some(next);
        }
        Ok(updates)
    }
}

/// The `result` array of a Bot API reply, or the API's own error description.
pub fn parse_response(mut body: Value) -> anyhow::Result<Vec<Value>> {
    if body.get("ok").and_then(Value::as_bool) != Some(true) {
        let description = body
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("no description");
        bail!("getUpdates failed: {description}");
    }
    match body.get_mut("result").map(Value::take) {
        Some(Value::Array(updates)) => Ok(updates),
        _ => bail!("getUpdates returned no update list"),
    }
}

pub fn next_offset(updates: &[Value]) -> Option<i64> {
    updates
        .iter()
        .filter_map(|u| u.get("update_id").and_then(Value::as_i64))
        .max()
        .map(|id| id + 1)
}
