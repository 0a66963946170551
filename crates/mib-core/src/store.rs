//! Where per-chat sessions live between updates.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    domain::{ChatId, ChatKind},
    errors::Error,
    prefs::{default_session, ensure_complete_session_for, PartialSession, SessionData},
    Result,
};

/// Key-value storage for `SessionData`, keyed by chat.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, chat_id: ChatId) -> Result<Option<SessionData>>;
    async fn put(&self, chat_id: ChatId, session: SessionData) -> Result<()>;
}

/// The chat's stored session, or a fresh default for its kind.
pub async fn load_session(
    store: &dyn SessionStore,
    chat_id: ChatId,
    kind: ChatKind,
) -> Result<SessionData> {
    Ok(store
        .get(chat_id)
        .await?
        .unwrap_or_else(|| default_session(kind)))
}

#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<HashMap<ChatId, SessionData>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, chat_id: ChatId) -> Result<Option<SessionData>> {
        Ok(self.inner.lock().await.get(&chat_id).cloned())
    }

    async fn put(&self, chat_id: ChatId, session: SessionData) -> Result<()> {
        self.inner.lock().await.insert(chat_id, session);
        Ok(())
    }
}

/// All sessions in one JSON object keyed by chat id.
///
/// The file is read once on open; every `put` rewrites it through a temp file
/// and a rename, and only a successful write changes what `get` returns.
/// Records written by older versions may lack fields and are completed against
/// the defaults for the chat kind implied by the id. Unreadable records or
/// fields are skipped with a warning.
pub struct JsonFileSessionStore {
    path: PathBuf,
    inner: Mutex<HashMap<ChatId, SessionData>>,
}

impl JsonFileSessionStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let sessions = load_file(&path).await?;
        tracing::info!(path = %path.display(), sessions = sessions.len(), "session file loaded");
        Ok(Self {
            path,
            inner: Mutex::new(sessions),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for JsonFileSessionStore {
    async fn get(&self, chat_id: ChatId) -> Result<Option<SessionData>> {
        Ok(self.inner.lock().await.get(&chat_id).cloned())
    }

    async fn put(&self, chat_id: ChatId, session: SessionData) -> Result<()> {
        let mut map = self.inner.lock().await;
        let mut next = map.clone();
        next.insert(chat_id, session);
        save_file(&self.path, &next).await?;
        *map = next;
        Ok(())
    }
}

async fn load_file(path: &Path) -> Result<HashMap<ChatId, SessionData>> {
    let txt = match tokio::fs::read_to_string(path).await {
        Ok(txt) => txt,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => return Err(e.into()),
    };
    if txt.trim().is_empty() {
        return Ok(HashMap::new());
    }

    let raw: Value = serde_json::from_str(&txt)?;
    let Value::Object(records) = raw else {
        return Err(Error::Store(format!(
            "session file {} is not a JSON object",
            path.display()
        )));
    };

    let mut out = HashMap::with_capacity(records.len());
    for (key, record) in records {
        let Ok(id) = key.parse::<i64>() else {
            tracing::warn!(path = %path.display(), key = %key, "skipping session with invalid chat id");
            continue;
        };
        if !record.is_object() {
            tracing::warn!(path = %path.display(), chat_id = id, "skipping session that is not an object");
            continue;
        }
        let (partial, dropped) = PartialSession::from_value_lenient(&record);
        if !dropped.is_empty() {
            tracing::warn!(
                path = %path.display(),
                chat_id = id,
                fields = ?dropped,
                "ignoring unreadable session fields"
            );
        }
        let chat_id = ChatId(id);
        out.insert(chat_id, ensure_complete_session_for(&partial, ChatKind::infer_from_id(chat_id)));
    }
    Ok(out)
}

async fn save_file(path: &Path, sessions: &HashMap<ChatId, SessionData>) -> Result<()> {
    let by_key: std::collections::BTreeMap<String, &SessionData> = sessions
        .iter()
        .map(|(id, s)| (id.0.to_string(), s))
        .collect();
    let txt = serde_json::to_string_pretty(&by_key)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, txt).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::{DisplayMode, MessageType};

    fn temp_path(name: &str) -> PathBuf {
        PathBuf::from(format!("/tmp/mib-store-{}-{name}.json", std::process::id()))
    }

    #[tokio::test]
    async fn load_session_falls_back_to_defaults() {
        let store = MemorySessionStore::new();
        let s = load_session(&store, ChatId(-100), ChatKind::Supergroup).await.unwrap();
        assert_eq!(s, default_session(ChatKind::Supergroup));
        assert!(store.get(ChatId(-100)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_store_round_trips() {
        let store = MemorySessionStore::new();
        let mut s = default_session(ChatKind::Private);
        s.enabled = false;
        store.put(ChatId(1), s.clone()).await.unwrap();
        assert_eq!(store.get(ChatId(1)).await.unwrap(), Some(s));
    }

    #[tokio::test]
    async fn file_store_persists_across_reopen() {
        let path = temp_path("reopen");
        let _ = std::fs::remove_file(&path);

        let store = JsonFileSessionStore::open(&path).await.unwrap();
        let mut s = default_session(ChatKind::Group);
        s.view_preferences.display_mode = DisplayMode::Full;
        store.put(ChatId(-42), s.clone()).await.unwrap();
        drop(store);

        let reopened = JsonFileSessionStore::open(&path).await.unwrap();
        assert_eq!(reopened.get(ChatId(-42)).await.unwrap(), Some(s));
        assert!(!PathBuf::from(format!("{}.tmp", path.display())).exists());

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn file_store_completes_partial_records() {
        let path = temp_path("partial");
        std::fs::write(
            &path,
            r#"{"7": {"enabled": false}, "-1001": {"viewPreferences": {"showAuthorInfo": false}}}"#,
        )
        .unwrap();

        let store = JsonFileSessionStore::open(&path).await.unwrap();
        let private = store.get(ChatId(7)).await.unwrap().unwrap();
        assert!(!private.enabled);
        assert_eq!(private.view_preferences.display_mode, DisplayMode::Compact);

        let group = store.get(ChatId(-1001)).await.unwrap().unwrap();
        assert!(!group.enabled);
        assert!(!group.view_preferences.show_author_info);
        assert_eq!(group.view_preferences.display_mode, DisplayMode::Raw);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn file_store_skips_bad_keys() {
        let path = temp_path("badkey");
        std::fs::write(&path, r#"{"abc": {}, "5": {"enabled": false}, "6": 17}"#).unwrap();
        let store = JsonFileSessionStore::open(&path).await.unwrap();
        assert!(!store.get(ChatId(5)).await.unwrap().unwrap().enabled);
        assert!(store.get(ChatId(6)).await.unwrap().is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn one_bad_field_keeps_other_records() {
        let path = temp_path("mixed");
        std::fs::write(
            &path,
            r#"{"7":{"enabled":true},"8":{"enabled":false,"messageFilters":{"enabledTypes":{"gif":true,"photo":false}}}}"#,
        )
        .unwrap();

        let store = JsonFileSessionStore::open(&path).await.unwrap();
        assert!(store.get(ChatId(7)).await.unwrap().unwrap().enabled);
        let eight = store.get(ChatId(8)).await.unwrap().unwrap();
        assert!(!eight.enabled);
        assert!(!eight.message_filters.is_type_enabled(MessageType::Photo));
        assert!(eight.message_filters.is_type_enabled(MessageType::Text));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn non_object_file_is_an_error() {
        let path = temp_path("array");
        std::fs::write(&path, "[1, 2]").unwrap();
        let err = JsonFileSessionStore::open(&path).await.err().unwrap();
        assert!(matches!(err, Error::Store(_)));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn failed_write_leaves_store_unchanged() {
        let path = temp_path("failwrite");
        let _ = std::fs::remove_file(&path);
        let tmp = PathBuf::from(format!("{}.tmp", path.display()));
        let _ = std::fs::remove_dir_all(&tmp);

        let store = JsonFileSessionStore::open(&path).await.unwrap();
        std::fs::create_dir(&tmp).unwrap();

        let mut s = default_session(ChatKind::Private);
        s.enabled = false;
        assert!(store.put(ChatId(3), s.clone()).await.is_err());
        assert!(store.get(ChatId(3)).await.unwrap().is_none());

        std::fs::remove_dir(&tmp).unwrap();
        store.put(ChatId(3), s.clone()).await.unwrap();
        assert_eq!(store.get(ChatId(3)).await.unwrap(), Some(s));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn missing_file_opens_empty() {
        let path = temp_path("missing");
        let _ = std::fs::remove_file(&path);
        let store = JsonFileSessionStore::open(&path).await.unwrap();
        assert!(store.get(ChatId(1)).await.unwrap().is_none());
        assert_eq!(store.path(), path.as_path());
    }
}
