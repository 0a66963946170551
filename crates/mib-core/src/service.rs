//! The bot's update flow over a [`MessagingPort`] and a [`SessionStore`].

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    actions::{apply_callback, requires_manage, ActionContext},
    callback::CallbackAction,
    commands::{run_command, Command},
    domain::{ChatId, ChatKind, UserId},
    formatting::split_html_chunks,
    keyboard::{InlineKeyboard, Reply},
    messaging::{
        port::MessagingPort,
        types::{IncomingCallback, IncomingMessage},
    },
    prefs::SessionData,
    report::build_report,
    security::can_manage,
    store::{load_session, SessionStore},
    Result,
};

const APOLOGY: &str = "😔 Sorry, something went wrong while handling that message.";
const UNKNOWN_ACTION: &str = "Unknown action";
const STALE_ACTION: &str = "This panel is no longer available";
const ACTION_FAILED: &str = "Something went wrong";

/// One async mutex per chat, so a chat's read-modify-write cycle on its
/// session never interleaves with another update for the same chat.
#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<ChatId, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    /// Idle entries (held by nobody but the map) are dropped on the way in.
    pub async fn lock_chat(&self, chat_id: ChatId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            map.entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.inner.lock().await.len()
    }
}

pub struct InfoBot {
    store: Arc<dyn SessionStore>,
    messenger: Arc<dyn MessagingPort>,
    chat_locks: ChatLocks,
    safe_limit: usize,
    bot_username: Option<String>,
}

impl InfoBot {
    pub fn new(store: Arc<dyn SessionStore>, messenger: Arc<dyn MessagingPort>, safe_limit: usize) -> Self {
        let safe_limit = safe_limit.min(messenger.capabilities().max_message_len);
        Self {
            store,
            messenger,
            chat_locks: ChatLocks::default(),
            safe_limit,
            bot_username: None,
        }
    }

    /// Commands addressed to another bot (`/cmd@other`) are then ignored.
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    /// Handle a message end to end. Failures are logged and answered with an
    /// apology; they never propagate.
    pub async fn handle_message(&self, msg: IncomingMessage) {
        let chat_id = msg.chat_id;
        if let Err(e) = self.process_message(msg).await {
            tracing::error!(chat_id = chat_id.0, error = %e, "message handling failed");
            if let Err(e) = self.messenger.send_html(chat_id, APOLOGY, None).await {
                tracing::warn!(chat_id = chat_id.0, error = %e, "failed to send apology");
            }
        }
    }

    /// Handle a button press. The query is always answered.
    pub async fn handle_callback(&self, cb: IncomingCallback) {
        let callback_id = cb.callback_id.clone();
        let notice = match self.process_callback(cb).await {
            Ok(notice) => notice,
            Err(e) => {
                tracing::error!(callback_id = %callback_id, error = %e, "callback handling failed");
                Some(ACTION_FAILED.to_string())
            }
        };
        if let Err(e) = self
            .messenger
            .answer_callback_query(&callback_id, notice.as_deref())
            .await
        {
            tracing::warn!(callback_id = %callback_id, error = %e, "failed to answer callback query");
        }
    }

    async fn process_message(&self, msg: IncomingMessage) -> Result<()> {
        let _guard = self.chat_locks.lock_chat(msg.chat_id).await;
        let mut session = load_session(self.store.as_ref(), msg.chat_id, msg.chat_kind).await?;

        let command = msg
            .text
            .as_deref()
            .and_then(|t| Command::parse(t, self.bot_username.as_deref()));
        if let Some(cmd) = command {
            return self.process_command(cmd, &msg, &mut session).await;
        }

        match build_report(&session, &msg.update)? {
            Some(report) => self.send_reply(msg.chat_id, &Reply::text(report)).await,
            None => {
                tracing::debug!(chat_id = msg.chat_id.0, "message not reported");
                Ok(())
            }
        }
    }

    async fn process_command(
        &self,
        cmd: Command,
        msg: &IncomingMessage,
        session: &mut SessionData,
    ) -> Result<()> {
        if let Command::Unknown(name) = &cmd {
            tracing::debug!(chat_id = msg.chat_id.0, command = %name, "ignoring unknown command");
            return Ok(());
        }
        tracing::info!(
            chat_id = msg.chat_id.0,
            user_id = msg.user_id.map(|u| u.0),
            command = cmd.name(),
            "command"
        );

        let can_manage = if msg.posted_as_chat() {
            true
        } else if cmd.requires_manage() {
            self.caller_can_manage(msg.chat_id, msg.chat_kind, msg.user_id).await
        } else {
            msg.chat_kind.is_private()
        };
        let ctx = ActionContext {
            chat_kind: msg.chat_kind,
            user_id: msg.user_id,
            can_manage,
        };
        let outcome = run_command(&cmd, session, &ctx)?;
        if outcome.changed {
            self.store.put(msg.chat_id, session.clone()).await?;
        }
        if let Some(reply) = outcome.reply {
            self.send_reply(msg.chat_id, &reply).await?;
        }
        Ok(())
    }

    async fn process_callback(&self, cb: IncomingCallback) -> Result<Option<String>> {
        let Some(action) = cb.data.as_deref().and_then(CallbackAction::parse) else {
            tracing::debug!(data = ?cb.data, "unrecognized callback data");
            return Ok(Some(UNKNOWN_ACTION.to_string()));
        };
        let (Some(chat_id), Some(message)) = (cb.chat_id, cb.message) else {
            return Ok(Some(STALE_ACTION.to_string()));
        };

        let _guard = self.chat_locks.lock_chat(chat_id).await;
        let mut session = load_session(self.store.as_ref(), chat_id, cb.chat_kind).await?;

        let can_manage = if requires_manage(&action, &session, cb.chat_kind) {
            self.caller_can_manage(chat_id, cb.chat_kind, Some(cb.user_id)).await
        } else {
            true
        };
        let ctx = ActionContext {
            chat_kind: cb.chat_kind,
            user_id: Some(cb.user_id),
            can_manage,
        };
        let outcome = apply_callback(action, &mut session, &ctx)?;
        tracing::info!(
            chat_id = chat_id.0,
            user_id = cb.user_id.0,
            action = %action,
            changed = outcome.changed,
            "callback"
        );

        if outcome.changed {
            self.store.put(chat_id, session).await?;
        }
        if let Some(panel) = &outcome.refreshed {
            if self.messenger.capabilities().supports_edit {
                // Telegram rejects edits that change nothing; the press still counts.
                if let Err(e) = self
                    .messenger
                    .edit_html(message, &panel.html, panel.keyboard.as_ref())
                    .await
                {
                    tracing::debug!(chat_id = chat_id.0, error = %e, "panel edit failed");
                }
            } else {
                self.send_reply(chat_id, panel).await?;
            }
        }
        if let Some(extra) = &outcome.extra {
            self.send_reply(chat_id, extra).await?;
        }
        Ok(Some(outcome.notice).filter(|n| !n.is_empty()))
    }

    async fn caller_can_manage(&self, chat_id: ChatId, kind: ChatKind, user_id: Option<UserId>) -> bool {
        if kind.is_private() {
            return true;
        }
        let Some(user_id) = user_id else {
            return false;
        };
        let status = match self.messenger.member_status(chat_id, user_id).await {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::warn!(
                    chat_id = chat_id.0,
                    user_id = user_id.0,
                    error = %e,
                    "member status lookup failed, treating caller as non-admin"
                );
                None
            }
        };
        can_manage(kind, status)
    }

    /// Send `reply`, split to the safe limit. The keyboard rides on the last chunk.
    async fn send_reply(&self, chat_id: ChatId, reply: &Reply) -> Result<()> {
        let chunks = split_html_chunks(&reply.html, self.safe_limit);
        let last = chunks.len().saturating_sub(1);
        for (i, chunk) in chunks.iter().enumerate() {
            let keyboard: Option<&InlineKeyboard> = if i == last { reply.keyboard.as_ref() } else { None };
            self.messenger.send_html(chat_id, chunk, keyboard).await?;
        }
        Ok(())
    }
}
