//! Telegram adapter (teloxide).
//!
//! Implements the `mib-core` MessagingPort over the Telegram Bot API and feeds
//! raw polled updates to the core `InfoBot`.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{ChatMemberKind, InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
};

use tokio::time::sleep;

pub mod handlers;
pub mod polling;
pub mod router;

use mib_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    errors::Error,
    keyboard::InlineKeyboard,
    messaging::{port::MessagingPort, types::MessagingCapabilities},
    security::MemberStatus,
    Result,
};

/// Telegram's hard limit on message text length.
pub const TELEGRAM_MAX_MESSAGE_LEN: usize = 4096;

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        tracing::warn!(retry_after = ?d, "rate limited by telegram, retrying");
                        sleep(d.duration()).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

/// Core keyboard to Telegram markup, row for row.
pub fn to_markup(keyboard: &InlineKeyboard) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.callback_data.clone()))
                .collect()
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

pub fn member_status(kind: &ChatMemberKind) -> MemberStatus {
    if kind.is_owner() {
        MemberStatus::Creator
    } else if kind.is_administrator() {
        MemberStatus::Administrator
    } else if kind.is_restricted() {
        MemberStatus::Restricted
    } else if kind.is_left() {
        MemberStatus::Left
    } else if kind.is_banned() {
        MemberStatus::Banned
    } else {
        MemberStatus::Member
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            supports_edit: true,
            max_message_len: TELEGRAM_MAX_MESSAGE_LEN,
        }
    }

    async fn send_html(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageRef> {
        let markup = keyboard.map(to_markup);
        let msg = self
            .with_retry(|| {
                let mut req = self
                    .bot
                    .send_message(Self::tg_chat(chat_id), html.to_string())
                    .parse_mode(ParseMode::Html);
                if let Some(markup) = &markup {
                    req = req.reply_markup(markup.clone());
                }
                req
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn edit_html(
        &self,
        msg: MessageRef,
        html: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<()> {
        let markup = keyboard.map(to_markup);
        self.with_retry(|| {
            let mut req = self
                .bot
                .edit_message_text(
                    Self::tg_chat(msg.chat_id),
                    Self::tg_msg_id(msg.message_id),
                    html.to_string(),
                )
                .parse_mode(ParseMode::Html);
            if let Some(markup) = &markup {
                req = req.reply_markup(markup.clone());
            }
            req
        })
        .await?;
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        self.with_retry(|| {
            let mut req = self.bot.answer_callback_query(callback_id.to_string());
            if let Some(t) = text {
                req = req.text(t.to_string());
            }
            req
        })
        .await?;
        Ok(())
    }

    async fn member_status(&self, chat_id: ChatId, user_id: UserId) -> Result<MemberStatus> {
        let user = teloxide::types::UserId(user_id.0 as u64);
        let member = self
            .with_retry(|| self.bot.get_chat_member(Self::tg_chat(chat_id), user))
            .await?;
        Ok(member_status(&member.kind))
    }
}
