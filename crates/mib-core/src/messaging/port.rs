use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef, UserId},
    keyboard::InlineKeyboard,
    messaging::types::MessagingCapabilities,
    security::MemberStatus,
    Result,
};

/// Outbound side of the messenger, plus the one lookup the core needs.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    async fn send_html(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageRef>;

    async fn edit_html(
        &self,
        msg: MessageRef,
        html: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<()>;

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()>;

    async fn member_status(&self, chat_id: ChatId, user_id: UserId) -> Result<MemberStatus>;
}
