use std::{collections::BTreeMap, sync::Arc};

use serde_json::Value;
use teloxide::prelude::*;
use tokio::time::sleep;

use mib_core::{
    config::Config, messaging::port::MessagingPort, service::InfoBot, store::SessionStore,
};

use crate::handlers::{self, UpdateKinds};
use crate::polling::{RawPoller, ERROR_BACKOFF};
use crate::TelegramMessenger;

pub struct AppState {
    pub bot: Arc<InfoBot>,
    pub kinds: UpdateKinds,
}

pub async fn run_polling(cfg: Arc<Config>, store: Arc<dyn SessionStore>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    let username = match bot.get_me().await {
        Ok(me) => {
            tracing::info!(username = %me.username(), "bot started");
            Some(me.username().to_string())
        }
        Err(e) => {
            tracing::warn!(error = %e, "getMe failed, commands addressed to other bots will not be filtered");
            None
        }
    };
    // getUpdates is refused while a webhook is set.
    if let Err(e) = bot.delete_webhook().await {
        tracing::warn!(error = %e, "deleteWebhook failed");
    }

    let kinds = UpdateKinds {
        edited_messages: cfg.inspect_edited_messages,
        channel_posts: cfg.inspect_channel_posts,
    };
    tracing::info!(
        safe_limit = cfg.telegram_safe_limit,
        allowed_updates = ?kinds.allowed_updates(),
        "configuration"
    );

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot));
    let mut info_bot = InfoBot::new(store, messenger, cfg.telegram_safe_limit);
    if let Some(username) = username {
        info_bot = info_bot.with_bot_username(username);
    }
    let state = Arc::new(AppState {
        bot: Arc::new(info_bot),
        kinds,
    });

    let mut poller = RawPoller::new(&cfg.telegram_bot_token, kinds.allowed_updates())?;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("shutdown requested");
                break;
            }
            polled = poller.poll() => match polled {
                Ok(updates) => handle_batch(&state, updates).await,
                Err(e) => {
                    tracing::warn!(error = %e, "polling failed");
                    sleep(ERROR_BACKOFF).await;
                }
            },
        }
    }

    tracing::info!("polling stopped");
    Ok(())
}

/// Chats run concurrently; each chat's updates run in arrival order. The batch
/// finishes before the next poll confirms it.
async fn handle_batch(state: &Arc<AppState>, updates: Vec<Value>) {
    let mut by_chat: BTreeMap<Option<i64>, Vec<Value>> = BTreeMap::new();
    for update in updates {
        by_chat.entry(handlers::chat_key(&update)).or_default().push(update);
    }

    let tasks: Vec<_> = by_chat
        .into_values()
        .map(|updates| {
            let state = state.clone();
            tokio::spawn(async move {
                for update in updates {
                    handlers::dispatch(state.clone(), update).await;
                }
            })
        })
        .collect();
    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "update task panicked");
        }
    }
}
