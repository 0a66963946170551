use std::sync::Arc;

use mib_core::{
    config::Config,
    store::{JsonFileSessionStore, MemorySessionStore, SessionStore},
};

#[tokio::main]
async fn main() -> Result<(), mib_core::Error> {
    mib_core::logging::init("mib")?;

    let cfg = Arc::new(Config::load()?);

    let store: Arc<dyn SessionStore> = match &cfg.session_file {
        Some(path) => Arc::new(JsonFileSessionStore::open(path).await?),
        None => {
            tracing::info!("SESSION_FILE not set, sessions are kept in memory");
            Arc::new(MemorySessionStore::new())
        }
    };

    mib_telegram::router::run_polling(cfg, store)
        .await
        .map_err(|e| mib_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
