/// Core error type for the message inspector bot.
///
/// Adapter crates map their SDK errors into `External` so handlers can treat
/// failures uniformly (log, apologise, move on).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session store error: {0}")]
    Store(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
