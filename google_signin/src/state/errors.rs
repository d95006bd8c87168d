use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum StateError {
    #[error("No state token recorded for this session")]
    NotFound,

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serde error: {0}")]
    Serde(String),
}
