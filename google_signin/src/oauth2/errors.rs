use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum OAuth2Error {
    #[error("Token exchange error: {0}")]
    TokenExchange(String),

    #[error("Fetch user info error: {0}")]
    FetchUserInfo(String),

    #[error("Malformed provider response")]
    MalformedResponse,

    #[error("Invalid provider response: missing or non-string field `{0}`")]
    MissingProfileField(&'static str),

    #[error("Url error: {0}")]
    Url(String),

    /// Error from configuration lookups
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
