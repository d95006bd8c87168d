//! Error boundary for the sign-in flows.

use thiserror::Error;

use super::types::{IdentityError, SessionError};
use crate::config::ConfigError;
use crate::oauth2::OAuth2Error;
use crate::state::StateError;

/// Everything that can go wrong between the entry point of a flow and its
/// tagged outcome. None of these reach the shopper; they are logged in full
/// and collapsed into a generic notice at the boundary.
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// The sign-in feature is switched off in configuration
    #[error("Sign-in with Google is disabled")]
    Disabled,

    /// The callback arrived without a mandatory parameter
    #[error("Missing callback parameter: {0}")]
    MissingParameter(&'static str),

    /// The callback state did not match the token minted for this session
    #[error("Callback state validation failed")]
    StateMismatch,

    /// The state token outlived its validity window
    #[error("State token expired")]
    StateExpired,

    /// The provider did not return an access token for the code
    #[error("No access token returned by provider")]
    TokenExchangeFailed,

    /// Error from OAuth2 operations
    #[error("OAuth2 error: {0}")]
    OAuth2(OAuth2Error),

    /// Error from the state store
    #[error("State error: {0}")]
    State(StateError),

    /// Error from configuration lookups
    #[error("Config error: {0}")]
    Config(ConfigError),

    /// Error from the identity resolver
    #[error("Identity error: {0}")]
    Identity(IdentityError),

    /// Error from the session collaborator
    #[error("Session error: {0}")]
    Session(SessionError),
}

// From implementations that log the underlying error as it crosses into the
// coordination boundary, so no detail is lost before it is collapsed into a
// generic outcome.

impl From<OAuth2Error> for CoordinationError {
    fn from(err: OAuth2Error) -> Self {
        let error = Self::OAuth2(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<StateError> for CoordinationError {
    fn from(err: StateError) -> Self {
        let error = Self::State(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<ConfigError> for CoordinationError {
    fn from(err: ConfigError) -> Self {
        let error = Self::Config(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<IdentityError> for CoordinationError {
    fn from(err: IdentityError) -> Self {
        let error = Self::Identity(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<SessionError> for CoordinationError {
    fn from(err: SessionError) -> Self {
        let error = Self::Session(err);
        tracing::error!("{}", error);
        error
    }
}
