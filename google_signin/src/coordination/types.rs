use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::oauth2::UserProfile;

/// A platform customer account resolved from a verified profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Error, Clone)]
#[error("Identity resolver error: {0}")]
pub struct IdentityError(pub String);

/// Maps a verified profile to an existing customer account, or creates one
/// when the platform's policy allows it.
///
/// `register_requested` carries the shopper's pre-redirect intent; whether a
/// missing account is created stays the platform's decision.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(
        &self,
        profile: &UserProfile,
        register_requested: bool,
    ) -> Result<Option<Identity>, IdentityError>;
}

#[derive(Debug, Error, Clone)]
#[error("Session error: {0}")]
pub struct SessionError(pub String);

/// Marks a customer as the authenticated principal for a browser session.
#[async_trait]
pub trait SessionManager: Send + Sync {
    async fn login(&self, session: &str, identity: &Identity) -> Result<(), SessionError>;
}

/// Where the browser is sent once an attempt concludes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Account,
    Checkout,
    Login,
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Account => "customer/account",
            Self::Checkout => "checkout",
            Self::Login => "customer/account/login",
        }
    }
}
