mod errors;
mod types;

pub use errors::StateError;
pub use types::StateToken;

use chrono::{Duration, Utc};

use crate::storage::SharedCacheStore;
use crate::utils::gen_random_string;

use types::AuthState;

const STATE_PREFIX: &str = "auth_state";

/// Seconds a minted state token stays valid across the provider round trip.
pub const STATE_TTL: u64 = 300;

/// Keyed store for per-session sign-in state: the anti-forgery token and the
/// register/checkout intent flags.
///
/// Every operation takes the session identifier explicitly; records for
/// different sessions never touch each other. The backing cache store decides
/// whether state survives a process restart.
#[derive(Clone)]
pub struct AuthStateStore {
    cache: SharedCacheStore,
    ttl: u64,
}

impl AuthStateStore {
    pub fn new(cache: SharedCacheStore) -> Self {
        Self {
            cache,
            ttl: STATE_TTL,
        }
    }

    pub fn with_ttl(cache: SharedCacheStore, ttl: u64) -> Self {
        Self { cache, ttl }
    }

    async fn load(&self, session: &str) -> Result<Option<AuthState>, StateError> {
        let data = self
            .cache
            .lock()
            .await
            .get(STATE_PREFIX, session)
            .await
            .map_err(|e| StateError::Storage(e.to_string()))?;

        data.map(AuthState::try_from).transpose()
    }

    async fn save(&self, session: &str, record: AuthState) -> Result<(), StateError> {
        self.cache
            .lock()
            .await
            .put_with_ttl(STATE_PREFIX, session, record.into(), self.ttl as usize)
            .await
            .map_err(|e| StateError::Storage(e.to_string()))
    }

    /// Mint a fresh unguessable state token for the session and return it.
    /// Always replaces any previous token; tokens are never reused.
    pub async fn set_state(&self, session: &str) -> Result<String, StateError> {
        let token = gen_random_string(32).map_err(|e| StateError::Crypto(e.to_string()))?;

        let mut record = self.load(session).await?.unwrap_or_default();
        record.csrf = Some(StateToken {
            token: token.clone(),
            expires_at: Utc::now() + Duration::seconds(self.ttl as i64),
        });
        self.save(session, record).await?;

        tracing::debug!("Minted fresh state token for session");
        Ok(token)
    }

    /// The currently pending state token, if any.
    pub async fn state(&self, session: &str) -> Result<String, StateError> {
        self.load(session)
            .await?
            .and_then(|record| record.csrf)
            .map(|csrf| csrf.token)
            .ok_or(StateError::NotFound)
    }

    /// Return the pending state token and clear it. The token is single-use:
    /// a second call fails, so a replayed callback cannot validate twice.
    pub async fn consume_state(&self, session: &str) -> Result<StateToken, StateError> {
        let mut record = self.load(session).await?.ok_or(StateError::NotFound)?;
        let csrf = record.csrf.take().ok_or(StateError::NotFound)?;
        self.save(session, record).await?;
        Ok(csrf)
    }

    pub async fn set_as_register_request(&self, session: &str) -> Result<(), StateError> {
        let mut record = self.load(session).await?.unwrap_or_default();
        record.register_intent = true;
        self.save(session, record).await
    }

    pub async fn set_as_checkout_request(&self, session: &str) -> Result<(), StateError> {
        let mut record = self.load(session).await?.unwrap_or_default();
        record.checkout_intent = true;
        self.save(session, record).await
    }

    pub async fn is_register_request(&self, session: &str) -> Result<bool, StateError> {
        Ok(self
            .load(session)
            .await?
            .map(|record| record.register_intent)
            .unwrap_or(false))
    }

    pub async fn forget_is_register_request(&self, session: &str) -> Result<(), StateError> {
        let Some(mut record) = self.load(session).await? else {
            return Ok(());
        };
        record.register_intent = false;
        self.save(session, record).await
    }

    pub async fn is_at_checkout(&self, session: &str) -> Result<bool, StateError> {
        Ok(self
            .load(session)
            .await?
            .map(|record| record.checkout_intent)
            .unwrap_or(false))
    }

    pub async fn forget_is_at_checkout(&self, session: &str) -> Result<(), StateError> {
        let Some(mut record) = self.load(session).await? else {
            return Ok(());
        };
        record.checkout_intent = false;
        self.save(session, record).await
    }
}
