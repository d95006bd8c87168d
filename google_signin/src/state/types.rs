use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::StateError;
use crate::storage::CacheData;

/// Anti-forgery token minted at redirect time and consumed at callback time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Per-session record carrying the sign-in round trip: the pending state
/// token and the one-shot intent flags recorded before the redirect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct AuthState {
    pub(crate) csrf: Option<StateToken>,
    pub(crate) register_intent: bool,
    pub(crate) checkout_intent: bool,
}

impl From<AuthState> for CacheData {
    fn from(state: AuthState) -> Self {
        Self {
            value: serde_json::to_string(&state).expect("Failed to serialize AuthState"),
        }
    }
}

impl TryFrom<CacheData> for AuthState {
    type Error = StateError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&data.value).map_err(|e| StateError::Serde(e.to_string()))
    }
}
