use serde::{Deserialize, Serialize};

/// Query parameters the provider sends back to the callback endpoint.
///
/// Both fields are mandatory for a valid callback; they are kept optional
/// here so that a broken or truncated callback can be turned into a proper
/// failure outcome instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// Canonical customer profile mapped from the provider's user-info response.
///
/// All three fields are required; the mapping rejects the whole profile when
/// any of them is missing or not a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Transient value object serialized into the provider authorization URL.
#[derive(Debug, Clone)]
pub(crate) struct AuthorizationRequest {
    pub(crate) response_type: &'static str,
    pub(crate) client_id: String,
    pub(crate) redirect_uri: String,
    pub(crate) scope: &'static str,
    pub(crate) state: String,
    pub(crate) access_type: &'static str,
    pub(crate) prompt: &'static str,
}

impl AuthorizationRequest {
    pub(crate) fn new(client_id: String, redirect_uri: String, state: String) -> Self {
        Self {
            response_type: "code",
            client_id,
            redirect_uri,
            scope: super::google::OAUTH2_SCOPE,
            state,
            access_type: "offline",
            prompt: "consent",
        }
    }

    pub(crate) fn query_pairs(&self) -> [(&'static str, &str); 7] {
        [
            ("response_type", self.response_type),
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("scope", self.scope),
            ("state", self.state.as_str()),
            ("access_type", self.access_type),
            ("prompt", self.prompt),
        ]
    }
}
