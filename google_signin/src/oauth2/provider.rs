use async_trait::async_trait;

use super::errors::OAuth2Error;
use super::types::UserProfile;

/// Contract an OAuth2 sign-in provider has to fulfil for the flows.
///
/// `GoogleProvider` is the production implementation; the trait seam exists
/// so the orchestrators can be exercised without network access.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Assemble the consent-screen URL carrying the given state token.
    /// Deterministic given its inputs; performs no network call.
    fn authorization_url(&self, state: &str) -> Result<String, OAuth2Error>;

    /// True iff `code` is a non-empty string and `state` equals `expected`.
    /// The comparison does not leak where the two tokens diverge.
    fn validate_callback(&self, code: &str, state: &str, expected: &str) -> bool;

    /// Exchange an authorization code for an access token.
    ///
    /// Returns `Ok(None)` when the provider did not hand back a usable
    /// `access_token`; callers must treat that as "no token", not success.
    async fn exchange_code_for_token(&self, code: &str) -> Result<Option<String>, OAuth2Error>;

    /// Fetch the user-info document authorized by `access_token` and map it
    /// to a [`UserProfile`], rejecting incomplete responses.
    async fn fetch_user_profile(&self, access_token: &str) -> Result<UserProfile, OAuth2Error>;
}
