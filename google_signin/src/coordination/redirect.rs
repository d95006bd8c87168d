use std::sync::Arc;

use crate::config::ConfigProvider;
use crate::oauth2::OAuthProvider;
use crate::state::AuthStateStore;

use super::errors::CoordinationError;

/// Generic notice shown when the redirect cannot be issued.
pub const SOMETHING_WENT_WRONG_NOTICE: &str = "Something went wrong. Please try again later.";

/// Intent flags carried on the redirect request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedirectRequest {
    pub is_register: bool,
    pub is_at_checkout: bool,
}

/// Result of a redirect attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// Send the browser to the provider consent screen.
    Authorize { url: String },
    /// Send the browser back to the login page with a generic notice;
    /// the cause is in the log.
    Failed,
}

/// Entry point behind the storefront's "Sign in with Google" button: records
/// the shopper's intent, mints a fresh state token and hands out the
/// authorization redirect.
pub struct RedirectFlow {
    config: Arc<dyn ConfigProvider>,
    provider: Arc<dyn OAuthProvider>,
    state: AuthStateStore,
}

impl RedirectFlow {
    pub fn new(
        config: Arc<dyn ConfigProvider>,
        provider: Arc<dyn OAuthProvider>,
        state: AuthStateStore,
    ) -> Self {
        Self {
            config,
            provider,
            state,
        }
    }

    /// Record intent and build the authorization redirect for `session`.
    /// Never propagates an error; failures collapse into [`RedirectOutcome::Failed`].
    pub async fn initiate(&self, session: &str, request: RedirectRequest) -> RedirectOutcome {
        match self.run(session, request).await {
            Ok(url) => RedirectOutcome::Authorize { url },
            Err(err) => {
                tracing::error!("Error during sign-in redirect: {err}");
                RedirectOutcome::Failed
            }
        }
    }

    async fn run(
        &self,
        session: &str,
        request: RedirectRequest,
    ) -> Result<String, CoordinationError> {
        if !self.config.is_enabled() {
            return Err(CoordinationError::Disabled);
        }

        // A fresh token on every visit; tokens are never reused
        let state = self.state.set_state(session).await?;

        if request.is_register {
            self.state.set_as_register_request(session).await?;
        }
        if request.is_at_checkout {
            self.state.set_as_checkout_request(session).await?;
        }

        let url = self.provider.authorization_url(&state)?;
        tracing::debug!("Issuing authorization redirect");
        Ok(url)
    }
}
