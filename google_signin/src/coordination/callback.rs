use std::sync::Arc;

use chrono::Utc;

use crate::config::ConfigProvider;
use crate::oauth2::{CallbackParams, OAuthProvider};
use crate::state::{AuthStateStore, StateError};

use super::errors::CoordinationError;
use super::types::{Destination, IdentityResolver, SessionManager};

/// Notice shown when code/state validation fails. Deliberately silent about
/// which of the two checks failed.
pub const VALIDATION_FAILED_NOTICE: &str = "Validation failed. Please try again later.";

/// Notice shown when the profile is verified but no customer account exists.
pub const REGISTRATION_REQUIRED_NOTICE: &str = "Customer not found. Please try to register.";

/// Notice shown for every other failure; the detail is log-only.
pub const SIGN_IN_FAILED_NOTICE: &str =
    "An error occurred during social authentication. Please try again later.";

/// Terminal result of a callback attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Customer authenticated and the session principal is set.
    LoggedIn { destination: Destination },
    /// Profile verified but no matching customer account exists.
    RegistrationRequired,
    /// Anything else went wrong; the shopper sees only the notice.
    Failed { notice: &'static str },
}

impl CallbackOutcome {
    pub fn destination(&self) -> Destination {
        match self {
            Self::LoggedIn { destination } => *destination,
            Self::RegistrationRequired | Self::Failed { .. } => Destination::Login,
        }
    }

    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Self::LoggedIn { .. } => None,
            Self::RegistrationRequired => Some(REGISTRATION_REQUIRED_NOTICE),
            Self::Failed { notice } => Some(notice),
        }
    }
}

/// Handles the provider callback: validates state, exchanges the code,
/// resolves the customer and picks the post-login destination.
pub struct CallbackFlow {
    config: Arc<dyn ConfigProvider>,
    provider: Arc<dyn OAuthProvider>,
    state: AuthStateStore,
    identities: Arc<dyn IdentityResolver>,
    sessions: Arc<dyn SessionManager>,
}

impl CallbackFlow {
    pub fn new(
        config: Arc<dyn ConfigProvider>,
        provider: Arc<dyn OAuthProvider>,
        state: AuthStateStore,
        identities: Arc<dyn IdentityResolver>,
        sessions: Arc<dyn SessionManager>,
    ) -> Self {
        Self {
            config,
            provider,
            state,
            identities,
            sessions,
        }
    }

    /// Walk the callback to a terminal outcome. Never propagates an error;
    /// every failure is logged in full and collapsed into a generic notice
    /// with the login page as destination.
    pub async fn handle(&self, session: &str, params: &CallbackParams) -> CallbackOutcome {
        match self.run(session, params).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!("Error during sign-in callback: {err}");
                CallbackOutcome::Failed {
                    notice: failure_notice(&err),
                }
            }
        }
    }

    async fn run(
        &self,
        session: &str,
        params: &CallbackParams,
    ) -> Result<CallbackOutcome, CoordinationError> {
        if !self.config.is_enabled() {
            return Err(CoordinationError::Disabled);
        }

        let code = params
            .code
            .as_deref()
            .ok_or(CoordinationError::MissingParameter("code"))?;
        let state = params
            .state
            .as_deref()
            .ok_or(CoordinationError::MissingParameter("state"))?;

        // Single use: the stored token is consumed whether or not the
        // comparison below succeeds, so a replayed callback cannot validate
        let stored = self.state.consume_state(session).await?;
        if Utc::now() > stored.expires_at {
            return Err(CoordinationError::StateExpired);
        }
        if !self.provider.validate_callback(code, state, &stored.token) {
            return Err(CoordinationError::StateMismatch);
        }
        tracing::debug!("Callback state validated");

        let Some(access_token) = self.provider.exchange_code_for_token(code).await? else {
            return Err(CoordinationError::TokenExchangeFailed);
        };
        tracing::debug!("Authorization code exchanged");

        let profile = self.provider.fetch_user_profile(&access_token).await?;

        let register_requested = self.state.is_register_request(session).await?;
        if register_requested {
            self.state.forget_is_register_request(session).await?;
        }

        let Some(identity) = self.identities.resolve(&profile, register_requested).await? else {
            tracing::info!("No customer account for verified profile");
            return Ok(CallbackOutcome::RegistrationRequired);
        };

        self.sessions.login(session, &identity).await?;
        tracing::info!("Customer {} signed in with Google", identity.id);

        let destination = if self.state.is_at_checkout(session).await? {
            self.state.forget_is_at_checkout(session).await?;
            Destination::Checkout
        } else {
            Destination::Account
        };

        Ok(CallbackOutcome::LoggedIn { destination })
    }
}

/// Pick the user-facing notice for a failed callback. Validation-stage
/// failures get the validation notice; everything else gets the generic one.
/// Neither reveals what actually happened.
fn failure_notice(err: &CoordinationError) -> &'static str {
    match err {
        CoordinationError::StateMismatch
        | CoordinationError::StateExpired
        | CoordinationError::State(StateError::NotFound) => VALIDATION_FAILED_NOTICE,
        _ => SIGN_IN_FAILED_NOTICE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, ConfigProvider};
    use crate::oauth2::{OAuth2Error, UserProfile};
    use crate::state::AuthStateStore;
    use crate::storage::CacheStoreKind;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::coordination::redirect::{RedirectFlow, RedirectOutcome, RedirectRequest};
    use crate::coordination::types::{
        Identity, IdentityError, IdentityResolver, SessionError, SessionManager,
    };

    struct TestConfig {
        enabled: bool,
    }

    impl ConfigProvider for TestConfig {
        fn is_enabled(&self) -> bool {
            self.enabled
        }

        fn client_key(&self) -> Result<String, ConfigError> {
            Ok("test-client-id".to_string())
        }

        fn client_secret(&self) -> Result<String, ConfigError> {
            Ok("test-client-secret".to_string())
        }
    }

    /// Provider double that validates like the real one but answers the
    /// network steps from canned data.
    struct MockProvider {
        token: Option<String>,
        profile: Result<UserProfile, OAuth2Error>,
    }

    impl MockProvider {
        fn happy() -> Self {
            Self {
                token: Some("access-token".to_string()),
                profile: Ok(test_profile()),
            }
        }
    }

    #[async_trait]
    impl crate::oauth2::OAuthProvider for MockProvider {
        fn authorization_url(&self, state: &str) -> Result<String, OAuth2Error> {
            Ok(format!("https://provider.example/auth?state={state}"))
        }

        fn validate_callback(&self, code: &str, state: &str, expected: &str) -> bool {
            !code.is_empty() && state == expected
        }

        async fn exchange_code_for_token(&self, _code: &str) -> Result<Option<String>, OAuth2Error> {
            Ok(self.token.clone())
        }

        async fn fetch_user_profile(&self, _access_token: &str) -> Result<UserProfile, OAuth2Error> {
            self.profile.clone()
        }
    }

    /// Resolver double backed by an email map; records the register hint.
    struct MockResolver {
        known: HashMap<String, Identity>,
        seen_register_hint: Mutex<Option<bool>>,
    }

    impl MockResolver {
        fn empty() -> Self {
            Self {
                known: HashMap::new(),
                seen_register_hint: Mutex::new(None),
            }
        }

        fn with_customer(email: &str) -> Self {
            let mut known = HashMap::new();
            known.insert(
                email.to_string(),
                Identity {
                    id: "customer-1".to_string(),
                    email: email.to_string(),
                },
            );
            Self {
                known,
                seen_register_hint: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl IdentityResolver for MockResolver {
        async fn resolve(
            &self,
            profile: &UserProfile,
            register_requested: bool,
        ) -> Result<Option<Identity>, IdentityError> {
            *self.seen_register_hint.lock().unwrap() = Some(register_requested);
            Ok(self.known.get(&profile.email).cloned())
        }
    }

    /// Session double recording who was logged in for which session.
    #[derive(Default)]
    struct MockSessions {
        logins: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SessionManager for MockSessions {
        async fn login(&self, session: &str, identity: &Identity) -> Result<(), SessionError> {
            self.logins
                .lock()
                .unwrap()
                .push((session.to_string(), identity.id.clone()));
            Ok(())
        }
    }

    fn test_profile() -> UserProfile {
        UserProfile {
            email: "jane@example.com".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
        }
    }

    struct TestHarness {
        state: AuthStateStore,
        redirect: RedirectFlow,
        callback: CallbackFlow,
        resolver: Arc<MockResolver>,
        sessions: Arc<MockSessions>,
    }

    async fn harness(provider: MockProvider, resolver: MockResolver) -> TestHarness {
        let cache = CacheStoreKind::Memory.connect().await.unwrap();
        let state = AuthStateStore::new(cache);
        let config = Arc::new(TestConfig { enabled: true });
        let provider: Arc<dyn crate::oauth2::OAuthProvider> = Arc::new(provider);
        let resolver = Arc::new(resolver);
        let sessions = Arc::new(MockSessions::default());

        TestHarness {
            state: state.clone(),
            redirect: RedirectFlow::new(config.clone(), provider.clone(), state.clone()),
            callback: CallbackFlow::new(
                config,
                provider,
                state,
                resolver.clone(),
                sessions.clone(),
            ),
            resolver,
            sessions,
        }
    }

    fn params(code: &str, state: &str) -> CallbackParams {
        CallbackParams {
            code: Some(code.to_string()),
            state: Some(state.to_string()),
        }
    }

    /// Extract the state query parameter embedded in an authorization URL.
    fn state_from_url(url: &str) -> String {
        url::Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_login_to_account() {
        let h = harness(
            MockProvider::happy(),
            MockResolver::with_customer("jane@example.com"),
        )
        .await;

        let RedirectOutcome::Authorize { url } = h
            .redirect
            .initiate("session1", RedirectRequest::default())
            .await
        else {
            panic!("Expected Authorize outcome");
        };

        let state = state_from_url(&url);
        let outcome = h.callback.handle("session1", &params("auth-code", &state)).await;

        assert_eq!(
            outcome,
            CallbackOutcome::LoggedIn {
                destination: Destination::Account
            }
        );
        assert!(outcome.notice().is_none());

        let logins = h.sessions.logins.lock().unwrap();
        assert_eq!(logins.as_slice(), &[("session1".to_string(), "customer-1".to_string())]);
    }

    #[tokio::test]
    async fn test_checkout_intent_drives_destination_and_is_cleared() {
        let h = harness(
            MockProvider::happy(),
            MockResolver::with_customer("jane@example.com"),
        )
        .await;

        let RedirectOutcome::Authorize { url } = h
            .redirect
            .initiate(
                "session1",
                RedirectRequest {
                    is_register: false,
                    is_at_checkout: true,
                },
            )
            .await
        else {
            panic!("Expected Authorize outcome");
        };

        let state = state_from_url(&url);
        let outcome = h.callback.handle("session1", &params("auth-code", &state)).await;

        assert_eq!(
            outcome,
            CallbackOutcome::LoggedIn {
                destination: Destination::Checkout
            }
        );

        // The flag is consumed with the successful callback
        assert!(!h.state.is_at_checkout("session1").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_state_fails_validation() {
        let h = harness(
            MockProvider::happy(),
            MockResolver::with_customer("jane@example.com"),
        )
        .await;

        h.state.set_state("session1").await.unwrap();

        let outcome = h.callback.handle("session1", &params("auth-code", "")).await;

        assert_eq!(
            outcome,
            CallbackOutcome::Failed {
                notice: VALIDATION_FAILED_NOTICE
            }
        );
        assert_eq!(outcome.destination(), Destination::Login);
        assert!(h.sessions.logins.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_parameters_fail_generically() {
        let h = harness(
            MockProvider::happy(),
            MockResolver::with_customer("jane@example.com"),
        )
        .await;

        let outcome = h
            .callback
            .handle(
                "session1",
                &CallbackParams {
                    code: None,
                    state: Some("whatever".to_string()),
                },
            )
            .await;

        assert_eq!(
            outcome,
            CallbackOutcome::Failed {
                notice: SIGN_IN_FAILED_NOTICE
            }
        );
        assert_eq!(outcome.destination(), Destination::Login);
    }

    #[tokio::test]
    async fn test_state_from_another_session_does_not_validate() {
        let h = harness(
            MockProvider::happy(),
            MockResolver::with_customer("jane@example.com"),
        )
        .await;

        let stolen = h.state.set_state("victim").await.unwrap();
        h.state.set_state("attacker").await.unwrap();

        let outcome = h
            .callback
            .handle("attacker", &params("auth-code", &stolen))
            .await;

        assert_eq!(
            outcome,
            CallbackOutcome::Failed {
                notice: VALIDATION_FAILED_NOTICE
            }
        );
    }

    #[tokio::test]
    async fn test_replayed_callback_does_not_validate_twice() {
        let h = harness(
            MockProvider::happy(),
            MockResolver::with_customer("jane@example.com"),
        )
        .await;

        let state = h.state.set_state("session1").await.unwrap();

        let first = h.callback.handle("session1", &params("auth-code", &state)).await;
        assert!(matches!(first, CallbackOutcome::LoggedIn { .. }));

        // Same code/state again: the token was consumed by the first attempt
        let replay = h.callback.handle("session1", &params("auth-code", &state)).await;
        assert_eq!(
            replay,
            CallbackOutcome::Failed {
                notice: VALIDATION_FAILED_NOTICE
            }
        );
    }

    #[tokio::test]
    async fn test_expired_state_fails_validation() {
        let cache = CacheStoreKind::Memory.connect().await.unwrap();
        let state = AuthStateStore::with_ttl(cache, 0);
        let config = Arc::new(TestConfig { enabled: true });
        let provider: Arc<dyn crate::oauth2::OAuthProvider> = Arc::new(MockProvider::happy());
        let callback = CallbackFlow::new(
            config,
            provider,
            state.clone(),
            Arc::new(MockResolver::with_customer("jane@example.com")),
            Arc::new(MockSessions::default()),
        );

        let token = state.set_state("session1").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let outcome = callback.handle("session1", &params("auth-code", &token)).await;

        assert_eq!(
            outcome,
            CallbackOutcome::Failed {
                notice: VALIDATION_FAILED_NOTICE
            }
        );
    }

    #[tokio::test]
    async fn test_no_access_token_fails() {
        let h = harness(
            MockProvider {
                token: None,
                profile: Ok(test_profile()),
            },
            MockResolver::with_customer("jane@example.com"),
        )
        .await;

        let state = h.state.set_state("session1").await.unwrap();
        let outcome = h.callback.handle("session1", &params("auth-code", &state)).await;

        assert_eq!(
            outcome,
            CallbackOutcome::Failed {
                notice: SIGN_IN_FAILED_NOTICE
            }
        );
    }

    #[tokio::test]
    async fn test_incomplete_profile_fails() {
        let h = harness(
            MockProvider {
                token: Some("access-token".to_string()),
                profile: Err(OAuth2Error::MissingProfileField("family_name")),
            },
            MockResolver::with_customer("jane@example.com"),
        )
        .await;

        let state = h.state.set_state("session1").await.unwrap();
        let outcome = h.callback.handle("session1", &params("auth-code", &state)).await;

        assert_eq!(
            outcome,
            CallbackOutcome::Failed {
                notice: SIGN_IN_FAILED_NOTICE
            }
        );
        assert_eq!(outcome.destination(), Destination::Login);
    }

    #[tokio::test]
    async fn test_unknown_customer_requires_registration() {
        let h = harness(MockProvider::happy(), MockResolver::empty()).await;

        let state = h.state.set_state("session1").await.unwrap();
        let outcome = h.callback.handle("session1", &params("auth-code", &state)).await;

        assert_eq!(outcome, CallbackOutcome::RegistrationRequired);
        assert_eq!(outcome.destination(), Destination::Login);
        assert_eq!(outcome.notice(), Some(REGISTRATION_REQUIRED_NOTICE));
        assert!(h.sessions.logins.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_intent_reaches_resolver_and_is_cleared() {
        let h = harness(MockProvider::happy(), MockResolver::empty()).await;

        let RedirectOutcome::Authorize { url } = h
            .redirect
            .initiate(
                "session1",
                RedirectRequest {
                    is_register: true,
                    is_at_checkout: false,
                },
            )
            .await
        else {
            panic!("Expected Authorize outcome");
        };

        let state = state_from_url(&url);
        h.callback.handle("session1", &params("auth-code", &state)).await;

        assert_eq!(*h.resolver.seen_register_hint.lock().unwrap(), Some(true));
        assert!(!h.state.is_register_request("session1").await.unwrap());
    }

    #[tokio::test]
    async fn test_disabled_feature_fails_both_flows() {
        let cache = CacheStoreKind::Memory.connect().await.unwrap();
        let state = AuthStateStore::new(cache);
        let config = Arc::new(TestConfig { enabled: false });
        let provider: Arc<dyn crate::oauth2::OAuthProvider> = Arc::new(MockProvider::happy());

        let redirect = RedirectFlow::new(config.clone(), provider.clone(), state.clone());
        let callback = CallbackFlow::new(
            config,
            provider,
            state.clone(),
            Arc::new(MockResolver::empty()),
            Arc::new(MockSessions::default()),
        );

        let outcome = redirect.initiate("session1", RedirectRequest::default()).await;
        assert_eq!(outcome, RedirectOutcome::Failed);

        let outcome = callback.handle("session1", &params("code", "state")).await;
        assert_eq!(
            outcome,
            CallbackOutcome::Failed {
                notice: SIGN_IN_FAILED_NOTICE
            }
        );
    }

    #[tokio::test]
    async fn test_redirect_without_flags_records_no_intent() {
        let h = harness(MockProvider::happy(), MockResolver::empty()).await;

        let outcome = h
            .redirect
            .initiate("session1", RedirectRequest::default())
            .await;

        assert!(matches!(outcome, RedirectOutcome::Authorize { .. }));
        assert!(!h.state.is_at_checkout("session1").await.unwrap());
        assert!(!h.state.is_register_request("session1").await.unwrap());
    }
}
