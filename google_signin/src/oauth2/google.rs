use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use subtle::ConstantTimeEq;
use url::Url;

use crate::config::ConfigProvider;

use super::errors::OAuth2Error;
use super::provider::OAuthProvider;
use super::types::{AuthorizationRequest, UserProfile};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

pub(crate) const OAUTH2_SCOPE: &str = "email profile";

/// Provider endpoint set; defaults to Google's public endpoints and is
/// overridable for tests and alternate deployments.
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

/// Google implementation of [`OAuthProvider`].
pub struct GoogleProvider {
    config: Arc<dyn ConfigProvider>,
    endpoints: GoogleEndpoints,
    redirect_uri: String,
    client: reqwest::Client,
}

impl GoogleProvider {
    pub fn new(config: Arc<dyn ConfigProvider>, redirect_uri: impl Into<String>) -> Self {
        Self::with_endpoints(config, redirect_uri, GoogleEndpoints::default())
    }

    pub fn with_endpoints(
        config: Arc<dyn ConfigProvider>,
        redirect_uri: impl Into<String>,
        endpoints: GoogleEndpoints,
    ) -> Self {
        Self {
            config,
            endpoints,
            redirect_uri: redirect_uri.into(),
            client: http_client(),
        }
    }
}

/// HTTP client for the outbound provider calls.
///
/// `timeout` is 30 seconds so a stalled provider surfaces as an ordinary
/// error within the request lifecycle instead of hanging it. Pool settings
/// follow reqwest defaults suitable for short-lived OAuth2 calls.
fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .expect("Failed to create reqwest client")
}

/// Parse a provider response body, degrading to an empty object on garbage.
///
/// The provider is not trusted to return JSON on every path; the field
/// mapping downstream turns the empty object into a typed error.
fn parse_body(body: &str) -> Value {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("Failed to parse provider response body: {e}");
            Value::Object(serde_json::Map::new())
        }
    }
}

/// Map a parsed user-info body to the canonical profile.
///
/// Every mapped field must exist and be a string; the error names the first
/// offending field.
fn map_profile(body: &Value) -> Result<UserProfile, OAuth2Error> {
    let fields = body
        .as_object()
        .filter(|o| !o.is_empty())
        .ok_or(OAuth2Error::MalformedResponse)?;

    let required = |name: &'static str| -> Result<String, OAuth2Error> {
        fields
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(OAuth2Error::MissingProfileField(name))
    };

    Ok(UserProfile {
        email: required("email")?,
        first_name: required("given_name")?,
        last_name: required("family_name")?,
    })
}

#[async_trait]
impl OAuthProvider for GoogleProvider {
    fn authorization_url(&self, state: &str) -> Result<String, OAuth2Error> {
        let request = AuthorizationRequest::new(
            self.config.client_key()?,
            self.redirect_uri.clone(),
            state.to_string(),
        );

        let url = Url::parse_with_params(&self.endpoints.auth_url, request.query_pairs())
            .map_err(|e| OAuth2Error::Url(e.to_string()))?;

        Ok(url.into())
    }

    fn validate_callback(&self, code: &str, state: &str, expected: &str) -> bool {
        !code.is_empty() && bool::from(state.as_bytes().ct_eq(expected.as_bytes()))
    }

    async fn exchange_code_for_token(&self, code: &str) -> Result<Option<String>, OAuth2Error> {
        let client_id = self.config.client_key()?;
        let client_secret = self.config.client_secret()?;

        let response = self
            .client
            .post(&self.endpoints.token_url)
            .form(&[
                ("code", code),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!("Token endpoint returned {status}");
        }

        // A response without a string access_token is "no token", not a
        // protocol error; the orchestrator decides what that means.
        let token = parse_body(&body)
            .get("access_token")
            .and_then(Value::as_str)
            .map(str::to_owned);

        Ok(token)
    }

    async fn fetch_user_profile(&self, access_token: &str) -> Result<UserProfile, OAuth2Error> {
        let response = self
            .client
            .get(&self.endpoints.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OAuth2Error::FetchUserInfo(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| OAuth2Error::FetchUserInfo(e.to_string()))?;

        map_profile(&parse_body(&body))
    }
}
