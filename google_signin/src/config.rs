use std::env;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),
}

/// Storefront configuration for the Google sign-in feature.
///
/// Backed by whatever the platform uses for admin configuration; credentials
/// are expected to be stored encrypted at rest and handed out decrypted. A
/// missing key is a fatal configuration error, never a silent default.
pub trait ConfigProvider: Send + Sync {
    /// Whether the sign-in button is enabled for the storefront.
    fn is_enabled(&self) -> bool;

    /// OAuth2 client id registered with the provider.
    fn client_key(&self) -> Result<String, ConfigError>;

    /// OAuth2 client secret registered with the provider.
    fn client_secret(&self) -> Result<String, ConfigError>;
}

/// Environment-backed configuration.
pub struct EnvConfig;

const ENABLED_VAR: &str = "GOOGLE_SIGNIN_ENABLED";
const CLIENT_ID_VAR: &str = "GOOGLE_SIGNIN_CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "GOOGLE_SIGNIN_CLIENT_SECRET";

impl ConfigProvider for EnvConfig {
    fn is_enabled(&self) -> bool {
        env::var(ENABLED_VAR)
            .map(|v| matches!(v.as_str(), "true" | "1"))
            .unwrap_or(false)
    }

    fn client_key(&self) -> Result<String, ConfigError> {
        env::var(CLIENT_ID_VAR).map_err(|_| ConfigError::Missing(CLIENT_ID_VAR))
    }

    fn client_secret(&self) -> Result<String, ConfigError> {
        env::var(CLIENT_SECRET_VAR).map_err(|_| ConfigError::Missing(CLIENT_SECRET_VAR))
    }
}
