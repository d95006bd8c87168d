//! google-signin - "Sign in with Google" for storefront customers
//!
//! This crate implements the OAuth2 authorization-code round trip behind a
//! storefront's Google sign-in button: building the consent-screen redirect,
//! minting and validating per-session anti-forgery state, exchanging the
//! callback code for an access token, mapping the provider profile and
//! resuming the shopper's pre-auth intent (checkout vs. account). The
//! platform pieces - customer accounts, the authenticated session, admin
//! configuration - stay behind narrow collaborator traits.

mod config;
mod coordination;
mod oauth2;
mod state;
mod storage;
mod utils;

pub use config::{ConfigError, ConfigProvider, EnvConfig};

pub use coordination::{
    CallbackFlow, CallbackOutcome, CoordinationError, Destination, Identity, IdentityError,
    IdentityResolver, REGISTRATION_REQUIRED_NOTICE, RedirectFlow, RedirectOutcome,
    RedirectRequest, SIGN_IN_FAILED_NOTICE, SOMETHING_WENT_WRONG_NOTICE, SessionError,
    SessionManager, VALIDATION_FAILED_NOTICE,
};

pub use oauth2::{
    CallbackParams, GoogleEndpoints, GoogleProvider, OAuth2Error, OAuthProvider, UserProfile,
};

pub use state::{AuthStateStore, STATE_TTL, StateError, StateToken};

pub use storage::{CacheData, CacheStore, CacheStoreKind, SharedCacheStore, StorageError};

pub use utils::gen_random_string;
