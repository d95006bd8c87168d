//! google-signin-axum - axum routes for the google-signin customer flow
//!
//! Exposes the two HTTP entry points of the round trip: the redirect to the
//! provider consent screen and the authorized callback. The storefront nests
//! the router under its auth prefix and supplies the flows, built with its
//! own configuration, identity resolver and session manager.

mod router;
mod session;

pub use router::{SignInState, router};
pub use session::{SESSION_COOKIE_NAME, session_id_from_headers};
