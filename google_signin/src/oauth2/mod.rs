mod errors;
mod google;
mod provider;
mod types;

pub use errors::OAuth2Error;
pub use google::{GoogleEndpoints, GoogleProvider};
pub use provider::OAuthProvider;
pub use types::{CallbackParams, UserProfile};
