mod callback;
mod errors;
mod redirect;
mod types;

pub use callback::{
    CallbackFlow, CallbackOutcome, REGISTRATION_REQUIRED_NOTICE, SIGN_IN_FAILED_NOTICE,
    VALIDATION_FAILED_NOTICE,
};
pub use errors::CoordinationError;
pub use redirect::{RedirectFlow, RedirectOutcome, RedirectRequest, SOMETHING_WENT_WRONG_NOTICE};
pub use types::{
    Destination, Identity, IdentityError, IdentityResolver, SessionError, SessionManager,
};
