use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
    routing::get,
};

use google_signin::{
    CallbackFlow, CallbackParams, Destination, RedirectFlow, RedirectOutcome, RedirectRequest,
    SOMETHING_WENT_WRONG_NOTICE, VALIDATION_FAILED_NOTICE,
};

use super::session::{ensure_session_id, session_id_from_headers};

/// Shared handler state for the sign-in routes.
#[derive(Clone)]
pub struct SignInState {
    pub redirect: Arc<RedirectFlow>,
    pub callback: Arc<CallbackFlow>,
}

impl SignInState {
    pub fn new(redirect: RedirectFlow, callback: CallbackFlow) -> Self {
        Self {
            redirect: Arc::new(redirect),
            callback: Arc::new(callback),
        }
    }
}

/// Routes for the sign-in round trip; nest under the storefront's auth
/// prefix (e.g. `/auth`).
pub fn router(state: SignInState) -> Router {
    Router::new()
        .route("/redirect", get(redirect_to_provider))
        .route("/callback", get(authorized_callback))
        .with_state(state)
}

/// Truthy query flags as the storefront links emit them.
fn flag(params: &HashMap<String, String>, name: &str) -> bool {
    params
        .get(name)
        .is_some_and(|v| matches!(v.as_str(), "true" | "1"))
}

/// Destination paths are storefront-relative; notices ride along as a query
/// parameter for the storefront to display.
fn destination_uri(destination: Destination, notice: Option<&str>) -> String {
    let path = format!("/{}", destination.path());
    match notice {
        Some(message) => format!("{path}?notice={}", urlencoding::encode(message)),
        None => path,
    }
}

async fn redirect_to_provider(
    State(state): State<SignInState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (HeaderMap, Redirect) {
    let mut response_headers = HeaderMap::new();

    let Some(session) = ensure_session_id(&headers, &mut response_headers) else {
        return (
            response_headers,
            Redirect::to(&destination_uri(
                Destination::Login,
                Some(SOMETHING_WENT_WRONG_NOTICE),
            )),
        );
    };

    let request = RedirectRequest {
        is_register: flag(&params, "is_register"),
        is_at_checkout: flag(&params, "is_at_checkout"),
    };

    match state.redirect.initiate(&session, request).await {
        RedirectOutcome::Authorize { url } => (response_headers, Redirect::to(&url)),
        RedirectOutcome::Failed => (
            response_headers,
            Redirect::to(&destination_uri(
                Destination::Login,
                Some(SOMETHING_WENT_WRONG_NOTICE),
            )),
        ),
    }
}

async fn authorized_callback(
    State(state): State<SignInState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    // Without a session cookie there is no minted state to validate against
    let Some(session) = session_id_from_headers(&headers) else {
        tracing::debug!("Callback without session cookie");
        return Redirect::to(&destination_uri(
            Destination::Login,
            Some(VALIDATION_FAILED_NOTICE),
        ));
    };

    let outcome = state.callback.handle(&session, &params).await;

    Redirect::to(&destination_uri(outcome.destination(), outcome.notice()))
}
