use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use google_signin::{
    AuthStateStore, CacheStoreKind, CallbackFlow, EnvConfig, GoogleProvider, Identity,
    IdentityError, IdentityResolver, RedirectFlow, SessionError, SessionManager, UserProfile,
};
use google_signin_axum::{SignInState, router as signin_router};

mod handlers;

use handlers::{account, checkout, index, login};

/// Customer directory for the demo: keeps accounts in memory and creates one
/// on the spot when the shopper asked to register.
#[derive(Default)]
struct DemoCustomers {
    by_email: Mutex<HashMap<String, Identity>>,
}

#[async_trait]
impl IdentityResolver for DemoCustomers {
    async fn resolve(
        &self,
        profile: &UserProfile,
        register_requested: bool,
    ) -> Result<Option<Identity>, IdentityError> {
        let mut by_email = self
            .by_email
            .lock()
            .map_err(|e| IdentityError(e.to_string()))?;

        if let Some(identity) = by_email.get(&profile.email) {
            return Ok(Some(identity.clone()));
        }

        if !register_requested {
            return Ok(None);
        }

        let identity = Identity {
            id: uuid::Uuid::new_v4().to_string(),
            email: profile.email.clone(),
        };
        tracing::info!(
            "Registered new customer {} for {} {}",
            identity.id,
            profile.first_name,
            profile.last_name
        );
        by_email.insert(profile.email.clone(), identity.clone());
        Ok(Some(identity))
    }
}

/// Session principal registry for the demo.
#[derive(Default)]
struct DemoSessions {
    principals: Mutex<HashMap<String, Identity>>,
}

#[async_trait]
impl SessionManager for DemoSessions {
    async fn login(&self, session: &str, identity: &Identity) -> Result<(), SessionError> {
        self.principals
            .lock()
            .map_err(|e| SessionError(e.to_string()))?
            .insert(session.to_string(), identity.clone());
        Ok(())
    }
}

fn cache_store_kind() -> CacheStoreKind {
    match env::var("GOOGLE_SIGNIN_CACHE_STORE").as_deref() {
        Ok("redis") => CacheStoreKind::Redis {
            url: env::var("GOOGLE_SIGNIN_CACHE_STORE_URL")
                .expect("GOOGLE_SIGNIN_CACHE_STORE_URL must be set for the redis store"),
        },
        _ => CacheStoreKind::Memory,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let origin = env::var("ORIGIN").unwrap_or_else(|_| "http://localhost:3001".to_string());

    let config = Arc::new(EnvConfig);
    let cache = cache_store_kind().connect().await?;
    let state_store = AuthStateStore::new(cache);
    let provider = Arc::new(GoogleProvider::new(
        config.clone(),
        format!("{origin}/auth/callback"),
    ));
    let customers = Arc::new(DemoCustomers::default());
    let sessions = Arc::new(DemoSessions::default());

    let signin = SignInState::new(
        RedirectFlow::new(config.clone(), provider.clone(), state_store.clone()),
        CallbackFlow::new(config, provider, state_store, customers, sessions),
    );

    let app = Router::new()
        .route("/", get(index))
        .route("/customer/account", get(account))
        .route("/customer/account/login", get(login))
        .route("/checkout", get(checkout))
        .nest("/auth", signin_router(signin));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
    tracing::info!("demo store listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
