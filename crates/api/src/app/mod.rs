//! HTTP application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `routes/`: HTTP routes + handlers (one file per entity area)
//! - `dto.rs`: request DTOs and their input validation
//! - config + dependency injection live here: the store, cache, and
//!   exposure policy are constructed once and passed in explicitly, never
//!   referenced as process-wide singletons.

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use coursedesk_auth::Hs256JwtValidator;
use coursedesk_infra::{InMemoryEntityStore, TtlCache};

use crate::middleware;
use crate::pipeline::{ExposurePolicy, Pipeline};
use self::routes::users::User;

pub mod dto;
pub mod routes;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// The single development/production switch: gates diagnostic exposure
    /// in failure envelopes and verbose logging.
    pub development: bool,
    pub jwt_secret: String,
}

impl AppConfig {
    pub const DEV_SECRET: &'static str = "dev-secret";

    pub fn from_env() -> Self {
        let development = std::env::var("DEV_MODE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let jwt_secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| Self::DEV_SECRET.to_string());

        Self {
            development,
            jwt_secret,
        }
    }
}

/// Injected collaborators shared by the entity routes.
pub struct AppState {
    pub store: Arc<InMemoryEntityStore<User>>,
    pub cache: Arc<TtlCache<User>>,
    pub pipeline: Pipeline,
}

/// Build the collaborators separately from the router so tests can keep a
/// handle on the store/cache (e.g. to script backend failures).
pub fn build_state(config: &AppConfig) -> Arc<AppState> {
    let policy = ExposurePolicy {
        development: config.development,
    };

    let store = Arc::new(
        InMemoryEntityStore::new().with_unique_index("email", |u: &User| u.email.to_lowercase()),
    );
    let cache = Arc::new(TtlCache::with_system_clock());

    Arc::new(AppState {
        store,
        cache,
        pipeline: Pipeline::new(policy),
    })
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: AppConfig) -> Router {
    let state = build_state(&config);
    build_app_with_state(config, state)
}

pub fn build_app_with_state(config: AppConfig, state: Arc<AppState>) -> Router {
    let jwt = Arc::new(Hs256JwtValidator::new(config.jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState {
        jwt,
        pipeline: state.pipeline,
    };

    // Protected routes: require auth + principal context.
    let protected = routes::router()
        .layer(Extension(state))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}
