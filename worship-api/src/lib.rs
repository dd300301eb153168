//! worship-api library - HTTP surface of the worship group service
//!
//! Members, songs and scales over REST, behind bearer-token auth with an
//! admin gate on every write.

use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue};
use axum::Router;
use chrono::Duration;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use worship_common::Store;

pub mod api;

use api::rate_limit::RateLimiter;

/// Token signing settings
#[derive(Clone)]
pub struct AuthSettings {
    /// Secret mixed into every token signature
    pub secret: Arc<str>,
    /// Lifetime of newly issued tokens
    pub token_ttl: Duration,
}

impl AuthSettings {
    pub fn new(secret: impl Into<Arc<str>>, token_ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            token_ttl,
        }
    }
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The one entity store for this process
    pub store: Arc<Store>,
    pub auth: AuthSettings,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<Store>, auth: AuthSettings, limiter: RateLimiter) -> Self {
        Self {
            store,
            auth,
            limiter: Arc::new(limiter),
        }
    }
}

/// Hardening headers added to every response, including 401 and 429
pub const SECURITY_HEADERS: [(HeaderName, &str); 5] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
    (header::REFERRER_POLICY, "no-referrer"),
    (
        header::STRICT_TRANSPORT_SECURITY,
        "max-age=15552000; includeSubDomains",
    ),
    (header::X_XSS_PROTECTION, "0"),
];

/// Build application router
///
/// Public: `/`, `/health`, `/auth/login`.
/// Protected (bearer token; admin for writes): `/members`, `/music`, `/scales`.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/members", get(api::list_members).post(api::create_member))
        .route(
            "/members/:id",
            get(api::get_member)
                .put(api::update_member)
                .delete(api::delete_member),
        )
        .route("/music", get(api::list_songs).post(api::create_song))
        .route(
            "/music/:id",
            get(api::get_song)
                .put(api::update_song)
                .delete(api::delete_song),
        )
        .route("/scales", get(api::list_scales).post(api::create_scale))
        .route(
            "/scales/:id",
            get(api::get_scale)
                .put(api::update_scale)
                .delete(api::delete_scale),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/", get(api::service_info))
        .route("/auth/login", post(api::login))
        .merge(api::health_routes());

    let mut router = Router::new()
        .merge(protected)
        .merge(public)
        .fallback(api::route_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::rate_limit_middleware,
        ));

    for (name, value) in SECURITY_HEADERS {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            name,
            HeaderValue::from_static(value),
        ));
    }

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
