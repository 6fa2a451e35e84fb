use crate::auth::{JwtManager, cookie_key};
use crate::config::Config;
use crate::db::Database;
use crate::error::{ApiErrorObject, AppError};
use crate::server::layers::{
    LIMITER_PRUNE_INTERVAL, access_log, client_limiter, cors_layer, rate_limit,
    security_header_layers, spawn_limiter_pruner,
};
use crate::server::routes::status;

use axum::{
    Router,
    extract::FromRef,
    http::StatusCode,
    middleware,
    response::Response,
};
use axum_extra::extract::cookie::Key;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

/// Everything a handler may need, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub cookie_key: Key,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Self {
        let jwt = Arc::new(JwtManager::new(&config.security));
        let cookie_key = cookie_key(&config.security.secret_key);
        Self {
            db,
            jwt,
            cookie_key,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl FromRef<AppState> for Arc<JwtManager> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

async fn not_found_handler() -> Response {
    ApiErrorObject::not_found().into_response_with(StatusCode::NOT_FOUND)
}

async fn method_not_allowed_handler() -> Response {
    ApiErrorObject::method_not_allowed().into_response_with(StatusCode::METHOD_NOT_ALLOWED)
}

/// Attaches `state` to `routes` and wraps them with the configured HTTP layers.
///
/// Layer order, outermost first: access log, CORS, response headers,
/// rate limit, body limit.
pub fn with_layers(routes: Router<AppState>, state: AppState) -> Result<Router, AppError> {
    let http = &state.config.http;
    let cors = cors_layer(&http.cors_allowed_origins)?;
    let limiter = if http.rate_limit.enabled {
        Some(client_limiter(&http.rate_limit)?)
    } else {
        None
    };
    let security_headers = http.security_headers;
    let body_limit = http.body_limit_bytes;

    let mut router = routes
        .fallback(not_found_handler)
        .method_not_allowed_fallback(method_not_allowed_handler)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(body_limit));

    if let Some(limiter) = limiter {
        if tokio::runtime::Handle::try_current().is_ok() {
            spawn_limiter_pruner(&limiter, LIMITER_PRUNE_INTERVAL);
        }
        router = router.layer(middleware::from_fn_with_state(limiter, rate_limit));
    }
    if security_headers {
        for layer in security_header_layers() {
            router = router.layer(layer);
        }
    }

    Ok(router.layer(cors).layer(middleware::from_fn(access_log)))
}

/// The admin-panel API router.
pub fn app_router(state: AppState) -> Result<Router, AppError> {
    info!(
        cors_origins = state.config.http.cors_allowed_origins.len(),
        rate_limit = state.config.http.rate_limit.enabled,
        "building router"
    );
    with_layers(status::router(), state)
}
