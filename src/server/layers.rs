//! Cross-cutting HTTP layers: access log, CORS, response headers, rate limit.

use crate::config::RateLimitConfig;
use crate::error::{ApiErrorObject, AppError};
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{
        HeaderName, HeaderValue, Method, StatusCode, Version,
        header::{
            ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN, REFERRER_POLICY, USER_AGENT,
            X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};
use base64::Engine as _;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use rand::RngCore;
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::{Arc, Weak},
    time::{Duration, Instant},
};
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
};
use tracing::{debug, error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");

fn generate_request_id() -> String {
    // 96 bits => 16 chars base64url (no padding).
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn protocol_name(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

/// One log line per request; echoes or assigns `x-request-id`.
pub async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let protocol = protocol_name(req.version());

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(generate_request_id, str::to_string);

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status().as_u16();
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let line = format!(
        "| {status:>3} | {request_id} | {:^7} | {protocol:<8} | {path} | {latency_ms}ms | {user_agent}",
        method.as_str()
    );

    if resp.status().is_server_error() {
        error!("{line}");
    } else if resp.status().is_client_error() {
        warn!("{line}");
    } else {
        info!("{line}");
    }

    resp
}

/// Builds the CORS policy.
///
/// With no configured origins every origin is mirrored back without
/// credentials. Otherwise only the listed origins are allowed, with
/// credentials.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, AppError> {
    let methods = [
        Method::GET,
        Method::HEAD,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if origins.is_empty() {
        return Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(methods)
            .allow_headers(AllowHeaders::mirror_request()));
    }

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| AppError::InvalidConfig(format!("bad CORS origin {origin:?}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT, ORIGIN, X_REQUESTED_WITH])
        .allow_credentials(true))
}

/// `nosniff`, same-origin framing and no referrer, unless a handler set them.
pub fn security_header_layers() -> [SetResponseHeaderLayer<HeaderValue>; 3] {
    [
        SetResponseHeaderLayer::if_not_present(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        SetResponseHeaderLayer::if_not_present(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ),
        SetResponseHeaderLayer::if_not_present(
            REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ),
    ]
}

pub type ClientLimiter = DefaultKeyedRateLimiter<IpAddr>;

/// How often idle peers are dropped from the limiter's keyed store.
pub const LIMITER_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

pub fn client_limiter(cfg: &RateLimitConfig) -> Result<Arc<ClientLimiter>, AppError> {
    let per_minute = NonZeroU32::new(cfg.per_minute).ok_or_else(|| {
        AppError::InvalidConfig("http.rate_limit.per_minute must be positive".to_string())
    })?;
    let burst = NonZeroU32::new(cfg.burst).ok_or_else(|| {
        AppError::InvalidConfig("http.rate_limit.burst must be positive".to_string())
    })?;
    Ok(Arc::new(RateLimiter::keyed(
        Quota::per_minute(per_minute).allow_burst(burst),
    )))
}

/// Periodically forgets peers whose bucket has refilled, so the keyed store
/// only holds clients seen within roughly one refill window. The task exits
/// once the limiter itself is dropped.
pub fn spawn_limiter_pruner(limiter: &Arc<ClientLimiter>, every: Duration) {
    let weak: Weak<ClientLimiter> = Arc::downgrade(limiter);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(limiter) = weak.upgrade() else {
                break;
            };
            limiter.retain_recent();
            limiter.shrink_to_fit();
            debug!(tracked = limiter.len(), "rate limiter pruned");
        }
    });
}

/// Rejects with 429 once the peer exhausts its quota. Requests without a
/// known peer address share one bucket.
pub async fn rate_limit(
    State(limiter): State<Arc<ClientLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |ConnectInfo(addr)| {
            addr.ip()
        });

    if limiter.check_key(&client).is_err() {
        warn!(%client, "rate limit exceeded");
        return ApiErrorObject::too_many_requests().into_response_with(StatusCode::TOO_MANY_REQUESTS);
    }
    next.run(req).await
}
