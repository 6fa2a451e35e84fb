//! Static status endpoints. Neither handler reads the request or the
//! application state.

use axum::{Json, Router, routing::get};
use serde::Serialize;

/// Body shared by the status endpoints. Field order is the wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBody {
    pub message: &'static str,
    pub status: &'static str,
}

pub const SERVICE_STATUS: StatusBody = StatusBody {
    message: "Tax Filing Admin Panel API",
    status: "running",
};

pub const HEALTH_STATUS: StatusBody = StatusBody {
    message: "Admin panel API is running",
    status: "healthy",
};

pub async fn service_status() -> Json<StatusBody> {
    Json(SERVICE_STATUS)
}

pub async fn health_check() -> Json<StatusBody> {
    Json(HEALTH_STATUS)
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(service_status))
        .route("/api/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bodies_serialize_to_fixed_bytes() {
        assert_eq!(
            serde_json::to_string(&SERVICE_STATUS).unwrap(),
            r#"{"message":"Tax Filing Admin Panel API","status":"running"}"#
        );
        assert_eq!(
            serde_json::to_string(&HEALTH_STATUS).unwrap(),
            r#"{"message":"Admin panel API is running","status":"healthy"}"#
        );
    }
}
