pub mod layers;
pub mod router;
pub mod routes;

use crate::error::AppError;
use axum::Router;
use std::{future::Future, net::SocketAddr};
use tokio::net::TcpListener;
use tracing::info;

pub use router::{AppState, app_router, with_layers};

/// Serves `router` on `listener` until `shutdown` resolves, then drains
/// in-flight requests. Peer addresses are exposed as `ConnectInfo<SocketAddr>`.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!("HTTP server listening on {}", addr);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}
