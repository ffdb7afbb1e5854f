use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub mod request_id;
pub mod static_files;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

use crate::controllers::{health, proxy::ProxyController};
use crate::infrastructure::config::Config;
use crate::infrastructure::proxy::UpstreamClient;

/// Routing policy of the proxy:
/// liveness and static files are answered locally, `/api/*` and every other
/// path go to the upstream.
pub fn build_router(config: Arc<Config>, upstream: Arc<UpstreamClient>) -> Router {
    let proxy_controller = Arc::new(ProxyController::new(
        upstream.clone(),
        config.read_timeout(),
    ));

    // Health routes (answered by the proxy itself)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state((upstream, config.clone()));

    // Forwarded routes
    let proxy_routes = Router::new()
        .route("/api/*path", any(ProxyController::forward_api))
        .fallback(ProxyController::forward_default)
        .with_state(proxy_controller);

    Router::new()
        .merge(health_routes)
        .merge(static_files::static_routes(&config))
        .merge(proxy_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(RequestBodyLimitLayer::new(config.max_body_bytes)),
        )
}

/// Serve `app` on `listener` with client addresses available to handlers
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

/// Start the proxy with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    upstream: Arc<UpstreamClient>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(config.clone(), upstream);

    let listener =
        TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Proxy listening on {}", listener.local_addr()?);

    serve(listener, app).await?;

    tracing::info!("Proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
