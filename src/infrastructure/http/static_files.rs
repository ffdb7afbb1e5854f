use axum::http::{header::CACHE_CONTROL, HeaderValue};
use axum::response::Response;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::infrastructure::config::Config;

/// Pre-built static files, served from disk without touching the upstream.
///
/// Successful responses get a long-lived `Cache-Control`; misses are plain 404s.
pub fn static_routes(config: &Config) -> Router {
    let cache_control = HeaderValue::from_str(&format!(
        "public, max-age={}",
        config.static_max_age_secs
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=2592000"));

    Router::new()
        .nest_service(&config.static_prefix, ServeDir::new(&config.static_root))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            move |response: &Response| {
                response
                    .status()
                    .is_success()
                    .then(|| cache_control.clone())
            },
        ))
}
