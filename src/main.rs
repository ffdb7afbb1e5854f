use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use patients_gateway::infrastructure::config::{Config, LogFormat};
use patients_gateway::infrastructure::http::start_http_server;
use patients_gateway::infrastructure::proxy::{wait_for_upstream, UpstreamClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        upstream = %config.upstream_url,
        "Starting patients gateway on {}:{}",
        config.host,
        config.port
    );

    if config.is_development() {
        tracing::debug!(?config, "Loaded configuration");
    }

    let upstream = UpstreamClient::new(&config)?;

    // Hold traffic until the application server is healthy
    if config.wait_for_upstream {
        let policy = config.health_policy();
        tracing::info!(
            path = %policy.path,
            retries = policy.retries,
            interval = ?policy.interval,
            "Waiting for upstream"
        );
        wait_for_upstream(&upstream, &policy).await?;
    } else {
        tracing::warn!("WAIT_FOR_UPSTREAM disabled, forwarding without a health gate");
    }

    start_http_server(Arc::new(config), Arc::new(upstream)).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "patients_gateway=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "patients_gateway=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
