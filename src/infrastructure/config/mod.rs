use reqwest::Url;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub upstream_url: Url,
    pub static_root: PathBuf,
    pub static_prefix: String,
    pub static_max_age_secs: u64,
    pub max_body_bytes: usize,
    pub connect_timeout_secs: u64,
    pub send_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub upstream_health_path: String,
    pub upstream_health_interval_secs: u64,
    pub upstream_health_timeout_secs: u64,
    pub upstream_health_retries: u32,
    pub wait_for_upstream: bool,
    pub environment: Environment,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// How the upstream liveness endpoint is polled before traffic is forwarded
#[derive(Debug, Clone, PartialEq)]
pub struct HealthPolicy {
    pub path: String,
    pub interval: Duration,
    pub timeout: Duration,
    pub retries: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let upstream_url = env::var("UPSTREAM_URL")
            .map_err(|_| "UPSTREAM_URL must be set")?;

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            upstream_url: Url::parse(&upstream_url)?,
            static_root: env::var("STATIC_ROOT")
                .unwrap_or_else(|_| "./staticfiles".to_string())
                .into(),
            static_prefix: normalize_prefix(
                &env::var("STATIC_PREFIX").unwrap_or_else(|_| "/static".to_string()),
            ),
            static_max_age_secs: env::var("STATIC_MAX_AGE_SECS")
                .unwrap_or_else(|_| "2592000".to_string())
                .parse()?,
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .unwrap_or_else(|_| "10485760".to_string())
                .parse()?,
            connect_timeout_secs: env::var("PROXY_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            send_timeout_secs: env::var("PROXY_SEND_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            read_timeout_secs: env::var("PROXY_READ_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            upstream_health_path: env::var("UPSTREAM_HEALTH_PATH")
                .unwrap_or_else(|_| "/api/health/".to_string()),
            upstream_health_interval_secs: env::var("UPSTREAM_HEALTH_INTERVAL_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            upstream_health_timeout_secs: env::var("UPSTREAM_HEALTH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            upstream_health_retries: env::var("UPSTREAM_HEALTH_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            wait_for_upstream: env::var("WAIT_FOR_UPSTREAM")
                .map(|s| s.to_lowercase() != "false")
                .unwrap_or(true),
            environment: env::var("ENVIRONMENT")
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })
                .unwrap_or(Environment::Development),
            log_format: env::var("LOG_FORMAT")
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })
                .unwrap_or(LogFormat::Pretty),
        };

        if config.static_prefix == "/" {
            return Err("STATIC_PREFIX cannot be the root path".into());
        }

        if config.upstream_health_retries == 0 {
            return Err("UPSTREAM_HEALTH_RETRIES must be at least 1".into());
        }

        Ok(config)
    }

    /// Defaults for everything except the upstream; used by tests and embedders
    pub fn with_upstream(upstream_url: Url) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            upstream_url,
            static_root: "./staticfiles".into(),
            static_prefix: "/static".to_string(),
            static_max_age_secs: 2_592_000,
            max_body_bytes: 10 * 1024 * 1024,
            connect_timeout_secs: 60,
            send_timeout_secs: 60,
            read_timeout_secs: 60,
            upstream_health_path: "/api/health/".to_string(),
            upstream_health_interval_secs: 30,
            upstream_health_timeout_secs: 10,
            upstream_health_retries: 3,
            wait_for_upstream: true,
            environment: Environment::Development,
            log_format: LogFormat::Pretty,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn health_policy(&self) -> HealthPolicy {
        HealthPolicy {
            path: self.upstream_health_path.clone(),
            interval: Duration::from_secs(self.upstream_health_interval_secs),
            timeout: Duration::from_secs(self.upstream_health_timeout_secs),
            retries: self.upstream_health_retries,
        }
    }
}

/// `static/` and `/static/` both mount at `/static`
fn normalize_prefix(prefix: &str) -> String {
    format!("/{}", prefix.trim_matches('/'))
}
