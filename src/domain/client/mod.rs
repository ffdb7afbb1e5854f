pub mod api_client;
pub mod config;
pub mod request;

pub use api_client::{ApiClient, HEALTH_PATH};
pub use config::{endpoint, ClientConfig};
pub use request::{ApiRequest, ApiResponse};
