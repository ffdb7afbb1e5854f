pub mod controllers;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::auth::{Credentials, FileTokenStore, MemoryTokenStore, Session, TokenPair, TokenStore};
pub use domain::client::{ApiClient, ApiRequest, ApiResponse, ClientConfig};
pub use domain::shared::{ClientError, ClientResult};
