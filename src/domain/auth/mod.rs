pub mod dto;
pub mod session;
pub mod store;

pub use dto::{Credentials, RefreshTokenRequest, RefreshTokenResponse, TokenPair};
pub use session::Session;
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
