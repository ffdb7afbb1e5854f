pub mod error;
pub mod error_dto;

pub use error::{ClientError, ClientResult};
pub use error_dto::{ApiErrorBody, TOKEN_NOT_VALID};
