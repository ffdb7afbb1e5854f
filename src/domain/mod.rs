pub mod auth;
pub mod client;
pub mod resources;
pub mod shared;
