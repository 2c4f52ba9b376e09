pub mod cache;
pub mod client;
pub mod endpoints;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
