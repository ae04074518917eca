//! HTTP access to the overlay REST API.

pub mod config;
pub mod error;
pub mod http;
pub mod script;

pub use config::ClientConfig;
pub use error::ClientError;
pub use http::HttpBackend;
