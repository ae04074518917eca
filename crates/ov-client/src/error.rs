use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    HttpClientBuild(String),

    #[error("invalid base URL {0:?}: expected http:// or https://")]
    InvalidBaseUrl(String),
}
