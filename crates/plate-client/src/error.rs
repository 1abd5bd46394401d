//! Client construction errors

/// Failure building an impact service client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Base URL could not be parsed or cannot carry paths
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// reqwest refused the client configuration
    #[error("failed to build http client: {0}")]
    Build(#[from] reqwest::Error),
}
