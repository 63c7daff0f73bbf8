use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid url {url:?}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("invalid request signature {0:?}: expected \"<METHOD> <URL>\"")]
    InvalidSignature(String),

    #[error("json encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}
