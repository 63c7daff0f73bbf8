use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("config must be loaded with load_and_validate before use")]
    ConfigNotLoaded,

    #[error("config error: {0}")]
    Config(#[from] provbench_config::ConfigError),

    #[error("transport error: {0}")]
    Transport(#[from] provbench_transport::TransportError),

    #[error("googleapi: error {code}: {message}")]
    Status { code: u16, message: String },

    #[error("invalid url {0:?}")]
    InvalidUrl(String),

    #[error("invalid header value for {name}")]
    InvalidHeader { name: &'static str },

    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response is missing field {0:?}")]
    MissingField(&'static str),

    #[error("operation failed: {0}")]
    OperationFailed(String),

    #[error("list returned page token {0:?} twice")]
    RepeatedPageToken(String),

    #[error("operation {0} timed out after 30 polls")]
    OperationTimeout(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { code: 404, .. })
    }
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Domain(#[from] provbench_domain::DomainError),

    #[error("{resource} {name:?} is in unhealthy state {status}")]
    Unhealthy {
        resource: &'static str,
        name: String,
        status: String,
    },

    #[error("resource type {0} is registered twice")]
    DuplicateResource(String),
}
