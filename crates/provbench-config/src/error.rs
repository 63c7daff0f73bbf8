use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("yaml parse error in {path}: {source}")]
    YamlParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("project is not set; set it in the config or via one of {0:?}")]
    MissingProject(&'static [&'static str]),

    #[error("region is not set")]
    MissingRegion,

    #[error("no credentials: {0}")]
    MissingCredentials(String),

    #[error("invalid base path for {service}: {url:?} ({message})")]
    InvalidBasePath {
        service: &'static str,
        url: String,
        message: String,
    },

    #[error("invalid value for {var}: {message}")]
    InvalidEnv { var: String, message: String },

    #[error("GCP auth failed: {0}")]
    Auth(String),
}
