use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("field '{key}' must be {expected}")]
    InvalidField { key: String, expected: &'static str },
}
