use thiserror::Error;

/// Input validation failures, always detected before any network call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("region code cannot be empty")]
    EmptyRegion,

    #[error("invalid region code '{code}'. Valid codes are: {valid}")]
    InvalidRegion { code: String, valid: String },

    #[error("invalid video ID format '{0}'. Video IDs are 11 characters of letters, numbers, hyphens, and underscores")]
    InvalidVideoId(String),

    #[error("{service} API key cannot be empty")]
    EmptyApiKey { service: String },

    #[error("{service} API key appears to be too short")]
    ApiKeyTooShort { service: String },
}

/// Errors raised by transport-level operations.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid JSON in response: {0}")]
    InvalidJson(String),
}

/// Top-level fetch error taxonomy.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("unexpected upstream data: {0}")]
    UpstreamData(String),
}

impl FetchError {
    pub fn missing_key(service: &str) -> Self {
        FetchError::Configuration(format!(
            "{} API key is not set. Add it to your environment or config file.",
            service
        ))
    }
}
