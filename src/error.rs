use thiserror::Error;

#[derive(Error, Debug)]
pub enum CircleCiError {
    #[error("Invalid parameter: {0}")]
    Validation(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("CircleCI API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to encode JSON: {0}")]
    Encode(serde_json::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CircleCiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CircleCiError>;
