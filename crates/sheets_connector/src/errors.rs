#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Google API error ({status}): {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid service account: {0}")]
    InvalidServiceAccount(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Operation name is reserved: {0}")]
    ReservedOperation(String),
}

pub type Result<T, E = SheetsError> = std::result::Result<T, E>;
