use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutoAtError {
    #[error("Member list fetch failed: {0}")]
    Fetch(String),

    #[error("Malformed member list response: {0}")]
    MalformedResponse(String),

    #[error("OneBot API error (retcode {retcode}): {message}")]
    Api { retcode: i64, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, AutoAtError>;
