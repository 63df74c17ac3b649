use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("invalid request URL: {0}")]
    Url(String),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API URL `{value}` (from {source_name}): {reason}")]
    InvalidUrl {
        value: String,
        source_name: &'static str,
        reason: String,
    },
}
