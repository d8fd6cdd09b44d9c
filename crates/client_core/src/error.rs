use thiserror::Error;

/// Failure talking to the assistant backend. The dispatcher treats every
/// variant the same way; the split only matters for diagnostics.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned HTTP {status}")]
    Status { status: u16 },
    #[error("response is not an api envelope: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}
