use reqwest::StatusCode;
use thiserror::Error;

/// Why a chat request did not produce a reply.
///
/// Never shown to the user; the client collapses every variant into the
/// same rendered error message and only logs the detail.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server answered with status {0}")]
    Status(StatusCode),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}
