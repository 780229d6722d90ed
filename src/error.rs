//! Error taxonomy for a single upload or question.
//!
//! Every variant is terminal for the request that produced it; nothing is
//! retried automatically.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The question was empty or whitespace-only. No request was sent.
    #[error("question must not be empty")]
    EmptyQuestion,

    /// The server answered with an `{"error": ...}` body.
    #[error("{0}")]
    Server(String),

    /// The request never produced a usable response: connection failure,
    /// timeout, or a body that was not the expected JSON.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ClientError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::transport(err)
    }
}
