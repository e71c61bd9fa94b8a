use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::parser::ParseError;

/// Failures talking to the model provider. Every variant is fatal for the current run.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Provider API error: {0}")]
    Api(String),

    #[error("Malformed response body: {0}")]
    MalformedBody(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err)
    }
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Model call failed: {0}")]
    ModelCall(#[from] ProviderError),

    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] ParseError),

    #[error("Step limit of {0} exceeded without an answer")]
    StepLimitExceeded(usize),

    #[error("Deadline of {0:?} exceeded without an answer")]
    DeadlineExceeded(Duration),

    #[error("Run cancelled")]
    Cancelled,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
