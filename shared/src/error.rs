use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    #[error("Invalid poll definition")]
    InvalidPoll,
    #[error("Poll already exists")]
    PollAlreadyExists,
    #[error("Poll not found")]
    PollNotFound,
    #[error("Invalid option")]
    InvalidOption,
    #[error("Invalid batch")]
    InvalidBatch,
    #[error("Invalid input provided")]
    InvalidInput,
    #[error("Resource not found")]
    NotFound,
    #[error("Internal system error")]
    SystemError,
}

/// Failures of the poll store and the aggregation service.
///
/// Every variant is recoverable by the caller; none is retried internally.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PollError {
    #[error("Invalid poll: {0}")]
    InvalidPoll(#[from] ValidationError),
    #[error("Poll already exists: {0}")]
    PollAlreadyExists(String),
    #[error("Poll not found: {0}")]
    PollNotFound(String),
    #[error("Invalid option {option:?} for poll {poll_id}")]
    InvalidOption { poll_id: String, option: String },
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),
}

impl PollError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PollError::InvalidPoll(_) => ErrorCode::InvalidPoll,
            PollError::PollAlreadyExists(_) => ErrorCode::PollAlreadyExists,
            PollError::PollNotFound(_) => ErrorCode::PollNotFound,
            PollError::InvalidOption { .. } => ErrorCode::InvalidOption,
            PollError::InvalidBatch(_) => ErrorCode::InvalidBatch,
        }
    }
}

/// Wire form of an error: a stable code plus human-readable text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(details) = &self.details {
            write!(f, "{}: {} ({})", self.code, self.message, details)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Some(details.into()),
        }
    }
}

impl From<&PollError> for Error {
    fn from(err: &PollError) -> Self {
        match err {
            PollError::InvalidPoll(reason) => Error::with_details(err.code(), "Invalid poll", reason.to_string()),
            PollError::PollAlreadyExists(id) | PollError::PollNotFound(id) => {
                Error::with_details(err.code(), err.code().to_string(), id.clone())
            }
            PollError::InvalidOption { option, .. } => {
                Error::with_details(err.code(), err.to_string(), option.clone())
            }
            PollError::InvalidBatch(reason) => Error::with_details(err.code(), "Invalid batch", reason.clone()),
        }
    }
}

impl From<PollError> for Error {
    fn from(err: PollError) -> Self {
        Error::from(&err)
    }
}

pub type Result<T> = std::result::Result<T, PollError>;
