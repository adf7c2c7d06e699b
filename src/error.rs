use crate::request::Verb;
use crate::response::Payload;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SqtpError>;

/// Builder state rejected before any network activity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} requires row values")]
    MissingValues(Verb),

    #[error("UPDATE requires at least one assignment")]
    MissingAssignment,

    #[error("{0} requires a WHERE or WHERE-IN predicate (use \"*\" to target every row)")]
    MissingPredicate(Verb),

    #[error("{0} mixes the \"*\" wildcard with narrower predicates")]
    AmbiguousWildcard(Verb),

    #[error("{operation} requires a {header} header")]
    MissingHeader {
        operation: &'static str,
        header: &'static str,
    },

    #[error("column {0} is used both as an assignment and as a WHERE-IN predicate")]
    ConflictingColumn(String),
}

#[derive(Debug, Error)]
pub enum SqtpError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: Payload },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SqtpError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SqtpError::Timeout(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SqtpError::Validation(_))
    }

    /// Status code of a non-2xx response, if this error carries one
    pub fn status(&self) -> Option<u16> {
        match self {
            SqtpError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for SqtpError {
    fn from(err: reqwest::Error) -> Self {
        SqtpError::Transport(err.to_string())
    }
}
