//! Error taxonomy for a single handler invocation.
//!
//! Every variant is fatal: the invocation stops, the cause is logged, and the
//! process exits with [`HandlerError::exit_code`]. Launch problems are not
//! represented here; they are collected as warnings in
//! [`crate::launcher::LaunchOutcome`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
    /// No custom-scheme argument was passed.
    #[error("no protocol URL passed; this program is meant to be launched by clicking wzreplay:// links")]
    Usage,

    /// Argument is not a `wzreplay:` URI or carries no usable URL.
    #[error("{0}")]
    ProtocolParse(String),

    /// Extracted URL fails the allow-list.
    #[error("URL not allowed ({reason}): {url}")]
    Validation { url: String, reason: String },

    /// Required platform information (user-data root) is missing.
    #[error("{0}")]
    Environment(String),

    /// Directory creation, enumeration or rename failed.
    #[error("filesystem: {0:#}")]
    Filesystem(anyhow::Error),

    /// Transport failure or non-success HTTP status.
    #[error("download failed: {0:#}")]
    Transfer(anyhow::Error),

    /// Config file unreadable or malformed.
    #[error("config: {0:#}")]
    Config(anyhow::Error),
}

impl HandlerError {
    /// Process exit status for this error. Success is 0 and never produced here.
    pub fn exit_code(&self) -> u8 {
        match self {
            HandlerError::Usage => 2,
            HandlerError::ProtocolParse(_) => 3,
            HandlerError::Validation { .. } => 4,
            HandlerError::Environment(_) => 5,
            HandlerError::Transfer(_) => 6,
            HandlerError::Filesystem(_) => 7,
            HandlerError::Config(_) => 8,
        }
    }
}

pub type HandlerResult<T> = Result<T, HandlerError>;
