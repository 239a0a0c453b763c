//! Error types shared by the panes, the backends and the heartbeat.

use std::fmt;
use thiserror::Error;

/// Optional capabilities a pane may be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Transfer,
    Delete,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Transfer => write!(f, "transfer"),
            Capability::Delete => write!(f, "delete"),
        }
    }
}

/// Failure of a single storage primitive (list, read, write, mkdir, remove).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("already exists: {path}")]
    AlreadyExists { path: String },

    #[error("not found: {path}")]
    NotFound { path: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("FTP error at {path}: {source}")]
    Ftp {
        path: String,
        #[source]
        source: suppaftp::FtpError,
    },

    #[error("{path} is not inside {root}")]
    OutsideRoot { path: String, root: String },

    #[error("{0} is not supported here")]
    Unsupported(&'static str),

    #[error("connection closed")]
    Disconnected,

    #[error("worker failed: {0}")]
    Task(String),
}

impl StoreError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::AlreadyExists => StoreError::AlreadyExists { path },
            std::io::ErrorKind::NotFound => StoreError::NotFound { path },
            _ => StoreError::Io { path, source },
        }
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::Task(err.to_string())
    }
}

/// Errors surfaced by pane operations. Backend failures are wrapped, never replaced.
#[derive(Error, Debug)]
pub enum PaneError {
    #[error("{0} capability is not configured")]
    CapabilityNotConfigured(Capability),

    #[error("failed to list {location}: {source}")]
    ListingFailed {
        location: String,
        #[source]
        source: StoreError,
    },

    #[error("transfer failed: {0}")]
    TransferFailed(#[source] StoreError),

    #[error("delete failed: {0}")]
    DeleteFailed(#[source] StoreError),
}

impl PaneError {
    /// The backend error behind this failure, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            PaneError::CapabilityNotConfigured(_) => None,
            PaneError::ListingFailed { source, .. } => Some(source),
            PaneError::TransferFailed(source) | PaneError::DeleteFailed(source) => Some(source),
        }
    }
}

/// The remote liveness probe failed; the session is gone for good.
#[derive(Error, Debug)]
#[error("connection lost: {0}")]
pub struct HeartbeatLost(#[source] pub StoreError);

pub type StoreResult<T> = Result<T, StoreError>;
pub type PaneResult<T> = Result<T, PaneError>;
