//! Error types for sheaf
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Every kind is raised at the point of detection and propagated unchanged.
//! Nothing here is retried: all operations are deterministic reads over
//! immutable data.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sheaf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sheaf
#[derive(Debug, Error)]
pub enum Error {
    /// Repository root is missing, unreadable, or has malformed control metadata
    #[error("Invalid repository path {path}: {reason}")]
    PathInvalid {
        /// Repository root that was checked
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Manifest path absent from the snapshot
    #[error("Path not found: '{path}'")]
    PathNotFound {
        /// Repository-relative path
        path: String,
    },

    /// Change identifier does not resolve to exactly one revision
    #[error("Revision not found: {changeid}")]
    RevisionNotFound {
        /// The identifier as given by the caller
        changeid: String,
    },

    /// Repository has no revisions yet
    #[error("Repository is empty")]
    RepoEmpty,

    /// Archive format name not implemented
    #[error("Unsupported archive format: {format}")]
    UnsupportedFormat {
        /// Requested format name
        format: String,
    },

    /// Subrepository location uses an unrecognized reference scheme
    #[error("Unsupported subrepository location '{location}'")]
    SubrepoPathUnsupported {
        /// Location string from the listing entry
        location: String,
    },

    /// Subrepository could not be resolved under the strict policy
    #[error("Subrepository '{prefix}' ({location}) unresolved: {reason}")]
    SubrepoUnresolved {
        /// Local prefix of the binding
        prefix: String,
        /// Location string from the listing entry
        location: String,
        /// Why resolution was refused
        reason: String,
    },

    /// Subrepository graph loops back onto a snapshot already being expanded
    #[error("Subrepository cycle: {}", chain.join(" -> "))]
    SubrepoCycle {
        /// Expansion chain ending in the repeated snapshot
        chain: Vec<String>,
    },

    /// Subrepository nesting exceeds the configured limit
    #[error("Subrepository nesting exceeds limit of {limit} at '{path}'")]
    SubrepoDepthExceeded {
        /// Configured maximum depth
        limit: usize,
        /// Archive path where the limit was hit
        path: String,
    },

    /// Stored data does not match its content id
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Caller supplied malformed input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Container encoding or decoding failed
    #[error("Archive error: {0}")]
    Archive(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a path-invalid error
    pub fn path_invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::PathInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a path-not-found error
    pub fn path_not_found(path: impl Into<String>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    /// Create a revision-not-found error
    pub fn revision_not_found(changeid: impl Into<String>) -> Self {
        Self::RevisionNotFound {
            changeid: changeid.into(),
        }
    }

    /// Create an unsupported-format error
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Create a corruption error
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an archive error
    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }

    /// Create a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// True for the lookup failures a caller usually maps to "not found"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::PathNotFound { .. } | Error::RevisionNotFound { .. } | Error::RepoEmpty
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
