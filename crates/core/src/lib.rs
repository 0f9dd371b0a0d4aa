//! Core types for sheaf
//!
//! This crate defines the foundational types used throughout the system:
//! - NodeId / BlobId: content-derived identifiers for changesets and blobs
//! - Manifest: path -> (blob, mode) mapping of one snapshot
//! - Snapshot: immutable view of a repository at one revision
//! - FileInfo / TreeEntry: per-file metadata and materialized entries
//! - Diagnostics: per-call collection of soft failures
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diagnostics;
pub mod error;
pub mod id;
pub mod manifest;
pub mod snapshot;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{Error, Result};
pub use id::{is_hex, BlobId, NodeId, ID_HEX_LEN, SHORT_ID_LEN};
pub use manifest::{validate_path, FileMode, Manifest, ManifestEntry};
pub use snapshot::{FileInfo, Snapshot, TreeEntry};
