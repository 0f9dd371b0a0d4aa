//! Immutable snapshot views
//!
//! A [`Snapshot`] is one revision of a repository: commit metadata plus the
//! manifest. Once built it never changes; cloning is cheap because the
//! manifest is shared.

use crate::id::NodeId;
use crate::manifest::{FileMode, Manifest};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One revision of a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Content-derived id
    pub id: NodeId,
    /// Position in the changelog (0 = first revision)
    pub rev: u64,
    /// Zero, one, or two parents
    pub parents: Vec<NodeId>,
    /// Committer
    pub author: String,
    /// Commit message
    pub message: String,
    /// Commit time with the committer's UTC offset
    pub date: DateTime<FixedOffset>,
    /// Branch label
    pub branch: String,
    /// Path -> content mapping
    pub manifest: Arc<Manifest>,
}

impl Snapshot {
    /// 12-character display prefix of the id
    pub fn short_id(&self) -> String {
        self.id.short()
    }

    /// True for merge snapshots
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Commit time as non-negative Unix seconds (archive mtimes)
    pub fn mtime(&self) -> u64 {
        self.date.timestamp().max(0) as u64
    }

    /// First line of the commit message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// Metadata describing one file of a snapshot
///
/// Author, date and description come from the changeset that last changed
/// the file, not necessarily from the snapshot it was looked up in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Repository-relative path
    pub path: String,
    /// Author of the last change to this file
    pub author: String,
    /// Date of the last change to this file
    pub date: DateTime<FixedOffset>,
    /// Commit message of the last change to this file
    pub description: String,
    /// Content length in bytes
    pub size: u64,
    /// Materialization mode
    pub mode: FileMode,
    /// Id of the changeset that last changed this file
    pub node: NodeId,
}

/// One materialized entry of a snapshot tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Repository-relative path
    pub path: String,
    /// Materialization mode
    pub mode: FileMode,
    /// File bytes, link target, or empty for directories
    pub data: Vec<u8>,
}
