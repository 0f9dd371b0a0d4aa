//! Changeset records and the changelog index
//!
//! Each changeset is one JSON record under `changesets/<id>.json`. The id is
//! the SHA-256 of the record bytes exactly as written, so a record can be
//! checked against its name without re-encoding it.
//!
//! The changelog lists ids in append order, one per line. Line N is
//! revision N. It is replaced whole on every append.

use crate::blob::write_atomic;
use crate::paths::StorePaths;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use sheaf_core::{Error, Manifest, NodeId, Result, Snapshot};
use std::fs;
use std::io;
use std::sync::Arc;

/// Stored form of one changeset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangesetRecord {
    /// Parent ids, first parent first
    pub parents: Vec<NodeId>,
    /// Committer
    pub author: String,
    /// Commit time
    pub date: DateTime<FixedOffset>,
    /// Commit message
    pub message: String,
    /// Branch label
    pub branch: String,
    /// Full file mapping
    pub manifest: Manifest,
}

impl ChangesetRecord {
    /// Canonical encoding; field order is fixed and the manifest is sorted
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Id of this record
    pub fn id(&self) -> Result<NodeId> {
        Ok(NodeId::digest(&self.encode()?))
    }

    /// Turn the record into a snapshot view
    pub fn into_snapshot(self, id: NodeId, rev: u64) -> Snapshot {
        Snapshot {
            id,
            rev,
            parents: self.parents,
            author: self.author,
            message: self.message,
            date: self.date,
            branch: self.branch,
            manifest: Arc::new(self.manifest),
        }
    }
}

/// Read and verify one changeset record
pub fn read_record(paths: &StorePaths, id: &NodeId) -> Result<ChangesetRecord> {
    let bytes = fs::read(paths.changeset(id)).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::corruption(format!("changeset {} is missing", id)),
        _ => Error::Io(e),
    })?;
    let actual = NodeId::digest(&bytes);
    if actual != *id {
        return Err(Error::corruption(format!(
            "changeset {} hashes to {}",
            id, actual
        )));
    }
    let record: ChangesetRecord = serde_json::from_slice(&bytes)
        .map_err(|e| Error::corruption(format!("changeset {} is unreadable: {}", id, e)))?;
    record.manifest.validate()?;
    Ok(record)
}

/// Write a record, returning its id
pub fn write_record(paths: &StorePaths, record: &ChangesetRecord) -> Result<NodeId> {
    let bytes = record.encode()?;
    let id = NodeId::digest(&bytes);
    let path = paths.changeset(&id);
    if !path.exists() {
        write_atomic(&path, &bytes)?;
    }
    Ok(id)
}

/// Load the changelog index
///
/// A missing changelog is an empty repository. A line that is not a full
/// id means the control metadata is damaged.
pub fn load_index(paths: &StorePaths) -> Result<Vec<NodeId>> {
    let content = match fs::read_to_string(paths.changelog()) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::Io(e)),
    };
    content
        .lines()
        .enumerate()
        .map(|(lineno, line)| {
            NodeId::from_hex(line.trim()).map_err(|_| {
                Error::path_invalid(
                    paths.root(),
                    format!("changelog line {} is not a changeset id", lineno + 1),
                )
            })
        })
        .collect()
}

/// Append one id, replacing the changelog atomically
///
/// Callers hold the append lock.
pub fn append_index(paths: &StorePaths, index: &[NodeId], id: &NodeId) -> Result<()> {
    let mut content = String::with_capacity((index.len() + 1) * 65);
    for existing in index.iter().chain(std::iter::once(id)) {
        content.push_str(&existing.to_hex());
        content.push('\n');
    }
    write_atomic(&paths.changelog(), content.as_bytes())
}
