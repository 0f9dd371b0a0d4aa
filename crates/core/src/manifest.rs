//! Snapshot manifests
//!
//! A manifest maps every repository-relative path of one snapshot to the
//! blob holding its content and the mode it is materialized with. Paths are
//! slash-separated, relative, and unique; iteration is in byte order of the
//! path so every consumer sees the same deterministic sequence.

use crate::error::{Error, Result};
use crate::id::BlobId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a manifest entry is materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileMode {
    /// Plain file
    Regular,
    /// File with the executable bit set
    Executable,
    /// Symbolic link; the blob holds the link target
    Symlink,
    /// Directory placeholder with no content
    Directory,
}

impl FileMode {
    /// Single-character flag (`""`, `"x"`, `"l"`, `"d"`)
    pub fn flag(&self) -> &'static str {
        match self {
            FileMode::Regular => "",
            FileMode::Executable => "x",
            FileMode::Symlink => "l",
            FileMode::Directory => "d",
        }
    }

    /// Unix permission bits used when writing archive entries
    pub fn permissions(&self) -> u32 {
        match self {
            FileMode::Regular => 0o644,
            FileMode::Executable | FileMode::Directory => 0o755,
            FileMode::Symlink => 0o777,
        }
    }

    /// `ls`-style permission string
    pub fn permission_string(&self) -> &'static str {
        match self {
            FileMode::Regular => "-rw-r--r--",
            FileMode::Executable => "-rwxr-xr-x",
            FileMode::Symlink => "lrwxrwxrwx",
            FileMode::Directory => "drwxr-xr-x",
        }
    }
}

/// One manifest entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Content of the file
    pub blob: BlobId,
    /// Materialization mode
    pub mode: FileMode,
    /// Revision number of the changeset that last changed blob or mode
    pub linkrev: u64,
}

/// Path -> entry mapping for one snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up one path
    pub fn get(&self, path: &str) -> Option<&ManifestEntry> {
        self.entries.get(path)
    }

    /// Check whether a path is present
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Insert or replace an entry after validating the path
    pub fn insert(&mut self, path: impl Into<String>, entry: ManifestEntry) -> Result<()> {
        let path = path.into();
        validate_path(&path)?;
        self.entries.insert(path, entry);
        Ok(())
    }

    /// Remove an entry, returning it if present
    pub fn remove(&mut self, path: &str) -> Option<ManifestEntry> {
        self.entries.remove(path)
    }

    /// Iterate entries in path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
        self.entries.iter().map(|(p, e)| (p.as_str(), e))
    }

    /// Iterate paths in order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the manifest has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-check every path (used after deserializing untrusted records)
    pub fn validate(&self) -> Result<()> {
        self.entries.keys().try_for_each(|p| validate_path(p))
    }
}

/// Validate a repository-relative path
///
/// Rejects empty paths, absolute paths, backslashes, and any empty, `.` or
/// `..` component.
pub fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::invalid_input("path must not be empty"));
    }
    if path.starts_with('/') {
        return Err(Error::invalid_input(format!("path '{}' must be relative", path)));
    }
    if path.contains('\\') || path.contains('\0') {
        return Err(Error::invalid_input(format!(
            "path '{}' contains a forbidden character",
            path
        )));
    }
    for component in path.split('/') {
        if component.is_empty() || component == "." || component == ".." {
            return Err(Error::invalid_input(format!(
                "path '{}' has an invalid component '{}'",
                path, component
            )));
        }
    }
    Ok(())
}
