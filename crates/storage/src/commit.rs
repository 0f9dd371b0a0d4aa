//! Appending changesets
//!
//! A minimal write path: collect file changes against the current tip and
//! append one changeset. Blobs are written first, then the record, then the
//! changelog is swapped in. A reader never sees an id whose record or blobs
//! are not yet on disk.

use crate::changelog::{append_index, load_index, write_record, ChangesetRecord};
use crate::store::SnapshotStore;
use chrono::{DateTime, FixedOffset, Utc};
use sheaf_core::{BlobId, Error, FileMode, ManifestEntry, NodeId, Result, Snapshot};
use std::collections::BTreeMap;
use tracing::info;

/// Branch label used when neither the builder nor a parent names one
pub const DEFAULT_BRANCH: &str = "default";

enum Change {
    Put(FileMode, Vec<u8>),
    Remove,
}

/// Builder for one new changeset
///
/// Starts from the tip at commit time unless explicit parents are given.
pub struct ChangesetBuilder<'a> {
    store: &'a SnapshotStore,
    parents: Option<Vec<NodeId>>,
    author: String,
    message: String,
    date: Option<DateTime<FixedOffset>>,
    branch: Option<String>,
    changes: BTreeMap<String, Change>,
}

impl<'a> ChangesetBuilder<'a> {
    pub(crate) fn new(store: &'a SnapshotStore) -> Self {
        Self {
            store,
            parents: None,
            author: "unknown".to_string(),
            message: String::new(),
            date: None,
            branch: None,
            changes: BTreeMap::new(),
        }
    }

    /// Committer
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Commit message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Commit time (default: now, UTC)
    pub fn date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = Some(date);
        self
    }

    /// Branch label (default: the first parent's branch)
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Explicit parents; the first parent's manifest is the base
    pub fn parents(mut self, parents: Vec<NodeId>) -> Self {
        self.parents = Some(parents);
        self
    }

    /// Add or replace a regular file
    pub fn put_file(self, path: impl Into<String>, data: impl AsRef<[u8]>) -> Self {
        self.put(path, FileMode::Regular, data.as_ref().to_vec())
    }

    /// Add or replace an executable file
    pub fn put_executable(self, path: impl Into<String>, data: impl AsRef<[u8]>) -> Self {
        self.put(path, FileMode::Executable, data.as_ref().to_vec())
    }

    /// Add or replace a symbolic link pointing at `target`
    pub fn put_symlink(self, path: impl Into<String>, target: impl Into<String>) -> Self {
        self.put(path, FileMode::Symlink, target.into().into_bytes())
    }

    /// Add an empty directory placeholder
    pub fn put_directory(self, path: impl Into<String>) -> Self {
        self.put(path, FileMode::Directory, Vec::new())
    }

    /// Remove a path present in the base manifest
    pub fn remove(mut self, path: impl Into<String>) -> Self {
        self.changes.insert(path.into(), Change::Remove);
        self
    }

    fn put(mut self, path: impl Into<String>, mode: FileMode, data: Vec<u8>) -> Self {
        self.changes.insert(path.into(), Change::Put(mode, data));
        self
    }

    /// Append the changeset and return the new snapshot
    pub fn commit(self) -> Result<Snapshot> {
        let paths = self.store.paths();
        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(paths.lock())?;
        fs2::FileExt::lock_exclusive(&lock_file)?;

        let index = load_index(paths)?;
        let rev = index.len() as u64;
        let parents = match self.parents {
            Some(parents) => parents,
            None => index.last().copied().into_iter().collect(),
        };

        let base = match parents.first() {
            Some(parent) => {
                let prev = index
                    .iter()
                    .position(|id| id == parent)
                    .ok_or_else(|| Error::revision_not_found(parent.to_hex()))?;
                Some(self.store.load(&index, prev as u64)?)
            }
            None => None,
        };
        let mut manifest = base
            .as_ref()
            .map(|s| s.manifest.as_ref().clone())
            .unwrap_or_default();

        for (path, change) in self.changes {
            match change {
                Change::Put(mode, data) => {
                    let blob = match mode {
                        FileMode::Directory => BlobId::digest(b""),
                        _ => self.store.blobs().put(&data)?,
                    };
                    let unchanged = manifest
                        .get(&path)
                        .is_some_and(|e| e.blob == blob && e.mode == mode);
                    if !unchanged {
                        manifest.insert(
                            path,
                            ManifestEntry {
                                blob,
                                mode,
                                linkrev: rev,
                            },
                        )?;
                    }
                }
                Change::Remove => {
                    if manifest.remove(&path).is_none() {
                        return Err(Error::path_not_found(path));
                    }
                }
            }
        }

        let branch = self
            .branch
            .or_else(|| base.as_ref().map(|s| s.branch.clone()))
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        if branch.trim().is_empty() || branch.contains('\n') {
            return Err(Error::invalid_input(format!("invalid branch label '{}'", branch)));
        }

        let record = ChangesetRecord {
            parents,
            author: self.author,
            date: self.date.unwrap_or_else(|| Utc::now().into()),
            message: self.message,
            branch,
            manifest,
        };
        let id = write_record(paths, &record)?;
        if index.contains(&id) {
            return Err(Error::invalid_input(format!(
                "changeset {} already exists",
                id.short()
            )));
        }
        append_index(paths, &index, &id)?;
        drop(lock_file);

        info!(
            target: "sheaf::store",
            rev,
            node = %id.short(),
            files = record.manifest.len(),
            "Committed changeset"
        );
        Ok(record.into_snapshot(id, rev))
    }
}

#[cfg(test)]
mod tests {
    use crate::SnapshotStore;
    use chrono::{FixedOffset, TimeZone};
    use sheaf_core::{Error, FileMode};
    use tempfile::TempDir;

    fn at(secs: i64) -> chrono::DateTime<FixedOffset> {
        FixedOffset::east_opt(0).unwrap().timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_first_commit_has_no_parents() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::init(dir.path()).unwrap();
        let s = store
            .changeset()
            .put_file("README", "readme\n")
            .date(at(0))
            .commit()
            .unwrap();
        assert_eq!(s.rev, 0);
        assert!(s.parents.is_empty());
        assert_eq!(s.branch, "default");
    }

    #[test]
    fn test_linkrev_kept_for_unchanged_files() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::init(dir.path()).unwrap();
        store
            .changeset()
            .put_file("a", "1")
            .put_file("b", "1")
            .date(at(0))
            .commit()
            .unwrap();
        let s = store
            .changeset()
            .put_file("a", "1")
            .put_file("b", "2")
            .date(at(1))
            .commit()
            .unwrap();
        assert_eq!(s.manifest.get("a").unwrap().linkrev, 0);
        assert_eq!(s.manifest.get("b").unwrap().linkrev, 1);
        assert_eq!(s.parents, vec![store.resolve(Some("0")).unwrap().id]);
    }

    #[test]
    fn test_modes_and_removal() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::init(dir.path()).unwrap();
        store
            .changeset()
            .put_executable("run.sh", "#!/bin/sh\n")
            .put_symlink("link", "run.sh")
            .put_directory("empty")
            .put_file("gone", "x")
            .date(at(0))
            .commit()
            .unwrap();
        let s = store.changeset().remove("gone").date(at(1)).commit().unwrap();
        assert_eq!(s.manifest.get("run.sh").unwrap().mode, FileMode::Executable);
        assert_eq!(store.read(&s, "link").unwrap(), b"run.sh");
        assert!(store.read(&s, "empty").unwrap().is_empty());
        assert!(!s.manifest.contains("gone"));
    }

    #[test]
    fn test_remove_missing_path_fails() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::init(dir.path()).unwrap();
        assert!(matches!(
            store.changeset().remove("nothing").commit(),
            Err(Error::PathNotFound { .. })
        ));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_invalid_path_rejected() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::init(dir.path()).unwrap();
        assert!(store.changeset().put_file("../escape", "x").commit().is_err());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_branch_inherited() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::init(dir.path()).unwrap();
        store
            .changeset()
            .branch("stable")
            .put_file("a", "1")
            .date(at(0))
            .commit()
            .unwrap();
        let s = store.changeset().put_file("a", "2").date(at(1)).commit().unwrap();
        assert_eq!(s.branch, "stable");
    }
}
