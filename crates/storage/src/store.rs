//! Revision-addressed snapshot store
//!
//! `SnapshotStore` opens one repository and serves read queries against its
//! immutable snapshots. The changelog is re-read on every lookup, so a store
//! that stays open sees revisions appended by other writers. Snapshots never
//! change, so up to `snapshot_cache` of them are kept by id; the oldest
//! entry is dropped when the cache is full.

use crate::blob::BlobStore;
use crate::changelog::{load_index, read_record};
use crate::commit::ChangesetBuilder;
use crate::config::StoreConfig;
use crate::lookup::lookup;
use crate::paths::{StorePaths, FORMAT_MARKER};
use parking_lot::RwLock;
use sheaf_core::{Error, FileInfo, FileMode, Manifest, NodeId, Result, Snapshot, TreeEntry};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;
use tracing::{debug, info};

/// Name of the provenance marker placed at the top of every exported tree
pub const ARCHIVAL_FILE: &str = ".hg_archival.txt";

/// One opened repository
pub struct SnapshotStore {
    paths: StorePaths,
    config: StoreConfig,
    blobs: BlobStore,
    name: String,
    cache: RwLock<SnapshotCache>,
}

/// Bounded id -> snapshot map, evicting in insertion order
struct SnapshotCache {
    capacity: usize,
    entries: HashMap<NodeId, Snapshot>,
    order: VecDeque<NodeId>,
}

impl SnapshotCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get(&self, id: &NodeId) -> Option<&Snapshot> {
        self.entries.get(id)
    }

    fn insert(&mut self, snapshot: Snapshot) {
        if self.entries.contains_key(&snapshot.id) {
            return;
        }
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(old) => {
                    self.entries.remove(&old);
                }
                None => break,
            }
        }
        self.order.push_back(snapshot.id);
        self.entries.insert(snapshot.id, snapshot);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("root", &self.paths.root())
            .field("name", &self.name)
            .finish()
    }
}

impl SnapshotStore {
    /// Create an empty repository at `path` and open it
    ///
    /// The directory is created if needed. Fails with `PathInvalid` when a
    /// repository already exists there.
    pub fn init(path: impl AsRef<Path>) -> Result<Self> {
        Self::init_with_config(path, None)
    }

    /// Create an empty repository with explicit settings
    pub fn init_with_config(path: impl AsRef<Path>, config: Option<StoreConfig>) -> Result<Self> {
        let paths = StorePaths::from_root(path.as_ref());
        if paths.control_dir().exists() {
            return Err(Error::path_invalid(
                paths.root(),
                "a repository already exists here",
            ));
        }
        paths.create_directories()?;
        match config {
            Some(config) => {
                config.validate()?;
                config.write_to_file(&paths.config())?;
            }
            None => StoreConfig::write_default_if_missing(&paths.config())?,
        }
        // The marker goes last; until it exists the directory is not a repository.
        std::fs::write(paths.requires(), FORMAT_MARKER)?;
        info!(target: "sheaf::store", path = ?paths.root(), "Initialized repository");
        Self::open(paths.root())
    }

    /// Open the repository rooted at `path`
    ///
    /// Fails with `PathInvalid` if the directory is missing or its control
    /// metadata is absent, unrecognized, or damaged.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let paths = StorePaths::from_root(path.as_ref());
        paths
            .validate()
            .map_err(|e| Error::path_invalid(paths.root(), e.to_string()))?;
        let config = StoreConfig::load_or_default(&paths.config())?;
        Self::open_with_config(path, config)
    }

    /// Open with settings supplied by the caller instead of `config.toml`
    pub fn open_with_config(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let root = path
            .as_ref()
            .canonicalize()
            .map_err(|e| Error::path_invalid(path.as_ref(), e.to_string()))?;
        let paths = StorePaths::from_root(&root);
        paths
            .validate()
            .map_err(|e| Error::path_invalid(&root, e.to_string()))?;

        let revisions = load_index(&paths)?.len();
        let name = config
            .name
            .clone()
            .or_else(|| root.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "repository".to_string());
        let blobs = BlobStore::new(paths.clone(), config.verify_blobs);
        let cache = RwLock::new(SnapshotCache::new(config.snapshot_cache));

        info!(
            target: "sheaf::store",
            path = ?root,
            name = %name,
            revisions,
            "Opened repository"
        );

        Ok(Self {
            paths,
            config,
            blobs,
            name,
            cache,
        })
    }

    /// Display name used for archive naming
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical repository root
    pub fn path(&self) -> &Path {
        self.paths.root()
    }

    /// Settings the store was opened with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub(crate) fn paths(&self) -> &StorePaths {
        &self.paths
    }

    pub(crate) fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Number of revisions
    pub fn len(&self) -> Result<usize> {
        Ok(load_index(&self.paths)?.len())
    }

    /// True when no revision has been committed yet
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Resolve a change identifier to a snapshot
    ///
    /// `None` and `"tip"` mean the most recent revision. See
    /// [`lookup`](crate::lookup::lookup) for the accepted forms.
    pub fn resolve(&self, changeid: Option<&str>) -> Result<Snapshot> {
        let index = load_index(&self.paths)?;
        let rev = lookup(&index, changeid, |label| self.branch_head(&index, label))?;
        let snapshot = self.load(&index, rev)?;
        debug!(
            target: "sheaf::store",
            changeid = changeid.unwrap_or("tip"),
            rev,
            node = %snapshot.short_id(),
            "Resolved revision"
        );
        Ok(snapshot)
    }

    /// Most recent snapshot
    pub fn tip(&self) -> Result<Snapshot> {
        self.resolve(None)
    }

    /// Manifest of a snapshot
    pub fn manifest<'a>(&self, snapshot: &'a Snapshot) -> &'a Manifest {
        &snapshot.manifest
    }

    /// Sorted manifest paths
    pub fn files(&self, snapshot: &Snapshot) -> Vec<String> {
        snapshot.manifest.paths().map(str::to_string).collect()
    }

    /// Bytes of one file (the link target for symlinks)
    pub fn read(&self, snapshot: &Snapshot, path: &str) -> Result<Vec<u8>> {
        let entry = snapshot
            .manifest
            .get(path)
            .ok_or_else(|| Error::path_not_found(path))?;
        match entry.mode {
            FileMode::Directory => Ok(Vec::new()),
            _ => self.blobs.get(&entry.blob),
        }
    }

    /// Metadata of one file, taken from the changeset that last changed it
    pub fn fileinfo(&self, snapshot: &Snapshot, path: &str) -> Result<FileInfo> {
        let entry = snapshot
            .manifest
            .get(path)
            .ok_or_else(|| Error::path_not_found(path))?;
        let index = load_index(&self.paths)?;
        if entry.linkrev as usize >= index.len() {
            return Err(Error::corruption(format!(
                "'{}' links to revision {} beyond the changelog",
                path, entry.linkrev
            )));
        }
        let changed = self.load(&index, entry.linkrev)?;
        let size = match entry.mode {
            FileMode::Directory => 0,
            _ => self.blobs.size(&entry.blob)?,
        };
        Ok(FileInfo {
            path: path.to_string(),
            author: changed.author,
            date: changed.date,
            description: changed.message,
            size,
            mode: entry.mode,
            node: changed.id,
        })
    }

    /// History walking revision numbers downward from `start` (default tip)
    pub fn log(&self, start: Option<&str>, limit: Option<usize>) -> Result<Vec<Snapshot>> {
        let index = load_index(&self.paths)?;
        if index.is_empty() {
            return Ok(Vec::new());
        }
        let first = lookup(&index, start, |label| self.branch_head(&index, label))?;
        let limit = limit.unwrap_or(usize::MAX);
        (0..=first)
            .rev()
            .take(limit)
            .map(|rev| self.load(&index, rev))
            .collect()
    }

    /// Branch label -> id of the newest revision on it
    pub fn branches(&self) -> Result<BTreeMap<String, NodeId>> {
        let index = load_index(&self.paths)?;
        let mut heads = BTreeMap::new();
        for rev in (0..index.len() as u64).rev() {
            let snapshot = self.load(&index, rev)?;
            heads.entry(snapshot.branch).or_insert(snapshot.id);
        }
        Ok(heads)
    }

    /// Provenance marker payload for `snapshot`
    ///
    /// The repository is named by the id of its first revision.
    pub fn archival_record(&self, snapshot: &Snapshot) -> Result<Vec<u8>> {
        let index = load_index(&self.paths)?;
        let first = index.first().ok_or(Error::RepoEmpty)?;
        Ok(format!(
            "repo: {}\nnode: {}\nbranch: {}\n",
            first, snapshot.id, snapshot.branch
        )
        .into_bytes())
    }

    /// Export the snapshot's own tree
    ///
    /// The provenance marker comes first, then every manifest entry in path
    /// order.
    pub fn materialize(&self, snapshot: &Snapshot) -> Result<Vec<TreeEntry>> {
        let mut entries = Vec::with_capacity(snapshot.manifest.len() + 1);
        entries.push(TreeEntry {
            path: ARCHIVAL_FILE.to_string(),
            mode: FileMode::Regular,
            data: self.archival_record(snapshot)?,
        });
        for (path, entry) in snapshot.manifest.iter() {
            let data = match entry.mode {
                FileMode::Directory => Vec::new(),
                _ => self.blobs.get(&entry.blob)?,
            };
            entries.push(TreeEntry {
                path: path.to_string(),
                mode: entry.mode,
                data,
            });
        }
        debug!(
            target: "sheaf::store",
            node = %snapshot.short_id(),
            entries = entries.len(),
            "Materialized snapshot"
        );
        Ok(entries)
    }

    /// Start a new changeset on top of the current tip
    pub fn changeset(&self) -> ChangesetBuilder<'_> {
        ChangesetBuilder::new(self)
    }

    pub(crate) fn load(&self, index: &[NodeId], rev: u64) -> Result<Snapshot> {
        let id = index
            .get(rev as usize)
            .ok_or_else(|| Error::revision_not_found(rev.to_string()))?;
        if let Some(snapshot) = self.cache.read().get(id) {
            return Ok(snapshot.clone());
        }
        let snapshot = read_record(&self.paths, id)?.into_snapshot(*id, rev);
        self.cache.write().insert(snapshot.clone());
        Ok(snapshot)
    }

    fn branch_head(&self, index: &[NodeId], label: &str) -> Result<Option<u64>> {
        for rev in (0..index.len() as u64).rev() {
            if self.load(index, rev)?.branch == label {
                return Ok(Some(rev));
            }
        }
        Ok(None)
    }
}
