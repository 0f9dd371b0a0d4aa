//! Shared fixtures for the end-to-end suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use chrono::{DateTime, FixedOffset, TimeZone};
use flate2::read::GzDecoder;
pub use sheaf::{
    read_tar, xxh3_hex, ArchiveComposer, ArchiveFormat, ArchiveRequest, ComposedArchive,
    ComposerConfig, DirectoryContainer, Error, FileMode, NodeId, RepositoryContainer,
    ResolutionPolicy, SkipReason, SnapshotStore, ARCHIVAL_FILE,
};
use tempfile::TempDir;

/// Base URL every fixture container is published under
pub const BASE: &str = "http://models.example.org/w";

/// Fixed commit time with a UTC offset
pub fn at(secs: i64) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(12 * 3600)
        .unwrap()
        .timestamp_opt(secs, 0)
        .unwrap()
}

// ============================================================================
// Workspace - a container directory of repositories
// ============================================================================

pub struct Workspace {
    pub dir: TempDir,
    pub container: DirectoryContainer,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let container = DirectoryContainer::parse(dir.path(), BASE).unwrap();
        Self { dir, container }
    }

    /// Create an empty repository named `name` inside the container
    pub fn init(&self, name: &str) -> SnapshotStore {
        SnapshotStore::init(self.dir.path().join(name)).unwrap()
    }

    pub fn open(&self, name: &str) -> SnapshotStore {
        SnapshotStore::open(self.dir.path().join(name)).unwrap()
    }

    pub fn composer(&self, config: ComposerConfig) -> ArchiveComposer<'_> {
        ArchiveComposer::new(&self.container, config).unwrap()
    }

    /// Compose `request` for the repository called `name` with default settings
    pub fn compose(&self, name: &str, request: &ArchiveRequest) -> sheaf::Result<ComposedArchive> {
        let store = self.open(name);
        let owner = self.container.owner(name)?;
        self.composer(ComposerConfig::default())
            .compose(&store, &owner, request)
    }
}

// ============================================================================
// Models - the pmr2hgtest family
// ============================================================================

/// `pmr2hgtest` and the two repositories it nests
///
/// - rev 0: README and file1, no bindings
/// - rev 1: binds `ext/import1` at import1 rev 0 (README only)
/// - rev 2: pins `ext/import1` to import1 rev 1, which binds `import2`
/// - rev 3: adds `ext/elsewhere`, a location on another host
pub struct Models {
    pub ws: Workspace,
    pub plain: NodeId,
    pub bound: NodeId,
    pub nested: NodeId,
    pub foreign: NodeId,
    pub import1: [NodeId; 2],
    pub import2: NodeId,
}

pub const README: &str = "This is a simple test repository.\n";
pub const FILE1: &str = "This is file1, initial commit.\n";
pub const IMPORT1_README: &str = "this is import1\n";
pub const IMPORT2_README: &str = "this is import2\n";

impl Models {
    pub fn new() -> Self {
        let ws = Workspace::new();

        let import2 = ws
            .init("import2")
            .changeset()
            .author("Import Two <import2@example.org>")
            .message("import2 initial")
            .date(at(1_262_304_000))
            .put_file("README", IMPORT2_README)
            .commit()
            .unwrap()
            .id;

        let store = ws.init("import1");
        let i1r0 = store
            .changeset()
            .author("Import One <import1@example.org>")
            .message("import1 initial")
            .date(at(1_262_390_400))
            .put_file("README", IMPORT1_README)
            .commit()
            .unwrap()
            .id;
        let i1r1 = store
            .changeset()
            .message("nest import2")
            .date(at(1_262_476_800))
            .put_file(".hgsub", format!("import2 = {}/import2\n", BASE))
            .put_file(".hgsubstate", format!("{} import2\n", import2))
            .commit()
            .unwrap()
            .id;

        let store = ws.init("pmr2hgtest");
        let plain = store
            .changeset()
            .author("Tester <test@example.com>")
            .message("initial commit")
            .date(at(1_262_563_200))
            .put_file("README", README)
            .put_file("file1", FILE1)
            .commit()
            .unwrap()
            .id;
        let bound = store
            .changeset()
            .message("bind import1")
            .date(at(1_262_649_600))
            .put_file(".hgsub", format!("ext/import1 = {}/import1\n", BASE))
            .put_file(".hgsubstate", format!("{} ext/import1\n", i1r0))
            .commit()
            .unwrap()
            .id;
        let nested = store
            .changeset()
            .message("follow import1")
            .date(at(1_262_736_000))
            .put_file(".hgsubstate", format!("{} ext/import1\n", i1r1))
            .commit()
            .unwrap()
            .id;
        let foreign = store
            .changeset()
            .message("bind a remote copy")
            .date(at(1_262_822_400))
            .put_file(
                ".hgsub",
                format!(
                    "ext/elsewhere = http://mirror.example.net/w/import1\next/import1 = {}/import1\n",
                    BASE
                ),
            )
            .put_file(
                ".hgsubstate",
                format!("{} ext/elsewhere\n{} ext/import1\n", i1r0, i1r1),
            )
            .commit()
            .unwrap()
            .id;

        Self {
            ws,
            plain,
            bound,
            nested,
            foreign,
            import1: [i1r0, i1r1],
            import2,
        }
    }

    pub fn store(&self) -> SnapshotStore {
        self.ws.open("pmr2hgtest")
    }

    /// Compose pmr2hgtest at `node`
    pub fn compose(&self, node: &NodeId, request: ArchiveRequest) -> ComposedArchive {
        self.ws
            .compose("pmr2hgtest", &request.with_revision(node.to_hex()))
            .unwrap()
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// File entries of an archive as path -> bytes; directories are left out
pub fn extract(format: ArchiveFormat, bytes: &[u8]) -> BTreeMap<String, Vec<u8>> {
    match format {
        ArchiveFormat::Tar => tar_files(bytes),
        ArchiveFormat::Tgz => {
            let mut tar = Vec::new();
            GzDecoder::new(bytes).read_to_end(&mut tar).unwrap();
            tar_files(&tar)
        }
        ArchiveFormat::Zip => {
            let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
            let mut files = BTreeMap::new();
            for i in 0..archive.len() {
                let mut file = archive.by_index(i).unwrap();
                if file.is_dir() {
                    continue;
                }
                let mut data = Vec::new();
                file.read_to_end(&mut data).unwrap();
                files.insert(file.name().to_string(), data);
            }
            files
        }
    }
}

fn tar_files(tar: &[u8]) -> BTreeMap<String, Vec<u8>> {
    read_tar(tar)
        .unwrap()
        .into_iter()
        .filter(|e| e.mode != FileMode::Directory)
        .map(|e| (e.path, e.data))
        .collect()
}

/// Sorted file paths of an archive
pub fn archive_paths(archive: &ComposedArchive) -> Vec<String> {
    extract(archive.format, &archive.bytes).into_keys().collect()
}
