//! Sheaf - revision-addressed repository snapshots and recursive archive export
//!
//! Sheaf reads immutable snapshots out of an append-only repository and
//! exports them as tar, gzip-compressed tar, or zip archives, splicing in the
//! snapshots of bound subrepositories at their pinned revisions.
//!
//! # Quick Start
//!
//! ```ignore
//! use sheaf::{ArchiveComposer, ArchiveRequest, ComposerConfig, DirectoryContainer,
//!             RepositoryContainer, SnapshotStore};
//!
//! let store = SnapshotStore::open("/srv/models/pmr2hgtest")?;
//! let container = DirectoryContainer::parse("/srv/models", "http://models.example.org/w")?;
//! let composer = ArchiveComposer::new(&container, ComposerConfig::default())?;
//!
//! let request = ArchiveRequest::for_format_name("tgz")?.with_revision("tip");
//! let archive = composer.compose(&store, &container.owner("pmr2hgtest")?, &request)?;
//! std::fs::write(&archive.file_name, &archive.bytes)?;
//! ```
//!
//! # Architecture
//!
//! - [`SnapshotStore`]: revision lookup and read-only file access
//! - [`SubrepoResolver`]: `.hgsub`/`.hgsubstate` bindings and sibling resolution
//! - [`ArchiveComposer`]: recursive composition into one container
//! - [`ContainerEncoder`]: tar, tgz, and zip backends

pub use sheaf_archive::{
    read_tar, xxh3_hex, ArchiveComposer, ArchiveEntry, ArchiveFormat, ArchiveReport,
    ArchiveRequest, ComposedArchive, ComposerConfig, ContainerEncoder, EncodeOptions,
    IncludedSubrepo, SkippedSubrepo,
};
pub use sheaf_core::{
    BlobId, Diagnostic, Diagnostics, Error, FileInfo, FileMode, Manifest, NodeId, Result,
    Severity, Snapshot, TreeEntry,
};
pub use sheaf_storage::{ChangesetBuilder, SnapshotStore, StoreConfig, ARCHIVAL_FILE, TIP};
pub use sheaf_subrepo::{
    DirectoryContainer, OwnerContext, RepositoryContainer, Resolution, ResolutionPolicy,
    SiblingPolicy, SkipReason, SubrepoBinding, SubrepoResolver,
};

