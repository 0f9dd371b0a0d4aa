//! Storage layer for sheaf
//!
//! This crate implements the revision-addressed snapshot store and the
//! append-only engine underneath it:
//! - SnapshotStore: open a repository, resolve revisions, read files
//! - BlobStore: content-addressed file storage
//! - changelog: changeset records and the append-order index
//! - lookup: change identifier resolution
//! - ChangesetBuilder: the append path used to create history
//! - StoreConfig: per-repository settings in `.sheaf/config.toml`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blob;
pub mod changelog;
pub mod commit;
pub mod config;
pub mod lookup;
pub mod paths;
pub mod store;

pub use blob::BlobStore;
pub use changelog::ChangesetRecord;
pub use commit::{ChangesetBuilder, DEFAULT_BRANCH};
pub use config::StoreConfig;
pub use lookup::TIP;
pub use paths::{StorePathError, StorePaths, CONTROL_DIR};
pub use store::{SnapshotStore, ARCHIVAL_FILE};
