//! Archive export for sheaf
//!
//! This crate turns snapshots into downloadable containers:
//! - ArchiveComposer: recursive composition with subrepository splicing
//! - encoder: tar, gzip-compressed tar, and zip backends
//! - ArchiveRequest / ComposedArchive: request parameters and the result
//! - ComposerConfig: policy, depth limit, schemes, compression

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod composer;
pub mod config;
pub mod encoder;
pub mod format;
pub mod naming;
pub mod report;
pub mod request;

pub use composer::{xxh3_hex, ArchiveComposer};
pub use config::{ComposerConfig, DEFAULT_COMPRESSION_LEVEL, DEFAULT_MAX_SUBREPO_DEPTH};
pub use encoder::{
    encode, encoder_for, finalize, read_tar, ArchiveEntry, ContainerEncoder, EncodeOptions,
    TarEncoder, TgzEncoder, ZipEncoder,
};
pub use format::ArchiveFormat;
pub use naming::{root_name, slug};
pub use report::{ArchiveReport, IncludedSubrepo, SkippedSubrepo};
pub use request::{ArchiveRequest, ComposedArchive};
