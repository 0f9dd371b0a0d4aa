//! Export Tests
//!
//! End-to-end archive export against on-disk repository families:
//! - Scenarios: plain snapshots, bound subrepositories, opt-out, soft skips
//! - Nesting: subrepositories inside subrepositories
//! - Formats: tar/tgz/zip equivalence, determinism, response metadata
//! - Properties: archived bytes equal stored bytes

#[path = "../common/mod.rs"]
mod common;

mod formats;
mod nesting;
mod properties;
mod scenarios;
