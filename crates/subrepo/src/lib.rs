//! Subrepository support for sheaf
//!
//! This crate reads the nested-repository declarations of a snapshot and
//! resolves them to other repositories:
//! - binding: `.hgsub` / `.hgsubstate` parsing
//! - container: namespaces of sibling repositories
//! - policy: locality checks and strict/lenient handling
//! - resolver: opening a bound repository at its pinned revision

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binding;
pub mod container;
pub mod policy;
pub mod resolver;

pub use binding::{bindings, parse_listing, parse_state, SubrepoBinding, LISTING_FILE, STATE_FILE};
pub use container::{DirectoryContainer, OwnerContext, RepositoryContainer};
pub use policy::{ResolutionPolicy, SiblingPolicy, SkipReason, DEFAULT_REMOTE_SCHEMES};
pub use resolver::{Resolution, ResolvedSubrepo, SubrepoResolver};
