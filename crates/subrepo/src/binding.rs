//! Subrepository binding declarations
//!
//! A snapshot declares nested repositories through two control files in its
//! manifest:
//!
//! ```text
//! .hgsub        ext/import1 = http://models.example.org/w/import1
//! .hgsubstate   8cdc4b8c1a6f3b0f0e2c8d1b1f7e9a3c5d6b7a80 ext/import1
//! ```
//!
//! The listing maps each local prefix to an external location; the state
//! pins each prefix to a revision of that location.

use sheaf_core::{validate_path, Diagnostics, Error, Result, Snapshot};
use sheaf_storage::SnapshotStore;
use std::collections::BTreeMap;

/// Listing control file
pub const LISTING_FILE: &str = ".hgsub";

/// State control file
pub const STATE_FILE: &str = ".hgsubstate";

/// Location kind accepted on listing lines; any other `[kind]` is rejected
const NATIVE_KIND: &str = "hg";

/// One nested repository declared by a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubrepoBinding {
    /// Manifest path prefix standing in for the nested tree
    pub prefix: String,
    /// External location as written in the listing
    pub location: String,
    /// Pinned revision; `None` means the target's tip
    pub revision: Option<String>,
}

/// Parse the listing file into `(prefix, location)` pairs sorted by prefix
///
/// A prefix listed twice keeps its last location.
pub fn parse_listing(text: &str) -> Result<Vec<(String, String)>> {
    let mut entries = BTreeMap::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            continue;
        }
        let (prefix, location) = line.split_once('=').ok_or_else(|| {
            Error::invalid_input(format!(
                "{} line {}: expected '<path> = <location>'",
                LISTING_FILE,
                lineno + 1
            ))
        })?;
        let prefix = prefix.trim();
        let location = strip_kind(location.trim())?;
        if location.is_empty() {
            return Err(Error::invalid_input(format!(
                "{} line {}: empty location for '{}'",
                LISTING_FILE,
                lineno + 1,
                prefix
            )));
        }
        validate_path(prefix).map_err(|e| {
            Error::invalid_input(format!("{} line {}: {}", LISTING_FILE, lineno + 1, e))
        })?;
        entries.insert(prefix.to_string(), location.to_string());
    }
    Ok(entries.into_iter().collect())
}

/// Parse the state file into prefix -> revision
pub fn parse_state(text: &str) -> Result<BTreeMap<String, String>> {
    let mut state = BTreeMap::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let (rev, prefix) = line.split_once(' ').ok_or_else(|| {
            Error::invalid_input(format!(
                "{} line {}: expected '<revision> <path>'",
                STATE_FILE,
                lineno + 1
            ))
        })?;
        state.insert(prefix.trim().to_string(), rev.to_string());
    }
    Ok(state)
}

fn strip_kind(location: &str) -> Result<&str> {
    if let Some(rest) = location.strip_prefix('[') {
        if let Some((kind, target)) = rest.split_once(']') {
            if kind.trim() == NATIVE_KIND {
                return Ok(target.trim());
            }
            return Err(Error::SubrepoPathUnsupported {
                location: location.to_string(),
            });
        }
    }
    Ok(location)
}

/// Bindings declared by `snapshot`, sorted by prefix
///
/// Prefixes without pinned state and prefixes that shadow manifest paths
/// are recorded as warnings rather than rejected.
pub fn bindings(
    store: &SnapshotStore,
    snapshot: &Snapshot,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<SubrepoBinding>> {
    if !snapshot.manifest.contains(LISTING_FILE) {
        return Ok(Vec::new());
    }
    let listing = parse_listing(&read_text(store, snapshot, LISTING_FILE)?)?;
    let state = if snapshot.manifest.contains(STATE_FILE) {
        parse_state(&read_text(store, snapshot, STATE_FILE)?)?
    } else {
        BTreeMap::new()
    };

    let mut result = Vec::with_capacity(listing.len());
    for (prefix, location) in listing {
        if snapshot.manifest.contains(&prefix) {
            diagnostics.warn(
                &prefix,
                "subrepository prefix collides with a file of the same path",
            );
        } else {
            let nested = format!("{}/", prefix);
            if snapshot.manifest.paths().any(|p| p.starts_with(&nested)) {
                diagnostics.warn(
                    &prefix,
                    "manifest has files under a subrepository prefix",
                );
            }
        }
        let revision = state.get(&prefix).cloned();
        if revision.is_none() {
            diagnostics.warn(&prefix, "no pinned revision; using the target's tip");
        }
        result.push(SubrepoBinding {
            prefix,
            location,
            revision,
        });
    }
    Ok(result)
}

fn read_text(store: &SnapshotStore, snapshot: &Snapshot, path: &str) -> Result<String> {
    String::from_utf8(store.read(snapshot, path)?)
        .map_err(|_| Error::invalid_input(format!("{} is not valid UTF-8", path)))
}
