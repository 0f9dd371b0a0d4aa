//! Composition report

use serde::Serialize;
use sheaf_core::{Diagnostics, NodeId};
use sheaf_subrepo::SkipReason;

/// A subrepository spliced into the archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludedSubrepo {
    /// Archive path of the subtree root
    pub path: String,
    /// Location from the binding
    pub location: String,
    /// Snapshot that was archived
    pub node: NodeId,
}

/// A subrepository left out of the archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSubrepo {
    /// Archive path the subtree would have had
    pub path: String,
    /// Location from the binding
    pub location: String,
    /// Why it was left out
    pub reason: SkipReason,
}

/// Outcome details of one composition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    /// Spliced subrepositories, depth first
    pub included: Vec<IncludedSubrepo>,
    /// Omitted subrepositories
    pub skipped: Vec<SkippedSubrepo>,
    /// Warnings and notes
    pub diagnostics: Diagnostics,
}

impl ArchiveReport {
    /// True when nothing was skipped and nothing was flagged
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.diagnostics.warnings().next().is_none()
    }
}
