//! Per-call diagnostics
//!
//! Operations that tolerate soft failures record them here instead of
//! writing to a shared output buffer. The caller owns the value for the
//! duration of one call and reads it back from the result.

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational note
    Note,
    /// Something was skipped or looks wrong, but the operation completed
    Warning,
}

/// One recorded message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// What the message is about (an archive path, a binding prefix, ...)
    pub subject: String,
    /// Human-readable message
    pub message: String,
}

/// Messages collected during one call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning
    pub fn warn(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, subject, message);
    }

    /// Record a note
    pub fn note(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Note, subject, message);
    }

    fn push(&mut self, severity: Severity, subject: impl Into<String>, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity,
            subject: subject.into(),
            message: message.into(),
        });
    }

    /// All messages in recording order
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Only the warnings
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// True if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded messages
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
