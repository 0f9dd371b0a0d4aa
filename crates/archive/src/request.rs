//! Archive requests and results

use crate::format::ArchiveFormat;
use crate::report::ArchiveReport;
use sheaf_core::{Error, Result};

/// Parameters of one archive export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
    /// Change identifier; `None` is the tip
    pub revision: Option<String>,
    /// Container format
    pub format: ArchiveFormat,
    /// Root directory override
    pub name: Option<String>,
    /// Splice in bound subrepositories
    pub include_subrepos: bool,
}

impl ArchiveRequest {
    /// Request for the tip with the format's default subrepo handling
    pub fn new(format: ArchiveFormat) -> Self {
        Self {
            revision: None,
            format,
            name: None,
            include_subrepos: format.includes_subrepos_by_default(),
        }
    }

    /// Request from a format name, rejecting unknown names up front
    pub fn for_format_name(format: &str) -> Result<Self> {
        Ok(Self::new(format.parse()?))
    }

    /// Pin the revision
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    /// Override the root directory name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Include or exclude subrepositories
    pub fn with_subrepos(mut self, include: bool) -> Self {
        self.include_subrepos = include;
        self
    }

    /// Reject a root name that would not stay a single top-level directory
    pub(crate) fn validated_name(&self) -> Result<Option<&str>> {
        match self.name.as_deref() {
            None => Ok(None),
            Some(name) => {
                let name = name.trim_matches('/');
                if name.is_empty()
                    || name.split('/').any(|c| c.is_empty() || c == "." || c == "..")
                    || name.contains(['\\', '\0'])
                {
                    return Err(Error::invalid_input(format!(
                        "invalid archive name '{}'",
                        name
                    )));
                }
                Ok(Some(name))
            }
        }
    }
}

/// A finished archive
#[derive(Debug, Clone)]
pub struct ComposedArchive {
    /// Container bytes
    pub bytes: Vec<u8>,
    /// Root directory every entry lives under
    pub root: String,
    /// Container format
    pub format: ArchiveFormat,
    /// Suggested download name (`<root><extension>`)
    pub file_name: String,
    /// xxh3 of `bytes`, hex
    pub checksum: String,
    /// What was included, skipped, and noticed along the way
    pub report: ArchiveReport,
}

impl ComposedArchive {
    /// Response headers for serving the archive as a download
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("Content-Type", self.format.content_type().to_string()),
            (
                "Content-Disposition",
                format!("attachment; filename={}", self.file_name),
            ),
        ];
        if let Some(encoding) = self.format.content_encoding() {
            headers.push(("Content-Encoding", encoding.to_string()));
        }
        headers
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for an empty byte stream (never produced by the composer)
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
