//! Container formats

use serde::{Deserialize, Serialize};
use sheaf_core::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Supported container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// Uncompressed tar
    Tar,
    /// Gzip-compressed tar
    Tgz,
    /// Deflate zip
    Zip,
}

impl ArchiveFormat {
    /// Every format, in display order
    pub const ALL: [ArchiveFormat; 3] = [ArchiveFormat::Tar, ArchiveFormat::Tgz, ArchiveFormat::Zip];

    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::Tgz => "tgz",
            ArchiveFormat::Zip => "zip",
        }
    }

    /// File name extension including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Tar => ".tar",
            ArchiveFormat::Tgz => ".tar.gz",
            ArchiveFormat::Zip => ".zip",
        }
    }

    /// `Content-Type` of the produced bytes
    pub fn content_type(&self) -> &'static str {
        match self {
            ArchiveFormat::Tar | ArchiveFormat::Tgz => "application/x-tar",
            ArchiveFormat::Zip => "application/zip",
        }
    }

    /// `Content-Encoding`, for formats served as an encoded tar
    pub fn content_encoding(&self) -> Option<&'static str> {
        match self {
            ArchiveFormat::Tgz => Some("gzip"),
            _ => None,
        }
    }

    /// Whether subrepositories are included when the request does not say
    pub fn includes_subrepos_by_default(&self) -> bool {
        matches!(self, ArchiveFormat::Tar | ArchiveFormat::Tgz)
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArchiveFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tar" => Ok(ArchiveFormat::Tar),
            "tgz" | "gz" | "tar.gz" => Ok(ArchiveFormat::Tgz),
            "zip" => Ok(ArchiveFormat::Zip),
            _ => Err(Error::unsupported_format(s)),
        }
    }
}
