//! Repository directory structure
//!
//! A repository is a directory whose control metadata lives in `.sheaf/`.
//! The structure is:
//!
//! ```text
//! <root>/
//! └── .sheaf/
//!     ├── requires        # Format marker
//!     ├── config.toml     # Per-repository settings
//!     ├── changelog       # One changeset id per line, in append order
//!     ├── lock            # Advisory lock for appends
//!     ├── changesets/     # <id>.json changeset records
//!     └── blobs/          # <aa>/<digest> file contents
//! ```

use sheaf_core::{BlobId, NodeId};
use std::path::{Path, PathBuf};

/// Name of the control directory under the repository root
pub const CONTROL_DIR: &str = ".sheaf";

/// Exact contents of the `requires` marker
pub const FORMAT_MARKER: &str = "sheaf-store-v1\n";

/// Repository directory paths
#[derive(Debug, Clone)]
pub struct StorePaths {
    root: PathBuf,
}

impl StorePaths {
    /// Create paths from the repository root
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        StorePaths {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Repository root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Control metadata directory
    pub fn control_dir(&self) -> PathBuf {
        self.root.join(CONTROL_DIR)
    }

    /// Format marker file
    pub fn requires(&self) -> PathBuf {
        self.control_dir().join("requires")
    }

    /// Repository configuration file
    pub fn config(&self) -> PathBuf {
        self.control_dir().join("config.toml")
    }

    /// Changelog index
    pub fn changelog(&self) -> PathBuf {
        self.control_dir().join("changelog")
    }

    /// Append lock file
    pub fn lock(&self) -> PathBuf {
        self.control_dir().join("lock")
    }

    /// Directory of changeset records
    pub fn changesets_dir(&self) -> PathBuf {
        self.control_dir().join("changesets")
    }

    /// Record file for one changeset
    pub fn changeset(&self, id: &NodeId) -> PathBuf {
        self.changesets_dir().join(format!("{}.json", id))
    }

    /// Directory of content blobs
    pub fn blobs_dir(&self) -> PathBuf {
        self.control_dir().join("blobs")
    }

    /// Storage location of one blob (fan-out on the first byte)
    pub fn blob(&self, id: &BlobId) -> PathBuf {
        let hex = id.to_hex();
        self.blobs_dir().join(&hex[..2]).join(hex)
    }

    /// Check if a repository exists at this path
    ///
    /// A repository exists if the format marker is present.
    pub fn exists(&self) -> bool {
        self.requires().exists()
    }

    /// Create the full directory structure
    pub fn create_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.changesets_dir())?;
        std::fs::create_dir_all(self.blobs_dir())?;
        Ok(())
    }

    /// Validate that the control metadata is present and recognized
    pub fn validate(&self) -> Result<(), StorePathError> {
        if !self.root.is_dir() {
            return Err(StorePathError::NotFound {
                path: self.root.clone(),
            });
        }

        if !self.control_dir().is_dir() {
            return Err(StorePathError::MissingControlDir {
                path: self.control_dir(),
            });
        }

        let marker = std::fs::read_to_string(self.requires()).map_err(|_| {
            StorePathError::MissingMarker {
                path: self.requires(),
            }
        })?;
        if marker != FORMAT_MARKER {
            return Err(StorePathError::UnknownFormat {
                found: marker.trim().to_string(),
            });
        }

        if !self.changesets_dir().is_dir() || !self.blobs_dir().is_dir() {
            return Err(StorePathError::MissingStorageDir {
                path: self.control_dir(),
            });
        }

        Ok(())
    }
}

/// Repository path validation errors
#[derive(Debug, thiserror::Error)]
pub enum StorePathError {
    /// Root directory not found
    #[error("repository not found at {path}")]
    NotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// No control directory
    #[error("missing control directory at {path}")]
    MissingControlDir {
        /// Expected control directory
        path: PathBuf,
    },

    /// No format marker
    #[error("missing format marker at {path}")]
    MissingMarker {
        /// Expected marker path
        path: PathBuf,
    },

    /// Marker names a format this build does not read
    #[error("unknown repository format '{found}'")]
    UnknownFormat {
        /// Marker contents
        found: String,
    },

    /// Changesets or blobs directory missing
    #[error("incomplete control directory at {path}")]
    MissingStorageDir {
        /// Control directory
        path: PathBuf,
    },
}
