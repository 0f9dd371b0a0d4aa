//! Repository configuration via `.sheaf/config.toml`
//!
//! `init` writes a commented default file. A missing file means defaults;
//! a malformed one makes `open` fail.

use serde::{Deserialize, Serialize};
use sheaf_core::{Error, Result};
use std::path::Path;

/// Per-repository settings
///
/// # Example
///
/// ```toml
/// # Display name used when naming archives (default: directory name)
/// # name = "pmr2hgtest"
///
/// # Re-hash blob contents on every read
/// verify_blobs = true
///
/// # Snapshots kept in memory per open store
/// snapshot_cache = 256
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Display name override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Re-hash blob contents on every read
    #[serde(default = "default_verify_blobs")]
    pub verify_blobs: bool,
    /// Snapshots kept in memory per open store
    #[serde(default = "default_snapshot_cache")]
    pub snapshot_cache: usize,
}

fn default_verify_blobs() -> bool {
    true
}

fn default_snapshot_cache() -> usize {
    256
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: None,
            verify_blobs: default_verify_blobs(),
            snapshot_cache: default_snapshot_cache(),
        }
    }
}

impl StoreConfig {
    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Enable or disable blob verification
    pub fn with_verify_blobs(mut self, verify: bool) -> Self {
        self.verify_blobs = verify;
        self
    }

    /// Set how many snapshots an open store keeps in memory
    pub fn with_snapshot_cache(mut self, capacity: usize) -> Self {
        self.snapshot_cache = capacity;
        self
    }

    /// Reject settings that cannot be used
    pub fn validate(&self) -> Result<()> {
        if self.snapshot_cache == 0 {
            return Err(Error::config("snapshot_cache must be at least 1"));
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(Error::config("name must not be blank"));
            }
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Sheaf repository configuration
#
# Display name used when naming archives (default: the directory name).
# name = "my-repository"

# Re-hash blob contents on every read and fail on mismatch.
verify_blobs = true

# Snapshots kept in memory per open store; oldest are dropped first.
snapshot_cache = 256
"#
    }

    /// Read and parse config from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: StoreConfig = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_toml_parses_to_default() {
        let config: StoreConfig = toml::from_str(StoreConfig::default_toml()).unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_name_override() {
        let config: StoreConfig = toml::from_str("name = \"pmr2hgtest\"").unwrap();
        assert_eq!(config.name.as_deref(), Some("pmr2hgtest"));
        assert!(config.verify_blobs);
    }

    #[test]
    fn test_blank_name_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "name = \"  \"").unwrap();
        assert!(matches!(
            StoreConfig::from_file(&path),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_zero_snapshot_cache_rejected() {
        let config = StoreConfig::default().with_snapshot_cache(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        let config: StoreConfig = toml::from_str("snapshot_cache = 8").unwrap();
        assert_eq!(config.snapshot_cache, 8);
    }

    #[test]
    fn test_malformed_file_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "verify_blobs = maybe").unwrap();
        assert!(StoreConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_write_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let config = StoreConfig::default()
            .with_name("import1")
            .with_verify_blobs(false);
        config.write_to_file(&path).unwrap();
        assert_eq!(StoreConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_write_default_if_missing_keeps_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "name = \"kept\"").unwrap();
        StoreConfig::write_default_if_missing(&path).unwrap();
        assert_eq!(
            StoreConfig::from_file(&path).unwrap().name.as_deref(),
            Some("kept")
        );
    }
}
