//! Composer configuration
//!
//! Built in code or loaded from a TOML file:
//!
//! ```toml
//! subrepo_policy = "lenient"
//! max_subrepo_depth = 16
//! remote_schemes = ["http", "https"]
//! compression_level = 6
//! ```

use serde::{Deserialize, Serialize};
use sheaf_core::{Error, Result};
use sheaf_subrepo::{ResolutionPolicy, SiblingPolicy, DEFAULT_REMOTE_SCHEMES};
use std::path::Path;

/// Default nesting limit for subrepositories
pub const DEFAULT_MAX_SUBREPO_DEPTH: usize = 16;

/// Default deflate/gzip level
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Settings for archive composition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Handling of bindings that cannot be resolved
    pub subrepo_policy: ResolutionPolicy,
    /// Deepest allowed subrepository nesting
    pub max_subrepo_depth: usize,
    /// Schemes accepted in binding locations
    pub remote_schemes: Vec<String>,
    /// Compression level for tgz and zip, 0-9
    pub compression_level: u32,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            subrepo_policy: ResolutionPolicy::default(),
            max_subrepo_depth: DEFAULT_MAX_SUBREPO_DEPTH,
            remote_schemes: DEFAULT_REMOTE_SCHEMES.iter().map(|s| s.to_string()).collect(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl ComposerConfig {
    /// Set the resolution policy
    pub fn with_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.subrepo_policy = policy;
        self
    }

    /// Set the nesting limit
    pub fn with_max_subrepo_depth(mut self, depth: usize) -> Self {
        self.max_subrepo_depth = depth;
        self
    }

    /// Set the accepted location schemes
    pub fn with_remote_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remote_schemes = schemes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the compression level
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    /// Reject settings that cannot be used
    pub fn validate(&self) -> Result<()> {
        if self.remote_schemes.is_empty() {
            return Err(Error::config("remote_schemes must not be empty"));
        }
        if self.remote_schemes.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::config("remote_schemes must not contain blank entries"));
        }
        if self.max_subrepo_depth == 0 {
            return Err(Error::config("max_subrepo_depth must be at least 1"));
        }
        if self.compression_level > 9 {
            return Err(Error::config(format!(
                "compression_level must be 0-9, got {}",
                self.compression_level
            )));
        }
        Ok(())
    }

    /// Locality policy for the configured schemes
    pub fn sibling_policy(&self) -> SiblingPolicy {
        SiblingPolicy::new(self.remote_schemes.iter().cloned())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Sheaf archive composer configuration

# What to do with a subrepository that cannot be resolved:
#   "lenient" - leave it out and report it (default)
#   "strict"  - fail the export
subrepo_policy = "lenient"

# Deepest allowed subrepository nesting.
max_subrepo_depth = 16

# URL schemes accepted in subrepository locations.
remote_schemes = ["http", "https"]

# Compression level for tgz and zip (0-9).
compression_level = 6
"#
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ComposerConfig = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse composer config: {}", e)))?;
        config.validate()?;
        Ok(config)
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
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(msg) => Error::config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }
}
