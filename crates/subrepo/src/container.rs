//! Repository containers
//!
//! A container is one logical namespace of repositories that share a base
//! URL, such as a folder of workspaces on a site. Subrepository locations
//! are only ever resolved against the container that holds the owner.

use sheaf_core::{Error, Result};
use sheaf_storage::CONTROL_DIR;
use std::path::{Path, PathBuf};
use url::Url;

/// The repository a binding is being resolved for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerContext {
    /// Name of the owner inside its container
    pub name: String,
    /// Public URL of the owner
    pub url: Url,
}

/// Namespace of sibling repositories
pub trait RepositoryContainer: Send + Sync {
    /// URL under which every member is addressed
    fn base_url(&self) -> &Url;

    /// Local root of the member called `name`, if there is one
    fn locate(&self, name: &str) -> Result<Option<PathBuf>>;

    /// Public URL of the member called `name`
    fn url_for(&self, name: &str) -> Result<Url> {
        let mut url = self.base_url().clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::invalid_input(format!("base URL '{}' cannot have members", self.base_url()))
            })?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }

    /// Owner context for the member called `name`
    fn owner(&self, name: &str) -> Result<OwnerContext> {
        Ok(OwnerContext {
            name: name.to_string(),
            url: self.url_for(name)?,
        })
    }
}

/// Container backed by a directory of repositories
///
/// Every child directory holding a control directory is a member, addressed
/// as `<base_url>/<dirname>`.
#[derive(Debug, Clone)]
pub struct DirectoryContainer {
    dir: PathBuf,
    base_url: Url,
}

impl DirectoryContainer {
    /// Container over `dir`, published at `base_url`
    pub fn new(dir: impl AsRef<Path>, base_url: Url) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(Error::invalid_input(format!(
                "base URL '{}' cannot have members",
                base_url
            )));
        }
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            base_url,
        })
    }

    /// Parse `base_url` and build the container
    pub fn parse(dir: impl AsRef<Path>, base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)
            .map_err(|e| Error::invalid_input(format!("invalid base URL '{}': {}", base_url, e)))?;
        Self::new(dir, url)
    }

    /// Directory holding the members
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Names of all members, sorted
    pub fn members(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.path().join(CONTROL_DIR).is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

impl RepositoryContainer for DirectoryContainer {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn locate(&self, name: &str) -> Result<Option<PathBuf>> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Ok(None);
        }
        let path = self.dir.join(name);
        if path.join(CONTROL_DIR).is_dir() {
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }
}
