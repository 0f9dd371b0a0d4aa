//! Content-addressed blob storage
//!
//! Every file version is stored whole under the SHA-256 digest of its
//! bytes. Identical contents share one blob.

use crate::paths::StorePaths;
use sheaf_core::{BlobId, Error, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Blob directory of one repository
#[derive(Debug, Clone)]
pub struct BlobStore {
    paths: StorePaths,
    verify: bool,
}

impl BlobStore {
    /// Create a blob store over an existing repository layout
    pub fn new(paths: StorePaths, verify: bool) -> Self {
        Self { paths, verify }
    }

    /// Store `data`, returning its id. Writing an existing blob is a no-op.
    pub fn put(&self, data: &[u8]) -> Result<BlobId> {
        let id = BlobId::digest(data);
        let path = self.paths.blob(&id);
        if path.exists() {
            return Ok(id);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_atomic(&path, data)?;
        Ok(id)
    }

    /// Read one blob
    ///
    /// A missing blob, or one whose bytes no longer hash to `id` when
    /// verification is on, is reported as corruption.
    pub fn get(&self, id: &BlobId) -> Result<Vec<u8>> {
        let data = fs::read(self.paths.blob(id)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::corruption(format!("blob {} is missing", id)),
            _ => Error::Io(e),
        })?;
        if self.verify {
            let actual = BlobId::digest(&data);
            if actual != *id {
                return Err(Error::corruption(format!(
                    "blob {} hashes to {}",
                    id, actual
                )));
            }
        }
        Ok(data)
    }

    /// Size in bytes without reading the content
    pub fn size(&self, id: &BlobId) -> Result<u64> {
        let meta = fs::metadata(self.paths.blob(id)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::corruption(format!("blob {} is missing", id)),
            _ => Error::Io(e),
        })?;
        Ok(meta.len())
    }

    /// Check whether a blob is stored
    pub fn contains(&self, id: &BlobId) -> bool {
        self.paths.blob(id).exists()
    }
}

/// Write `data` to `path` via a temp file and rename
///
/// Readers observe either the previous file or the complete new one.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let result = (|| -> io::Result<()> {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();
    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::Io(e));
    }
    Ok(())
}
