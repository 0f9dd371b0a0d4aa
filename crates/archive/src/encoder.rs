//! Container encoders
//!
//! Byte-level backends with no knowledge of revisions or bindings:
//! - TarEncoder: uncompressed tar, the intermediate form of every archive
//! - TgzEncoder: tar written through gzip in one pass
//! - ZipEncoder: deflate zip
//!
//! All headers are derived from the entry alone (path, mode, mtime), with
//! uid/gid zeroed, so equal entry streams encode to equal bytes.

use crate::format::ArchiveFormat;
use chrono::{Datelike, Timelike};
use flate2::{Compression, GzBuilder};
use sheaf_core::{Error, FileMode, Result};
use std::io::{self, Cursor, Read, Write};
use tar::{Archive, Builder, EntryType, Header};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Earliest time a zip header can carry (1980-01-01T00:00:00Z)
const MIN_ZIP_TIMESTAMP: i64 = 315_532_800;

/// Latest time a zip header can carry (2107-12-31T23:59:58Z)
const MAX_ZIP_TIMESTAMP: i64 = 4_354_819_198;

/// One entry of an archive stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Archive-relative path, slash separated, no trailing slash
    pub path: String,
    /// How the entry is materialized
    pub mode: FileMode,
    /// File bytes, link target, or empty for directories
    pub data: Vec<u8>,
    /// Modification time in Unix seconds
    pub mtime: u64,
}

impl ArchiveEntry {
    /// Create an entry
    pub fn new(path: impl Into<String>, mode: FileMode, data: Vec<u8>, mtime: u64) -> Self {
        Self {
            path: path.into(),
            mode,
            data,
            mtime,
        }
    }

    /// Link target of a symlink entry
    pub fn link_target(&self) -> Result<&str> {
        std::str::from_utf8(&self.data)
            .map_err(|_| Error::archive(format!("link target of '{}' is not UTF-8", self.path)))
    }
}

/// Settings that only matter for some formats
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Name of the tar member recorded in the gzip header
    pub gzip_member: String,
    /// Time recorded in the gzip header
    pub gzip_mtime: u64,
    /// Compression level, 0-9
    pub compression_level: u32,
}

impl EncodeOptions {
    /// Options for an archive rooted at `root`
    pub fn for_root(root: &str, mtime: u64, compression_level: u32) -> Self {
        Self {
            gzip_member: format!("{}.tar", root),
            gzip_mtime: mtime,
            compression_level,
        }
    }
}

/// A format backend accepting a stream of entries
pub trait ContainerEncoder {
    /// Append one entry
    fn append(&mut self, entry: &ArchiveEntry) -> Result<()>;

    /// Finish the container and return its bytes
    fn finish(self: Box<Self>) -> Result<Vec<u8>>;
}

/// Encoder for `format`
pub fn encoder_for(format: ArchiveFormat, options: &EncodeOptions) -> Box<dyn ContainerEncoder> {
    match format {
        ArchiveFormat::Tar => Box::new(TarEncoder::new()),
        ArchiveFormat::Tgz => Box::new(TgzEncoder::new(options.clone())),
        ArchiveFormat::Zip => Box::new(ZipEncoder::new(options.compression_level)),
    }
}

/// Encode a complete entry list
pub fn encode<'a>(
    format: ArchiveFormat,
    entries: impl IntoIterator<Item = &'a ArchiveEntry>,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    let mut encoder = encoder_for(format, options);
    for entry in entries {
        encoder.append(entry)?;
    }
    encoder.finish()
}

/// Convert a composed tar into the requested format
///
/// Tar passes through untouched. Tgz is one gzip pass over the tar bytes.
/// Zip re-encodes the tar's entries.
pub fn finalize(format: ArchiveFormat, tar: Vec<u8>, options: &EncodeOptions) -> Result<Vec<u8>> {
    match format {
        ArchiveFormat::Tar => Ok(tar),
        ArchiveFormat::Tgz => gzip(&tar, options),
        ArchiveFormat::Zip => {
            let mut encoder = ZipEncoder::new(options.compression_level);
            for entry in read_tar(&tar)? {
                encoder.append_entry(&entry)?;
            }
            encoder.finish_bytes()
        }
    }
}

// ============================================================================
// Tar
// ============================================================================

/// In-memory tar builder
pub struct TarEncoder {
    builder: Builder<Vec<u8>>,
}

impl Default for TarEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TarEncoder {
    /// Empty tar
    pub fn new() -> Self {
        Self {
            builder: Builder::new(Vec::new()),
        }
    }

    /// Append one entry
    pub fn append_entry(&mut self, entry: &ArchiveEntry) -> Result<()> {
        let mut header = Header::new_gnu();
        header.set_mode(entry.mode.permissions());
        header.set_mtime(entry.mtime);
        header.set_uid(0);
        header.set_gid(0);

        let appended = match entry.mode {
            FileMode::Regular | FileMode::Executable => {
                header.set_entry_type(EntryType::Regular);
                header.set_size(entry.data.len() as u64);
                self.builder
                    .append_data(&mut header, &entry.path, entry.data.as_slice())
            }
            FileMode::Directory => {
                header.set_entry_type(EntryType::Directory);
                header.set_size(0);
                self.builder
                    .append_data(&mut header, format!("{}/", entry.path), io::empty())
            }
            FileMode::Symlink => {
                header.set_entry_type(EntryType::Symlink);
                header.set_size(0);
                let target = entry.link_target()?;
                self.builder.append_link(&mut header, &entry.path, target)
            }
        };
        appended.map_err(|e| Error::archive(format!("append '{}': {}", entry.path, e)))
    }

    /// Append every entry of another tar, unchanged
    pub fn splice(&mut self, tar: &[u8]) -> Result<usize> {
        let entries = read_tar(tar)?;
        for entry in &entries {
            self.append_entry(entry)?;
        }
        Ok(entries.len())
    }

    /// Finish the tar and return its bytes
    pub fn finish_bytes(self) -> Result<Vec<u8>> {
        self.builder
            .into_inner()
            .map_err(|e| Error::archive(format!("tar finish: {}", e)))
    }
}

impl ContainerEncoder for TarEncoder {
    fn append(&mut self, entry: &ArchiveEntry) -> Result<()> {
        self.append_entry(entry)
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        self.finish_bytes()
    }
}

/// Read every entry of an uncompressed tar
///
/// Regular files with any execute bit come back as executables. Entry
/// kinds the encoders never write are ignored.
pub fn read_tar(tar: &[u8]) -> Result<Vec<ArchiveEntry>> {
    let mut archive = Archive::new(tar);
    let mut entries = Vec::new();
    for entry in archive
        .entries()
        .map_err(|e| Error::archive(e.to_string()))?
    {
        let mut entry = entry.map_err(|e| Error::archive(e.to_string()))?;
        let path = entry
            .path()
            .map_err(|e| Error::archive(e.to_string()))?
            .to_string_lossy()
            .trim_end_matches('/')
            .to_string();
        let header = entry.header();
        let mtime = header.mtime().map_err(|e| Error::archive(e.to_string()))?;
        let perms = header.mode().map_err(|e| Error::archive(e.to_string()))?;
        let kind = header.entry_type();

        let (mode, data) = match kind {
            EntryType::Regular | EntryType::Continuous => {
                let mut data = Vec::new();
                entry
                    .read_to_end(&mut data)
                    .map_err(|e| Error::archive(format!("read '{}': {}", path, e)))?;
                let mode = if perms & 0o111 != 0 {
                    FileMode::Executable
                } else {
                    FileMode::Regular
                };
                (mode, data)
            }
            EntryType::Directory => (FileMode::Directory, Vec::new()),
            EntryType::Symlink => {
                let target = entry
                    .link_name()
                    .map_err(|e| Error::archive(e.to_string()))?
                    .ok_or_else(|| Error::archive(format!("symlink '{}' has no target", path)))?
                    .to_string_lossy()
                    .into_owned();
                (FileMode::Symlink, target.into_bytes())
            }
            _ => continue,
        };
        entries.push(ArchiveEntry::new(path, mode, data, mtime));
    }
    Ok(entries)
}

// ============================================================================
// Gzip
// ============================================================================

/// Tar written through gzip
pub struct TgzEncoder {
    tar: TarEncoder,
    options: EncodeOptions,
}

impl TgzEncoder {
    /// Empty compressed tar
    pub fn new(options: EncodeOptions) -> Self {
        Self {
            tar: TarEncoder::new(),
            options,
        }
    }
}

impl ContainerEncoder for TgzEncoder {
    fn append(&mut self, entry: &ArchiveEntry) -> Result<()> {
        self.tar.append_entry(entry)
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        let tar = self.tar.finish_bytes()?;
        gzip(&tar, &self.options)
    }
}

/// Gzip `data` in one pass, naming the member and pinning the header time
pub fn gzip(data: &[u8], options: &EncodeOptions) -> Result<Vec<u8>> {
    let mtime = u32::try_from(options.gzip_mtime).unwrap_or(u32::MAX);
    let mut encoder = GzBuilder::new()
        .filename(options.gzip_member.as_bytes())
        .mtime(mtime)
        .write(Vec::new(), Compression::new(options.compression_level));
    encoder
        .write_all(data)
        .map_err(|e| Error::archive(format!("gzip: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| Error::archive(format!("gzip finish: {}", e)))
}

// ============================================================================
// Zip
// ============================================================================

/// In-memory zip builder
pub struct ZipEncoder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    level: u32,
}

impl ZipEncoder {
    /// Empty zip using deflate at `level`
    pub fn new(level: u32) -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            level,
        }
    }

    /// Append one entry
    pub fn append_entry(&mut self, entry: &ArchiveEntry) -> Result<()> {
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(self.level as i32))
            .last_modified_time(zip_timestamp(entry.mtime))
            .unix_permissions(entry.mode.permissions());
        let err = |e: zip::result::ZipError| Error::archive(format!("zip '{}': {}", entry.path, e));

        match entry.mode {
            FileMode::Regular | FileMode::Executable => {
                self.writer
                    .start_file(entry.path.as_str(), options)
                    .map_err(err)?;
                self.writer
                    .write_all(&entry.data)
                    .map_err(|e| Error::archive(format!("zip '{}': {}", entry.path, e)))
            }
            FileMode::Directory => self
                .writer
                .add_directory(entry.path.as_str(), options)
                .map_err(err),
            FileMode::Symlink => {
                let target = entry.link_target()?;
                self.writer
                    .add_symlink(entry.path.as_str(), target, options)
                    .map_err(err)
            }
        }
    }

    /// Finish the zip and return its bytes
    pub fn finish_bytes(mut self) -> Result<Vec<u8>> {
        let cursor = self
            .writer
            .finish()
            .map_err(|e| Error::archive(format!("zip finish: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

impl ContainerEncoder for ZipEncoder {
    fn append(&mut self, entry: &ArchiveEntry) -> Result<()> {
        self.append_entry(entry)
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        self.finish_bytes()
    }
}

/// DOS timestamp for `mtime`, clamped to the range zip can represent
pub fn zip_timestamp(mtime: u64) -> zip::DateTime {
    let secs = i64::try_from(mtime)
        .unwrap_or(i64::MAX)
        .clamp(MIN_ZIP_TIMESTAMP, MAX_ZIP_TIMESTAMP);
    chrono::DateTime::from_timestamp(secs, 0)
        .and_then(|t| {
            zip::DateTime::from_date_and_time(
                t.year() as u16,
                t.month() as u8,
                t.day() as u8,
                t.hour() as u8,
                t.minute() as u8,
                t.second() as u8,
            )
            .ok()
        })
        .unwrap_or_default()
}
