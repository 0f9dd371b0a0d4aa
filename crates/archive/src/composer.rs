//! Recursive archive composition
//!
//! Every snapshot, root or nested, is first written as an uncompressed tar
//! rooted at its final archive path. A nested tar is read back and its
//! entries are appended to the parent's tar unchanged. Compression or zip
//! encoding happens once, on the outermost tar.

use crate::config::ComposerConfig;
use crate::encoder::{finalize, ArchiveEntry, EncodeOptions, TarEncoder};
use crate::naming::root_name;
use crate::report::{ArchiveReport, IncludedSubrepo, SkippedSubrepo};
use crate::request::{ArchiveRequest, ComposedArchive};
use sheaf_core::{Error, NodeId, Result, Snapshot};
use sheaf_storage::SnapshotStore;
use sheaf_subrepo::{
    OwnerContext, RepositoryContainer, Resolution, ResolutionPolicy, SubrepoResolver,
};
use std::path::PathBuf;
use tracing::{debug, info};

/// One snapshot on the current expansion path
struct Frame {
    path: PathBuf,
    node: NodeId,
    label: String,
}

/// State threaded through one composition
struct Composition<'r> {
    resolver: SubrepoResolver<'r>,
    chain: Vec<Frame>,
    report: ArchiveReport,
}

/// Builds archives of snapshots and their bound subrepositories
pub struct ArchiveComposer<'c> {
    container: &'c dyn RepositoryContainer,
    config: ComposerConfig,
}

impl<'c> ArchiveComposer<'c> {
    /// Composer resolving subrepositories in `container`
    pub fn new(container: &'c dyn RepositoryContainer, config: ComposerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { container, config })
    }

    /// Settings in use
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Compose the archive for `request` against `store`
    ///
    /// `owner` is the store's identity inside the container; binding
    /// locations are judged relative to it.
    pub fn compose(
        &self,
        store: &SnapshotStore,
        owner: &OwnerContext,
        request: &ArchiveRequest,
    ) -> Result<ComposedArchive> {
        let name_override = request.validated_name()?;
        let snapshot = store.resolve(request.revision.as_deref())?;
        let root = match name_override {
            Some(name) => name.to_string(),
            None => root_name(store.name(), &snapshot),
        };
        info!(
            target: "sheaf::archive",
            repo = %store.name(),
            node = %snapshot.short_id(),
            format = %request.format,
            include_subrepos = request.include_subrepos,
            "Composing archive"
        );

        let mut state = Composition {
            resolver: SubrepoResolver::new(self.container, self.config.sibling_policy()),
            chain: Vec::new(),
            report: ArchiveReport::default(),
        };
        let tar = self.compose_tar(
            &mut state,
            store,
            &snapshot,
            owner,
            &root,
            request.include_subrepos,
            0,
        )?;

        let options = EncodeOptions::for_root(&root, snapshot.mtime(), self.config.compression_level);
        let bytes = finalize(request.format, tar, &options)?;
        let checksum = xxh3_hex(&bytes);

        info!(
            target: "sheaf::archive",
            root = %root,
            bytes = bytes.len(),
            included = state.report.included.len(),
            skipped = state.report.skipped.len(),
            "Archive composed"
        );

        Ok(ComposedArchive {
            file_name: format!("{}{}", root, request.format.extension()),
            bytes,
            root,
            format: request.format,
            checksum,
            report: state.report,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn compose_tar(
        &self,
        state: &mut Composition<'_>,
        store: &SnapshotStore,
        snapshot: &Snapshot,
        owner: &OwnerContext,
        root: &str,
        include_subrepos: bool,
        depth: usize,
    ) -> Result<Vec<u8>> {
        let label = format!("{}@{}", store.name(), snapshot.short_id());
        if state
            .chain
            .iter()
            .any(|f| f.node == snapshot.id && f.path == store.path())
        {
            let mut chain: Vec<String> = state.chain.iter().map(|f| f.label.clone()).collect();
            chain.push(label);
            return Err(Error::SubrepoCycle { chain });
        }
        state.chain.push(Frame {
            path: store.path().to_path_buf(),
            node: snapshot.id,
            label,
        });

        let mut resolved = Vec::new();
        if include_subrepos {
            let bindings = state
                .resolver
                .bindings(store, snapshot, &mut state.report.diagnostics)?;
            for binding in bindings {
                let path = format!("{}/{}", root, binding.prefix);
                match state.resolver.resolve(&binding, owner)? {
                    Resolution::Skipped(reason) => {
                        if self.config.subrepo_policy == ResolutionPolicy::Strict {
                            return Err(Error::SubrepoUnresolved {
                                prefix: binding.prefix,
                                location: binding.location,
                                reason: reason.to_string(),
                            });
                        }
                        state
                            .report
                            .diagnostics
                            .warn(&path, format!("skipped {}: {}", binding.location, reason));
                        state.report.skipped.push(SkippedSubrepo {
                            path,
                            location: binding.location,
                            reason,
                        });
                    }
                    Resolution::Resolved(sub) => {
                        if depth + 1 > self.config.max_subrepo_depth {
                            return Err(Error::SubrepoDepthExceeded {
                                limit: self.config.max_subrepo_depth,
                                path,
                            });
                        }
                        resolved.push((binding, path, sub));
                    }
                }
            }
        } else if snapshot.manifest.contains(sheaf_subrepo::LISTING_FILE) {
            debug!(
                target: "sheaf::archive",
                root = %root,
                "Subrepositories not requested"
            );
        }

        // Files at or under a resolved prefix give way to the subrepository
        let mtime = snapshot.mtime();
        let mut encoder = TarEncoder::new();
        for entry in store.materialize(snapshot)? {
            if let Some((binding, _, _)) = resolved
                .iter()
                .find(|(b, _, _)| shadows(&b.prefix, &entry.path))
            {
                state.report.diagnostics.warn(
                    format!("{}/{}", root, entry.path),
                    format!("replaced by subrepository {}", binding.prefix),
                );
                continue;
            }
            encoder.append_entry(&ArchiveEntry::new(
                format!("{}/{}", root, entry.path),
                entry.mode,
                entry.data,
                mtime,
            ))?;
        }

        for (binding, path, sub) in resolved {
            let child = self.compose_tar(
                state,
                &sub.store,
                &sub.snapshot,
                &sub.owner,
                &path,
                true,
                depth + 1,
            )?;
            let spliced = encoder.splice(&child)?;
            debug!(
                target: "sheaf::archive",
                path = %path,
                entries = spliced,
                "Spliced subrepository"
            );
            state.report.included.push(IncludedSubrepo {
                path,
                location: binding.location,
                node: sub.snapshot.id,
            });
        }

        state.chain.pop();
        encoder.finish_bytes()
    }
}

/// True when `path` is the subrepository prefix itself or lies beneath it
fn shadows(prefix: &str, path: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// xxh3 checksum as 16 hex digits
pub fn xxh3_hex(data: &[u8]) -> String {
    use xxhash_rust::xxh3::xxh3_64;
    format!("{:016x}", xxh3_64(data))
}
