//! Binding resolution
//!
//! Turns a binding into an opened store positioned at the pinned revision,
//! provided the locality policy accepts its location.

use crate::binding::{self, SubrepoBinding};
use crate::container::{OwnerContext, RepositoryContainer};
use crate::policy::{SiblingPolicy, SkipReason};
use sheaf_core::{Diagnostics, Result, Snapshot};
use sheaf_storage::SnapshotStore;
use tracing::{debug, warn};

/// A binding opened at its pinned revision
#[derive(Debug)]
pub struct ResolvedSubrepo {
    /// Store of the bound repository
    pub store: SnapshotStore,
    /// Snapshot at the pinned revision
    pub snapshot: Snapshot,
    /// The bound repository as an owner of its own bindings
    pub owner: OwnerContext,
}

/// Outcome of resolving one binding
#[derive(Debug)]
pub enum Resolution {
    /// The bound repository was found and opened
    Resolved(Box<ResolvedSubrepo>),
    /// The policy declined the location or nothing matched it
    Skipped(SkipReason),
}

/// Resolves bindings against one container
pub struct SubrepoResolver<'c> {
    container: &'c dyn RepositoryContainer,
    policy: SiblingPolicy,
}

impl<'c> SubrepoResolver<'c> {
    /// Resolver over `container` using `policy`
    pub fn new(container: &'c dyn RepositoryContainer, policy: SiblingPolicy) -> Self {
        Self { container, policy }
    }

    /// Container bindings are resolved in
    pub fn container(&self) -> &dyn RepositoryContainer {
        self.container
    }

    /// Bindings declared by `snapshot`, sorted by prefix
    pub fn bindings(
        &self,
        store: &SnapshotStore,
        snapshot: &Snapshot,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<SubrepoBinding>> {
        binding::bindings(store, snapshot, diagnostics)
    }

    /// Resolve one binding on behalf of `owner`
    ///
    /// Unsupported locations, and failures opening or reading a sibling
    /// that does exist, are errors. Everything else the policy rejects is
    /// a skip.
    pub fn resolve(&self, binding: &SubrepoBinding, owner: &OwnerContext) -> Result<Resolution> {
        let name = match self.policy.sibling_name(&binding.location, owner)? {
            Ok(name) => name,
            Err(reason) => return Ok(self.skip(binding, reason)),
        };
        let path = match self.container.locate(&name)? {
            Some(path) => path,
            None => return Ok(self.skip(binding, SkipReason::NoSuchRepository)),
        };

        let store = SnapshotStore::open(&path)?;
        let snapshot = store.resolve(binding.revision.as_deref())?;
        debug!(
            target: "sheaf::subrepo",
            prefix = %binding.prefix,
            sibling = %name,
            node = %snapshot.short_id(),
            "Resolved subrepository"
        );
        Ok(Resolution::Resolved(Box::new(ResolvedSubrepo {
            store,
            snapshot,
            owner: self.container.owner(&name)?,
        })))
    }

    fn skip(&self, binding: &SubrepoBinding, reason: SkipReason) -> Resolution {
        warn!(
            target: "sheaf::subrepo",
            prefix = %binding.prefix,
            location = %binding.location,
            %reason,
            "Skipping subrepository"
        );
        Resolution::Skipped(reason)
    }
}
