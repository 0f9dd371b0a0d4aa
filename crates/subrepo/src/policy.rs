//! Locality and resolution policies

use crate::container::OwnerContext;
use serde::{Deserialize, Serialize};
use sheaf_core::{Error, Result};
use std::fmt;
use url::Url;

/// Schemes accepted as network-style locations unless configured otherwise
pub const DEFAULT_REMOTE_SCHEMES: &[&str] = &["http", "https"];

/// What to do with a binding that cannot be resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionPolicy {
    /// Omit the subtree and record the skip
    #[default]
    Lenient,
    /// Fail the whole operation
    Strict,
}

/// Why a binding was not resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Location is outside the owner's container
    NotSibling,
    /// Location names a sibling that does not exist
    NoSuchRepository,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotSibling => write!(f, "location is not a sibling of the owner"),
            SkipReason::NoSuchRepository => write!(f, "no repository by that name"),
        }
    }
}

/// Accepts only locations that name a sibling of the owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingPolicy {
    remote_schemes: Vec<String>,
}

impl Default for SiblingPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_REMOTE_SCHEMES.iter().map(|s| s.to_string()))
    }
}

impl SiblingPolicy {
    /// Policy accepting the given schemes (compared case-insensitively)
    pub fn new(schemes: impl IntoIterator<Item = String>) -> Self {
        Self {
            remote_schemes: schemes
                .into_iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Accepted schemes
    pub fn remote_schemes(&self) -> &[String] {
        &self.remote_schemes
    }

    /// Sibling name for `location`, or why it is not one
    ///
    /// A location that is not an absolute URL with an accepted scheme is
    /// an error, not a skip.
    pub fn sibling_name(
        &self,
        location: &str,
        owner: &OwnerContext,
    ) -> Result<std::result::Result<String, SkipReason>> {
        let url = Url::parse(location).map_err(|_| Error::SubrepoPathUnsupported {
            location: location.to_string(),
        })?;
        if !self.remote_schemes.iter().any(|s| s == url.scheme()) {
            return Err(Error::SubrepoPathUnsupported {
                location: location.to_string(),
            });
        }

        let same_origin = url.scheme() == owner.url.scheme()
            && url.host_str() == owner.url.host_str()
            && url.port_or_known_default() == owner.url.port_or_known_default();
        if !same_origin {
            return Ok(Err(SkipReason::NotSibling));
        }

        match (split_last(&url), split_last(&owner.url)) {
            (Some((parent, name)), Some((owner_parent, _))) if parent == owner_parent => {
                Ok(Ok(name.to_string()))
            }
            _ => Ok(Err(SkipReason::NotSibling)),
        }
    }
}

/// Split a URL path into (parent, last segment), ignoring a trailing slash
fn split_last(url: &Url) -> Option<(&str, &str)> {
    let path = url.path().trim_end_matches('/');
    let (parent, name) = path.rsplit_once('/')?;
    if name.is_empty() {
        None
    } else {
        Some((parent, name))
    }
}
