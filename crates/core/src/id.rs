//! Content-derived identifiers
//!
//! Both changesets and file blobs are addressed by the SHA-256 digest of
//! their canonical bytes. The two id kinds share a representation but are
//! distinct types so a blob id can never be passed where a changeset id is
//! expected.
//!
//! ## Display
//!
//! Ids print as 64 lowercase hex characters. [`NodeId::short`] gives the
//! 12-character prefix used in archive names.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Length of an id in bytes
pub const ID_LEN: usize = 32;

/// Length of an id in hex characters
pub const ID_HEX_LEN: usize = ID_LEN * 2;

/// Length of the short display prefix in hex characters
pub const SHORT_ID_LEN: usize = 12;

macro_rules! content_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name([u8; ID_LEN]);

        impl $name {
            /// Wrap raw digest bytes
            pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
                Self(bytes)
            }

            /// Digest `data` with SHA-256
            pub fn digest(data: &[u8]) -> Self {
                let mut out = [0u8; ID_LEN];
                out.copy_from_slice(&Sha256::digest(data));
                Self(out)
            }

            /// Parse a full-length hex id
            pub fn from_hex(s: &str) -> Result<Self> {
                if s.len() != ID_HEX_LEN {
                    return Err(Error::invalid_input(format!(
                        "{} must be {} hex characters, got {}",
                        stringify!($name),
                        ID_HEX_LEN,
                        s.len()
                    )));
                }
                let mut out = [0u8; ID_LEN];
                hex::decode_to_slice(s, &mut out).map_err(|e| {
                    Error::invalid_input(format!("invalid {} '{}': {}", stringify!($name), s, e))
                })?;
                Ok(Self(out))
            }

            /// Raw digest bytes
            pub fn as_bytes(&self) -> &[u8; ID_LEN] {
                &self.0
            }

            /// Full lowercase hex form
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// First [`SHORT_ID_LEN`] hex characters
            pub fn short(&self) -> String {
                let mut s = self.to_hex();
                s.truncate(SHORT_ID_LEN);
                s
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.short())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::from_hex(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

content_id! {
    /// Identifier of one changeset (and therefore of one snapshot)
    NodeId
}

content_id! {
    /// Identifier of one file's content
    BlobId
}

/// True if `s` is non-empty and consists only of lowercase or uppercase hex digits
pub fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}
