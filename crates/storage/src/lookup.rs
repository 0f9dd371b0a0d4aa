//! Revision identifier lookup
//!
//! Maps a caller-supplied change identifier onto a revision number. Forms
//! are tried in order: the `tip` alias, a decimal revision number (negative
//! counts back from tip), a full id, a branch label, and finally a unique
//! hex prefix.

use sheaf_core::{is_hex, Error, NodeId, Result, ID_HEX_LEN};

/// Alias for the most recent revision
pub const TIP: &str = "tip";

/// Find the revision number for `changeid`
///
/// `branch_head` returns the newest revision carrying a branch label, if
/// any. It is consulted only when the identifier is not a number or a full
/// id.
pub fn lookup<F>(index: &[NodeId], changeid: Option<&str>, mut branch_head: F) -> Result<u64>
where
    F: FnMut(&str) -> Result<Option<u64>>,
{
    let changeid = match changeid.map(str::trim) {
        None | Some(TIP) => {
            return match index.len() {
                0 => Err(Error::RepoEmpty),
                n => Ok(n as u64 - 1),
            };
        }
        Some(id) => id,
    };

    if changeid.is_empty() || index.is_empty() {
        return Err(Error::revision_not_found(changeid));
    }

    if let Ok(n) = changeid.parse::<i64>() {
        let len = index.len() as i64;
        let rev = if n < 0 { len + n } else { n };
        if (0..len).contains(&rev) {
            return Ok(rev as u64);
        }
        return Err(Error::revision_not_found(changeid));
    }

    if changeid.len() == ID_HEX_LEN {
        if let Ok(id) = NodeId::from_hex(changeid) {
            return index
                .iter()
                .position(|n| *n == id)
                .map(|rev| rev as u64)
                .ok_or_else(|| Error::revision_not_found(changeid));
        }
    }

    if let Some(rev) = branch_head(changeid)? {
        return Ok(rev);
    }

    if is_hex(changeid) && changeid.len() < ID_HEX_LEN {
        let prefix = changeid.to_ascii_lowercase();
        let mut found = None;
        for (rev, id) in index.iter().enumerate() {
            if id.to_hex().starts_with(&prefix) {
                if found.is_some() {
                    return Err(Error::revision_not_found(changeid));
                }
                found = Some(rev as u64);
            }
        }
        if let Some(rev) = found {
            return Ok(rev);
        }
    }

    Err(Error::revision_not_found(changeid))
}
