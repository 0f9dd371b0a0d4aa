//! Archive root naming

use sheaf_core::Snapshot;

/// Replace every run of non-word characters with a single hyphen
///
/// Word characters are alphanumerics (any script) and `_`.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_alphanumeric() || c == '_' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('-');
            in_run = true;
        }
    }
    out
}

/// `<slug(display name)>-<short id>`
pub fn root_name(display_name: &str, snapshot: &Snapshot) -> String {
    format!("{}-{}", slug(display_name), snapshot.short_id())
}
