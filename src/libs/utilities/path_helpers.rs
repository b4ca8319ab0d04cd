use crate::log_debug;
use std::path::PathBuf;

/// Expands a leading `~` to the current user's home directory.
///
/// Paths without a tilde, and tildes that cannot be expanded because the home
/// directory is unknown, are returned unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    let expanded = shellexpand::tilde(path);
    if expanded != path {
        log_debug!("[Paths] Expanded '{}' to '{}'", path, expanded);
    }
    PathBuf::from(expanded.as_ref())
}
