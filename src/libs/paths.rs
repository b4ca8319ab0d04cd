// Locates the telemetry profile on disk.
// Everything here is a pure function of the home value passed in; nothing reads the
// process environment, so callers and tests decide what DAGSTER_HOME is.

use crate::libs::utilities::path_helpers::expand_tilde;
use crate::log_debug;
use crate::schemas::telemetry::{CONFIG_FILE_NAME, LEGACY_PROFILE_FILE_NAME};
use std::path::{Path, PathBuf};

/// Turns a raw `DAGSTER_HOME` value into a directory path.
///
/// Returns `None` when the value is unset or blank. There is deliberately no fallback
/// location: without a home directory the profile is simply unavailable.
pub fn resolve_home(home: Option<&str>) -> Option<PathBuf> {
    let raw = home.map(str::trim).filter(|value| !value.is_empty())?;
    let resolved = expand_tilde(raw);
    log_debug!("[Paths] Telemetry home resolved to {}", resolved.display());
    Some(resolved)
}

/// `<home>/dagster.yaml`
pub fn config_file_path(home: &Path) -> PathBuf {
    home.join(CONFIG_FILE_NAME)
}

/// `<home>/instance_profile.yaml`, read only to migrate older installations.
pub fn legacy_profile_path(home: &Path) -> PathBuf {
    home.join(LEGACY_PROFILE_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_or_blank_home_is_unavailable() {
        assert_eq!(resolve_home(None), None);
        assert_eq!(resolve_home(Some("")), None);
        assert_eq!(resolve_home(Some("   ")), None);
    }

    #[test]
    fn config_files_live_directly_under_home() {
        let home = resolve_home(Some("/dagster/home/path/")).unwrap();
        assert_eq!(
            config_file_path(&home),
            PathBuf::from("/dagster/home/path/dagster.yaml")
        );
        assert_eq!(
            legacy_profile_path(&home),
            PathBuf::from("/dagster/home/path/instance_profile.yaml")
        );
    }
}
