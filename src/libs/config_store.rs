// Reads and writes the YAML profile as a generic mapping.
//
// The file is user-editable and may hold settings unrelated to telemetry, so it is
// never deserialized into a fixed struct. Keys are kept in their original order,
// which keeps rewrites deterministic and diffs small.

use crate::error::{Result, TelemetryError};
use crate::libs::paths::{config_file_path, legacy_profile_path};
use crate::{log_debug, log_info};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Where a loaded profile tree came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Neither `dagster.yaml` nor the legacy profile exists.
    Missing,
    Modern(PathBuf),
    /// Only the legacy `instance_profile.yaml` exists. Its content is migrated into
    /// `dagster.yaml`; the legacy file itself is left alone.
    LegacyProfile(PathBuf),
}

#[derive(Debug, Clone)]
pub struct LoadedProfile {
    pub tree: Mapping,
    pub source: ConfigSource,
    /// Where the profile is always written back to.
    pub target: PathBuf,
}

/// Reads `path` into a mapping.
///
/// # Arguments
/// * `path`: The profile file to read.
///
/// # Returns
/// * `Ok(None)` if the file does not exist.
/// * `Ok(Some(empty))` for an empty, comment-only or `null` document.
/// * `Ok(Some(tree))` for a mapping document, unchanged.
/// * `Err(ConfigParse)` for malformed YAML, `Err(ConfigEncoding)` for a file that is not
///   UTF-8, `Err(ConfigNotMapping)` for a top-level scalar or list, `Err(Io)` when the
///   file exists but cannot be read.
pub fn read_config_tree(path: &Path) -> Result<Option<Mapping>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log_debug!("[Store] {} does not exist", path.display());
            return Ok(None);
        }
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            return Err(TelemetryError::ConfigEncoding {
                path: path.to_path_buf(),
                source: e,
            });
        }
        Err(e) => return Err(TelemetryError::io(path, e)),
    };

    let has_content = contents.lines().map(str::trim).any(|line| !line.is_empty() && !line.starts_with('#'));
    if !has_content {
        log_debug!("[Store] {} is empty", path.display());
        return Ok(Some(Mapping::new()));
    }

    let document: Value =
        serde_yaml::from_str(&contents).map_err(|source| TelemetryError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

    match document {
        Value::Null => Ok(Some(Mapping::new())),
        Value::Mapping(tree) => {
            log_debug!("[Store] Loaded {} top-level keys from {}", tree.len(), path.display());
            Ok(Some(tree))
        }
        other => Err(TelemetryError::ConfigNotMapping {
            path: path.to_path_buf(),
            found: value_kind(&other),
        }),
    }
}

/// Serializes `tree` and replaces the whole content of `path` with it.
/// The parent directory must already exist.
pub fn write_config_tree(path: &Path, tree: &Mapping) -> Result<()> {
    let output = serde_yaml::to_string(tree)?;
    fs::write(path, output).map_err(|e| TelemetryError::io(path, e))?;
    log_debug!("[Store] Wrote {}", path.display());
    Ok(())
}

/// Loads the profile for `home`, preferring `dagster.yaml` and falling back to the
/// legacy `instance_profile.yaml` only when the modern file is absent.
pub fn load_profile(home: &Path) -> Result<LoadedProfile> {
    let target = config_file_path(home);
    if let Some(tree) = read_config_tree(&target)? {
        return Ok(LoadedProfile {
            tree,
            source: ConfigSource::Modern(target.clone()),
            target,
        });
    }

    let legacy = legacy_profile_path(home);
    if let Some(tree) = read_config_tree(&legacy)? {
        log_info!(
            "Migrating telemetry profile from {} to {}",
            legacy.display(),
            target.display()
        );
        return Ok(LoadedProfile {
            tree,
            source: ConfigSource::LegacyProfile(legacy),
            target,
        });
    }

    Ok(LoadedProfile {
        tree: Mapping::new(),
        source: ConfigSource::Missing,
        target,
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
