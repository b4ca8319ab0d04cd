// Toggle, reset and read operations on the telemetry profile.
//
// Each operation loads `$DAGSTER_HOME/dagster.yaml` (or the legacy profile), resolves
// the state with its overrides, and writes the tree back when the resolver asks for it
// or when the content came from somewhere other than `dagster.yaml`.
// Without a home directory every operation is a no-op that hands back a notice.

use crate::error::Result;
use crate::libs::config_store::{ConfigSource, load_profile, write_config_tree};
use crate::libs::identity::RandomIdentifier;
use crate::libs::paths::resolve_home;
use crate::libs::state_resolver::resolve;
use crate::schemas::telemetry::{
    EffectiveState, HOME_ENV_VAR, Overrides, ProfileLayout, TELEMETRY_SECTION_KEY,
    TelemetrySettings,
};
use crate::{log_debug, log_info};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub state: EffectiveState,
    pub path: PathBuf,
    /// Whether this call rewrote the profile.
    pub wrote: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileOutcome {
    /// No home directory; nothing was read or written.
    HomeUnset { notice: String },
    Resolved(ProfileUpdate),
}

pub fn enable(settings: &TelemetrySettings) -> Result<ProfileOutcome> {
    apply(settings, Overrides::set_enabled(true), "enable telemetry")
}

pub fn disable(settings: &TelemetrySettings) -> Result<ProfileOutcome> {
    apply(settings, Overrides::set_enabled(false), "disable telemetry")
}

pub fn reset_identifier(settings: &TelemetrySettings) -> Result<ProfileOutcome> {
    apply(settings, Overrides::regenerate_identifier(), "reset profile")
}

/// Read path: fills in and persists missing values, never changes stored ones.
pub fn current_state(settings: &TelemetrySettings) -> Result<ProfileOutcome> {
    apply(settings, Overrides::default(), "view telemetry status")
}

fn home_unset_notice(purpose: &str) -> String {
    format!("Must set ${HOME_ENV_VAR} environment variable to {purpose}")
}

fn apply(settings: &TelemetrySettings, overrides: Overrides, purpose: &str) -> Result<ProfileOutcome> {
    match resolve_home(settings.home.as_deref()) {
        Some(home) => Ok(ProfileOutcome::Resolved(apply_in_home(&home, overrides)?)),
        None => {
            log_debug!("[Profile] No {} set; skipping '{}'", HOME_ENV_VAR, purpose);
            Ok(ProfileOutcome::HomeUnset {
                notice: home_unset_notice(purpose),
            })
        }
    }
}

/// Resolves and, when needed, persists the profile stored under `home`.
///
/// # Arguments
/// * `home`: The resolved installation home directory. It must already exist.
/// * `overrides`: Changes requested by the caller; `Overrides::default()` for a plain read.
///
/// # Returns
/// * `Ok(ProfileUpdate)` with the effective state, the `dagster.yaml` path, and whether
///   the file was rewritten. It is rewritten when the resolver filled in, overrode or
///   migrated something, or when the content came from the legacy profile file.
/// * `Err` for an unreadable or malformed profile (left untouched) or a failed write.
pub fn apply_in_home(home: &Path, overrides: Overrides) -> Result<ProfileUpdate> {
    let loaded = load_profile(home)?;
    match &loaded.source {
        ConfigSource::Modern(path) | ConfigSource::LegacyProfile(path) => {
            log_debug!("[Profile] Read profile from {}", path.display());
        }
        ConfigSource::Missing => log_debug!("[Profile] No profile under {}", home.display()),
    }
    if !overrides.is_empty() {
        log_debug!("[Profile] Applying {:?}", overrides);
    }

    let resolution = resolve(&loaded.tree, &overrides, &RandomIdentifier);
    if resolution.layout == ProfileLayout::Legacy {
        log_info!(
            "Moving legacy telemetry keys into the '{}' section of {}",
            TELEMETRY_SECTION_KEY,
            loaded.target.display()
        );
    }

    let migrating = matches!(loaded.source, ConfigSource::LegacyProfile(_));
    let wrote = resolution.needs_write || migrating;
    if wrote {
        write_config_tree(&loaded.target, &resolution.tree)?;
        if loaded.source == ConfigSource::Missing {
            log_info!("Created telemetry profile at {}", loaded.target.display());
        }
    } else {
        log_debug!("[Profile] {} is up to date", loaded.target.display());
    }

    Ok(ProfileUpdate {
        state: resolution.state,
        path: loaded.target,
        wrote,
    })
}
