// Data types and key names for the telemetry profile.
//
// Modern layout of `$DAGSTER_HOME/dagster.yaml`:
//
//   telemetry:
//     enabled: true
//     user_id: 6f1c...
//
// Legacy flat layout (older releases, usually in `instance_profile.yaml`):
//
//   user_id: 6f1c...
//   telemetry_enabled: false

/// Environment variable naming the installation home directory.
pub const HOME_ENV_VAR: &str = "DAGSTER_HOME";
/// Process-level opt-out honored by the reporter: `TELEMETRY_ENABLED=false`.
pub const TELEMETRY_ENABLED_ENV_VAR: &str = "TELEMETRY_ENABLED";
pub const ENDPOINT_ENV_VAR: &str = "DAGSTER_TELEMETRY_ENDPOINT";
pub const DEFAULT_ENDPOINT: &str = "https://telemetry.elementl.dev/actions";

pub const CONFIG_FILE_NAME: &str = "dagster.yaml";
pub const LEGACY_PROFILE_FILE_NAME: &str = "instance_profile.yaml";

pub const TELEMETRY_SECTION_KEY: &str = "telemetry";
pub const USER_ID_KEY: &str = "user_id";
pub const ENABLED_KEY: &str = "enabled";
/// Top-level flag keys of the legacy layout. `tracking_enabled` is what the very
/// first release wrote when it created a profile.
pub const LEGACY_ENABLED_KEYS: [&str; 2] = ["telemetry_enabled", "tracking_enabled"];

/// The recognized values as found in a profile, each possibly missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceState {
    pub identifier: Option<String>,
    pub enabled: Option<bool>,
}

/// The resolved pair every caller acts on, independent of the on-disk layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveState {
    pub identifier: String,
    pub enabled: bool,
}

/// Explicit changes requested by the toggle and reset operations.
/// The default value requests nothing, which is the plain read path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub enabled: Option<bool>,
    pub regenerate_identifier: bool,
}

impl Overrides {
    pub fn set_enabled(enabled: bool) -> Self {
        Overrides {
            enabled: Some(enabled),
            regenerate_identifier: false,
        }
    }

    pub fn regenerate_identifier() -> Self {
        Overrides {
            enabled: None,
            regenerate_identifier: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_none() && !self.regenerate_identifier
    }
}

/// Which shape the recognized values were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileLayout {
    /// No recognized keys at all.
    Empty,
    /// A `telemetry` section (possibly with dead legacy keys next to it).
    Modern,
    /// Only the flat `user_id` / `telemetry_enabled` keys.
    Legacy,
}

/// Runtime inputs threaded into every operation instead of being read from the
/// process environment at the point of use.
#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    /// Raw `DAGSTER_HOME` value; `None` or blank means no profile can be persisted.
    pub home: Option<String>,
    /// Raw `TELEMETRY_ENABLED` value.
    pub telemetry_enabled_env: Option<String>,
    pub endpoint: String,
}

impl TelemetrySettings {
    pub fn new(home: Option<String>) -> Self {
        TelemetrySettings {
            home,
            telemetry_enabled_env: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// `TELEMETRY_ENABLED=false` switches reporting off for the whole process,
    /// whatever the profile says.
    pub fn env_opted_out(&self) -> bool {
        self.telemetry_enabled_env
            .as_deref()
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("false"))
    }
}
