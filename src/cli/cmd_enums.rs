use crate::schemas::telemetry::{
    DEFAULT_ENDPOINT, ENDPOINT_ENV_VAR, HOME_ENV_VAR, TELEMETRY_ENABLED_ENV_VAR, TelemetrySettings,
};
use clap::{Args, Parser, Subcommand};

/// Command-line interface for `dagster-telemetry`.
#[derive(Parser)]
#[command(name = "dagster-telemetry")]
#[command(about = "Manage the anonymous usage-telemetry profile of a Dagster installation", long_about = None)]
pub struct Cli {
    /// Enables detailed debug output for troubleshooting.
    #[arg(short, long, global = true)]
    pub(crate) debug: bool,

    #[command(flatten)]
    pub(crate) settings: SettingsArgs,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

/// Options shared by every subcommand. Each one can also come from the environment.
#[derive(Args)]
pub struct SettingsArgs {
    /// Installation home directory holding dagster.yaml.
    #[arg(long, global = true, env = HOME_ENV_VAR, value_name = "DIR")]
    pub(crate) home: Option<String>,

    /// Where usage reports are posted.
    #[arg(long, global = true, env = ENDPOINT_ENV_VAR, default_value = DEFAULT_ENDPOINT, value_name = "URL")]
    pub(crate) endpoint: String,

    /// Set to `false` to stop all reports from this process regardless of the profile.
    #[arg(long, global = true, env = TELEMETRY_ENABLED_ENV_VAR, hide = true)]
    pub(crate) telemetry_enabled: Option<String>,
}

impl SettingsArgs {
    pub fn into_settings(self) -> TelemetrySettings {
        let mut settings = TelemetrySettings::new(self.home);
        settings.telemetry_enabled_env = self.telemetry_enabled;
        settings.endpoint = self.endpoint;
        settings
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enable telemetry. Requires $DAGSTER_HOME to be set.
    EnableTelemetry,
    /// Disable telemetry. Requires $DAGSTER_HOME to be set.
    DisableTelemetry,
    /// Generate a new anonymous user identifier. Requires $DAGSTER_HOME to be set.
    ResetTelemetryProfile,
    /// Show the identifier and whether telemetry is enabled.
    TelemetryStatus,
    /// Send a single usage report, unless telemetry is disabled.
    LogAction {
        /// Action label to report.
        action: String,
        /// Extra data attached to the report, as a JSON document.
        #[arg(long, value_name = "JSON")]
        metadata: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands_with_kebab_case_names() {
        let cli = Cli::try_parse_from(["dagster-telemetry", "--home", "/tmp/dh", "disable-telemetry"])
            .unwrap();
        assert!(matches!(cli.command, Commands::DisableTelemetry));

        let settings = cli.settings.into_settings();
        assert_eq!(settings.home.as_deref(), Some("/tmp/dh"));
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn log_action_takes_metadata() {
        let cli = Cli::try_parse_from([
            "dagster-telemetry",
            "log-action",
            "launched",
            "--metadata",
            r#"{"k": 1}"#,
        ])
        .unwrap();
        match cli.command {
            Commands::LogAction { action, metadata } => {
                assert_eq!(action, "launched");
                assert_eq!(metadata.as_deref(), Some(r#"{"k": 1}"#));
            }
            _ => panic!("expected log-action"),
        }
    }
}
