// `log-action`: sends one report through the same path the rest of Dagster uses.

use crate::error::TelemetryError;
use crate::libs::reporter::{ReportOutcome, Reporter};
use crate::schemas::telemetry::TelemetrySettings;
use crate::{log_debug, log_error, log_info};

pub fn run(settings: &TelemetrySettings, action: &str, metadata: Option<&str>) {
    // Bad metadata is a usage error, reported before anything is resolved or sent.
    let metadata = match metadata
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .map_err(TelemetryError::from)
    {
        Ok(metadata) => metadata,
        Err(e) => {
            log_error!("--metadata: {}", e);
            std::process::exit(2);
        }
    };

    match Reporter::new().report(settings, action, metadata) {
        ReportOutcome::Sent => log_info!("Reported '{}'", action),
        ReportOutcome::Disabled => log_info!("Telemetry is disabled; nothing was sent"),
        ReportOutcome::Dropped => log_debug!("Report for '{}' was dropped", action),
    }
}
