// `reset-telemetry-profile`: replaces the anonymous identifier, keeps the enabled flag.

use crate::commands::finish;
use crate::libs::profile;
use crate::schemas::telemetry::TelemetrySettings;
use colored::Colorize;

pub fn run(settings: &TelemetrySettings) {
    finish(profile::reset_identifier(settings), |update| {
        println!(
            "New telemetry user_id {} written to {}",
            update.state.identifier.bold(),
            update.path.display().to_string().cyan()
        );
    });
}
