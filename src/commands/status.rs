// `telemetry-status`: shows the profile as every report would see it.
// Like any read, this fills in and saves missing values.

use crate::commands::finish;
use crate::libs::profile;
use crate::log_info;
use crate::schemas::telemetry::TelemetrySettings;
use colored::Colorize;

pub fn run(settings: &TelemetrySettings) {
    finish(profile::current_state(settings), |update| {
        if update.wrote {
            log_info!("Saved missing telemetry defaults to {}", update.path.display());
        }
        let enabled = if update.state.enabled {
            "true".green()
        } else {
            "false".yellow()
        };
        println!("profile: {}", update.path.display().to_string().cyan());
        println!("user_id: {}", update.state.identifier);
        println!("enabled: {}", enabled);
    });
}
