// `enable-telemetry` and `disable-telemetry`.

use crate::commands::finish;
use crate::libs::profile;
use crate::log_debug;
use crate::schemas::telemetry::TelemetrySettings;
use colored::Colorize;

pub fn run(settings: &TelemetrySettings, enable: bool) {
    log_debug!("Entered toggle::run() with enable={}", enable);

    let outcome = if enable {
        profile::enable(settings)
    } else {
        profile::disable(settings)
    };

    finish(outcome, |update| {
        let status = if update.state.enabled {
            "enabled".green()
        } else {
            "disabled".yellow()
        };
        println!(
            "Telemetry {} in {}",
            status,
            update.path.display().to_string().cyan()
        );
    });
}
