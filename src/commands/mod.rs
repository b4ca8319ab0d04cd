// Register application subcommands.
// Each module corresponds to one `dagster-telemetry` command-line action.

// `log-action`: send one usage report.
pub mod log_action;
// `reset-telemetry-profile`: issue a new anonymous identifier.
pub mod reset_profile;
// `telemetry-status`: print the resolved profile.
pub mod status;
// `enable-telemetry` / `disable-telemetry`.
pub mod toggle;

use crate::error::TelemetryError;
use crate::libs::profile::{ProfileOutcome, ProfileUpdate};
use crate::log_error;

/// Prints the notice for a missing home directory, or hands the update to `on_update`.
/// Errors end the process with status 1.
pub(crate) fn finish(
    outcome: Result<ProfileOutcome, TelemetryError>,
    on_update: impl FnOnce(ProfileUpdate),
) {
    match outcome {
        Ok(ProfileOutcome::HomeUnset { notice }) => println!("{notice}"),
        Ok(ProfileOutcome::Resolved(update)) => on_update(update),
        Err(e) => {
            log_error!("{}", e);
            std::process::exit(1);
        }
    }
}
