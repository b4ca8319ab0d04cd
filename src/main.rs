mod cli;
mod commands;
mod error;
mod libs;
mod logger;
mod schemas;

use clap::Parser;
use cli::cmd_enums::{Cli, Commands};
use commands::{log_action, reset_profile, status, toggle};

fn main() {
    let cli = Cli::parse();
    logger::init(cli.debug);

    let settings = cli.settings.into_settings();
    log_debug!("Running with {:?}", settings);

    match cli.command {
        Commands::EnableTelemetry => toggle::run(&settings, true),
        Commands::DisableTelemetry => toggle::run(&settings, false),
        Commands::ResetTelemetryProfile => reset_profile::run(&settings),
        Commands::TelemetryStatus => status::run(&settings),
        Commands::LogAction { action, metadata } => {
            log_action::run(&settings, &action, metadata.as_deref())
        }
    }
}
