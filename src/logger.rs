// Application logging.
// Level-tagged, colored lines go to stderr so stdout stays reserved for the
// user-facing output of each command (notices, status lines).
// Debug lines are only printed once `init(true)` has been called.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// `log_info!` for normal progress messages.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => (eprintln!("{} {}", ::colored::Colorize::bright_green("[INFO]"), format!($($arg)*)));
}

/// `log_warn!` for conditions the user should know about but that do not stop the command.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => (eprintln!("{} {}", ::colored::Colorize::bright_yellow("[WARN]"), format!($($arg)*)));
}

/// `log_error!` for failures that end the current command.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => (eprintln!("{} {}", ::colored::Colorize::bright_red("[ERROR]"), format!($($arg)*)));
}

/// `log_debug!` for internal tracing; silent unless debug mode is on.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if $crate::logger::is_debug_enabled() {
            eprintln!("{} {}", ::colored::Colorize::dimmed("[DEBUG]"), format!($($arg)*));
        }
    };
}

static DEBUG_ENABLED: OnceLock<AtomicBool> = OnceLock::new();

/// Sets the process-wide debug flag. Called once from `main` with the value of `--debug`.
pub fn init(debug: bool) {
    DEBUG_ENABLED
        .get_or_init(|| AtomicBool::new(debug))
        .store(debug, Ordering::Relaxed);

    log_debug!("[Logger] Debug output enabled");
}

/// Returns whether `log_debug!` output should be printed. `false` until `init` runs.
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED
        .get()
        .map(|flag| flag.load(Ordering::Relaxed))
        .unwrap_or(false)
}
