// Helpers with no telemetry knowledge of their own.

// `~` expansion for user-supplied paths.
pub mod path_helpers;
// Report timestamps.
pub mod timestamps;
