// Data shapes shared across the crate.

// Profile keys, resolved state types and runtime settings.
pub mod telemetry;
