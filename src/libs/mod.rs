// Core library modules, leaves first.

// Locating dagster.yaml from DAGSTER_HOME.
pub mod paths;
// Reading and writing the YAML profile.
pub mod config_store;
// Random and host-derived identifiers.
pub mod identity;
// The state resolution and merge logic.
pub mod state_resolver;
// Enable, disable, reset and read operations.
pub mod profile;
// Best-effort usage reports.
pub mod reporter;
// Small helpers shared by the modules above.
pub mod utilities;
