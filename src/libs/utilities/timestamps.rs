use chrono::{SecondsFormat, Utc};

/// Current UTC time in RFC 3339 with microsecond precision,
/// e.g. `2024-03-07T10:30:45.123456Z`. Used as a report's `client_time`.
pub fn current_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
