//! Sends usage reports.
//!
//! [`Reporter::report`] is the one place where telemetry failures are swallowed: a
//! broken profile, a missing network or a rejected request must never bubble up into
//! the command that triggered the report. Everything below it returns `Result` as usual.

use crate::error::{Result, TelemetryError};
use crate::libs::identity::{HostIdentifier, IdentifierSource};
use crate::libs::profile::{self, ProfileOutcome};
use crate::libs::utilities::timestamps::current_timestamp;
use crate::log_debug;
use crate::schemas::telemetry::{EffectiveState, TelemetrySettings};

/// A fully built report, ready to be form-encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPayload {
    pub user_id: String,
    pub action: String,
    pub client_time: String,
    pub metadata: Option<serde_json::Value>,
}

impl ReportPayload {
    /// Form fields in wire order. `metadata` is sent as JSON text and omitted when absent.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("user_id", self.user_id.clone()),
            ("action", self.action.clone()),
            ("client_time", self.client_time.clone()),
        ];
        if let Some(metadata) = &self.metadata {
            fields.push(("metadata", metadata.to_string()));
        }
        fields
    }
}

/// Delivers a payload somewhere. [`HttpTransport`] is the real one.
pub trait Transport {
    fn send(&self, endpoint: &str, payload: &ReportPayload) -> Result<()>;
}

/// Form-encoded `POST` through a `ureq` agent. No timeout is configured here.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("dagster-telemetry/", env!("CARGO_PKG_VERSION")))
            .build();
        HttpTransport { agent }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn send(&self, endpoint: &str, payload: &ReportPayload) -> Result<()> {
        let fields = payload.form_fields();
        let form: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.agent
            .post(endpoint)
            .send_form(&form)
            .map_err(|e| TelemetryError::Transport(Box::new(e)))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Sent,
    /// Opted out through the profile or `TELEMETRY_ENABLED=false`. Nothing was sent.
    Disabled,
    /// Something failed on the way; the report is lost.
    Dropped,
}

pub struct Reporter<T: Transport = HttpTransport> {
    transport: T,
}

impl Reporter<HttpTransport> {
    pub fn new() -> Self {
        Reporter {
            transport: HttpTransport::new(),
        }
    }
}

impl Default for Reporter<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Reporter<T> {
    pub fn with_transport(transport: T) -> Self {
        Reporter { transport }
    }

    /// Reports `action` unless telemetry is disabled. Never fails.
    ///
    /// # Arguments
    /// * `settings`: Home directory, endpoint and the `TELEMETRY_ENABLED` opt-out.
    /// * `action`: Label of what happened, sent as the `action` field.
    /// * `metadata`: Optional extra data, sent as JSON text in the `metadata` field.
    ///
    /// # Returns
    /// * `ReportOutcome::Sent` once the transport accepted the payload.
    /// * `ReportOutcome::Disabled` when the environment or the profile opts out;
    ///   nothing is sent.
    /// * `ReportOutcome::Dropped` when resolving the profile or sending failed. The
    ///   error is only logged at debug level.
    pub fn report(
        &self,
        settings: &TelemetrySettings,
        action: &str,
        metadata: Option<serde_json::Value>,
    ) -> ReportOutcome {
        match self.try_report(settings, action, metadata) {
            Ok(outcome) => outcome,
            Err(e) => {
                log_debug!("[Reporter] Dropped '{}' report: {}", action, e);
                ReportOutcome::Dropped
            }
        }
    }

    fn try_report(
        &self,
        settings: &TelemetrySettings,
        action: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<ReportOutcome> {
        if settings.env_opted_out() {
            log_debug!("[Reporter] Disabled through the environment");
            return Ok(ReportOutcome::Disabled);
        }

        let state = resolve_reporting_state(settings)?;
        if !state.enabled {
            log_debug!("[Reporter] Disabled in the profile");
            return Ok(ReportOutcome::Disabled);
        }

        let payload = ReportPayload {
            user_id: state.identifier,
            action: action.to_string(),
            client_time: current_timestamp(),
            metadata,
        };
        self.transport.send(&settings.endpoint, &payload)?;
        log_debug!("[Reporter] Sent '{}' to {}", action, settings.endpoint);
        Ok(ReportOutcome::Sent)
    }
}

/// The persisted state when a home directory exists, otherwise a host-derived
/// identifier held only for this call.
fn resolve_reporting_state(settings: &TelemetrySettings) -> Result<EffectiveState> {
    match profile::current_state(settings)? {
        ProfileOutcome::Resolved(update) => Ok(update.state),
        ProfileOutcome::HomeUnset { .. } => Ok(EffectiveState {
            identifier: HostIdentifier.generate(),
            enabled: true,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::profile::{disable, enable};
    use serde_json::json;
    use std::cell::RefCell;
    use std::fs;

    #[derive(Default)]
    struct RecordingTransport {
        sent: RefCell<Vec<(String, ReportPayload)>>,
        fail: bool,
    }

    impl Transport for RecordingTransport {
        fn send(&self, endpoint: &str, payload: &ReportPayload) -> Result<()> {
            self.sent
                .borrow_mut()
                .push((endpoint.to_string(), payload.clone()));
            if self.fail {
                let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
                return Err(TelemetryError::io("telemetry endpoint", io));
            }
            Ok(())
        }
    }

    fn settings_for(dir: &tempfile::TempDir) -> TelemetrySettings {
        TelemetrySettings::new(Some(dir.path().display().to_string()))
    }

    #[test]
    fn disabled_profile_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_for(&dir);
        disable(&settings).unwrap();

        let reporter = Reporter::with_transport(RecordingTransport::default());
        for (action, metadata) in [("did something", Some(json!({}))), ("other", None)] {
            assert_eq!(
                reporter.report(&settings, action, metadata),
                ReportOutcome::Disabled
            );
        }
        assert!(reporter.transport.sent.borrow().is_empty());
    }

    #[test]
    fn yaml_1_1_off_in_profile_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("dagster.yaml"),
            "telemetry:\n  user_id: abc\n  enabled: off\n",
        )
        .unwrap();

        let reporter = Reporter::with_transport(RecordingTransport::default());
        assert_eq!(
            reporter.report(&settings_for(&dir), "did something", None),
            ReportOutcome::Disabled
        );
        assert!(reporter.transport.sent.borrow().is_empty());
    }

    #[test]
    fn enabled_profile_sends_resolved_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_for(&dir);
        let state = match enable(&settings).unwrap() {
            ProfileOutcome::Resolved(update) => update.state,
            other => panic!("unexpected outcome: {other:?}"),
        };

        let reporter = Reporter::with_transport(RecordingTransport::default());
        let outcome = reporter.report(&settings, "did something", Some(json!({})));
        assert_eq!(outcome, ReportOutcome::Sent);

        let sent = reporter.transport.sent.borrow();
        assert_eq!(sent.len(), 1);
        let (endpoint, payload) = &sent[0];
        assert_eq!(endpoint, "https://telemetry.elementl.dev/actions");
        assert_eq!(payload.user_id, state.identifier);
        assert_eq!(payload.action, "did something");
        assert_eq!(payload.metadata, Some(json!({})));
        assert!(!payload.client_time.is_empty());
    }

    #[test]
    fn first_report_creates_profile() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Reporter::with_transport(RecordingTransport::default());

        assert_eq!(
            reporter.report(&settings_for(&dir), "launched", None),
            ReportOutcome::Sent
        );
        assert!(dir.path().join("dagster.yaml").exists());
    }

    #[test]
    fn env_opt_out_wins_over_profile() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings_for(&dir);
        settings.telemetry_enabled_env = Some("false".to_string());

        let reporter = Reporter::with_transport(RecordingTransport::default());
        assert_eq!(reporter.report(&settings, "x", None), ReportOutcome::Disabled);
        assert!(reporter.transport.sent.borrow().is_empty());
        assert!(!dir.path().join("dagster.yaml").exists());
    }

    #[test]
    fn no_home_uses_host_identifier_without_writing() {
        let reporter = Reporter::with_transport(RecordingTransport::default());
        let settings = TelemetrySettings::new(None);

        assert_eq!(reporter.report(&settings, "x", None), ReportOutcome::Sent);
        assert_eq!(reporter.report(&settings, "y", None), ReportOutcome::Sent);

        let sent = reporter.transport.sent.borrow();
        assert_eq!(sent[0].1.user_id, HostIdentifier.generate());
        assert_eq!(sent[0].1.user_id, sent[1].1.user_id);
    }

    #[test]
    fn failures_are_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_for(&dir);
        let failing = Reporter::with_transport(RecordingTransport {
            fail: true,
            ..Default::default()
        });
        assert_eq!(failing.report(&settings, "x", None), ReportOutcome::Dropped);

        fs::write(dir.path().join("dagster.yaml"), "telemetry: [\n").unwrap();
        let reporter = Reporter::with_transport(RecordingTransport::default());
        assert_eq!(reporter.report(&settings, "x", None), ReportOutcome::Dropped);
        assert!(reporter.transport.sent.borrow().is_empty());
    }

    #[test]
    fn metadata_is_sent_as_json_text() {
        let payload = ReportPayload {
            user_id: "abc".to_string(),
            action: "run".to_string(),
            client_time: "2024-01-01T00:00:00.000000Z".to_string(),
            metadata: Some(json!({"pipeline": "etl"})),
        };
        let fields = payload.form_fields();
        assert_eq!(fields.last(), Some(&("metadata", r#"{"pipeline":"etl"}"#.to_string())));

        let bare = ReportPayload {
            metadata: None,
            ..payload
        };
        assert_eq!(bare.form_fields().len(), 3);
    }
}
