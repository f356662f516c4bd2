//! Connection status shown next to the gauges

use chrono::{DateTime, Local};

use crate::client::SampleSource;
use crate::core::dashboard::CycleOutcome;

/// Status line state, updated by the app loop after every data cycle.
#[derive(Debug, Clone)]
pub struct StatusState {
    pub endpoint: String,
    pub last_update: Option<DateTime<Local>>,
    pub last_outcome: Option<CycleOutcome>,
    pub last_status: Option<u16>,
    pub error_count: u32,
    /// Set once polling has stopped; cleared by a reconnect.
    pub fatal: Option<String>,
}

/// Coarse health for coloring the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkHealth {
    Waiting,
    Healthy,
    Degraded,
    Down,
}

impl StatusState {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            last_update: None,
            last_outcome: None,
            last_status: None,
            error_count: 0,
            fatal: None,
        }
    }

    /// Fold one data cycle into the status. `NotDue` cycles are ignored so the
    /// status reflects the last real request.
    pub fn record(&mut self, outcome: CycleOutcome, source: &SampleSource) {
        self.last_status = source.last_status();
        self.error_count = source.consecutive_errors();
        match outcome {
            CycleOutcome::NotDue => return,
            CycleOutcome::Updated { .. } => {
                self.last_update = Some(Local::now());
            }
            CycleOutcome::Transient { .. } => {}
        }
        self.last_outcome = Some(outcome);
    }

    pub fn record_fatal(&mut self, message: impl Into<String>) {
        self.fatal = Some(message.into());
    }

    /// Forget the previous session's outcome after a reconnect.
    pub fn reset(&mut self) {
        self.last_outcome = None;
        self.last_status = None;
        self.error_count = 0;
        self.fatal = None;
    }

    pub fn health(&self) -> LinkHealth {
        if self.fatal.is_some() {
            return LinkHealth::Down;
        }
        match self.last_outcome {
            None => LinkHealth::Waiting,
            Some(CycleOutcome::Updated { rejected: 0 }) => LinkHealth::Healthy,
            Some(_) => LinkHealth::Degraded,
        }
    }

    pub fn describe(&self) -> String {
        if let Some(fatal) = &self.fatal {
            return format!("stopped: {}", fatal);
        }
        match self.last_outcome {
            None => "connecting".to_string(),
            Some(CycleOutcome::Updated { rejected: 0 }) => "live".to_string(),
            Some(CycleOutcome::Updated { rejected }) => {
                format!("live, {} gauges stale", rejected)
            }
            Some(CycleOutcome::Transient { status: Some(503) }) => "server paused".to_string(),
            Some(CycleOutcome::Transient { status: Some(code) }) => {
                format!("retrying (HTTP {})", code)
            }
            Some(CycleOutcome::Transient { status: None }) => "retrying (no response)".to_string(),
            Some(CycleOutcome::NotDue) => "live".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::scripted::ScriptedTransport;
    use crate::client::{PollSettings, Session};
    use std::sync::Arc;

    fn source() -> SampleSource {
        SampleSource::with_session(
            Arc::new(ScriptedTransport::new()),
            Session::anonymous(),
            PollSettings::default(),
        )
    }

    #[test]
    fn test_status_transitions() {
        let source = source();
        let mut status = StatusState::new("http://localhost:8080");
        assert_eq!(status.health(), LinkHealth::Waiting);
        assert_eq!(status.describe(), "connecting");

        status.record(CycleOutcome::Updated { rejected: 0 }, &source);
        assert_eq!(status.health(), LinkHealth::Healthy);
        assert!(status.last_update.is_some());

        status.record(CycleOutcome::NotDue, &source);
        assert_eq!(status.health(), LinkHealth::Healthy);

        status.record(CycleOutcome::Transient { status: Some(500) }, &source);
        assert_eq!(status.health(), LinkHealth::Degraded);
        assert_eq!(status.describe(), "retrying (HTTP 500)");

        status.record(CycleOutcome::Updated { rejected: 2 }, &source);
        assert_eq!(status.describe(), "live, 2 gauges stale");
    }

    #[test]
    fn test_fatal_until_reset() {
        let mut status = StatusState::new("http://localhost:8080");
        status.record_fatal("5 consecutive failed requests");
        assert_eq!(status.health(), LinkHealth::Down);
        assert!(status.describe().starts_with("stopped: "));

        status.reset();
        assert_eq!(status.health(), LinkHealth::Waiting);
    }
}
