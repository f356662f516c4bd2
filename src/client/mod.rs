//! Authenticated polling client for the metrics server.
//!
//! [`SampleSource`] turns a flaky HTTP endpoint into a stream of snapshots.
//! Each [`SampleSource::poll`] either hands back a fresh snapshot, reports
//! that the next request is not due yet, reports a transient failure, or
//! escalates once failures have piled up.

pub mod transport;

use reqwest::header::HeaderMap;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::metrics::Snapshot;
pub use transport::{HttpTransport, Response, Transport, TransportError};

/// Login and logout endpoint.
pub const AUTH_PATH: &str = "/v1/auth";

/// Status the server returns while paused. Not counted as an error.
pub const SERVICE_UNAVAILABLE: u16 = 503;

/// Login identity for one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub id: String,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login exchange failed")]
    Transport(#[from] TransportError),
}

#[derive(Debug, Error)]
pub enum PollError {
    /// A 200 response whose body is not a JSON object. Points at a schema
    /// mismatch, so it is not retried.
    #[error("server sent a malformed snapshot")]
    Parse(#[from] serde_json::Error),

    #[error(
        "{count} consecutive requests failed (last status {last_status}); check the server"
    )]
    TooManyErrors { count: u32, last_status: u16 },
}

/// Result of one poll that did not escalate.
#[derive(Debug)]
pub enum PollOutcome {
    Snapshot(Snapshot),
    /// The request interval has not elapsed; nothing was sent.
    NotDue,
    /// No usable response this time.
    Transient { status: Option<u16> },
}

/// Headers replayed on every request after login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    headers: HeaderMap,
}

/// Response headers that describe the login response itself rather than the
/// session, and must not be echoed back.
const NON_SESSION_HEADERS: &[&str] = &[
    "content-length",
    "content-type",
    "content-encoding",
    "transfer-encoding",
    "connection",
    "keep-alive",
    "date",
    "server",
];

impl Session {
    /// A session with no headers. Requests made with it will be rejected by
    /// the server and counted as failures.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_response_headers(response_headers: &HeaderMap) -> Self {
        let mut headers = response_headers.clone();
        for name in NON_SESSION_HEADERS {
            headers.remove(*name);
        }
        Self { headers }
    }

    /// One login exchange. Any response, whatever its status, yields a session
    /// built from its headers.
    pub async fn authenticate(
        transport: &dyn Transport,
        credentials: &Credentials,
    ) -> Result<Self, AuthError> {
        let body = json!({ "id": credentials.id, "pass": credentials.password });
        let response = transport
            .post_json(AUTH_PATH, &HeaderMap::new(), &body)
            .await?;
        if response.status != 200 {
            tracing::warn!(status = response.status, "login answered with non-200 status");
        }
        Ok(Self::from_response_headers(&response.headers))
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn is_anonymous(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Throttle and escalation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub error_threshold: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            error_threshold: 5,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct PollState {
    last_request: Option<Instant>,
    consecutive_errors: u32,
    last_status: Option<u16>,
    exhausted: bool,
}

pub struct SampleSource {
    transport: Arc<dyn Transport>,
    session: Session,
    settings: PollSettings,
    state: PollState,
}

impl SampleSource {
    /// Authenticate and build a source.
    ///
    /// A failed login is logged and the source starts unauthenticated; the
    /// server's rejections then surface through the normal error count.
    pub async fn connect(
        transport: Arc<dyn Transport>,
        credentials: &Credentials,
        settings: PollSettings,
    ) -> Self {
        let session = match Session::authenticate(transport.as_ref(), credentials).await {
            Ok(session) if session.is_anonymous() => {
                tracing::warn!(
                    host = %credentials.host,
                    "login response carried no session headers"
                );
                session
            }
            Ok(session) => {
                tracing::info!(host = %credentials.host, port = credentials.port, "authenticated");
                session
            }
            Err(e) => {
                tracing::warn!(error = %e, "login failed, continuing without a session");
                Session::anonymous()
            }
        };
        Self::with_session(transport, session, settings)
    }

    pub fn with_session(
        transport: Arc<dyn Transport>,
        session: Session,
        settings: PollSettings,
    ) -> Self {
        Self {
            transport,
            session,
            settings,
            state: PollState::default(),
        }
    }

    /// Poll `path` if the request interval has elapsed.
    pub async fn poll(&mut self, path: &str) -> Result<PollOutcome, PollError> {
        self.poll_at(path, Instant::now()).await
    }

    /// [`SampleSource::poll`] with an explicit clock reading.
    pub async fn poll_at(&mut self, path: &str, now: Instant) -> Result<PollOutcome, PollError> {
        if self.state.exhausted {
            return Err(self.too_many_errors());
        }

        if let Some(last) = self.state.last_request {
            if now.saturating_duration_since(last) < self.settings.interval {
                return Ok(PollOutcome::NotDue);
            }
        }

        let response = match self.transport.get(path, self.session.headers()).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, "no response from server");
                return Ok(PollOutcome::Transient { status: None });
            }
        };
        self.state.last_status = Some(response.status);

        match response.status {
            200 => {
                self.state.consecutive_errors = 0;
                let snapshot = Snapshot::parse(&response.body).map_err(|e| {
                    tracing::warn!(error = %e, "malformed snapshot body");
                    PollError::Parse(e)
                })?;
                // Only a fresh snapshot starts a new interval
                self.state.last_request = Some(now);
                Ok(PollOutcome::Snapshot(snapshot))
            }
            SERVICE_UNAVAILABLE => {
                tracing::debug!("server paused (503)");
                Ok(PollOutcome::Transient {
                    status: Some(SERVICE_UNAVAILABLE),
                })
            }
            status => {
                self.state.consecutive_errors += 1;
                tracing::warn!(
                    status,
                    consecutive = self.state.consecutive_errors,
                    threshold = self.settings.error_threshold,
                    "request failed"
                );
                if self.state.consecutive_errors >= self.settings.error_threshold {
                    self.state.exhausted = true;
                    let err = self.too_many_errors();
                    tracing::error!(error = %err, "giving up on sample source");
                    return Err(err);
                }
                Ok(PollOutcome::Transient {
                    status: Some(status),
                })
            }
        }
    }

    /// Fire-and-forget POST carrying the session headers.
    pub async fn post(&self, path: &str, body: &serde_json::Value) {
        match self
            .transport
            .post_json(path, self.session.headers(), body)
            .await
        {
            Ok(response) if response.status != 200 => {
                tracing::debug!(path, status = response.status, "post rejected");
            }
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "post failed"),
        }
    }

    /// Revoke the session. Never fails.
    pub async fn teardown(self) {
        if let Err(e) = self
            .transport
            .delete(AUTH_PATH, self.session.headers())
            .await
        {
            tracing::debug!(error = %e, "logout failed, ignoring");
        }
    }

    fn too_many_errors(&self) -> PollError {
        PollError::TooManyErrors {
            count: self.state.consecutive_errors,
            last_status: self.state.last_status.unwrap_or_default(),
        }
    }

    pub fn last_status(&self) -> Option<u16> {
        self.state.last_status
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.state.consecutive_errors
    }
}

#[cfg(test)]
mod tests {
    use super::transport::scripted::ScriptedTransport;
    use super::*;
    use reqwest::header::{self, HeaderValue};

    const BODY: &str = r#"{"cpu":{"name":"x","usage":10,"process":1}}"#;
    const PATH: &str = "/v1/all";

    fn credentials() -> Credentials {
        Credentials {
            host: "localhost".to_string(),
            port: 8080,
            id: "admin".to_string(),
            password: "secret".to_string(),
        }
    }

    fn settings(threshold: u32) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(1000),
            error_threshold: threshold,
        }
    }

    fn source(transport: &Arc<ScriptedTransport>, threshold: u32) -> SampleSource {
        SampleSource::with_session(transport.clone(), Session::anonymous(), settings(threshold))
    }

    /// Poll once per interval starting at `start`, returning the next free instant.
    async fn poll_each(
        source: &mut SampleSource,
        start: Instant,
        count: usize,
    ) -> (Vec<Result<PollOutcome, PollError>>, Instant) {
        let mut now = start;
        let mut results = Vec::new();
        for _ in 0..count {
            results.push(source.poll_at(PATH, now).await);
            now += Duration::from_millis(1000);
        }
        (results, now)
    }

    #[tokio::test]
    async fn test_session_headers_replayed() {
        let mut login_headers = HeaderMap::new();
        login_headers.insert("x-session-id", HeaderValue::from_static("abc"));
        login_headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));

        let transport = Arc::new(
            ScriptedTransport::new()
                .reply_with(Response {
                    status: 200,
                    headers: login_headers,
                    body: String::new(),
                })
                .reply(200, BODY)
                .reply(200, ""),
        );

        let mut source =
            SampleSource::connect(transport.clone(), &credentials(), settings(5)).await;
        assert!(!source.session.is_anonymous());
        assert!(source.session.headers().get(header::CONTENT_LENGTH).is_none());

        let outcome = source.poll(PATH).await.unwrap();
        assert!(matches!(outcome, PollOutcome::Snapshot(_)));
        source.teardown().await;

        let calls = transport.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!((calls[0].method, calls[0].path.as_str()), ("POST", AUTH_PATH));
        assert_eq!(calls[1].headers.get("x-session-id").unwrap(), "abc");
        assert_eq!((calls[2].method, calls[2].path.as_str()), ("DELETE", AUTH_PATH));
        assert_eq!(calls[2].headers.get("x-session-id").unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_failed_login_is_lenient() {
        let transport = Arc::new(ScriptedTransport::new().drop_connection());
        let source = SampleSource::connect(transport.clone(), &credentials(), settings(5)).await;
        assert!(source.session.is_anonymous());

        let err = Session::authenticate(transport.as_ref(), &credentials()).await;
        assert!(matches!(err, Err(AuthError::Transport(_))));
    }

    #[tokio::test]
    async fn test_throttle_skips_network() {
        let transport = Arc::new(ScriptedTransport::new().reply(200, BODY).reply(200, BODY));
        let mut source = source(&transport, 5);
        let start = Instant::now();

        assert!(matches!(
            source.poll_at(PATH, start).await,
            Ok(PollOutcome::Snapshot(_))
        ));
        assert!(matches!(
            source.poll_at(PATH, start + Duration::from_millis(999)).await,
            Ok(PollOutcome::NotDue)
        ));
        assert_eq!(transport.call_count(), 1);

        assert!(matches!(
            source.poll_at(PATH, start + Duration::from_millis(1000)).await,
            Ok(PollOutcome::Snapshot(_))
        ));
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failure_does_not_start_interval() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply(500, "")
                .drop_connection()
                .reply(503, "")
                .reply(200, BODY),
        );
        let mut source = source(&transport, 5);
        let start = Instant::now();

        assert!(matches!(
            source.poll_at(PATH, start).await,
            Ok(PollOutcome::Transient { status: Some(500) })
        ));
        assert!(matches!(
            source.poll_at(PATH, start + Duration::from_millis(10)).await,
            Ok(PollOutcome::Transient { status: None })
        ));
        assert!(matches!(
            source.poll_at(PATH, start + Duration::from_millis(20)).await,
            Ok(PollOutcome::Transient { status: Some(503) })
        ));
        assert!(matches!(
            source.poll_at(PATH, start + Duration::from_millis(30)).await,
            Ok(PollOutcome::Snapshot(_))
        ));
        assert_eq!(transport.call_count(), 4);

        // The snapshot does start one
        assert!(matches!(
            source.poll_at(PATH, start + Duration::from_millis(40)).await,
            Ok(PollOutcome::NotDue)
        ));
        assert_eq!(transport.call_count(), 4);
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_counted() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .drop_connection()
                .drop_connection()
                .drop_connection(),
        );
        let mut source = source(&transport, 2);
        let (results, _) = poll_each(&mut source, Instant::now(), 3).await;

        for result in results {
            assert!(matches!(result, Ok(PollOutcome::Transient { status: None })));
        }
        assert_eq!(source.consecutive_errors(), 0);
    }

    #[tokio::test]
    async fn test_service_unavailable_is_not_counted() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply(503, "")
                .reply(503, "")
                .reply(503, ""),
        );
        let mut source = source(&transport, 2);
        let (results, _) = poll_each(&mut source, Instant::now(), 3).await;

        assert!(results
            .iter()
            .all(|r| matches!(r, Ok(PollOutcome::Transient { status: Some(503) }))));
        assert_eq!(source.consecutive_errors(), 0);
        assert_eq!(source.last_status(), Some(503));
    }

    #[tokio::test]
    async fn test_threshold_escalates() {
        let threshold = 3;
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply(500, "")
                .reply(401, "")
                .reply(500, ""),
        );
        let mut source = source(&transport, threshold);
        let (results, next) = poll_each(&mut source, Instant::now(), 3).await;

        assert!(matches!(results[0], Ok(PollOutcome::Transient { status: Some(500) })));
        assert!(matches!(results[1], Ok(PollOutcome::Transient { status: Some(401) })));
        assert!(matches!(
            results[2],
            Err(PollError::TooManyErrors {
                count: 3,
                last_status: 500
            })
        ));

        // Exhausted sources stay dead without touching the network
        assert!(matches!(
            source.poll_at(PATH, next).await,
            Err(PollError::TooManyErrors { .. })
        ));
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_success_resets_error_count() {
        let threshold = 3;
        let mut script = ScriptedTransport::new()
            .reply(500, "")
            .reply(500, "")
            .reply(200, BODY);
        for _ in 0..threshold - 1 {
            script = script.reply(500, "");
        }
        let transport = Arc::new(script);
        let mut source = source(&transport, threshold);

        let polls = 3 + (threshold as usize - 1);
        let (results, _) = poll_each(&mut source, Instant::now(), polls).await;
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(source.consecutive_errors(), threshold - 1);
        assert!(!source.state.exhausted);
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let transport = Arc::new(ScriptedTransport::new().reply(200, "<html>oops</html>"));
        let mut source = source(&transport, 5);

        assert!(matches!(
            source.poll_at(PATH, Instant::now()).await,
            Err(PollError::Parse(_))
        ));
        assert!(!source.state.exhausted);
    }

    #[tokio::test]
    async fn test_teardown_swallows_failure() {
        let transport = Arc::new(ScriptedTransport::new().drop_connection());
        let source = source(&transport, 5);
        source.teardown().await;
        assert_eq!(transport.call_count(), 1);
    }
}
