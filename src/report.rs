//! Backend scan reporting.
//!
//! Submits a scanned card identifier to the backend as
//! `GET <base_url>?rfid=<HEX>`, parses the verdict out of the body and
//! forwards the telemetry code over the bus. Telemetry is
//! fire-and-forget: when the session is down the code is dropped, never
//! queued, so the door controller only ever acts on fresh scans.

use core::fmt::Write as _;

use log::{info, warn};

use crate::app::events::NodeEvent;
use crate::app::ports::{EventSink, HttpRequester, MessageBusSession};
use crate::config::ReporterConfig;
use crate::protocol::ServerVerdict;

/// Request URL capacity: base URL plus `?rfid=` and up to 20 hex chars.
const MAX_URL_LEN: usize = 192;

/// What happened to one submitted scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Verdict parsed and its code published.
    Published,
    /// Verdict parsed but the session was down; code dropped.
    Dropped,
    /// Backend answered 200 but the body matched no known marker.
    Unparsed,
    /// Transport failure or non-positive status code.
    RequestFailed(i16),
}

/// Scan-to-verdict pipeline over the HTTP and bus ports.
pub struct Reporter {
    cfg: ReporterConfig,
}

impl Reporter {
    pub fn new(cfg: ReporterConfig) -> Self {
        Self { cfg }
    }

    /// Submit one scanned identifier and publish the resulting verdict
    /// code to `telemetry_topic`.
    pub fn submit(
        &mut self,
        uid_hex: &str,
        http: &mut impl HttpRequester,
        bus: &mut impl MessageBusSession,
        telemetry_topic: &str,
        sink: &mut impl EventSink,
    ) -> ReportOutcome {
        let mut url = heapless::String::<MAX_URL_LEN>::new();
        if write!(url, "{}?rfid={}", self.cfg.base_url, uid_hex).is_err() {
            warn!("report: request URL too long, scan dropped");
            sink.emit(&NodeEvent::ReportFailed { code: 0 });
            return ReportOutcome::RequestFailed(0);
        }

        let response = match http.get(&url) {
            Ok(r) => r,
            Err(e) => {
                warn!("report: backend request failed: {}", e);
                sink.emit(&NodeEvent::ReportFailed { code: 0 });
                return ReportOutcome::RequestFailed(0);
            }
        };

        if response.code <= 0 {
            warn!("report: backend answered with code {}", response.code);
            sink.emit(&NodeEvent::ReportFailed { code: response.code });
            return ReportOutcome::RequestFailed(response.code);
        }

        let Some(verdict) = ServerVerdict::parse(&response.body) else {
            warn!("report: unparseable backend response: {:?}", response.body);
            sink.emit(&NodeEvent::ResponseUnparsed);
            return ReportOutcome::Unparsed;
        };
        sink.emit(&NodeEvent::VerdictReceived { verdict });

        if !bus.is_connected() {
            warn!("report: session down, verdict {:?} dropped", verdict);
            sink.emit(&NodeEvent::VerdictDropped { verdict });
            return ReportOutcome::Dropped;
        }

        let code = verdict.telemetry_code();
        match bus.publish(telemetry_topic, code.as_bytes()) {
            Ok(()) => {
                info!("report: published verdict code '{}'", code);
                sink.emit(&NodeEvent::VerdictPublished { verdict });
                ReportOutcome::Published
            }
            Err(e) => {
                warn!("report: publish failed: {}", e);
                sink.emit(&NodeEvent::VerdictDropped { verdict });
                ReportOutcome::Dropped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::{HttpResponse, InboundMessage};
    use crate::error::{HttpError, SessionError};

    struct FakeHttp {
        response: Result<HttpResponse, HttpError>,
        urls: Vec<String>,
    }

    impl FakeHttp {
        fn ok(code: i16, body: &str) -> Self {
            let mut b = heapless::String::new();
            b.push_str(body).unwrap();
            Self {
                response: Ok(HttpResponse { code, body: b }),
                urls: Vec::new(),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err(HttpError::ConnectFailed),
                urls: Vec::new(),
            }
        }
    }

    impl HttpRequester for FakeHttp {
        fn get(&mut self, url: &str) -> Result<HttpResponse, HttpError> {
            self.urls.push(url.to_owned());
            self.response.clone()
        }
    }

    struct FakeBus {
        connected: bool,
        published: Vec<(String, Vec<u8>)>,
    }

    impl FakeBus {
        fn up() -> Self {
            Self {
                connected: true,
                published: Vec::new(),
            }
        }

        fn down() -> Self {
            Self {
                connected: false,
                published: Vec::new(),
            }
        }
    }

    impl MessageBusSession for FakeBus {
        fn connect(&mut self, _client_id: &str) -> Result<(), SessionError> {
            self.connected = true;
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SessionError> {
            if !self.connected {
                return Err(SessionError::NotConnected);
            }
            self.published.push((topic.to_owned(), payload.to_vec()));
            Ok(())
        }

        fn subscribe(&mut self, _topic: &str) -> Result<(), SessionError> {
            Ok(())
        }

        fn poll(&mut self) -> Option<InboundMessage> {
            None
        }
    }

    struct RecSink(Vec<NodeEvent>);
    impl EventSink for RecSink {
        fn emit(&mut self, event: &NodeEvent) {
            self.0.push(event.clone());
        }
    }

    #[test]
    fn status_verdict_is_published() {
        let mut http = FakeHttp::ok(200, "card ok STATUS:3");
        let mut bus = FakeBus::up();
        let mut sink = RecSink(Vec::new());
        let mut reporter = Reporter::new(ReporterConfig::default());

        let out = reporter.submit("040AFF01", &mut http, &mut bus, "RFID_LOGIN", &mut sink);
        assert_eq!(out, ReportOutcome::Published);
        assert_eq!(
            http.urls,
            vec!["http://192.168.43.174/rfid_handler.php?rfid=040AFF01"]
        );
        assert_eq!(bus.published, vec![("RFID_LOGIN".to_owned(), b"3".to_vec())]);
    }

    #[test]
    fn not_found_publishes_minus_one() {
        let mut http = FakeHttp::ok(200, "RFID NOT FOUND");
        let mut bus = FakeBus::up();
        let mut sink = RecSink(Vec::new());
        let mut reporter = Reporter::new(ReporterConfig::default());

        let out = reporter.submit("12AB", &mut http, &mut bus, "RFID_LOGIN", &mut sink);
        assert_eq!(out, ReportOutcome::Published);
        assert_eq!(bus.published[0].1, b"-1".to_vec());
    }

    #[test]
    fn session_down_drops_without_queueing() {
        let mut http = FakeHttp::ok(200, "STATUS:1");
        let mut bus = FakeBus::down();
        let mut sink = RecSink(Vec::new());
        let mut reporter = Reporter::new(ReporterConfig::default());

        let out = reporter.submit("12AB", &mut http, &mut bus, "RFID_LOGIN", &mut sink);
        assert_eq!(out, ReportOutcome::Dropped);
        assert!(bus.published.is_empty());
        assert!(sink.0.iter().any(|e| matches!(e, NodeEvent::VerdictDropped { .. })));

        // Reconnecting later must not replay the dropped verdict.
        bus.connected = true;
        assert!(bus.published.is_empty());
    }

    #[test]
    fn transport_failure_publishes_nothing() {
        let mut http = FakeHttp::failing();
        let mut bus = FakeBus::up();
        let mut sink = RecSink(Vec::new());
        let mut reporter = Reporter::new(ReporterConfig::default());

        let out = reporter.submit("12AB", &mut http, &mut bus, "RFID_LOGIN", &mut sink);
        assert_eq!(out, ReportOutcome::RequestFailed(0));
        assert!(bus.published.is_empty());
    }

    #[test]
    fn unparseable_body_publishes_nothing() {
        let mut http = FakeHttp::ok(200, "<html>maintenance</html>");
        let mut bus = FakeBus::up();
        let mut sink = RecSink(Vec::new());
        let mut reporter = Reporter::new(ReporterConfig::default());

        let out = reporter.submit("12AB", &mut http, &mut bus, "RFID_LOGIN", &mut sink);
        assert_eq!(out, ReportOutcome::Unparsed);
        assert!(bus.published.is_empty());
        assert!(sink.0.contains(&NodeEvent::ResponseUnparsed));
    }
}
