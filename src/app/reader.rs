//! Card-reader node service.
//!
//! One `tick()` per main-loop pass drives, in order: the wireless link,
//! the broker session, inbound bus traffic (drained and discarded, this
//! node publishes only), the periodic liveness ping, and finally one
//! scan-cycle step. Everything network-facing is gated on the link being
//! up, and every delay in the pipeline is tick-counted, so a dead AP or
//! broker never stops the loop from spinning.

use log::warn;

use crate::app::TickAction;
use crate::app::events::NodeEvent;
use crate::app::ports::{CardReader, EventSink, HttpRequester, MessageBusSession, NetworkLink};
use crate::config::{ReaderNodeConfig, ticks_for};
use crate::net::link::LinkManager;
use crate::net::session::{SessionManager, SessionStatus};
use crate::report::Reporter;
use crate::scan::{ScanCycle, ScanOutcome};

/// Liveness payload published on the ping topic.
const PING_PAYLOAD: &[u8] = b"alive";

pub struct ReaderService {
    link: LinkManager,
    session: SessionManager,
    scan: ScanCycle,
    reporter: Reporter,
    telemetry_topic: heapless::String<32>,
    ping_topic: heapless::String<32>,
    ping_ticks: u32,
    ping_left: u32,
}

impl ReaderService {
    pub fn new(cfg: ReaderNodeConfig, seed: u32) -> Self {
        let tick_ms = cfg.tick_interval_ms;
        let ping_ticks = ticks_for(cfg.ping_interval_secs.saturating_mul(1_000), tick_ms);
        Self {
            link: LinkManager::new(cfg.link, tick_ms),
            session: SessionManager::new(cfg.broker, tick_ms, seed),
            scan: ScanCycle::new(cfg.scan_settle_ms, tick_ms),
            reporter: Reporter::new(cfg.reporter),
            telemetry_topic: cfg.telemetry_topic,
            ping_topic: cfg.ping_topic,
            ping_ticks,
            ping_left: ping_ticks,
        }
    }

    /// Advance every state machine by one tick.
    pub fn tick(
        &mut self,
        net: &mut impl NetworkLink,
        bus: &mut impl MessageBusSession,
        http: &mut impl HttpRequester,
        reader: &mut impl CardReader,
        sink: &mut impl EventSink,
    ) -> TickAction {
        self.link.step(net, sink);
        if !self.link.is_up() {
            return TickAction::Continue;
        }

        if self.session.step(bus, sink) == SessionStatus::RestartRequired {
            return TickAction::Restart;
        }

        // Publish-only node: service the connection, discard anything
        // a misconfigured broker routes our way.
        while bus.poll().is_some() {}

        if self.session.is_open() {
            self.ping_left = self.ping_left.saturating_sub(1);
            if self.ping_left == 0 {
                self.ping_left = self.ping_ticks;
                match bus.publish(&self.ping_topic, PING_PAYLOAD) {
                    Ok(()) => sink.emit(&NodeEvent::PingPublished),
                    Err(e) => warn!("reader: ping publish failed: {}", e),
                }
            }
        }

        match self.scan.step(reader) {
            ScanOutcome::Settling | ScanOutcome::NoCard | ScanOutcome::SelectFailed => {}
            ScanOutcome::Scanned(uid) => {
                sink.emit(&NodeEvent::CardScanned { uid: uid.clone() });
                let hex = uid.hex();
                let _ = self
                    .reporter
                    .submit(&hex, http, bus, &self.telemetry_topic, sink);
                // Release runs even when reporting failed, otherwise the
                // reader cannot detect the next card.
                reader.release();
                self.scan.settle();
            }
        }

        TickAction::Continue
    }

    pub fn link_up(&self) -> bool {
        self.link.is_up()
    }

    pub fn session_open(&self) -> bool {
        self.session.is_open()
    }
}
