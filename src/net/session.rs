//! Broker session manager.
//!
//! Keeps one persistent publish/subscribe session open once the network
//! link is up. Connect attempts are bounded by a count budget with a
//! fixed inter-attempt delay; budget exhaustion is either fatal (device
//! restart, the evolved reader policy) or silent (budget resets and the
//! next loop pass tries again, the relay policy).
//!
//! Each attempt can present a fresh randomized session identifier so a
//! half-dead previous session on the broker never blocks the reconnect.

use core::fmt::Write as _;

use log::{info, warn};

use crate::app::events::NodeEvent;
use crate::app::ports::{EventSink, MessageBusSession};
use crate::config::{BrokerConfig, ticks_for};

/// Outcome of one session-manager step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Nothing to do (halted, or no attempt due this tick).
    Idle,
    /// Session is open.
    Connected,
    /// An attempt failed or the inter-attempt delay is running.
    Waiting,
    /// The budget is exhausted and policy says restart the device.
    /// Reported exactly once; no further attempts are made this run.
    RestartRequired,
}

/// Tiny xorshift PRNG for client-id suffixes. Not cryptographic — it
/// only has to avoid colliding with the node's own previous session.
struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    fn new(seed: u32) -> Self {
        Self { state: seed | 1 }
    }

    fn next_u16(&mut self) -> u16 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x >> 8) as u16
    }
}

/// Tick-driven session manager over a [`MessageBusSession`] port.
pub struct SessionManager {
    cfg: BrokerConfig,
    ticks_per_delay: u32,
    attempts: u8,
    delay_left: u32,
    open: bool,
    halted: bool,
    rng: XorShift32,
}

impl SessionManager {
    pub fn new(cfg: BrokerConfig, tick_interval_ms: u32, seed: u32) -> Self {
        let ticks_per_delay = ticks_for(cfg.retry_delay_ms, tick_interval_ms);
        Self {
            cfg,
            ticks_per_delay,
            attempts: 0,
            delay_left: 0,
            open: false,
            halted: false,
            rng: XorShift32::new(seed),
        }
    }

    /// Whether the session was open as of the last step.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Advance the session state machine by one tick.
    pub fn step(
        &mut self,
        bus: &mut impl MessageBusSession,
        sink: &mut impl EventSink,
    ) -> SessionStatus {
        if self.halted {
            return SessionStatus::Idle;
        }

        if bus.is_connected() {
            if !self.open {
                // The client reconnected underneath us; restore the
                // subscription the new session does not carry over.
                self.open = true;
                self.resubscribe(bus, sink);
            }
            self.attempts = 0;
            return SessionStatus::Connected;
        }

        if self.open {
            self.open = false;
            warn!("session: connection to broker lost");
            sink.emit(&NodeEvent::SessionLost);
        }

        if self.delay_left > 0 {
            self.delay_left -= 1;
            return SessionStatus::Waiting;
        }

        self.attempts += 1;
        sink.emit(&NodeEvent::SessionAttempt {
            attempt: self.attempts,
            max: self.cfg.max_connect_attempts,
        });

        let client_id = self.client_id();
        info!(
            "session: connect attempt {}/{} as '{}'",
            self.attempts, self.cfg.max_connect_attempts, client_id
        );

        match bus.connect(&client_id) {
            Ok(()) => {
                self.open = true;
                self.attempts = 0;
                self.delay_left = 0;
                info!("session: connected to {}:{}", self.cfg.host, self.cfg.port);
                sink.emit(&NodeEvent::SessionConnected);
                self.resubscribe(bus, sink);
                SessionStatus::Connected
            }
            Err(e) => {
                warn!("session: attempt {} failed: {}", self.attempts, e);
                if self.attempts >= self.cfg.max_connect_attempts {
                    if self.cfg.restart_on_exhaustion {
                        self.halted = true;
                        sink.emit(&NodeEvent::SessionExhausted { restart: true });
                        SessionStatus::RestartRequired
                    } else {
                        // Silent give-up: reset the budget, retry after
                        // the usual delay on a later pass.
                        self.attempts = 0;
                        self.delay_left = self.ticks_per_delay;
                        sink.emit(&NodeEvent::SessionExhausted { restart: false });
                        SessionStatus::Waiting
                    }
                } else {
                    self.delay_left = self.ticks_per_delay;
                    SessionStatus::Waiting
                }
            }
        }
    }

    /// Session identifier for the next attempt: the configured base, or
    /// base plus a fresh random hex suffix.
    fn client_id(&mut self) -> heapless::String<48> {
        let mut id: heapless::String<48> = heapless::String::new();
        let _ = id.push_str(&self.cfg.client_id);
        if self.cfg.randomize_client_id {
            // Capacity leaves room for the 5-char suffix.
            let _ = write!(id, "-{:04X}", self.rng.next_u16());
        }
        id
    }

    /// Re-issue the command-topic subscription after a (re)connect.
    /// Failure is logged only; the next full reconnect retries it.
    fn resubscribe(&mut self, bus: &mut impl MessageBusSession, sink: &mut impl EventSink) {
        let Some(topic) = self.cfg.subscribe_topic.clone() else {
            return;
        };
        match bus.subscribe(&topic) {
            Ok(()) => {
                info!("session: subscribed to '{}'", topic);
                sink.emit(&NodeEvent::SubscribeOk);
            }
            Err(e) => {
                warn!("session: subscribe to '{}' failed: {}", topic, e);
                sink.emit(&NodeEvent::SubscribeFailed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::InboundMessage;
    use crate::error::SessionError;

    struct FakeBus {
        connected: bool,
        failures_left: u32,
        connect_ids: Vec<String>,
        subscriptions: Vec<String>,
    }

    impl FakeBus {
        fn failing(n: u32) -> Self {
            Self {
                connected: false,
                failures_left: n,
                connect_ids: Vec::new(),
                subscriptions: Vec::new(),
            }
        }
    }

    impl MessageBusSession for FakeBus {
        fn connect(&mut self, client_id: &str) -> Result<(), SessionError> {
            self.connect_ids.push(client_id.to_owned());
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(SessionError::ConnectFailed);
            }
            self.connected = true;
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn publish(&mut self, _topic: &str, _payload: &[u8]) -> Result<(), SessionError> {
            if self.connected { Ok(()) } else { Err(SessionError::NotConnected) }
        }

        fn subscribe(&mut self, topic: &str) -> Result<(), SessionError> {
            self.subscriptions.push(topic.to_owned());
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

    fn broker_cfg(max: u8, restart: bool, randomize: bool) -> BrokerConfig {
        let mut c = BrokerConfig::default();
        c.max_connect_attempts = max;
        c.restart_on_exhaustion = restart;
        c.randomize_client_id = randomize;
        c.retry_delay_ms = 200;
        c
    }

    #[test]
    fn connects_first_attempt() {
        let mut bus = FakeBus::failing(0);
        let mut sink = RecSink(Vec::new());
        let mut mgr = SessionManager::new(broker_cfg(5, false, false), 100, 1);

        assert_eq!(mgr.step(&mut bus, &mut sink), SessionStatus::Connected);
        assert!(mgr.is_open());
        assert_eq!(bus.connect_ids.len(), 1);
    }

    #[test]
    fn retries_with_fixed_delay() {
        let mut bus = FakeBus::failing(2);
        let mut sink = RecSink(Vec::new());
        // 200 ms delay at 100 ms ticks = 2 ticks between attempts
        let mut mgr = SessionManager::new(broker_cfg(5, false, false), 100, 1);

        assert_eq!(mgr.step(&mut bus, &mut sink), SessionStatus::Waiting); // attempt 1
        assert_eq!(mgr.step(&mut bus, &mut sink), SessionStatus::Waiting); // delay
        assert_eq!(mgr.step(&mut bus, &mut sink), SessionStatus::Waiting); // delay
        assert_eq!(mgr.step(&mut bus, &mut sink), SessionStatus::Waiting); // attempt 2
        assert_eq!(bus.connect_ids.len(), 2);
        for _ in 0..2 {
            let _ = mgr.step(&mut bus, &mut sink);
        }
        assert_eq!(mgr.step(&mut bus, &mut sink), SessionStatus::Connected); // attempt 3
        assert_eq!(bus.connect_ids.len(), 3);
    }

    #[test]
    fn exhaustion_with_restart_halts_after_exact_budget() {
        let mut bus = FakeBus::failing(u32::MAX);
        let mut sink = RecSink(Vec::new());
        let mut mgr = SessionManager::new(broker_cfg(3, true, false), 100, 1);

        let mut restarts = 0;
        for _ in 0..50 {
            if mgr.step(&mut bus, &mut sink) == SessionStatus::RestartRequired {
                restarts += 1;
            }
        }
        assert_eq!(restarts, 1, "exactly one restart action");
        assert_eq!(bus.connect_ids.len(), 3, "no attempts past the budget");
        assert!(sink.0.contains(&NodeEvent::SessionExhausted { restart: true }));
    }

    #[test]
    fn exhaustion_without_restart_is_silent_and_keeps_trying() {
        let mut bus = FakeBus::failing(u32::MAX);
        let mut sink = RecSink(Vec::new());
        let mut mgr = SessionManager::new(broker_cfg(2, false, false), 100, 1);

        for _ in 0..30 {
            let status = mgr.step(&mut bus, &mut sink);
            assert_ne!(status, SessionStatus::RestartRequired);
        }
        assert!(bus.connect_ids.len() > 2, "keeps attempting after reset");
        assert!(sink.0.contains(&NodeEvent::SessionExhausted { restart: false }));
    }

    #[test]
    fn randomized_ids_differ_between_attempts() {
        let mut bus = FakeBus::failing(2);
        let mut sink = RecSink(Vec::new());
        let mut cfg = broker_cfg(5, false, true);
        cfg.retry_delay_ms = 100; // 1 tick
        let mut mgr = SessionManager::new(cfg, 100, 0xC0FF_EE00);

        for _ in 0..6 {
            let _ = mgr.step(&mut bus, &mut sink);
        }
        assert!(bus.connect_ids.len() >= 3);
        assert_ne!(bus.connect_ids[0], bus.connect_ids[1]);
        assert_ne!(bus.connect_ids[1], bus.connect_ids[2]);
        for id in &bus.connect_ids {
            assert!(id.starts_with("gatenode-"));
        }
    }

    #[test]
    fn fixed_id_is_stable() {
        let mut bus = FakeBus::failing(1);
        let mut sink = RecSink(Vec::new());
        let mut cfg = broker_cfg(5, false, false);
        cfg.retry_delay_ms = 100;
        let mut mgr = SessionManager::new(cfg, 100, 7);

        for _ in 0..4 {
            let _ = mgr.step(&mut bus, &mut sink);
        }
        assert_eq!(bus.connect_ids[0], bus.connect_ids[1]);
    }

    #[test]
    fn subscribes_on_every_connect() {
        let mut bus = FakeBus::failing(0);
        let mut sink = RecSink(Vec::new());
        let mut cfg = broker_cfg(5, false, false);
        cfg.subscribe_topic = Some(heapless::String::try_from("RFID_LOGIN").unwrap());
        let mut mgr = SessionManager::new(cfg, 100, 1);

        assert_eq!(mgr.step(&mut bus, &mut sink), SessionStatus::Connected);
        assert_eq!(bus.subscriptions, vec!["RFID_LOGIN"]);

        // Broker drops the session; the next successful connect resubscribes.
        bus.connected = false;
        let _ = mgr.step(&mut bus, &mut sink); // observes loss, attempt succeeds
        assert_eq!(bus.subscriptions.len(), 2);
    }

    #[test]
    fn publish_only_node_never_subscribes() {
        let mut bus = FakeBus::failing(0);
        let mut sink = RecSink(Vec::new());
        let mut mgr = SessionManager::new(broker_cfg(5, false, false), 100, 1);
        let _ = mgr.step(&mut bus, &mut sink);
        assert!(bus.subscriptions.is_empty());
    }
}
