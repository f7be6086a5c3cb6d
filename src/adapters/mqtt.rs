//! MQTT broker-session adapter.
//!
//! Implements [`MessageBusSession`] over the ESP-IDF MQTT client. The
//! client delivers events on its own task; a small shared state (one
//! atomic connected flag, one bounded inbound queue) bridges them to
//! the tick-driven domain side, which drains the queue via `poll()`.
//!
//! `connect()` is synchronous with a bounded wait: it returns `Ok` only
//! once the broker acknowledged the session, or `ConnectFailed` after
//! ~5 s without a CONNACK.

use crate::app::ports::{InboundMessage, MessageBusSession};
use crate::error::SessionError;

#[cfg(feature = "espidf")]
use crate::app::ports::{MAX_INBOUND_LEN, MAX_TOPIC_LEN};

/// Inbound messages retained between ticks. Commands arrive at human
/// badge-swipe rate, so a small queue is plenty; overflow drops the
/// oldest message.
const INBOUND_QUEUE_DEPTH: usize = 8;

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(feature = "espidf")]
mod shared {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicBool;

    use crate::app::ports::InboundMessage;

    /// State shared with the MQTT client's event callback.
    pub(super) struct Shared {
        pub connected: AtomicBool,
        pub inbound: Mutex<VecDeque<InboundMessage>>,
    }

    impl Shared {
        pub fn new() -> Self {
            Self {
                connected: AtomicBool::new(false),
                inbound: Mutex::new(VecDeque::new()),
            }
        }
    }
}

#[cfg(feature = "espidf")]
pub struct MqttAdapter {
    broker_url: heapless::String<96>,
    client: Option<esp_idf_svc::mqtt::client::EspMqttClient<'static>>,
    shared: std::sync::Arc<shared::Shared>,
}

#[cfg(feature = "espidf")]
impl MqttAdapter {
    /// Polls of the connected flag while waiting for the CONNACK.
    const CONNECT_WAIT_POLLS: u32 = 100;
    const CONNECT_WAIT_SLICE_MS: u64 = 50;

    pub fn new(broker: &crate::config::BrokerConfig) -> crate::error::Result<Self> {
        use core::fmt::Write as _;

        let mut broker_url = heapless::String::new();
        write!(broker_url, "mqtt://{}:{}", broker.host, broker.port)
            .map_err(|_| crate::error::Error::Config("broker URL too long"))?;
        Ok(Self {
            broker_url,
            client: None,
            shared: std::sync::Arc::new(shared::Shared::new()),
        })
    }
}

#[cfg(feature = "espidf")]
impl MessageBusSession for MqttAdapter {
    fn connect(&mut self, client_id: &str) -> Result<(), SessionError> {
        use std::sync::atomic::Ordering;

        use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration};

        // Tear down any previous half-open client first.
        self.client = None;
        self.shared.connected.store(false, Ordering::SeqCst);

        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            ..MqttClientConfiguration::default()
        };

        let shared = std::sync::Arc::clone(&self.shared);
        let client = EspMqttClient::new_cb(&self.broker_url, &conf, move |event| {
            match event.payload() {
                EventPayload::Connected(_) => {
                    shared.connected.store(true, Ordering::SeqCst);
                }
                EventPayload::Disconnected => {
                    shared.connected.store(false, Ordering::SeqCst);
                }
                EventPayload::Received {
                    topic: Some(topic),
                    data,
                    ..
                } => {
                    let mut t: heapless::String<MAX_TOPIC_LEN> = heapless::String::new();
                    let mut p: heapless::Vec<u8, MAX_INBOUND_LEN> = heapless::Vec::new();
                    let take = data.len().min(MAX_INBOUND_LEN);
                    if t.push_str(topic).is_ok() && p.extend_from_slice(&data[..take]).is_ok() {
                        if let Ok(mut queue) = shared.inbound.lock() {
                            if queue.len() >= INBOUND_QUEUE_DEPTH {
                                queue.pop_front();
                            }
                            queue.push_back(InboundMessage { topic: t, payload: p });
                        }
                    }
                }
                _ => {}
            }
        })
        .map_err(|_| SessionError::ConnectFailed)?;
        self.client = Some(client);

        for _ in 0..Self::CONNECT_WAIT_POLLS {
            if self.shared.connected.load(Ordering::SeqCst) {
                return Ok(());
            }
            std::thread::sleep(std::time::Duration::from_millis(Self::CONNECT_WAIT_SLICE_MS));
        }
        self.client = None;
        Err(SessionError::ConnectFailed)
    }

    fn is_connected(&self) -> bool {
        self.client.is_some() && self.shared.connected.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SessionError> {
        use esp_idf_svc::mqtt::client::QoS;

        let client = self.client.as_mut().ok_or(SessionError::NotConnected)?;
        client
            .enqueue(topic, QoS::AtMostOnce, false, payload)
            .map(|_| ())
            .map_err(|_| SessionError::PublishFailed)
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), SessionError> {
        use esp_idf_svc::mqtt::client::QoS;

        let client = self.client.as_mut().ok_or(SessionError::NotConnected)?;
        client
            .subscribe(topic, QoS::AtMostOnce)
            .map(|_| ())
            .map_err(|_| SessionError::SubscribeFailed)
    }

    fn poll(&mut self) -> Option<InboundMessage> {
        self.shared
            .inbound
            .lock()
            .map(|mut queue| queue.pop_front())
            .unwrap_or(None)
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

/// In-memory broker simulation recording everything the node does.
#[cfg(not(feature = "espidf"))]
pub struct MqttAdapter {
    connected: bool,
    fail_connects: u32,
    inbound: std::collections::VecDeque<InboundMessage>,
    /// Session identifiers from every `connect()` call, in order.
    pub connect_ids: Vec<String>,
    /// Every `(topic, payload)` published, in order.
    pub published: Vec<(String, Vec<u8>)>,
    /// Every topic subscribed to, in order.
    pub subscriptions: Vec<String>,
}

#[cfg(not(feature = "espidf"))]
impl MqttAdapter {
    pub fn new() -> Self {
        Self {
            connected: false,
            fail_connects: 0,
            inbound: std::collections::VecDeque::new(),
            connect_ids: Vec::new(),
            published: Vec::new(),
            subscriptions: Vec::new(),
        }
    }

    /// Make the next `n` connect attempts fail.
    pub fn sim_fail_connects(&mut self, n: u32) {
        self.fail_connects = n;
    }

    /// Queue one inbound message as if the broker delivered it.
    pub fn sim_deliver(&mut self, topic: &str, payload: &[u8]) {
        let mut t = heapless::String::new();
        let mut p = heapless::Vec::new();
        assert!(t.push_str(topic).is_ok(), "sim topic too long");
        assert!(p.extend_from_slice(payload).is_ok(), "sim payload too long");
        if self.inbound.len() >= INBOUND_QUEUE_DEPTH {
            self.inbound.pop_front();
        }
        self.inbound.push_back(InboundMessage { topic: t, payload: p });
    }

    /// Drop the session (broker restart, TCP reset).
    pub fn sim_drop_session(&mut self) {
        self.connected = false;
    }
}

#[cfg(not(feature = "espidf"))]
impl MessageBusSession for MqttAdapter {
    fn connect(&mut self, client_id: &str) -> Result<(), SessionError> {
        self.connect_ids.push(client_id.to_owned());
        if self.fail_connects > 0 {
            self.fail_connects -= 1;
            return Err(SessionError::ConnectFailed);
        }
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

    fn subscribe(&mut self, topic: &str) -> Result<(), SessionError> {
        if !self.connected {
            return Err(SessionError::NotConnected);
        }
        self.subscriptions.push(topic.to_owned());
        Ok(())
    }

    fn poll(&mut self) -> Option<InboundMessage> {
        if !self.connected {
            return None;
        }
        self.inbound.pop_front()
    }
}
