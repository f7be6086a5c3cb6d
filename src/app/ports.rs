//! Port traits — the hexagonal boundary between domain logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ node service (domain)
//! ```
//!
//! The vendor peripheral / network / bus libraries are treated as
//! capability interfaces so the scan, report and relay cycles can be
//! tested against fakes. The relay control line and pulse dwell use the
//! `embedded-hal` traits directly (`OutputPin`, `DelayNs`) rather than
//! bespoke ports.

use crate::config::WifiProfile;
use crate::error::{HttpError, LinkError, SessionError};
use crate::uid::CardUid;

/// Longest topic name carried on an inbound message.
pub const MAX_TOPIC_LEN: usize = 32;
/// Longest inbound payload retained; command payloads are one byte.
pub const MAX_INBOUND_LEN: usize = 32;
/// Response body capacity — backend verdict bodies are well under this.
pub const MAX_BODY_LEN: usize = 256;

// ───────────────────────────────────────────────────────────────
// Card reader (driven adapter: RC522 → domain)
// ───────────────────────────────────────────────────────────────

/// Contactless reader capability.
pub trait CardReader {
    /// Cheap presence probe — the overwhelmingly common no-card case
    /// must return quickly with no side effects.
    fn card_present(&mut self) -> bool;

    /// Select the card in the field and return its UID.
    /// `None` when selection fails (card moved away mid-probe).
    fn read_uid(&mut self) -> Option<CardUid>;

    /// Halt the card and stop any active crypto session on the reader.
    /// Omitting this leaves the reader unable to detect the next card.
    fn release(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Network link (driven adapter: WiFi STA → domain)
// ───────────────────────────────────────────────────────────────

/// Wireless network link capability.
pub trait NetworkLink {
    /// Start an association attempt against the given profile.
    /// Completion is observed through subsequent [`is_up`] polls.
    fn begin(&mut self, profile: &WifiProfile) -> Result<(), LinkError>;

    /// Current link status (polled, may consult the driver).
    fn is_up(&mut self) -> bool;

    /// The address obtained from the AP, once associated.
    fn local_addr(&mut self) -> Option<core::net::Ipv4Addr>;

    /// Tear the link down.
    fn disconnect(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Message-bus session (driven adapter: MQTT client → domain)
// ───────────────────────────────────────────────────────────────

/// One message received from the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: heapless::String<MAX_TOPIC_LEN>,
    pub payload: heapless::Vec<u8, MAX_INBOUND_LEN>,
}

/// Publish/subscribe session capability.
///
/// `connect` is synchronous: it returns `Ok` only once the broker has
/// acknowledged the session (adapters bound the wait internally).
pub trait MessageBusSession {
    fn connect(&mut self, client_id: &str) -> Result<(), SessionError>;

    fn is_connected(&self) -> bool;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SessionError>;

    fn subscribe(&mut self, topic: &str) -> Result<(), SessionError>;

    /// Service keep-alive traffic and return at most one queued inbound
    /// message. Call repeatedly each tick until it returns `None`.
    fn poll(&mut self) -> Option<InboundMessage>;
}

// ───────────────────────────────────────────────────────────────
// HTTP requester (driven adapter: blocking client → domain)
// ───────────────────────────────────────────────────────────────

/// A completed request/response exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code; adapters report transport-level failures as
    /// `Err`, so a non-positive code never reaches the domain.
    pub code: i16,
    pub body: heapless::String<MAX_BODY_LEN>,
}

/// Blocking request capability with bounded connect/read timeouts
/// (configured on the adapter).
pub trait HttpRequester {
    fn get(&mut self, url: &str) -> Result<HttpResponse, HttpError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The node services emit structured [`NodeEvent`](super::events::NodeEvent)s
/// through this port. Adapters decide where they go (serial log today;
/// a bus or display adapter would implement the same trait).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::NodeEvent);
}
