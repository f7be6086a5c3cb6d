//! Outbound application events.
//!
//! The node services emit these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them — today they become serial log
//! lines via `LogEventSink`.

use crate::protocol::{RelayCommand, ServerVerdict};
use crate::uid::CardUid;

/// Structured events emitted by the node services.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    // ── Network link ──────────────────────────────────────
    /// Started associating against the profile at this list index.
    LinkConnecting { profile: usize },
    /// One status poll elapsed without association.
    LinkPolling { profile: usize, poll: u16 },
    /// Link is up; carries the obtained address when known.
    LinkUp { addr: Option<core::net::Ipv4Addr> },
    /// An established link dropped.
    LinkLost,
    /// Every profile's poll budget elapsed; retrying next loop pass.
    LinkExhausted,

    // ── Broker session ────────────────────────────────────
    SessionAttempt { attempt: u8, max: u8 },
    SessionConnected,
    SessionLost,
    /// The connect budget ran out. `restart` tells whether this is
    /// fatal (device restart) or silent (budget reset).
    SessionExhausted { restart: bool },
    SubscribeOk,
    SubscribeFailed,

    // ── Card scan / report ────────────────────────────────
    CardScanned { uid: CardUid },
    /// The backend request failed or answered with a non-positive code.
    ReportFailed { code: i16 },
    /// The backend answered, but the body matched neither marker.
    ResponseUnparsed,
    VerdictReceived { verdict: ServerVerdict },
    VerdictPublished { verdict: ServerVerdict },
    /// Session was down; the verdict is dropped, never queued.
    VerdictDropped { verdict: ServerVerdict },
    PingPublished,

    // ── Relay command handling ────────────────────────────
    CommandAccepted { command: RelayCommand },
    /// Payload matched neither `1` nor `0`; no actuation.
    CommandIgnored { command: RelayCommand },
    RelayEngaged,
    RelayReleased,
    /// The pulse sequence failed mid-flight (GPIO write error).
    RelayFault,
}
