//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured node events to the
//! logger (UART / USB-CDC in production). A future bus or display
//! adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::NodeEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`NodeEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &NodeEvent) {
        match event {
            NodeEvent::LinkConnecting { profile } => {
                info!("LINK | associating, profile #{}", profile);
            }
            NodeEvent::LinkPolling { profile, poll } => {
                info!("LINK | waiting, profile #{} poll {}", profile, poll);
            }
            NodeEvent::LinkUp { addr: Some(ip) } => {
                info!("LINK | up, address {}", ip);
            }
            NodeEvent::LinkUp { addr: None } => {
                info!("LINK | up, no address yet");
            }
            NodeEvent::LinkLost => warn!("LINK | lost"),
            NodeEvent::LinkExhausted => warn!("LINK | all profiles exhausted"),

            NodeEvent::SessionAttempt { attempt, max } => {
                info!("SESSION | connect attempt {}/{}", attempt, max);
            }
            NodeEvent::SessionConnected => info!("SESSION | connected"),
            NodeEvent::SessionLost => warn!("SESSION | lost"),
            NodeEvent::SessionExhausted { restart } => {
                warn!(
                    "SESSION | budget exhausted ({})",
                    if *restart { "restarting" } else { "retrying later" }
                );
            }
            NodeEvent::SubscribeOk => info!("SESSION | subscribed"),
            NodeEvent::SubscribeFailed => warn!("SESSION | subscribe failed"),

            NodeEvent::CardScanned { uid } => info!("SCAN | card {}", uid),
            NodeEvent::ReportFailed { code } => {
                warn!("SCAN | report failed, code {}", code);
            }
            NodeEvent::ResponseUnparsed => warn!("SCAN | backend response unparsed"),
            NodeEvent::VerdictReceived { verdict } => {
                info!("SCAN | verdict {:?}", verdict);
            }
            NodeEvent::VerdictPublished { verdict } => {
                info!("SCAN | published {:?}", verdict);
            }
            NodeEvent::VerdictDropped { verdict } => {
                warn!("SCAN | session down, dropped {:?}", verdict);
            }
            NodeEvent::PingPublished => info!("PING | alive"),

            NodeEvent::CommandAccepted { command } => {
                info!("RELAY | command {:?}", command);
            }
            NodeEvent::CommandIgnored { command } => {
                warn!("RELAY | ignored {:?}", command);
            }
            NodeEvent::RelayEngaged => info!("RELAY | engaged"),
            NodeEvent::RelayReleased => info!("RELAY | released"),
            NodeEvent::RelayFault => warn!("RELAY | actuation fault"),
        }
    }
}
