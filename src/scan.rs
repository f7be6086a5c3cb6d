//! Card scan cycle.
//!
//! Per loop pass: `NoCard → CardPresent → CardSelected → Formatted →
//! Reported → Released`. Any pass in which no card is present (the
//! overwhelmingly common case) costs exactly one capability probe and
//! returns with no side effects.
//!
//! After a full cycle the reader service arms a settle delay that
//! debounces repeated reads of a card left in the field. The release
//! step (halt + stop crypto) is owned by the service so it runs even
//! when reporting fails.

use log::debug;

use crate::app::ports::CardReader;
use crate::config::ticks_for;
use crate::uid::CardUid;

/// Result of one scan-cycle step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Settle delay still running; the field was not probed.
    Settling,
    /// No card in the field.
    NoCard,
    /// A card answered the probe but selection failed (moved away).
    SelectFailed,
    /// A card was selected; its identifier is ready for reporting.
    Scanned(CardUid),
}

/// Tick-driven scan cycle over a [`CardReader`] port.
pub struct ScanCycle {
    settle_ticks: u32,
    settle_left: u32,
}

impl ScanCycle {
    pub fn new(settle_ms: u32, tick_interval_ms: u32) -> Self {
        Self {
            settle_ticks: ticks_for(settle_ms, tick_interval_ms),
            settle_left: 0,
        }
    }

    /// Probe for a card once. Cheap when the field is empty.
    pub fn step(&mut self, reader: &mut impl CardReader) -> ScanOutcome {
        if self.settle_left > 0 {
            self.settle_left -= 1;
            return ScanOutcome::Settling;
        }

        if !reader.card_present() {
            return ScanOutcome::NoCard;
        }

        match reader.read_uid() {
            Some(uid) => {
                debug!("scan: selected card {}", uid);
                ScanOutcome::Scanned(uid)
            }
            None => {
                debug!("scan: card present but selection failed");
                ScanOutcome::SelectFailed
            }
        }
    }

    /// Arm the post-cycle settle delay. Called by the service after the
    /// card has been reported and released.
    pub fn settle(&mut self) {
        self.settle_left = self.settle_ticks;
    }

    /// Whether the settle delay is currently running.
    pub fn is_settling(&self) -> bool {
        self.settle_left > 0
    }
}
