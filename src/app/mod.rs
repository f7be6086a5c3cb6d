//! Application core — pure domain logic, zero I/O.
//!
//! The two node services orchestrate the card-read-and-report cycle and
//! the command-relay cycle. All interaction with hardware and the
//! network happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod reader;
pub mod relay;

/// What the binary's main loop should do after one service tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Sleep one tick period, then tick again.
    Continue,
    /// Reconnection policy gave up; restart the whole device.
    Restart,
}
