//! GateNode firmware library.
//!
//! Two firmware images for a small access-control testbed share this
//! crate: a card-reader node (RC522 scan → HTTP report → MQTT telemetry)
//! and a relay-actuator node (MQTT command → relay pulse). The domain
//! logic is pure and host-testable; all ESP-IDF-specific code is guarded
//! by `#[cfg(feature = "espidf")]` inside the adapter modules.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod net;
pub mod protocol;
pub mod report;
pub mod scan;
pub mod uid;

pub mod error;
pub mod pins;

// Adapters and drivers carry cfg-gated ESP-IDF implementations with
// in-memory simulation fallbacks for host-target tests.
pub mod adapters;
pub mod drivers;
