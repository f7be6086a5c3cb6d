//! Delay provider.
//!
//! - **`feature = "espidf"`** — FreeRTOS task delay from
//!   `esp_idf_hal`, which yields the calling task instead of spinning.
//! - **otherwise** — a recording fake that counts requested time
//!   without sleeping, keeping host tests instant.

/// Delay implementation handed to drivers on the device.
#[cfg(feature = "espidf")]
pub type NodeDelay = esp_idf_hal::delay::FreeRtos;

/// Recording delay for host-side tests. Implements the `embedded-hal`
/// `DelayNs` trait; time is accumulated, never slept.
#[cfg(not(feature = "espidf"))]
pub struct SimDelay {
    total_ns: u64,
}

#[cfg(not(feature = "espidf"))]
impl SimDelay {
    pub fn new() -> Self {
        Self { total_ns: 0 }
    }

    /// Total delay requested so far, in milliseconds.
    pub fn total_ms(&self) -> u32 {
        (self.total_ns / 1_000_000) as u32
    }
}

#[cfg(not(feature = "espidf"))]
impl embedded_hal::delay::DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}
