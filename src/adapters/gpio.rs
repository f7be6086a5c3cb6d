//! Recorded fake GPIO output for host-side tests.
//!
//! On the device the relay control line is a real
//! `esp_idf_hal::gpio::PinDriver`, which already implements the
//! `embedded-hal` `OutputPin` trait the relay driver is generic over.
//! This module only exists for host targets.

use embedded_hal::digital::{Error, ErrorKind, ErrorType, OutputPin};

/// Write failure injected by [`SimPin::sim_fail_writes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimPinError;

impl Error for SimPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Output pin that records every level written to it.
pub struct SimPin {
    levels: Vec<bool>,
    fail_writes: bool,
}

impl SimPin {
    pub fn new() -> Self {
        Self {
            levels: Vec::new(),
            fail_writes: false,
        }
    }

    /// Make every subsequent write fail.
    pub fn sim_fail_writes(&mut self) {
        self.fail_writes = true;
    }

    /// Every level written, in order (`true` = high).
    pub fn history(&self) -> &[bool] {
        &self.levels
    }

    /// Whether the last written level was low. Panics if nothing was
    /// ever written.
    pub fn is_low(&self) -> bool {
        !*self.levels.last().expect("no level written yet")
    }
}

impl ErrorType for SimPin {
    type Error = SimPinError;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(SimPinError);
        }
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(SimPinError);
        }
        self.levels.push(true);
        Ok(())
    }
}
