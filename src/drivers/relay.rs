//! Door-strike relay driver.
//!
//! The relay module is **active-low**: driving the control line LOW
//! energises the coil and opens the strike; HIGH releases it. The
//! driver is generic over the `embedded-hal` `OutputPin` and `DelayNs`
//! traits, so the node service and tests run against recorded fakes.
//!
//! ## Pulse shape
//!
//! State changes are not single edges. The line is toggled through
//! three full high/low cycles at a 50 ms dwell before settling on the
//! target level, matching the switching pattern the relay module was
//! qualified with. One full sequence takes ~350 ms and runs to
//! completion inside the calling tick.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

/// High/low cycles per state change.
pub const PULSE_REPEATS: u32 = 3;
/// Dwell at each level within the pulse train (milliseconds).
pub const PULSE_DWELL_MS: u32 = 50;

pub struct RelayDriver<P, D> {
    pin: P,
    delay: D,
    engaged: bool,
}

impl<P: OutputPin, D: DelayNs> RelayDriver<P, D> {
    /// Take ownership of the control line and drive it to the released
    /// (HIGH) level immediately, before the first command arrives.
    pub fn new(mut pin: P, delay: D) -> Result<Self, ActuatorError> {
        pin.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
        Ok(Self {
            pin,
            delay,
            engaged: false,
        })
    }

    /// Engage the relay (strike open). Final line level: LOW.
    pub fn activate(&mut self) -> Result<(), ActuatorError> {
        self.pulse_to(false)?;
        self.engaged = true;
        Ok(())
    }

    /// Release the relay (strike locked). Final line level: HIGH.
    pub fn deactivate(&mut self) -> Result<(), ActuatorError> {
        self.pulse_to(true)?;
        self.engaged = false;
        Ok(())
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Release the underlying pin and delay provider.
    pub fn free(self) -> (P, D) {
        (self.pin, self.delay)
    }

    fn pulse_to(&mut self, release: bool) -> Result<(), ActuatorError> {
        for _ in 0..PULSE_REPEATS {
            self.write(!release)?;
            self.delay.delay_ms(PULSE_DWELL_MS);
            self.write(release)?;
            self.delay.delay_ms(PULSE_DWELL_MS);
        }
        // Settle on the target level.
        self.write(release)?;
        self.delay.delay_ms(PULSE_DWELL_MS);
        Ok(())
    }

    fn write(&mut self, high: bool) -> Result<(), ActuatorError> {
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| ActuatorError::GpioWriteFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gpio::SimPin;
    use crate::adapters::time::SimDelay;

    #[test]
    fn starts_released() {
        let driver = RelayDriver::new(SimPin::new(), SimDelay::new()).unwrap();
        assert!(!driver.is_engaged());
    }

    #[test]
    fn activate_ends_low() {
        let mut driver = RelayDriver::new(SimPin::new(), SimDelay::new()).unwrap();
        driver.activate().unwrap();
        assert!(driver.is_engaged());
        let pin = driver.pin;
        assert!(pin.is_low());
    }

    #[test]
    fn deactivate_ends_high() {
        let mut driver = RelayDriver::new(SimPin::new(), SimDelay::new()).unwrap();
        driver.activate().unwrap();
        driver.deactivate().unwrap();
        assert!(!driver.is_engaged());
        let pin = driver.pin;
        assert!(!pin.is_low());
    }

    #[test]
    fn pulse_writes_full_train() {
        let mut driver = RelayDriver::new(SimPin::new(), SimDelay::new()).unwrap();
        driver.activate().unwrap();
        // 1 initial release write + 3 cycles x 2 edges + 1 settle write.
        let writes = driver.pin.history();
        assert_eq!(writes.len(), 8);
        // H (init), then H L H L H L, then final L.
        assert_eq!(
            writes,
            &[true, true, false, true, false, true, false, false]
        );
    }

    #[test]
    fn dwell_runs_between_every_edge() {
        let mut driver = RelayDriver::new(SimPin::new(), SimDelay::new()).unwrap();
        driver.activate().unwrap();
        // 3 cycles x 2 dwells + 1 settle dwell.
        assert_eq!(driver.delay.total_ms(), 7 * PULSE_DWELL_MS);
    }
}
