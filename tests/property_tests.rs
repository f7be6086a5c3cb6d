//! Property-based tests for the pure domain pieces: UID formatting,
//! payload grammars, tick arithmetic, and the relay level invariant.

#![cfg(not(feature = "espidf"))]

use proptest::prelude::*;

use gatenode::adapters::gpio::SimPin;
use gatenode::adapters::time::SimDelay;
use gatenode::config::ticks_for;
use gatenode::drivers::relay::RelayDriver;
use gatenode::protocol::{RelayCommand, ServerVerdict};
use gatenode::uid::CardUid;

proptest! {
    /// Hex rendering is always two uppercase digits per byte.
    #[test]
    fn uid_hex_shape(bytes in proptest::collection::vec(any::<u8>(), 1..=10)) {
        let uid = CardUid::from_bytes(&bytes).unwrap();
        let hex = uid.hex();
        prop_assert_eq!(hex.len(), bytes.len() * 2);
        prop_assert!(hex.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    /// A `NOT FOUND` marker wins no matter what surrounds it.
    #[test]
    fn not_found_dominates(prefix in ".{0,40}", suffix in ".{0,40}") {
        let body = format!("{prefix}NOT FOUND{suffix}");
        prop_assert_eq!(ServerVerdict::parse(&body), Some(ServerVerdict::NotFound));
    }

    /// The status character is whatever immediately follows `STATUS:`.
    #[test]
    fn status_char_is_extracted(code in proptest::char::range('0', 'z')) {
        let body = format!("granted STATUS:{code}");
        prop_assert_eq!(ServerVerdict::parse(&body), Some(ServerVerdict::Status(code)));
    }

    /// Only the exact payloads `1` and `0` ever actuate the relay.
    #[test]
    fn only_exact_payloads_actuate(payload in proptest::collection::vec(any::<u8>(), 0..16)) {
        let actuates = matches!(
            RelayCommand::decode(&payload),
            RelayCommand::On | RelayCommand::Off
        );
        let exact = payload.as_slice() == b"1" || payload.as_slice() == b"0";
        prop_assert_eq!(actuates, exact);
    }

    /// Tick conversion never yields zero (a zero budget would stall a
    /// state machine forever).
    #[test]
    fn ticks_never_zero(interval in 0u32..1_000_000, tick in 0u32..10_000) {
        prop_assert!(ticks_for(interval, tick) >= 1);
    }

    /// After any command sequence the relay line level matches the
    /// logical state: LOW iff engaged (active-low module).
    #[test]
    fn relay_level_tracks_state(commands in proptest::collection::vec(any::<bool>(), 1..20)) {
        let mut driver = RelayDriver::new(SimPin::new(), SimDelay::new()).unwrap();
        for engage in &commands {
            if *engage {
                driver.activate().unwrap();
            } else {
                driver.deactivate().unwrap();
            }
        }
        let engaged = driver.is_engaged();
        let (pin, _) = driver.free();
        prop_assert_eq!(pin.is_low(), engaged);
    }
}
