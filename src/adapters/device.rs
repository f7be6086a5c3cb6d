//! Whole-device operations: entropy and restart.

/// Seed for the session-identifier PRNG.
#[cfg(feature = "espidf")]
pub fn entropy_seed() -> u32 {
    // Hardware RNG; valid once WiFi or Bluetooth has started, and
    // still usable as a seed before that.
    unsafe { esp_idf_svc::sys::esp_random() }
}

/// Seed for the session-identifier PRNG (host: wall-clock jitter).
#[cfg(not(feature = "espidf"))]
pub fn entropy_seed() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0x5EED_CAFE)
}

/// Restart the whole device. Last resort of the reconnect policy.
#[cfg(feature = "espidf")]
pub fn restart() -> ! {
    log::warn!("device: restarting");
    unsafe { esp_idf_svc::sys::esp_restart() };
    unreachable!()
}

/// Host stand-in for a device restart: terminate the process.
#[cfg(not(feature = "espidf"))]
pub fn restart() -> ! {
    log::warn!("device: restarting (host: exiting)");
    std::process::exit(0)
}
