//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements        | Connects to                  |
//! |------------|-------------------|------------------------------|
//! | `wifi`     | NetworkLink       | ESP-IDF WiFi STA             |
//! | `mqtt`     | MessageBusSession | ESP-IDF MQTT client          |
//! | `http`     | HttpRequester     | ESP-IDF HTTP client          |
//! | `rc522`    | CardReader        | MFRC522 over SPI             |
//! | `log_sink` | EventSink         | Serial log output            |
//! | `time`     | DelayNs           | FreeRTOS task delay          |
//! | `device`   | (free functions)  | esp_random / esp_restart     |
//! | `gpio`     | OutputPin         | recorded fake (host only)    |
//!
//! ## cfg gating
//!
//! Real implementations live behind `feature = "espidf"` (which pulls
//! in the ESP-IDF crates and is only enabled for the xtensa target).
//! Without it every adapter is an in-memory, scriptable simulation so
//! the whole firmware stack runs under host-target tests.

pub mod device;
#[cfg(not(feature = "espidf"))]
pub mod gpio;
pub mod http;
pub mod log_sink;
pub mod mqtt;
pub mod rc522;
pub mod time;
pub mod wifi;
