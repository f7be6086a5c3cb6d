//! Node configuration parameters.
//!
//! Every address, credential, topic and retry budget that the Arduino-era
//! sketches hard-coded as globals lives here as an explicit struct, built
//! once at startup and handed to each component at construction.

use serde::{Deserialize, Serialize};

/// Maximum number of known network profiles per node.
pub const MAX_WIFI_PROFILES: usize = 5;

/// Build a fixed-capacity string from a literal. Truncates on overflow;
/// all callers pass literals known to fit.
fn hs<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    let _ = out.push_str(s);
    out
}

/// Convert a millisecond interval into a tick count at the given tick
/// period, never returning zero.
pub fn ticks_for(interval_ms: u32, tick_interval_ms: u32) -> u32 {
    (interval_ms / tick_interval_ms.max(1)).max(1)
}

// ---------------------------------------------------------------------------
// Network link
// ---------------------------------------------------------------------------

/// One known access point, tried in list order (first success wins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiProfile {
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
}

impl WifiProfile {
    /// Build a profile, rejecting out-of-range SSID / password lengths.
    pub fn new(ssid: &str, password: &str) -> crate::error::Result<Self> {
        if ssid.is_empty() || ssid.len() > 32 {
            return Err(crate::error::Error::Config("SSID must be 1-32 bytes"));
        }
        if password.len() > 64 {
            return Err(crate::error::Error::Config("password must be <= 64 bytes"));
        }
        Ok(Self {
            ssid: hs(ssid),
            password: hs(password),
        })
    }
}

/// Association policy for the wireless link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Known networks in priority order.
    pub profiles: heapless::Vec<WifiProfile, MAX_WIFI_PROFILES>,
    /// Link-status polling interval while associating (milliseconds).
    pub poll_interval_ms: u32,
    /// Status polls per profile before moving to the next one.
    pub polls_per_profile: u16,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            profiles: heapless::Vec::new(),
            poll_interval_ms: 500,
            // 20 polls x 500 ms = 10 s box per profile
            polls_per_profile: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// Message-bus session
// ---------------------------------------------------------------------------

/// Broker endpoint and reconnection policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub host: heapless::String<64>,
    pub port: u16,
    /// Base session identifier presented to the broker.
    pub client_id: heapless::String<40>,
    /// Append a fresh random hex suffix per connect attempt, avoiding
    /// broker-side identity collisions on reconnect.
    pub randomize_client_id: bool,
    /// Connect attempts before the budget is exhausted.
    pub max_connect_attempts: u8,
    /// Fixed delay between connect attempts (milliseconds).
    pub retry_delay_ms: u32,
    /// Whether budget exhaustion is fatal (whole-device restart) or
    /// silent (budget resets, retry on the next loop pass).
    pub restart_on_exhaustion: bool,
    /// Command topic to (re-)subscribe to after every successful connect.
    /// `None` for publish-only nodes.
    pub subscribe_topic: Option<heapless::String<32>>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: hs("192.168.43.174"),
            port: 1883,
            client_id: hs("gatenode"),
            randomize_client_id: false,
            max_connect_attempts: 5,
            retry_delay_ms: 2_000,
            restart_on_exhaustion: false,
            subscribe_topic: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Backend reporter
// ---------------------------------------------------------------------------

/// Backend request endpoint and timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// Base URL; the card identifier is appended as `?rfid=<HEX>`.
    pub base_url: heapless::String<128>,
    /// TCP connect timeout (milliseconds).
    pub connect_timeout_ms: u32,
    /// Response read timeout (milliseconds).
    pub read_timeout_ms: u32,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            base_url: hs("http://192.168.43.174/rfid_handler.php"),
            connect_timeout_ms: 10_000,
            read_timeout_ms: 15_000,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-node aggregates
// ---------------------------------------------------------------------------

/// Full configuration for the card-reader node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderNodeConfig {
    /// Main loop tick period (milliseconds).
    pub tick_interval_ms: u32,
    pub link: LinkConfig,
    pub broker: BrokerConfig,
    pub reporter: ReporterConfig,
    /// Verdict codes are published here.
    pub telemetry_topic: heapless::String<32>,
    /// Periodic liveness payload `alive` is published here.
    pub ping_topic: heapless::String<32>,
    pub ping_interval_secs: u32,
    /// Settle delay after a full scan cycle, debouncing a card left in
    /// the field (milliseconds).
    pub scan_settle_ms: u32,
}

impl Default for ReaderNodeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            link: LinkConfig::default(),
            broker: BrokerConfig {
                client_id: hs("gatenode-reader"),
                randomize_client_id: false,
                max_connect_attempts: 10,
                retry_delay_ms: 5_000,
                restart_on_exhaustion: true,
                subscribe_topic: None,
                ..BrokerConfig::default()
            },
            reporter: ReporterConfig::default(),
            telemetry_topic: hs("RFID_LOGIN"),
            ping_topic: hs("ESP32_PING"),
            ping_interval_secs: 30,
            scan_settle_ms: 1_000,
        }
    }
}

/// Full configuration for the relay-actuator node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayNodeConfig {
    /// Main loop tick period (milliseconds).
    pub tick_interval_ms: u32,
    pub link: LinkConfig,
    pub broker: BrokerConfig,
}

impl Default for RelayNodeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            link: LinkConfig::default(),
            broker: BrokerConfig {
                client_id: hs("gatenode-relay"),
                randomize_client_id: true,
                max_connect_attempts: 5,
                retry_delay_ms: 2_000,
                restart_on_exhaustion: false,
                subscribe_topic: Some(hs("RFID_LOGIN")),
                ..BrokerConfig::default()
            },
        }
    }
}
