//! WiFi station-mode adapter.
//!
//! Implements [`NetworkLink`] — the hexagonal boundary for wireless
//! connectivity. Association is fire-and-forget: `begin()` hands the
//! profile to the driver and returns; the link manager observes the
//! result through `is_up()` polls.
//!
//! - **`feature = "espidf"`**: real ESP-IDF WiFi driver via
//!   `esp_idf_svc::wifi::EspWifi`.
//! - **otherwise**: scripted simulation for host-side tests, driven by
//!   a per-SSID poll plan.

use crate::app::ports::NetworkLink;
use crate::config::WifiProfile;
use crate::error::LinkError;

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(feature = "espidf")]
pub struct WifiAdapter {
    wifi: esp_idf_svc::wifi::EspWifi<'static>,
}

#[cfg(feature = "espidf")]
impl WifiAdapter {
    pub fn new(
        modem: esp_idf_hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        nvs: esp_idf_svc::nvs::EspDefaultNvsPartition,
    ) -> anyhow::Result<Self> {
        let wifi = esp_idf_svc::wifi::EspWifi::new(modem, sysloop, Some(nvs))?;
        Ok(Self { wifi })
    }
}

#[cfg(feature = "espidf")]
impl NetworkLink for WifiAdapter {
    fn begin(&mut self, profile: &WifiProfile) -> Result<(), LinkError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let auth_method = if profile.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let conf = Configuration::Client(ClientConfiguration {
            ssid: profile.ssid.clone(),
            password: profile.password.clone(),
            auth_method,
            ..Default::default()
        });

        self.wifi
            .set_configuration(&conf)
            .map_err(|_| LinkError::AssociationFailed)?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi.start().map_err(|_| LinkError::AssociationFailed)?;
        }
        self.wifi
            .connect()
            .map_err(|_| LinkError::AssociationFailed)?;
        Ok(())
    }

    fn is_up(&mut self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    fn local_addr(&mut self) -> Option<core::net::Ipv4Addr> {
        self.wifi.sta_netif().get_ip_info().ok().map(|info| info.ip)
    }

    fn disconnect(&mut self) {
        let _ = self.wifi.disconnect();
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

/// Scripted link simulation. Each known SSID carries the number of
/// status polls before association succeeds; unknown SSIDs never
/// come up.
#[cfg(not(feature = "espidf"))]
pub struct WifiAdapter {
    plans: Vec<(String, Option<u32>)>,
    active: Option<usize>,
    polls_since_begin: u32,
    up: bool,
    /// Every SSID handed to `begin()`, in order.
    pub begins: Vec<String>,
}

#[cfg(not(feature = "espidf"))]
impl WifiAdapter {
    pub fn new() -> Self {
        Self {
            plans: Vec::new(),
            active: None,
            polls_since_begin: 0,
            up: false,
            begins: Vec::new(),
        }
    }

    /// Script an SSID: `Some(n)` associates after `n` status polls,
    /// `None` never associates.
    pub fn sim_plan(&mut self, ssid: &str, polls_until_up: Option<u32>) {
        self.plans.push((ssid.to_owned(), polls_until_up));
    }

    /// Drop an established association (carrier loss).
    pub fn sim_drop(&mut self) {
        self.active = None;
        self.up = false;
    }
}

#[cfg(not(feature = "espidf"))]
impl NetworkLink for WifiAdapter {
    fn begin(&mut self, profile: &WifiProfile) -> Result<(), LinkError> {
        self.begins.push(profile.ssid.as_str().to_owned());
        self.active = self
            .plans
            .iter()
            .position(|(ssid, _)| ssid == profile.ssid.as_str());
        self.polls_since_begin = 0;
        self.up = false;
        Ok(())
    }

    fn is_up(&mut self) -> bool {
        if self.up {
            return true;
        }
        let Some(idx) = self.active else { return false };
        let Some(needed) = self.plans[idx].1 else {
            return false;
        };
        self.polls_since_begin += 1;
        if self.polls_since_begin > needed {
            self.up = true;
        }
        self.up
    }

    fn local_addr(&mut self) -> Option<core::net::Ipv4Addr> {
        self.up.then(|| core::net::Ipv4Addr::new(192, 168, 43, 50))
    }

    fn disconnect(&mut self) {
        self.sim_drop();
    }
}
