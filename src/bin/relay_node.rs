//! Relay-actuator node firmware entry point.
//!
//! Wires the real adapters (WiFi STA, MQTT client) and the door-strike
//! relay driver to the relay service and runs the tick loop. Built only
//! with `--features espidf` for the xtensa target.

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::peripherals::Peripherals;
use log::info;

use gatenode::adapters::device;
use gatenode::adapters::log_sink::LogEventSink;
use gatenode::adapters::mqtt::MqttAdapter;
use gatenode::adapters::time::NodeDelay;
use gatenode::adapters::wifi::WifiAdapter;
use gatenode::app::TickAction;
use gatenode::app::relay::RelayService;
use gatenode::config::{RelayNodeConfig, WifiProfile};
use gatenode::drivers::relay::RelayDriver;
use gatenode::error::Error;

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("GateNode relay v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let sysloop = esp_idf_svc::eventloop::EspSystemEventLoop::take()?;
    let nvs = esp_idf_svc::nvs::EspDefaultNvsPartition::take()?;

    let mut cfg = RelayNodeConfig::default();
    cfg.link
        .profiles
        .push(WifiProfile::new("testbed-lab", "testbed-pass")?)
        .map_err(|_| anyhow::anyhow!("profile list full"))?;

    // Relay control line; the driver parks it released (HIGH) before
    // the first command can arrive.
    let relay_pin = PinDriver::output(peripherals.pins.gpio26)?;
    let mut relay = RelayDriver::new(relay_pin, NodeDelay).map_err(Error::from)?;

    let mut net = WifiAdapter::new(peripherals.modem, sysloop, nvs)?;
    let mut bus = MqttAdapter::new(&cfg.broker)?;
    let mut sink = LogEventSink::new();

    let tick_ms = cfg.tick_interval_ms;
    let mut service = RelayService::new(cfg, device::entropy_seed());

    info!("relay: entering main loop ({} ms tick)", tick_ms);
    loop {
        let action = service.tick(&mut net, &mut bus, &mut relay, &mut sink);
        if action == TickAction::Restart {
            device::restart();
        }
        FreeRtos::delay_ms(tick_ms);
    }
}
