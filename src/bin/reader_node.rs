//! Card-reader node firmware entry point.
//!
//! Wires the real adapters (WiFi STA, MQTT client, HTTP client, RC522
//! over VSPI) to the reader service and runs the tick loop. Built only
//! with `--features espidf` for the xtensa target.

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::spi::config::Config as SpiConfig;
use esp_idf_hal::spi::{SpiDeviceDriver, SpiDriverConfig};
use esp_idf_hal::units::FromValueType as _;
use log::info;

use gatenode::adapters::device;
use gatenode::adapters::http::HttpAdapter;
use gatenode::adapters::log_sink::LogEventSink;
use gatenode::adapters::mqtt::MqttAdapter;
use gatenode::adapters::rc522::Rc522Adapter;
use gatenode::adapters::wifi::WifiAdapter;
use gatenode::app::TickAction;
use gatenode::app::reader::ReaderService;
use gatenode::config::{ReaderNodeConfig, WifiProfile};
use gatenode::pins;

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("GateNode reader v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let sysloop = esp_idf_svc::eventloop::EspSystemEventLoop::take()?;
    let nvs = esp_idf_svc::nvs::EspDefaultNvsPartition::take()?;

    let mut cfg = ReaderNodeConfig::default();
    cfg.link
        .profiles
        .push(WifiProfile::new("testbed-lab", "testbed-pass")?)
        .map_err(|_| anyhow::anyhow!("profile list full"))?;

    // RC522 on VSPI; assignments live in the `pins` module.
    let mut rc522_rst = PinDriver::output(peripherals.pins.gpio22)?;
    rc522_rst.set_high()?;
    let spi = SpiDeviceDriver::new_single(
        peripherals.spi3,
        peripherals.pins.gpio18, // SCK
        peripherals.pins.gpio23, // MOSI
        Some(peripherals.pins.gpio19), // MISO
        Some(peripherals.pins.gpio5), // CS
        &SpiDriverConfig::new(),
        &SpiConfig::new().baudrate(pins::RC522_SPI_BAUD_HZ.Hz()),
    )?;
    let mut reader = Rc522Adapter::new(spi)?;

    let mut net = WifiAdapter::new(peripherals.modem, sysloop, nvs)?;
    let mut bus = MqttAdapter::new(&cfg.broker)?;
    let mut http = HttpAdapter::new(&cfg.reporter);
    let mut sink = LogEventSink::new();

    let tick_ms = cfg.tick_interval_ms;
    let mut service = ReaderService::new(cfg, device::entropy_seed());

    info!("reader: entering main loop ({} ms tick)", tick_ms);
    loop {
        let action = service.tick(&mut net, &mut bus, &mut http, &mut reader, &mut sink);
        if action == TickAction::Restart {
            device::restart();
        }
        FreeRtos::delay_ms(tick_ms);
    }
}
