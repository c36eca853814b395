//! Air Quality Monitor firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  WifiAdapter      MqttAdapter     Ens160<I2cDriver>            │
//! │  (NetworkPort)    (BrokerPort)    (AirQualityDriver)           │
//! │  LogDisplay       LogEventSink    Esp32TimeAdapter             │
//! │  (DisplayPort)    (EventSink)     (Clock)                      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Supervisor (pure logic)                   │    │
//! │  │  Connectivity · Discovery · Telemetry · SensorReader   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::{Result, bail};
use log::{error, info};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use aqmonitor::adapters::device_id;
use aqmonitor::adapters::display::LogDisplay;
use aqmonitor::adapters::log_sink::LogEventSink;
use aqmonitor::adapters::mqtt::MqttAdapter;
use aqmonitor::adapters::system;
use aqmonitor::adapters::time::Esp32TimeAdapter;
use aqmonitor::adapters::wifi::WifiAdapter;
use aqmonitor::app::ports::NetworkPort;
use aqmonitor::config::DeviceConfig;
use aqmonitor::drivers::watchdog::Watchdog;
use aqmonitor::pins;
use aqmonitor::sensors::ens160::Ens160;
use aqmonitor::supervisor::Supervisor;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Air Quality Monitor v{}          ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = DeviceConfig::default();
    if let Err(e) = config.validate() {
        bail!("{}", e);
    }

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take().ok();

    info!(
        "I2C: SDA=GPIO{} SCL=GPIO{} @ {} Hz",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        pins::I2C_FREQ_HZ
    );
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio8,
        peripherals.pins.gpio9,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )?;

    // ── 4. Adapters ───────────────────────────────────────────
    let sensor = Ens160::new(i2c, config.sensor_i2c_address);
    let wifi = WifiAdapter::new(peripherals.modem, sysloop, nvs, &config)?;
    info!("MAC: {}", device_id::format_mac(&wifi.mac_address()));
    let mqtt = MqttAdapter::new(&config);

    let mut supervisor = Supervisor::new(
        sensor,
        wifi,
        mqtt,
        LogDisplay::new(),
        LogEventSink::new(),
        &config,
    );
    let mut clock = Esp32TimeAdapter::new();

    // The watchdog is armed on the first loop iteration so that the
    // bounded boot waits do not count against it.
    let mut watchdog: Option<Watchdog> = None;
    let mut heartbeat = || {
        watchdog
            .get_or_insert_with(|| {
                let wd = Watchdog::new(config.watchdog_timeout_secs);
                info!("Watchdog armed, {} ms timeout", wd.timeout_ms());
                wd
            })
            .feed();
    };

    // ── 5. Run until a fault, then restart ────────────────────
    let fault = supervisor.run(&mut clock, &mut heartbeat);
    error!("Fatal: {}. Restarting.", fault);
    system::restart()
}
