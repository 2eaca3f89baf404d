//! TDS Probe Firmware — Main Entry Point
//!
//! Hexagonal architecture with a fixed-period measurement loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                    │
//! │                                                            │
//! │  HardwareAdapter   UartConsole   NvsAdapter   LogEventSink │
//! │  (Analog+Clock)    (Console)     (Config+EEPROM) (Events)  │
//! │                                                            │
//! │  ─────────────── Port Trait Boundary ───────────────       │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │              TdsMeter (pure logic)                   │  │
//! │  │  Probe · Line reader · Calibration FSM · Stats       │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use embedded_hal::delay::DelayNs;
use esp_idf_hal::delay::FreeRtos;
use log::{info, warn};

use tdsprobe::adapters::hardware::HardwareAdapter;
use tdsprobe::adapters::log_sink::LogEventSink;
use tdsprobe::adapters::nvs::NvsAdapter;
use tdsprobe::adapters::serial::UartConsole;
use tdsprobe::adapters::time::Esp32TimeAdapter;
use tdsprobe::app::service::TdsMeter;
use tdsprobe::config::MeterConfig;
use tdsprobe::drivers::hw_init;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("TdsProbe v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Storage + config ───────────────────────────────────
    let mut nvs = NvsAdapter::new()?;
    let config = match nvs.load_or(MeterConfig::esp32s3()) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Config load failed ({}), using board defaults", e);
            MeterConfig::esp32s3()
        }
    };

    // ── 3. Peripherals ────────────────────────────────────────
    let channel = hw_init::init_peripherals(config.probe_adc_gpio)?;
    let mut hw = HardwareAdapter::new(channel, Esp32TimeAdapter::new());
    let mut console = UartConsole::new();
    let mut sink = LogEventSink::new();

    // ── 4. Meter ──────────────────────────────────────────────
    let interval_ms = config.sample_interval_ms;
    let mut meter = TdsMeter::new(config);
    meter.begin(&mut nvs, &mut sink);

    info!("System ready. Entering measurement loop.");

    // ── 5. Measurement loop ───────────────────────────────────
    let mut delay = FreeRtos;
    loop {
        let reading = meter.update(&mut hw, &mut console, &mut nvs, &mut sink);
        info!("TDS {:.0} ppm (EC25 {:.0} uS/cm)", reading.tds_ppm, reading.ec25);
        delay.delay_ms(interval_ms);
    }
}
