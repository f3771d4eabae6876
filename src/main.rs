//! ServoCal firmware main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  HardwareAdapter          LogEventSink     NvsAdapter    │
//! │  (Motor+Indicator+Input   (EventSink)      (ByteStore)   │
//! │   +Console+Clock)                                        │
//! │                                                          │
//! │  ──────────────── Port Trait Boundary ─────────────      │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │            AppService (pure logic)             │      │
//! │  │  FSM · Search · Ramp · Twitch · Store          │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use servocal::adapters::console::UartConsole;
use servocal::adapters::hardware::HardwareAdapter;
use servocal::adapters::log_sink::LogEventSink;
use servocal::adapters::nvs::NvsAdapter;
use servocal::adapters::time::Esp32TimeAdapter;
use servocal::app::service::AppService;
use servocal::calibration::store::CalibrationStore;
use servocal::config::ServoConfig;
use servocal::drivers::hw_init;
use servocal::drivers::servo::ServoDriver;
use servocal::drivers::status_led::StatusLed;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  ServoCal v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    hw_init::init_peripherals()?;

    // ── 3. Configuration (optional build-time JSON override) ──
    let config = match option_env!("SERVOCAL_CONFIG_JSON") {
        Some(json) => ServoConfig::from_json(json).unwrap_or_else(|e| {
            warn!("Config override rejected ({}), using defaults", e);
            ServoConfig::default()
        }),
        None => ServoConfig::default(),
    };
    info!("Config: {:?}", config);

    // ── 4. Persistent storage ─────────────────────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            warn!("NVS init failed ({}), calibration will not survive reset", e);
            NvsAdapter::volatile()
        }
    };
    let mut store = CalibrationStore::new(nvs);

    // ── 5. Adapters ───────────────────────────────────────────
    let mut hw = HardwareAdapter::new(
        ServoDriver::new(),
        StatusLed::new(),
        UartConsole::new(),
        Esp32TimeAdapter::new(),
    );
    let mut sink = LogEventSink::new();

    // ── 6. Session (never returns) ────────────────────────────
    let mut app = AppService::new(config);
    app.run(&mut hw, &mut store, &mut sink)
}
