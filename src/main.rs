//! Water Sensor Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                     │
//! │                                                            │
//! │  HardwareAdapter   BtSerialAdapter   LogEventSink          │
//! │  (SensorPort)      (SerialLink)      (EventSink)           │
//! │                                                            │
//! │  ─────────────── Port Trait Boundary ───────────────       │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │            SensorLoop (pure logic)               │      │
//! │  │  sample · format · interval gate · SET_INTERVAL  │      │
//! │  └──────────────────────────────────────────────────┘      │
//! └────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use embedded_hal::delay::DelayNs;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::bt::{BtDriver, Classic};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{info, warn};

use watersensor::adapters::bt_serial::BtSerialAdapter;
use watersensor::adapters::hardware::HardwareAdapter;
use watersensor::adapters::log_sink::LogEventSink;
use watersensor::adapters::time::Esp32TimeAdapter;
use watersensor::app::service::SensorLoop;
use watersensor::config::{CONSOLE_BAUD, RuntimeConfig};
use watersensor::drivers::hw_init;
use watersensor::pins;
use watersensor::sensors::water_level::WaterLevelSensor;

/// Pause between iterations so the FreeRTOS idle task can feed the task
/// watchdog. One tick at the default 100 Hz tick rate.
const LOOP_YIELD_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  WaterSensor v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    info!("Console at {} baud", CONSOLE_BAUD);

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Readings will come back as 0; the loop still runs.
        warn!("HAL init failed: {}", e);
    }

    let peripherals = Peripherals::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let bt = BtDriver::<Classic>::new(peripherals.modem, Some(nvs))?;

    // ── 3. Adapters ───────────────────────────────────────────
    let mut hw = HardwareAdapter::new(WaterLevelSensor::new(pins::SENSOR_ADC_GPIO));
    let mut link = BtSerialAdapter::new(bt);
    let mut sink = LogEventSink::new();
    let clock = Esp32TimeAdapter::new();
    let mut delay = FreeRtos;

    // ── 4. Sensor loop ────────────────────────────────────────
    let mut sensor_loop = SensorLoop::new(RuntimeConfig::default());
    if let Err(e) = sensor_loop.start(&mut link, &mut sink) {
        warn!("Bluetooth start failed: {}", e);
    }

    info!(
        "Sampling GPIO{} every iteration, sending every >{}ms",
        hw.water_level().gpio(),
        sensor_loop.interval_ms()
    );

    loop {
        sensor_loop.step(clock.uptime_ms(), &mut hw, &mut link, &mut sink);
        delay.delay_ms(LOOP_YIELD_MS);
    }
}
