//! Runtime configuration and fixed device parameters
//!
//! Only the telemetry interval is tunable, and only over the Bluetooth
//! serial link via `SET_INTERVAL`. Nothing is persisted; every boot starts
//! from [`RuntimeConfig::default()`].

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ---------------------------------------------------------------------------
// Device constants
// ---------------------------------------------------------------------------

/// Bluetooth Classic device name advertised to the phone app.
pub const DEVICE_NAME: &str = "ESP32_WaterSensor";

/// Full-scale reading of the 12-bit ADC.
pub const MAX_ADC: u16 = 4095;

/// Tank volume represented by a 100% level reading.
pub const MAX_LITERS: u16 = 100;

/// Diagnostic console baud rate (UART0).
pub const CONSOLE_BAUD: u32 = 115_200;

/// Silence after which an unterminated inbound line is taken as complete.
pub const LINE_IDLE_TIMEOUT_MS: u64 = 1000;

// ---------------------------------------------------------------------------
// Interval bounds
// ---------------------------------------------------------------------------

pub const DEFAULT_INTERVAL_MS: u32 = 2000;
pub const MIN_INTERVAL_MS: u32 = 1000;
pub const MAX_INTERVAL_MS: u32 = 10_000;

/// Mutable process state, owned by the sensor loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Minimum spacing between telemetry transmissions (milliseconds)
    pub interval_ms: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl RuntimeConfig {
    /// Check a requested interval against the accepted range (inclusive).
    ///
    /// Values are rejected, never clamped.
    pub fn validate_interval(requested: i64) -> Result<u32, Error> {
        if (MIN_INTERVAL_MS as i64..=MAX_INTERVAL_MS as i64).contains(&requested) {
            Ok(requested as u32)
        } else {
            Err(Error::Config("interval out of range"))
        }
    }

    /// Validate and apply a new interval. On error the config is untouched.
    pub fn set_interval(&mut self, requested: i64) -> Result<u32, Error> {
        let interval = Self::validate_interval(requested)?;
        self.interval_ms = interval;
        Ok(interval)
    }
}
