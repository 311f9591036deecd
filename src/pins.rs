//! GPIO / peripheral pin assignments for the water sensor board.
//!
//! Single source of truth. Drivers reference this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors: analog (ADC1)
// ---------------------------------------------------------------------------

/// Analog water-level probe. GPIO 34 is input-only on the ESP32, which
/// suits an ADC line.
pub const SENSOR_ADC_GPIO: i32 = 34;

/// ADC1 channel wired to [`SENSOR_ADC_GPIO`] (GPIO 34 → ADC1_CH6 on ESP32).
pub const SENSOR_ADC1_CHANNEL: u32 = 6;

