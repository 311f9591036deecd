//! Sensor reading derivation and the outbound JSON payload.
//!
//! The payload text is fixed-shape so the phone app can parse it with a
//! plain `JSON.parse`:
//!
//! ```text
//! {"level": 42.50, "liters": 42.5}
//! ```
//!
//! `level` carries two decimals, `liters` one, and the field order never
//! changes. The string is built with `core::fmt::Write` into a
//! fixed-capacity buffer, so no heap is touched per sample.

use core::fmt::Write;

use crate::config::{MAX_ADC, MAX_LITERS};

/// Capacity of the payload buffer. Large enough for any `u16` raw value,
/// including out-of-range readings above [`MAX_ADC`].
pub const PAYLOAD_CAP: usize = 64;

pub type Payload = heapless::String<PAYLOAD_CAP>;

/// One sample of the water-level probe with its derived values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Raw ADC count, nominally `0..=MAX_ADC`.
    pub raw: u16,
    /// Fill level as a percentage of full scale.
    pub level_percent: f32,
    /// Fill level expressed in liters.
    pub liters: f32,
}

impl SensorReading {
    /// Derive level and volume from a raw ADC count.
    ///
    /// No clamping: a raw value above `MAX_ADC` yields a level above 100%.
    pub fn from_raw(raw: u16) -> Self {
        let level_percent = (f32::from(raw) / f32::from(MAX_ADC)) * 100.0;
        let liters = (level_percent / 100.0) * f32::from(MAX_LITERS);
        Self {
            raw,
            level_percent,
            liters,
        }
    }

    /// Render the wire payload (without the trailing newline).
    pub fn to_payload(&self) -> Payload {
        let mut out = Payload::new();
        // Cannot overflow: the widest u16-derived payload is under 40 bytes.
        let _ = write!(
            out,
            "{{\"level\": {:.2}, \"liters\": {:.1}}}",
            self.level_percent, self.liters,
        );
        out
    }
}
