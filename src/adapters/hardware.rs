//! Hardware adapter: bridges the water-level probe to [`SensorPort`].
//!
//! This is the only module in the system that touches the ADC. On
//! non-espidf targets the underlying driver uses a cfg-gated simulation
//! stub.

use crate::app::ports::SensorPort;
use crate::sensors::water_level::WaterLevelSensor;

/// Concrete adapter that puts the probe behind the port trait.
pub struct HardwareAdapter {
    water_level: WaterLevelSensor,
}

impl HardwareAdapter {
    pub fn new(water_level: WaterLevelSensor) -> Self {
        Self { water_level }
    }

    pub fn water_level(&self) -> &WaterLevelSensor {
        &self.water_level
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_raw(&mut self) -> u16 {
        self.water_level.read()
    }
}
