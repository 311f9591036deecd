//! Analog water-level probe.
//!
//! A resistive/capacitive level probe drives a 0 – 3.1 V signal into ADC1.
//! The raw 12-bit count is reported as-is; conversion to percent and
//! liters lives in [`crate::telemetry`].
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the ADC1 oneshot channel configured by hw_init.
//! On host/test: reads from a static `AtomicU16` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(not(target_os = "espidf"))]
static SIM_LEVEL_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_level_adc(raw: u16) {
    SIM_LEVEL_ADC.store(raw, Ordering::Relaxed);
}

pub struct WaterLevelSensor {
    adc_gpio: i32,
    total_reads: u32,
}

impl WaterLevelSensor {
    pub fn new(adc_gpio: i32) -> Self {
        Self {
            adc_gpio,
            total_reads: 0,
        }
    }

    pub fn gpio(&self) -> i32 {
        self.adc_gpio
    }

    pub fn total_reads(&self) -> u32 {
        self.total_reads
    }

    pub fn read(&mut self) -> u16 {
        self.total_reads = self.total_reads.saturating_add(1);
        self.read_adc()
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(pins::SENSOR_ADC1_CHANNEL)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_LEVEL_ADC.load(Ordering::Relaxed)
    }
}
