//! Sensor subsystem.
//!
//! The board carries a single analog probe; its driver lives in
//! [`water_level`] and is wrapped behind `SensorPort` by
//! [`HardwareAdapter`](crate::adapters::hardware::HardwareAdapter).

pub mod water_level;
