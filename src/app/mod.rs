//! Application core: pure domain logic, zero I/O.
//!
//! Sampling, payload gating and command handling for the water sensor.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
