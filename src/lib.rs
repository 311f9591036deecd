//! Water sensor firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

// The ESP-IDF bindings are optional dependencies behind the `espidf`
// feature; without it the device-side modules cannot resolve them.
#[cfg(all(target_os = "espidf", not(feature = "espidf")))]
compile_error!("building for target_os = \"espidf\" requires `--features espidf`");

pub mod app;
pub mod config;
pub mod error;
pub mod monitor;
pub mod pins;
pub mod telemetry;

pub mod adapters;
pub mod drivers;
pub mod sensors;
