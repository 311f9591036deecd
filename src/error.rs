//! Unified error types for the water sensor firmware.
//!
//! A single `Error` enum that every subsystem converts into. All variants
//! are `Copy` so they pass through the loop without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The analog sensor could not be set up or read.
    Sensor(SensorError),
    /// The Bluetooth serial link failed.
    Comms(CommsError),
    /// A configuration value was rejected.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC unit or channel configuration failed.
    AdcConfigFailed,
    /// ADC read returned an error.
    AdcReadFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcConfigFailed => write!(f, "ADC configuration failed"),
            Self::AdcReadFailed => write!(f, "ADC read failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// Bluetooth controller or Bluedroid stack failed to come up.
    BtInitFailed,
    /// SPP profile or server could not be started.
    SppStartFailed,
    /// Outbound write attempted with no client connected.
    NotConnected,
    /// Outbound line does not fit the transmit buffer.
    LineTooLong,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BtInitFailed => write!(f, "Bluetooth init failed"),
            Self::SppStartFailed => write!(f, "SPP server start failed"),
            Self::NotConnected => write!(f, "no SPP client connected"),
            Self::LineTooLong => write!(f, "line exceeds transmit buffer"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
