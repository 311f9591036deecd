//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SensorLoop (domain)
//! ```
//!
//! Driven adapters (ADC, Bluetooth serial, console log) implement these
//! traits. The [`SensorLoop`](super::service::SensorLoop) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::error::CommsError;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to sample the water-level probe.
pub trait SensorPort {
    /// Sample the analog input once. Nominally `0..=MAX_ADC`; a failed
    /// read is indistinguishable from `0`.
    fn read_raw(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Serial link port (driven adapter: domain ↔ Bluetooth SPP)
// ───────────────────────────────────────────────────────────────

/// Bidirectional, line-oriented text channel to the phone.
pub trait SerialLink {
    /// Start advertising under `device_name` and accept a client.
    fn begin(&mut self, device_name: &str) -> Result<(), CommsError>;

    /// Send one line; the adapter appends the `\n` terminator.
    fn write_line(&mut self, line: &str) -> Result<(), CommsError>;

    /// Take the next complete inbound line (terminator stripped), if one
    /// is buffered at monotonic time `now_ms`. A partial line with no
    /// terminator is complete once the sender has been silent for
    /// [`LINE_IDLE_TIMEOUT_MS`](crate::config::LINE_IDLE_TIMEOUT_MS).
    /// Never blocks.
    fn read_line(&mut self, now_ms: u64) -> Option<heapless::String<LINE_CAP>>;
}

/// Longest inbound line the link will buffer (without terminator).
pub const LINE_CAP: usize = 64;

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → diagnostic console)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
