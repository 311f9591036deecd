//! Outbound application events.
//!
//! The [`SensorLoop`](super::service::SensorLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port. On the device they end up
//! on the diagnostic console; tests record them.

use crate::error::CommsError;
use crate::telemetry::Payload;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The loop has started and the link is advertising under `device_name`.
    Started { device_name: &'static str },

    /// A telemetry payload went out over the link.
    Sent(Payload),

    /// The link refused an outbound line. The send still counts toward
    /// the interval gate.
    LinkWriteFailed(CommsError),

    /// The interval changed via `SET_INTERVAL`.
    IntervalChanged { from: u32, to: u32 },

    /// A `SET_INTERVAL` value was outside the accepted range.
    IntervalRejected(i64),
}
