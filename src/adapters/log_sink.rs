//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the ESP-IDF
//! logger, which goes to the UART0 diagnostic console in production.
//! Every transmitted payload is mirrored as `Sent: <payload>`.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::error::CommsError;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { device_name } => {
                info!("Bluetooth Started. Waiting for connection...");
                info!("START | device_name={}", device_name);
            }
            AppEvent::Sent(payload) => {
                info!("Sent: {}", payload);
            }
            // No client is the normal idle case; keep it out of the info stream.
            AppEvent::LinkWriteFailed(CommsError::NotConnected) => {
                debug!("LINK | write skipped, no client");
            }
            AppEvent::LinkWriteFailed(e) => {
                warn!("LINK | write failed: {}", e);
            }
            AppEvent::IntervalChanged { from, to } => {
                info!("CONFIG | interval {}ms -> {}ms", from, to);
            }
            AppEvent::IntervalRejected(requested) => {
                warn!("CONFIG | interval {} rejected", requested);
            }
        }
    }
}
