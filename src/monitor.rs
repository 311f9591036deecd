//! Receiver-side view of the telemetry stream.
//!
//! The phone app parses each notification as JSON and keeps a short
//! rolling history for its chart and its average / min / max readout.
//! This module is the same logic on the Rust side, so the payload format
//! and the statistics can be checked against what the firmware emits.

use serde::Deserialize;

/// Entries retained by [`LevelHistory`]; older ones fall off.
pub const HISTORY_LEN: usize = 100;

/// One decoded telemetry line.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TelemetryPayload {
    pub level: f32,
    pub liters: f32,
}

impl TelemetryPayload {
    /// Decode one payload line. Surrounding whitespace is ignored.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }
}

/// Rolling window of the most recent payloads.
pub struct LevelHistory {
    entries: heapless::HistoryBuffer<TelemetryPayload, HISTORY_LEN>,
}

impl Default for LevelHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelHistory {
    pub const fn new() -> Self {
        Self {
            entries: heapless::HistoryBuffer::new(),
        }
    }

    pub fn push(&mut self, payload: TelemetryPayload) {
        self.entries.write(payload);
    }

    /// Parse and record a line. Malformed lines are returned as errors and
    /// leave the history untouched.
    pub fn push_line(&mut self, line: &str) -> Result<TelemetryPayload, serde_json::Error> {
        let payload = TelemetryPayload::parse(line)?;
        self.push(payload);
        Ok(payload)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }

    pub fn latest(&self) -> Option<&TelemetryPayload> {
        self.entries.recent()
    }

    /// Oldest-first iterator over the retained payloads.
    pub fn iter(&self) -> impl Iterator<Item = &TelemetryPayload> {
        self.entries.oldest_ordered()
    }

    pub fn average_level(&self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }
        let sum: f32 = self.iter().map(|p| p.level).sum();
        Some(sum / self.len() as f32)
    }

    pub fn min_level(&self) -> Option<f32> {
        self.iter().map(|p| p.level).reduce(f32::min)
    }

    pub fn max_level(&self) -> Option<f32> {
        self.iter().map(|p| p.level).reduce(f32::max)
    }
}
