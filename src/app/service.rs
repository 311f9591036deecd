//! Sensor loop, the hexagonal core.
//!
//! [`SensorLoop`] owns the only mutable state in the firmware: the runtime
//! config (telemetry interval) and the timestamp of the last send. All I/O
//! flows through port traits injected at call sites, so the loop is
//! testable with mock adapters and an explicit clock.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │       SensorLoop        │
//!  SerialLink ◀──▶│  sample · gate · parse  │
//!                 └────────────────────────┘
//! ```
//!
//! Each [`step`](SensorLoop::step) runs, in order: sample, derive, format,
//! interval-gated send, then at most one inbound command. The send decision
//! is made before the command is read, so a `SET_INTERVAL` received in an
//! iteration only affects later iterations.

use log::{debug, info};

use crate::config::{DEVICE_NAME, RuntimeConfig};
use crate::error::Error;
use crate::telemetry::SensorReading;

use super::commands::{AppCommand, CommandOutcome};
use super::events::AppEvent;
use super::ports::{EventSink, SensorPort, SerialLink};

/// Summary of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// The sample taken this iteration.
    pub reading: SensorReading,
    /// Whether a payload was transmitted.
    pub sent: bool,
    /// Result of the inbound command, if a line was waiting.
    pub command: Option<CommandOutcome>,
}

// ───────────────────────────────────────────────────────────────
// SensorLoop
// ───────────────────────────────────────────────────────────────

pub struct SensorLoop {
    config: RuntimeConfig,
    /// Millisecond tick of the last transmission (0 until the first send).
    last_send_ms: u64,
    iterations: u64,
}

impl SensorLoop {
    /// Construct the loop. Does **not** touch the link; call [`start`] next.
    ///
    /// [`start`]: Self::start
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            last_send_ms: 0,
            iterations: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Bring up the wireless endpoint under [`DEVICE_NAME`].
    pub fn start(
        &mut self,
        link: &mut impl SerialLink,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        link.begin(DEVICE_NAME)?;
        sink.emit(&AppEvent::Started {
            device_name: DEVICE_NAME,
        });
        info!(
            "SensorLoop started (interval={}ms)",
            self.config.interval_ms
        );
        Ok(())
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one iteration at monotonic time `now_ms`. Never blocks.
    pub fn step(
        &mut self,
        now_ms: u64,
        hw: &mut impl SensorPort,
        link: &mut impl SerialLink,
        sink: &mut impl EventSink,
    ) -> StepOutcome {
        self.iterations += 1;

        // 1. Sample, 2. derive, 3. format
        let reading = SensorReading::from_raw(hw.read_raw());
        let payload = reading.to_payload();

        // 4. Interval-gated transmit; a missed window is not queued.
        let sent = self.send_due(now_ms);
        if sent {
            if let Err(e) = link.write_line(&payload) {
                sink.emit(&AppEvent::LinkWriteFailed(e));
            }
            sink.emit(&AppEvent::Sent(payload));
            self.last_send_ms = now_ms;
        }

        // 5. At most one inbound command per iteration.
        let command = link.read_line(now_ms).map(|line| {
            let outcome = self.handle_command(AppCommand::parse(&line), sink);
            if let Some(reply) = outcome.reply() {
                if let Err(e) = link.write_line(&reply) {
                    sink.emit(&AppEvent::LinkWriteFailed(e));
                }
            }
            outcome
        });

        StepOutcome {
            reading,
            sent,
            command,
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a parsed command to the runtime config.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        sink: &mut impl EventSink,
    ) -> CommandOutcome {
        match cmd {
            AppCommand::SetInterval(requested) => {
                let from = self.config.interval_ms;
                match self.config.set_interval(requested) {
                    Ok(to) => {
                        sink.emit(&AppEvent::IntervalChanged { from, to });
                        CommandOutcome::IntervalSet(to)
                    }
                    Err(_) => {
                        sink.emit(&AppEvent::IntervalRejected(requested));
                        CommandOutcome::IntervalRejected(requested)
                    }
                }
            }
            AppCommand::Unrecognized => {
                debug!("Ignoring unrecognized command");
                CommandOutcome::Ignored
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Strictly more than one interval has elapsed since the last send.
    /// Wrapping subtraction keeps the gate correct across tick rollover.
    pub fn send_due(&self, now_ms: u64) -> bool {
        now_ms.wrapping_sub(self.last_send_ms) > u64::from(self.config.interval_ms)
    }

    pub fn interval_ms(&self) -> u32 {
        self.config.interval_ms
    }

    pub fn last_send_ms(&self) -> u64 {
        self.last_send_ms
    }

    /// Iterations executed since construction.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}
