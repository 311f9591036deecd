//! Inbound commands from the Bluetooth serial link.
//!
//! The phone sends newline-delimited text. One command is recognised:
//!
//! ```text
//! SET_INTERVAL<integer>      e.g. SET_INTERVAL5000
//! ```
//!
//! The integer follows the prefix directly. It is read leniently: leading
//! whitespace and one sign are accepted, the longest digit run is taken,
//! and anything after it is ignored. No digits at all reads as `0`, which
//! the interval bounds then reject.

use core::fmt::Write;

/// Literal prefix of the interval command (case-sensitive).
pub const SET_INTERVAL_PREFIX: &str = "SET_INTERVAL";

/// Capacity of a reply line (without the trailing newline).
pub const REPLY_CAP: usize = 48;

pub type Reply = heapless::String<REPLY_CAP>;

/// Commands that the link can send into the sensor loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Change the telemetry interval. Carries the value as parsed, before
    /// range validation.
    SetInterval(i64),

    /// Any other line. No reply, no effect.
    Unrecognized,
}

impl AppCommand {
    /// Interpret one received line. Surrounding whitespace (including a
    /// trailing `\r`) is trimmed first.
    pub fn parse(line: &str) -> Self {
        match line.trim().strip_prefix(SET_INTERVAL_PREFIX) {
            Some(arg) => Self::SetInterval(parse_leading_int(arg)),
            None => Self::Unrecognized,
        }
    }
}

/// What the loop did with a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Interval accepted and applied.
    IntervalSet(u32),
    /// Interval outside the accepted range; config untouched.
    IntervalRejected(i64),
    /// Line was not a recognised command.
    Ignored,
}

impl CommandOutcome {
    /// Reply line to send back over the link, if any.
    pub fn reply(&self) -> Option<Reply> {
        let mut out = Reply::new();
        match self {
            Self::IntervalSet(ms) => {
                let _ = write!(out, "ACK: Interval set to {}", ms);
            }
            Self::IntervalRejected(_) => {
                let _ = out.push_str("ERR: Invalid interval");
            }
            Self::Ignored => return None,
        }
        Some(out)
    }
}

// ── Tokenizer ─────────────────────────────────────────────────

/// Read a leading signed integer, C `atol` style. Saturates instead of
/// overflowing.
fn parse_leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, b| {
            acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
        });

    if negative { -magnitude } else { magnitude }
}
