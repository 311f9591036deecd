//! Fuzz target: `AppCommand::parse` + `SensorLoop::handle_command`
//!
//! Feeds arbitrary text lines through the command path and asserts the
//! interval never leaves its accepted range and every reply fits.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use watersensor::app::commands::AppCommand;
use watersensor::app::events::AppEvent;
use watersensor::app::ports::EventSink;
use watersensor::app::service::SensorLoop;
use watersensor::config::{MAX_INTERVAL_MS, MIN_INTERVAL_MS, RuntimeConfig};

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let mut lp = SensorLoop::new(RuntimeConfig::default());
    for line in text.split('\n') {
        let outcome = lp.handle_command(AppCommand::parse(line), &mut Discard);
        if let Some(reply) = outcome.reply() {
            assert!(reply.starts_with("ACK: ") || reply.starts_with("ERR: "));
        }
        let ms = lp.interval_ms();
        assert!((MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&ms));
    }
});
