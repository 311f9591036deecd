//! Integration tests for the SensorLoop → link pipeline.
//!
//! Drives the loop with an explicit millisecond clock so the interval gate,
//! command handling and payload format can be checked end to end.

use approx::assert_relative_eq;

use crate::mock_hw::{MockSensor, RecordingLink, RecordingSink};

use watersensor::app::commands::CommandOutcome;
use watersensor::app::events::AppEvent;
use watersensor::app::service::SensorLoop;
use watersensor::config::{DEVICE_NAME, RuntimeConfig};
use watersensor::error::{CommsError, Error};
use watersensor::monitor::LevelHistory;

const FULL: &str = r#"{"level": 100.00, "liters": 100.0}"#;

fn make_loop() -> (SensorLoop, MockSensor, RecordingLink, RecordingSink) {
    let mut lp = SensorLoop::new(RuntimeConfig::default());
    let mut link = RecordingLink::new();
    let mut sink = RecordingSink::new();
    lp.start(&mut link, &mut sink).unwrap();
    (lp, MockSensor::new(4095), link, sink)
}

/// Step once per millisecond over `from..=to`.
fn run(
    lp: &mut SensorLoop,
    hw: &mut MockSensor,
    link: &mut RecordingLink,
    sink: &mut RecordingSink,
    from: u64,
    to: u64,
) -> usize {
    (from..=to)
        .filter(|&t| lp.step(t, hw, link, sink).sent)
        .count()
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_advertises_under_device_name() {
    let (_lp, _hw, link, sink) = make_loop();
    assert_eq!(link.begun_as.as_deref(), Some(DEVICE_NAME));
    assert_eq!(
        sink.events.first(),
        Some(&AppEvent::Started {
            device_name: DEVICE_NAME
        })
    );
}

#[test]
fn failed_begin_is_reported_and_not_announced() {
    let mut lp = SensorLoop::new(RuntimeConfig::default());
    let mut link = RecordingLink::new();
    link.fail_begin = true;
    let mut sink = RecordingSink::new();

    let err = lp.start(&mut link, &mut sink).unwrap_err();
    assert_eq!(err, Error::Comms(CommsError::SppStartFailed));
    assert!(sink.events.is_empty());
}

// ── Interval gate ─────────────────────────────────────────────

#[test]
fn first_send_waits_for_a_full_interval() {
    let (mut lp, mut hw, mut link, mut sink) = make_loop();

    assert_eq!(run(&mut lp, &mut hw, &mut link, &mut sink, 0, 2000), 0);
    assert!(link.outbound.is_empty());

    assert!(lp.step(2001, &mut hw, &mut link, &mut sink).sent);
    assert_eq!(link.outbound, vec![FULL.to_string()]);
    assert_eq!(lp.last_send_ms(), 2001);
}

#[test]
fn elapsed_equal_to_interval_does_not_send() {
    let (mut lp, mut hw, mut link, mut sink) = make_loop();
    assert!(lp.step(2001, &mut hw, &mut link, &mut sink).sent);

    assert!(!lp.step(4001, &mut hw, &mut link, &mut sink).sent);
    assert!(lp.step(4002, &mut hw, &mut link, &mut sink).sent);
}

#[test]
fn steady_cadence_sends_every_interval_plus_one() {
    let (mut lp, mut hw, mut link, mut sink) = make_loop();

    // Sends land on 2001, 4002, 6003, 8004.
    let sent = run(&mut lp, &mut hw, &mut link, &mut sink, 0, 10_000);
    assert_eq!(sent, 4);
    assert_eq!(sink.sent_count(), 4);
    assert_eq!(lp.last_send_ms(), 8004);
    assert_eq!(hw.reads, 10_001, "sensor is sampled every iteration");
}

#[test]
fn missed_windows_are_not_queued() {
    let (mut lp, mut hw, mut link, mut sink) = make_loop();
    assert!(lp.step(2001, &mut hw, &mut link, &mut sink).sent);

    // A long stall yields a single send, not a burst.
    assert!(lp.step(60_000, &mut hw, &mut link, &mut sink).sent);
    assert!(!lp.step(60_001, &mut hw, &mut link, &mut sink).sent);
    assert!(!lp.step(62_000, &mut hw, &mut link, &mut sink).sent);
    assert_eq!(link.payloads().len(), 2);
}

// ── SET_INTERVAL ──────────────────────────────────────────────

#[test]
fn set_interval_in_range_is_acknowledged() {
    let (mut lp, mut hw, mut link, mut sink) = make_loop();
    link.push_inbound("SET_INTERVAL5000");

    let out = lp.step(10, &mut hw, &mut link, &mut sink);
    assert_eq!(out.command, Some(CommandOutcome::IntervalSet(5000)));
    assert_eq!(lp.interval_ms(), 5000);
    assert_eq!(link.outbound, vec!["ACK: Interval set to 5000".to_string()]);
    assert!(sink.events.contains(&AppEvent::IntervalChanged {
        from: 2000,
        to: 5000
    }));
}

#[test]
fn set_interval_boundaries_are_inclusive() {
    let (mut lp, mut hw, mut link, mut sink) = make_loop();
    link.push_inbound("SET_INTERVAL1000");
    link.push_inbound("SET_INTERVAL10000");

    lp.step(1, &mut hw, &mut link, &mut sink);
    assert_eq!(lp.interval_ms(), 1000);
    lp.step(2, &mut hw, &mut link, &mut sink);
    assert_eq!(lp.interval_ms(), 10_000);
    assert_eq!(
        link.take_outbound(),
        vec![
            "ACK: Interval set to 1000".to_string(),
            "ACK: Interval set to 10000".to_string(),
        ]
    );
}

#[test]
fn set_interval_out_of_range_is_rejected() {
    let (mut lp, mut hw, mut link, mut sink) = make_loop();
    for cmd in ["SET_INTERVAL500", "SET_INTERVAL99999", "SET_INTERVALabc"] {
        link.push_inbound(cmd);
        let out = lp.step(10, &mut hw, &mut link, &mut sink);
        assert!(matches!(
            out.command,
            Some(CommandOutcome::IntervalRejected(_))
        ));
        assert_eq!(lp.interval_ms(), 2000, "{cmd} must not change the interval");
    }
    assert_eq!(link.outbound, vec!["ERR: Invalid interval".to_string(); 3]);
    assert!(sink.events.contains(&AppEvent::IntervalRejected(500)));
    assert!(sink.events.contains(&AppEvent::IntervalRejected(99_999)));
    assert!(sink.events.contains(&AppEvent::IntervalRejected(0)));
}

#[test]
fn repeating_a_command_is_idempotent() {
    let (mut lp, mut hw, mut link, mut sink) = make_loop();
    link.push_inbound("SET_INTERVAL5000");
    link.push_inbound("SET_INTERVAL5000");

    lp.step(1, &mut hw, &mut link, &mut sink);
    lp.step(2, &mut hw, &mut link, &mut sink);

    assert_eq!(lp.interval_ms(), 5000);
    assert_eq!(
        link.outbound,
        vec!["ACK: Interval set to 5000".to_string(); 2]
    );
}

#[test]
fn unknown_lines_get_no_reply() {
    let (mut lp, mut hw, mut link, mut sink) = make_loop();
    for line in ["HELLO", "set_interval5000", "", "INTERVAL 5000"] {
        link.push_inbound(line);
        let out = lp.step(1, &mut hw, &mut link, &mut sink);
        assert_eq!(out.command, Some(CommandOutcome::Ignored));
    }
    assert!(link.outbound.is_empty());
    assert_eq!(lp.interval_ms(), 2000);
}

#[test]
fn one_command_per_iteration() {
    let (mut lp, mut hw, mut link, mut sink) = make_loop();
    link.push_inbound("SET_INTERVAL3000");
    link.push_inbound("SET_INTERVAL4000");

    lp.step(1, &mut hw, &mut link, &mut sink);
    assert_eq!(lp.interval_ms(), 3000);
    assert_eq!(link.inbound.len(), 1);

    lp.step(2, &mut hw, &mut link, &mut sink);
    assert_eq!(lp.interval_ms(), 4000);
}

#[test]
fn command_only_affects_later_iterations() {
    let (mut lp, mut hw, mut link, mut sink) = make_loop();
    assert!(lp.step(2001, &mut hw, &mut link, &mut sink).sent);
    link.take_outbound();

    // Due under the old interval; the new one applies from the next step.
    link.push_inbound("SET_INTERVAL5000");
    assert!(lp.step(4002, &mut hw, &mut link, &mut sink).sent);
    assert_eq!(
        link.take_outbound(),
        vec![FULL.to_string(), "ACK: Interval set to 5000".to_string()]
    );

    assert!(!lp.step(6003, &mut hw, &mut link, &mut sink).sent);
    assert!(!lp.step(9002, &mut hw, &mut link, &mut sink).sent);
    assert!(lp.step(9003, &mut hw, &mut link, &mut sink).sent);
}

// ── Link failures ─────────────────────────────────────────────

#[test]
fn failed_write_still_counts_as_a_send() {
    let (mut lp, mut hw, mut link, mut sink) = make_loop();
    link.disconnected = true;

    assert!(lp.step(2001, &mut hw, &mut link, &mut sink).sent);
    assert_eq!(lp.last_send_ms(), 2001);
    assert!(
        sink.events
            .contains(&AppEvent::LinkWriteFailed(CommsError::NotConnected))
    );
    assert_eq!(sink.sent_count(), 1);

    // Reconnecting does not trigger a catch-up send.
    link.disconnected = false;
    assert!(!lp.step(2500, &mut hw, &mut link, &mut sink).sent);
    assert!(link.outbound.is_empty());
}

// ── Payload ───────────────────────────────────────────────────

#[test]
fn reading_tracks_probe_each_iteration() {
    let (mut lp, mut hw, mut link, mut sink) = make_loop();

    hw.raw = 2048;
    let out = lp.step(1, &mut hw, &mut link, &mut sink);
    assert_eq!(out.reading.raw, 2048);
    assert_relative_eq!(out.reading.level_percent, 50.012_21, epsilon = 1e-3);
    assert_relative_eq!(out.reading.liters, out.reading.level_percent);

    hw.raw = 0;
    let out = lp.step(2, &mut hw, &mut link, &mut sink);
    assert_relative_eq!(out.reading.level_percent, 0.0);
}

#[test]
fn payloads_decode_on_the_receiving_side() {
    let (mut lp, mut hw, mut link, mut sink) = make_loop();
    let mut history = LevelHistory::new();

    for (i, raw) in [0u16, 1024, 2048, 4095].into_iter().enumerate() {
        hw.raw = raw;
        let now = 2001 * (i as u64 + 1);
        assert!(lp.step(now, &mut hw, &mut link, &mut sink).sent);
    }

    for line in link.payloads() {
        history.push_line(line).unwrap();
    }
    assert_eq!(history.len(), 4);
    assert_relative_eq!(history.min_level().unwrap(), 0.0);
    assert_relative_eq!(history.max_level().unwrap(), 100.0);
    assert_relative_eq!(history.latest().unwrap().liters, 100.0);
}
