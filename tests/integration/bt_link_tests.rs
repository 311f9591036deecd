//! Integration tests for the host simulation of the Bluetooth serial
//! adapter driven by the real SensorLoop and hardware adapter.

use crate::mock_hw::RecordingSink;

use watersensor::adapters::bt_serial::{BtSerialAdapter, LinkState};
use watersensor::adapters::hardware::HardwareAdapter;
use watersensor::app::commands::CommandOutcome;
use watersensor::app::service::SensorLoop;
use watersensor::config::RuntimeConfig;
use watersensor::pins;
use watersensor::sensors::water_level::{WaterLevelSensor, sim_set_level_adc};

fn make_rig() -> (SensorLoop, HardwareAdapter, BtSerialAdapter, RecordingSink) {
    let mut lp = SensorLoop::new(RuntimeConfig::default());
    let mut link = BtSerialAdapter::new();
    let mut sink = RecordingSink::new();
    lp.start(&mut link, &mut sink).unwrap();
    let hw = HardwareAdapter::new(WaterLevelSensor::new(pins::SENSOR_ADC_GPIO));
    (lp, hw, link, sink)
}

#[test]
fn link_state_follows_client() {
    let (_lp, _hw, mut link, _sink) = make_rig();
    assert_eq!(link.state(), LinkState::Advertising);
    link.sim_connect();
    assert_eq!(link.state(), LinkState::Connected);
    link.sim_disconnect();
    assert_eq!(link.state(), LinkState::Advertising);
}

#[test]
fn probe_value_reaches_the_phone() {
    let (mut lp, mut hw, mut link, mut sink) = make_rig();
    link.sim_connect();

    // Only this test touches the simulated ADC.
    sim_set_level_adc(4095);
    assert!(lp.step(2001, &mut hw, &mut link, &mut sink).sent);
    assert_eq!(
        link.sim_take_outbound(),
        vec![r#"{"level": 100.00, "liters": 100.0}"#.to_string()]
    );
    assert_eq!(hw.water_level().total_reads(), 1);
}

#[test]
fn split_command_is_applied_once_complete() {
    let (mut lp, mut hw, mut link, mut sink) = make_rig();
    link.sim_connect();

    link.sim_push_inbound(b"SET_INTER");
    let out = lp.step(1, &mut hw, &mut link, &mut sink);
    assert_eq!(out.command, None, "partial line stays buffered");

    link.sim_push_inbound(b"VAL7000\r\n");
    let out = lp.step(2, &mut hw, &mut link, &mut sink);
    assert_eq!(out.command, Some(CommandOutcome::IntervalSet(7000)));
    assert_eq!(
        link.sim_take_outbound(),
        vec!["ACK: Interval set to 7000".to_string()]
    );
}

#[test]
fn replies_are_dropped_while_disconnected() {
    let (mut lp, mut hw, mut link, mut sink) = make_rig();

    link.sim_push_inbound(b"SET_INTERVAL3000\n");
    let out = lp.step(1, &mut hw, &mut link, &mut sink);

    // The command still applies; only the reply is lost.
    assert_eq!(out.command, Some(CommandOutcome::IntervalSet(3000)));
    assert_eq!(lp.interval_ms(), 3000);
    assert!(link.sim_take_outbound().is_empty());
}

#[test]
fn disconnect_discards_pending_input() {
    let (mut lp, mut hw, mut link, mut sink) = make_rig();
    link.sim_connect();
    link.sim_push_inbound(b"SET_INTERVAL3000\n");
    link.sim_disconnect();
    link.sim_connect();

    let out = lp.step(1, &mut hw, &mut link, &mut sink);
    assert_eq!(out.command, None);
    assert_eq!(lp.interval_ms(), 2000);
}

#[test]
fn unterminated_command_applies_after_sender_goes_quiet() {
    let (mut lp, mut hw, mut link, mut sink) = make_rig();
    link.sim_connect();

    link.sim_push_inbound(b"SET_INTERVAL5000");
    for now in (100..1000).step_by(100) {
        assert_eq!(lp.step(now, &mut hw, &mut link, &mut sink).command, None);
    }
    assert_eq!(lp.interval_ms(), 2000);

    let out = lp.step(1500, &mut hw, &mut link, &mut sink);
    assert_eq!(out.command, Some(CommandOutcome::IntervalSet(5000)));

    // The following command is not merged into the flushed one.
    link.sim_push_inbound(b"SET_INTERVAL3000\n");
    let out = lp.step(1501, &mut hw, &mut link, &mut sink);
    assert_eq!(out.command, Some(CommandOutcome::IntervalSet(3000)));
    assert_eq!(lp.interval_ms(), 3000);
    assert_eq!(
        link.sim_take_outbound(),
        vec![
            "ACK: Interval set to 5000".to_string(),
            "ACK: Interval set to 3000".to_string(),
        ]
    );
}
