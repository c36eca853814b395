//! Boot ordering, phase transitions and the run loop contract.

use super::mock_hw::{DisplayCall, Rig};

use aqmonitor::app::events::AppEvent;
use aqmonitor::error::FatalFault;
use aqmonitor::supervisor::Phase;

#[test]
fn boot_reaches_running() {
    let rig = Rig::booted();
    assert_eq!(rig.sup.phase(), Phase::Running);
    assert_eq!(
        rig.sup.sink().count(|e| matches!(
            e,
            AppEvent::PhaseChanged { from: Phase::Booting, to: Phase::Running }
        )),
        1
    );
    assert_eq!(rig.sup.display().calls.first(), Some(&DisplayCall::Init));
}

#[test]
fn boot_emits_identity_first() {
    let rig = Rig::booted();
    match rig.sup.sink().events.first() {
        Some(AppEvent::Identity(id)) => assert_eq!(id.as_str(), super::mock_hw::MOCK_ID),
        other => panic!("expected identity event, got {other:?}"),
    }
}

#[test]
fn sensor_init_failure_stops_before_network() {
    let mut rig = Rig::new();
    rig.sensor.state().begin_failures = u32::MAX;

    assert_eq!(rig.sup.boot(&mut rig.clock), Err(FatalFault::SensorInit));
    assert_eq!(rig.network.state().begins, 0);
    assert_eq!(rig.sup.phase(), Phase::Booting);
    assert!(rig.sup.display().calls.is_empty(), "display not initialised");
}

#[test]
fn slow_sensor_start_is_tolerated() {
    let mut rig = Rig::new();
    rig.sensor.state().begin_failures = 20;

    rig.sup.boot(&mut rig.clock).unwrap();
    assert_eq!(rig.clock.now, 200, "retried every 10 ms");
}

#[test]
fn tick_services_display_before_telemetry() {
    let mut rig = Rig::booted();
    rig.tick().unwrap();
    rig.tick().unwrap();
    assert_eq!(rig.sup.display().handler_runs, 2);
}

#[test]
fn run_returns_fault_once_and_feeds_heartbeat_every_iteration() {
    let mut rig = Rig::new();
    let sensor = rig.sensor.clone();

    // Let the loop spin a while, then break the sensor.
    let mut beats = 0u32;
    let fault = rig.sup.run(&mut rig.clock, &mut || {
        beats += 1;
        if beats == 50 {
            sensor.set(0, 0, 0);
        }
    });

    assert!(matches!(fault, FatalFault::Sensor(_)));
    assert!(beats >= 50);
    assert_eq!(rig.sup.sink().count(|e| matches!(e, AppEvent::Fault(_))), 1);
    // 1 ms between iterations.
    assert!(rig.clock.delays >= 49);
}
