//! Telemetry cadence, payload format and display updates.

use super::mock_hw::{DisplayCall, Rig};

use aqmonitor::app::events::AppEvent;
use aqmonitor::error::{FatalFault, SensorFault};

const STATUS_TOPIC: &str = "ESP32/AQM";

#[test]
fn first_tick_publishes_immediately() {
    let mut rig = Rig::booted();
    rig.tick().unwrap();
    assert_eq!(
        rig.broker.payloads_on(STATUS_TOPIC),
        vec![r#"{"State":"online","TVOC":120,"eCO2":650,"AQI":2}"#.to_string()]
    );
}

#[test]
fn publishes_once_per_interval() {
    let mut rig = Rig::booted();
    rig.tick().unwrap();

    for _ in 0..14 {
        rig.clock.advance(1_000);
        rig.tick().unwrap();
    }
    assert_eq!(rig.broker.payloads_on(STATUS_TOPIC).len(), 1);

    rig.clock.advance(1_000);
    rig.tick().unwrap();
    assert_eq!(rig.broker.payloads_on(STATUS_TOPIC).len(), 2);
}

#[test]
fn broker_down_still_samples_and_updates_display() {
    let mut rig = Rig::booted();
    {
        let mut b = rig.broker.state();
        b.connected = false;
        b.accept = false;
    }
    rig.tick().unwrap();

    assert!(rig.broker.payloads_on(STATUS_TOPIC).is_empty());
    assert_eq!(rig.sensor.state().polls, 1);
    assert_eq!(rig.sup.display().last_eco2_arrow(), Some(25));
    assert_eq!(
        rig.sup
            .sink()
            .count(|e| matches!(e, AppEvent::Telemetry { published: false, .. })),
        1
    );
}

#[test]
fn display_tracks_readings() {
    let mut rig = Rig::booted();
    rig.tick().unwrap();
    assert_eq!(rig.sup.display().last_eco2_arrow(), Some(25));
    assert_eq!(rig.sup.display().last_aqi_arrow(), Some(25));
    assert!(
        rig.sup
            .display()
            .calls
            .contains(&DisplayCall::Eco2Label("650".into()))
    );

    rig.sensor.set(5, 1600, 900);
    rig.clock.advance(15_000);
    rig.tick().unwrap();
    assert_eq!(rig.sup.display().last_eco2_arrow(), Some(-35));
    assert_eq!(rig.sup.display().last_aqi_arrow(), Some(-35));
}

#[test]
fn low_eco2_leaves_arrow_in_place() {
    let mut rig = Rig::booted();
    rig.tick().unwrap();

    rig.sensor.set(1, 350, 40);
    rig.clock.advance(15_000);
    rig.tick().unwrap();

    assert_eq!(rig.sup.display().last_eco2_arrow(), Some(25));
    assert!(
        rig.sup
            .display()
            .calls
            .contains(&DisplayCall::Eco2Label("350".into()))
    );
}

#[test]
fn zero_reading_is_fatal_and_not_published() {
    let mut rig = Rig::booted();
    rig.sensor.set(2, 650, 0);

    let fault = rig.tick().unwrap_err();
    assert!(matches!(
        fault,
        FatalFault::Sensor(SensorFault::ZeroReading { tvoc: 0, .. })
    ));
    assert!(rig.broker.payloads_on(STATUS_TOPIC).is_empty());
}

#[test]
fn invalid_sensor_status_ends_the_run() {
    let mut rig = Rig::new();
    rig.sensor.state().status = aqmonitor::app::ports::DeviceStatus::InvalidOutput;

    let mut beats = 0u32;
    let fault = rig.sup.run(&mut rig.clock, &mut || beats += 1);
    assert_eq!(fault, FatalFault::Sensor(SensorFault::InvalidOutput));
    assert_eq!(beats, 1);
}
