//! Link and broker lifecycle through the supervisor.

use super::mock_hw::{MOCK_ID, Rig};

use aqmonitor::app::events::AppEvent;
use aqmonitor::connectivity::ConnectionState;
use aqmonitor::error::FatalFault;

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_network_timeout_is_single_fault_without_publishes() {
    let mut rig = Rig::new();
    rig.network.state().associates = false;

    let mut beats = 0;
    let fault = rig.sup.run(&mut rig.clock, &mut || beats += 1);

    assert_eq!(fault, FatalFault::NetworkTimeout);
    assert!(rig.clock.now >= u64::from(rig.config.connect_timeout_ms));
    assert!(rig.broker.topics().is_empty(), "nothing may be published");
    assert_eq!(rig.broker.state().attempts, 0, "broker never attempted");
    assert_eq!(beats, 0, "loop never entered");
    assert_eq!(
        rig.sup.sink().count(|e| matches!(e, AppEvent::Fault(_))),
        1
    );
}

#[test]
fn rejected_static_ip_is_fatal() {
    let mut rig = Rig::new();
    rig.network.state().configure_ok = false;
    assert_eq!(rig.sup.boot(&mut rig.clock), Err(FatalFault::NetworkConfig));
    assert_eq!(rig.network.state().begins, 0);
}

#[test]
fn boot_broker_timeout_is_fatal() {
    let mut rig = Rig::new();
    rig.broker.state().accept = false;
    assert_eq!(rig.sup.boot(&mut rig.clock), Err(FatalFault::BrokerTimeout));
    assert!(rig.broker.state().attempts > 1, "broker retried during boot");
    assert!(rig.broker.topics().is_empty());
}

#[test]
fn boot_uses_abbreviation_as_client_id() {
    let rig = Rig::booted();
    assert_eq!(rig.broker.state().last_client_id.as_deref(), Some("AQM"));
    assert_eq!(rig.sup.connectivity().identity().as_str(), MOCK_ID);
    assert_eq!(
        rig.broker.state().subscribe_calls,
        vec!["homeassistant/status".to_string()]
    );
}

// ── Broker loss ───────────────────────────────────────────────

#[test]
fn broker_down_tick_never_sleeps_past_backoff() {
    let mut rig = Rig::booted();
    rig.tick().unwrap();

    {
        let mut b = rig.broker.state();
        b.connected = false;
        b.accept = false;
    }
    let attempts_before = rig.broker.state().attempts;
    let before = rig.clock.now;

    rig.tick().unwrap();
    assert_eq!(rig.clock.now, before, "tick must not block on the broker");
    assert_eq!(rig.broker.state().attempts, attempts_before + 1);

    // Inside the backoff window: no new attempt.
    rig.clock.advance(999);
    rig.tick().unwrap();
    assert_eq!(rig.broker.state().attempts, attempts_before + 1);

    rig.clock.advance(1);
    rig.tick().unwrap();
    assert_eq!(rig.broker.state().attempts, attempts_before + 2);
}

#[test]
fn broker_loss_is_retried_forever_and_resubscribes() {
    let mut rig = Rig::booted();
    {
        let mut b = rig.broker.state();
        b.connected = false;
        b.accept = false;
    }

    // An hour of failed attempts: never fatal.
    for _ in 0..3_600 {
        rig.tick().unwrap();
        rig.clock.advance(1_000);
    }
    assert_eq!(rig.sup.connectivity().broker_state(), ConnectionState::Disconnected);
    assert_eq!(rig.sup.sink().count(|e| matches!(e, AppEvent::BrokerLost)), 1);

    rig.broker.state().accept = true;
    rig.tick().unwrap();

    assert_eq!(rig.sup.connectivity().broker_state(), ConnectionState::Connected);
    let subs = rig.broker.state().subscribe_calls.clone();
    assert_eq!(subs.len(), 2);
    assert!(subs.iter().all(|t| t == "homeassistant/status"));
    // Boot plus reconnect.
    assert_eq!(rig.sup.sink().count(|e| matches!(e, AppEvent::BrokerConnected)), 2);
}

// ── Link loss ─────────────────────────────────────────────────

#[test]
fn link_loss_recovers_within_timeout() {
    let mut rig = Rig::booted();
    rig.network.state().link_up = false;

    let connected = |rig: &Rig| {
        rig.sup
            .sink()
            .count(|e| matches!(e, AppEvent::NetworkConnected))
    };
    let before = connected(&rig);

    rig.tick().unwrap();

    {
        let n = rig.network.state();
        assert_eq!(n.disconnects, 1);
        assert_eq!(n.reconnects, 1);
        assert!(n.link_up);
    }
    assert_eq!(connected(&rig), before + 1);

    rig.tick().unwrap();
    assert_eq!(connected(&rig), before + 1, "reported once per recovery");
}

#[test]
fn link_loss_without_recovery_is_fatal() {
    let mut rig = Rig::booted();
    {
        let mut n = rig.network.state();
        n.link_up = false;
        n.associates = false;
    }
    let start = rig.clock.now;

    assert_eq!(rig.tick(), Err(FatalFault::NetworkTimeout));
    let waited = rig.clock.now - start;
    let timeout = u64::from(rig.config.connect_timeout_ms);
    assert!(waited >= timeout);
    assert!(waited < timeout + u64::from(rig.config.connect_poll_ms) * 2);
}
