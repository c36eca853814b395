//! Mock hardware adapters for integration tests.
//!
//! Network, broker and sensor mocks keep their state behind an
//! `Rc<RefCell<_>>` handle so a test can keep poking at them (drop the link,
//! inject a hub message) after the adapter has been moved into the
//! supervisor.  Everything is recorded so tests can assert on full call
//! histories.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use aqmonitor::app::events::AppEvent;
use aqmonitor::app::ports::{
    AirQualityDriver, BrokerPort, Clock, DeviceStatus, DisplayPort, EventSink, InboundMessage,
    MacAddress, NetworkPort,
};
use aqmonitor::config::DeviceConfig;
use aqmonitor::error::{BrokerError, DriverError, NetworkError};
use aqmonitor::supervisor::Supervisor;

pub const MOCK_MAC: MacAddress = [0x7C, 0xDF, 0xA1, 0x0B, 0x05, 0x30];
pub const MOCK_ID: &str = "7cdfa1b530";

// ── Network ───────────────────────────────────────────────────

#[derive(Debug)]
pub struct NetworkState {
    pub link_up: bool,
    /// Whether `begin()` / `reconnect()` bring the link up.
    pub associates: bool,
    pub configure_ok: bool,
    pub begins: u32,
    pub disconnects: u32,
    pub reconnects: u32,
}

#[derive(Clone)]
pub struct MockNetwork(pub Rc<RefCell<NetworkState>>);

impl MockNetwork {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(NetworkState {
            link_up: false,
            associates: true,
            configure_ok: true,
            begins: 0,
            disconnects: 0,
            reconnects: 0,
        })))
    }

    pub fn state(&self) -> std::cell::RefMut<'_, NetworkState> {
        self.0.borrow_mut()
    }
}

impl NetworkPort for MockNetwork {
    fn configure(&mut self) -> Result<(), NetworkError> {
        if self.0.borrow().configure_ok {
            Ok(())
        } else {
            Err(NetworkError::ConfigRejected)
        }
    }

    fn begin(&mut self) -> Result<(), NetworkError> {
        let mut s = self.0.borrow_mut();
        s.begins += 1;
        s.link_up = s.associates;
        Ok(())
    }

    fn is_link_up(&self) -> bool {
        self.0.borrow().link_up
    }

    fn disconnect(&mut self) {
        let mut s = self.0.borrow_mut();
        s.disconnects += 1;
        s.link_up = false;
    }

    fn reconnect(&mut self) -> Result<(), NetworkError> {
        let mut s = self.0.borrow_mut();
        s.reconnects += 1;
        s.link_up = s.associates;
        Ok(())
    }

    fn mac_address(&self) -> MacAddress {
        MOCK_MAC
    }

    fn local_ip(&self) -> Option<core::net::Ipv4Addr> {
        self.0
            .borrow()
            .link_up
            .then_some(core::net::Ipv4Addr::new(192, 168, 1, 60))
    }
}

// ── Broker ────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct BrokerState {
    pub connected: bool,
    pub accept: bool,
    pub attempts: u32,
    pub last_client_id: Option<String>,
    pub published: Vec<(String, Vec<u8>)>,
    pub subscribe_calls: Vec<String>,
    pub inbound: VecDeque<InboundMessage>,
}

#[derive(Clone)]
pub struct MockBroker(pub Rc<RefCell<BrokerState>>);

impl MockBroker {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(BrokerState {
            accept: true,
            ..BrokerState::default()
        })))
    }

    pub fn state(&self) -> std::cell::RefMut<'_, BrokerState> {
        self.0.borrow_mut()
    }

    pub fn inject(&self, topic: &str, payload: &[u8]) {
        self.0
            .borrow_mut()
            .inbound
            .push_back(InboundMessage::new(topic, payload));
    }

    /// Topics published so far, in order.
    pub fn topics(&self) -> Vec<String> {
        self.0.borrow().published.iter().map(|(t, _)| t.clone()).collect()
    }

    /// Publishes on topics under `homeassistant/`.
    pub fn discovery_publishes(&self) -> Vec<(String, String)> {
        self.0
            .borrow()
            .published
            .iter()
            .filter(|(t, _)| t.starts_with("homeassistant/"))
            .map(|(t, p)| (t.clone(), String::from_utf8(p.clone()).unwrap()))
            .collect()
    }

    /// Payloads published on `topic`.
    pub fn payloads_on(&self, topic: &str) -> Vec<String> {
        self.0
            .borrow()
            .published
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| String::from_utf8(p.clone()).unwrap())
            .collect()
    }
}

impl BrokerPort for MockBroker {
    fn connect(&mut self, client_id: &str, _username: &str, _password: &str) -> Result<(), BrokerError> {
        let mut s = self.0.borrow_mut();
        s.attempts += 1;
        s.last_client_id = Some(client_id.to_string());
        if s.accept {
            s.connected = true;
            Ok(())
        } else {
            Err(BrokerError::ConnectFailed)
        }
    }

    fn is_connected(&self) -> bool {
        self.0.borrow().connected
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        let mut s = self.0.borrow_mut();
        if !s.connected {
            return Err(BrokerError::NotConnected);
        }
        s.published.push((topic.to_string(), payload.to_vec()));
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), BrokerError> {
        self.0.borrow_mut().subscribe_calls.push(topic.to_string());
        Ok(())
    }

    fn poll(&mut self) -> Option<InboundMessage> {
        self.0.borrow_mut().inbound.pop_front()
    }
}

// ── Sensor ────────────────────────────────────────────────────

#[derive(Debug)]
pub struct SensorState {
    pub status: DeviceStatus,
    pub aqi: u16,
    pub eco2: u16,
    pub tvoc: u16,
    pub begin_failures: u32,
    pub bus_down: bool,
    pub polls: u32,
}

#[derive(Clone)]
pub struct MockDriver(pub Rc<RefCell<SensorState>>);

impl MockDriver {
    pub fn reading(aqi: u16, eco2: u16, tvoc: u16) -> Self {
        Self(Rc::new(RefCell::new(SensorState {
            status: DeviceStatus::Normal,
            aqi,
            eco2,
            tvoc,
            begin_failures: 0,
            bus_down: false,
            polls: 0,
        })))
    }

    pub fn state(&self) -> std::cell::RefMut<'_, SensorState> {
        self.0.borrow_mut()
    }

    pub fn set(&self, aqi: u16, eco2: u16, tvoc: u16) {
        let mut s = self.0.borrow_mut();
        s.aqi = aqi;
        s.eco2 = eco2;
        s.tvoc = tvoc;
    }
}

impl AirQualityDriver for MockDriver {
    fn begin(&mut self) -> Result<(), DriverError> {
        let mut s = self.0.borrow_mut();
        if s.begin_failures > 0 {
            s.begin_failures -= 1;
            return Err(DriverError::Bus);
        }
        Ok(())
    }

    fn set_standard_mode(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn status(&mut self) -> Result<DeviceStatus, DriverError> {
        let mut s = self.0.borrow_mut();
        s.polls += 1;
        if s.bus_down {
            return Err(DriverError::Bus);
        }
        Ok(s.status)
    }

    fn aqi(&mut self) -> Result<u16, DriverError> {
        Ok(self.0.borrow().aqi)
    }

    fn eco2(&mut self) -> Result<u16, DriverError> {
        Ok(self.0.borrow().eco2)
    }

    fn tvoc(&mut self) -> Result<u16, DriverError> {
        Ok(self.0.borrow().tvoc)
    }
}

// ── Display ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCall {
    Init,
    AqiArrow(i16),
    Eco2Arrow(i16),
    AqiLabel(String),
    Eco2Label(String),
}

#[derive(Default)]
pub struct MockDisplay {
    pub calls: Vec<DisplayCall>,
    pub handler_runs: u32,
}

impl MockDisplay {
    pub fn last_eco2_arrow(&self) -> Option<i16> {
        self.calls.iter().rev().find_map(|c| match c {
            DisplayCall::Eco2Arrow(y) => Some(*y),
            _ => None,
        })
    }

    pub fn last_aqi_arrow(&self) -> Option<i16> {
        self.calls.iter().rev().find_map(|c| match c {
            DisplayCall::AqiArrow(y) => Some(*y),
            _ => None,
        })
    }
}

impl DisplayPort for MockDisplay {
    fn init(&mut self) {
        self.calls.push(DisplayCall::Init);
    }

    fn handler(&mut self) {
        self.handler_runs += 1;
    }

    fn set_aqi_arrow_y(&mut self, y: i16) {
        self.calls.push(DisplayCall::AqiArrow(y));
    }

    fn set_eco2_arrow_y(&mut self, y: i16) {
        self.calls.push(DisplayCall::Eco2Arrow(y));
    }

    fn set_aqi_label(&mut self, text: &str) {
        self.calls.push(DisplayCall::AqiLabel(text.to_string()));
    }

    fn set_eco2_label(&mut self, text: &str) {
        self.calls.push(DisplayCall::Eco2Label(text.to_string()));
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// Manual clock: time only moves through `delay_ms` or `advance`.
#[derive(Default)]
pub struct MockClock {
    pub now: u64,
    pub delays: u32,
}

impl MockClock {
    pub fn advance(&mut self, ms: u64) {
        self.now += ms;
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays += 1;
        self.now += u64::from(ms);
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type TestSupervisor = Supervisor<MockDriver, MockNetwork, MockBroker, MockDisplay, RecordingSink>;

/// Supervisor wired to fresh mocks, plus handles to poke them.
pub struct Rig {
    pub sup: TestSupervisor,
    pub network: MockNetwork,
    pub broker: MockBroker,
    pub sensor: MockDriver,
    pub clock: MockClock,
    pub config: DeviceConfig,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_config(DeviceConfig::default())
    }

    pub fn with_config(config: DeviceConfig) -> Self {
        let network = MockNetwork::new();
        let broker = MockBroker::new();
        let sensor = MockDriver::reading(2, 650, 120);
        let sup = Supervisor::new(
            sensor.clone(),
            network.clone(),
            broker.clone(),
            MockDisplay::default(),
            RecordingSink::default(),
            &config,
        );
        Self {
            sup,
            network,
            broker,
            sensor,
            clock: MockClock::default(),
            config,
        }
    }

    /// Boot and assert success.
    pub fn booted() -> Self {
        let mut rig = Self::new();
        rig.sup.boot(&mut rig.clock).expect("boot");
        rig
    }

    pub fn tick(&mut self) -> Result<(), aqmonitor::error::FatalFault> {
        self.sup.tick(&mut self.clock)
    }
}
