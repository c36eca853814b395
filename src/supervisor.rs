//! Supervisor: boot sequence and the cooperative control loop.
//!
//! ```text
//!  SensorReader ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                   │        Supervisor         │
//!  Connectivity ◀──▶│ Booting ──▶ Running       │ ──▶ DisplayPort
//!                   │ Discovery · Telemetry     │
//!                   └──────────────────────────┘
//! ```
//!
//! Every fault that reaches the supervisor ends the run.  The caller
//! (the binary) logs it and restarts the chip; there is no in-place recovery.

use core::time::Duration;

use log::{error, info};

use crate::app::commands::AppCommand;
use crate::app::events::AppEvent;
use crate::app::ports::{AirQualityDriver, BrokerPort, Clock, DisplayPort, EventSink, NetworkPort};
use crate::config::{DeviceConfig, HUB_STATUS_TOPIC};
use crate::connectivity::{ConnectionState, ConnectivityManager};
use crate::discovery::{DiscoveryPublisher, METRICS, hub_status_handler};
use crate::error::FatalFault;
use crate::sensors::SensorReader;
use crate::telemetry::TelemetryPublisher;

/// Supervisor lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Booting,
    Running,
}

// ───────────────────────────────────────────────────────────────
// Supervisor
// ───────────────────────────────────────────────────────────────

pub struct Supervisor<D, N, B, S, E> {
    sensor: SensorReader<D>,
    connectivity: ConnectivityManager<N, B>,
    discovery: DiscoveryPublisher,
    telemetry: TelemetryPublisher,
    display: S,
    sink: E,
    phase: Phase,
    connect_timeout: Duration,
    sensor_retry_ms: u32,
    loop_delay_ms: u32,
}

impl<D, N, B, S, E> Supervisor<D, N, B, S, E>
where
    D: AirQualityDriver,
    N: NetworkPort,
    B: BrokerPort,
    S: DisplayPort,
    E: EventSink,
{
    pub fn new(driver: D, network: N, broker: B, display: S, sink: E, config: &DeviceConfig) -> Self {
        Self {
            sensor: SensorReader::new(driver),
            connectivity: ConnectivityManager::new(network, broker, config),
            discovery: DiscoveryPublisher::new(config),
            telemetry: TelemetryPublisher::new(config),
            display,
            sink,
            phase: Phase::Booting,
            connect_timeout: Duration::from_millis(u64::from(config.connect_timeout_ms)),
            sensor_retry_ms: config.connect_poll_ms,
            loop_delay_ms: config.loop_delay_ms,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn connectivity(&self) -> &ConnectivityManager<N, B> {
        &self.connectivity
    }

    pub fn display(&self) -> &S {
        &self.display
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    // ── Booting ───────────────────────────────────────────────

    /// Sensor, network, broker, discovery, display, in that order.
    ///
    /// The first failing step ends the boot; nothing after it runs.
    pub fn boot(&mut self, clock: &mut impl Clock) -> Result<(), FatalFault> {
        let result = self.boot_steps(clock);
        match result {
            Ok(()) => self.set_phase(Phase::Running),
            Err(fault) => self.sink.emit(&AppEvent::Fault(fault)),
        }
        result
    }

    fn boot_steps(&mut self, clock: &mut impl Clock) -> Result<(), FatalFault> {
        self.sink
            .emit(&AppEvent::Identity(self.connectivity.identity().clone()));

        self.sensor
            .begin(clock, self.connect_timeout, self.sensor_retry_ms)?;

        self.connectivity.connect_network(clock, self.connect_timeout)?;
        self.sink.emit(&AppEvent::NetworkConnected);

        self.connectivity.subscribe(HUB_STATUS_TOPIC, hub_status_handler);
        self.connectivity.connect_broker(clock, self.connect_timeout)?;
        self.sink.emit(&AppEvent::BrokerConnected);

        self.publish_discovery();

        self.display.init();
        Ok(())
    }

    // ── Running ───────────────────────────────────────────────

    /// One control loop iteration.
    pub fn tick(&mut self, clock: &mut impl Clock) -> Result<(), FatalFault> {
        let result = self.tick_steps(clock);
        if let Err(fault) = result {
            self.sink.emit(&AppEvent::Fault(fault));
        }
        result
    }

    fn tick_steps(&mut self, clock: &mut impl Clock) -> Result<(), FatalFault> {
        // 1. UI refresh
        self.display.handler();

        // 2. Link and broker maintenance
        let broker_before = self.connectivity.broker_state();
        let commands = self.connectivity.tick(clock)?;
        let broker_after = self.connectivity.broker_state();

        if self.connectivity.take_link_recovered() {
            self.sink.emit(&AppEvent::NetworkConnected);
        }
        match (broker_before, broker_after) {
            (ConnectionState::Connected, ConnectionState::Connected) => {}
            (ConnectionState::Connected, _) => self.sink.emit(&AppEvent::BrokerLost),
            (_, ConnectionState::Connected) => self.sink.emit(&AppEvent::BrokerConnected),
            _ => {}
        }

        // 3. Dispatched commands
        for cmd in commands {
            match cmd {
                AppCommand::RepublishDiscovery => {
                    info!("Hub online, re-announcing entities");
                    self.publish_discovery();
                }
            }
        }

        // 4. Telemetry
        let now = clock.now_ms();
        if let Some(report) = self.telemetry.tick(
            now,
            &mut self.sensor,
            &mut self.connectivity,
            &mut self.display,
        )? {
            self.sink.emit(&AppEvent::Telemetry {
                sample: report.sample,
                published: report.published,
            });
        }
        Ok(())
    }

    /// Boot, then tick until a fault.  `heartbeat` runs once per loop
    /// iteration (watchdog feed).
    ///
    /// Never returns normally: the fault that ended the run is returned
    /// exactly once and the caller is expected to restart.
    pub fn run(&mut self, clock: &mut impl Clock, heartbeat: &mut impl FnMut()) -> FatalFault {
        if let Err(fault) = self.boot(clock) {
            error!("Boot failed: {}", fault);
            return fault;
        }

        loop {
            heartbeat();
            if let Err(fault) = self.tick(clock) {
                error!("Run ended: {}", fault);
                return fault;
            }
            clock.delay_ms(self.loop_delay_ms);
        }
    }

    fn publish_discovery(&mut self) {
        let identity = self.connectivity.identity().clone();
        let accepted = self
            .discovery
            .publish_all(&identity, &METRICS, &mut self.connectivity);
        self.sink.emit(&AppEvent::DiscoveryPublished {
            accepted,
            total: METRICS.len(),
        });
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.phase;
        if from != to {
            self.phase = to;
            self.sink.emit(&AppEvent::PhaseChanged { from, to });
        }
    }
}
