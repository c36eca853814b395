//! Connectivity manager: network link and broker session lifecycle.
//!
//! ```text
//!   boot:   connect_network ──▶ connect_broker ──▶ (discovery)
//!   run:    tick ──▶ link down?   ──▶ reconnect (bounded wait, fatal on timeout)
//!                ──▶ broker down? ──▶ one attempt per backoff window
//!                ──▶ drain inbound ──▶ topic handlers ──▶ AppCommand
//! ```
//!
//! The broker is never given up on: the retry loop continues for as long as
//! the network stays up.  Only the network link carries a deadline.

use core::time::Duration;

use log::{error, info, warn};

use crate::app::commands::{AppCommand, InboundHandler};
use crate::app::ports::{BrokerPort, Clock, NetworkPort, PublishPort};
use crate::config::DeviceConfig;
use crate::error::{FatalFault, PublishError};
use crate::identity::DeviceIdentity;

/// Maximum number of registered topic handlers.
pub const MAX_SUBSCRIPTIONS: usize = 4;

/// Maximum inbound messages handled per tick.
pub const MAX_INBOUND_PER_TICK: usize = 4;

/// Commands produced by one tick.
pub type Commands = heapless::Vec<AppCommand, MAX_INBOUND_PER_TICK>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

pub struct ConnectivityManager<N, B> {
    network: N,
    broker: B,
    identity: DeviceIdentity,
    client_id: &'static str,
    username: &'static str,
    password: &'static str,
    network_state: ConnectionState,
    broker_state: ConnectionState,
    subscriptions: heapless::Vec<(&'static str, InboundHandler), MAX_SUBSCRIPTIONS>,
    poll_ms: u32,
    backoff_ms: u64,
    reconnect_timeout: Duration,
    next_broker_attempt_ms: Option<u64>,
    link_recovered: bool,
}

impl<N: NetworkPort, B: BrokerPort> ConnectivityManager<N, B> {
    pub fn new(network: N, broker: B, config: &DeviceConfig) -> Self {
        let identity = DeviceIdentity::from_mac(&network.mac_address());
        Self {
            network,
            broker,
            identity,
            client_id: config.abbreviation,
            username: config.broker_username,
            password: config.broker_password,
            network_state: ConnectionState::Disconnected,
            broker_state: ConnectionState::Disconnected,
            subscriptions: heapless::Vec::new(),
            poll_ms: config.connect_poll_ms,
            backoff_ms: u64::from(config.broker_retry_backoff_ms),
            reconnect_timeout: Duration::from_millis(u64::from(config.connect_timeout_ms)),
            next_broker_attempt_ms: None,
            link_recovered: false,
        }
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn network_state(&self) -> ConnectionState {
        self.network_state
    }

    pub fn broker_state(&self) -> ConnectionState {
        self.broker_state
    }

    /// True once after a tick brought a lost link back.
    pub fn take_link_recovered(&mut self) -> bool {
        core::mem::take(&mut self.link_recovered)
    }

    /// Register `handler` for `topic`.  The subscription is (re)issued on
    /// every successful broker connect; if the broker is already connected
    /// it is issued immediately.
    pub fn subscribe(&mut self, topic: &'static str, handler: InboundHandler) -> bool {
        if self.subscriptions.iter().any(|(t, _)| *t == topic) {
            return true;
        }
        if self.subscriptions.push((topic, handler)).is_err() {
            warn!("MQTT: subscription table full, dropping {}", topic);
            return false;
        }
        if self.broker_state == ConnectionState::Connected {
            if let Err(e) = self.broker.subscribe(topic) {
                warn!("MQTT: subscribe {} failed: {}", topic, e);
            }
        }
        true
    }

    // ── Boot-time connects ────────────────────────────────────────

    /// Bring the link up, blocking until it is associated or `timeout`
    /// elapses.
    pub fn connect_network(
        &mut self,
        clock: &mut impl Clock,
        timeout: Duration,
    ) -> Result<(), FatalFault> {
        if let Err(e) = self.network.configure() {
            error!("WiFi: static IP rejected: {}", e);
            return Err(FatalFault::NetworkConfig);
        }

        self.network_state = ConnectionState::Connecting;
        info!("WiFi: connecting");
        if let Err(e) = self.network.begin() {
            warn!("WiFi: begin failed: {}", e);
        }
        self.wait_for_link(clock, timeout)
    }

    /// Establish the broker session, retrying until it succeeds or `timeout`
    /// elapses.  Requires the link to be up.
    pub fn connect_broker(
        &mut self,
        clock: &mut impl Clock,
        timeout: Duration,
    ) -> Result<(), FatalFault> {
        if self.network_state != ConnectionState::Connected {
            error!("MQTT: connect requested without network");
            return Err(FatalFault::NetworkDown);
        }

        self.broker_state = ConnectionState::Connecting;
        let started = clock.now_ms();
        let timeout_ms = timeout.as_millis() as u64;
        info!("MQTT: connecting as {}", self.client_id);

        loop {
            if self.try_broker_connect() {
                return Ok(());
            }
            if clock.now_ms().saturating_sub(started) >= timeout_ms {
                error!("MQTT: no session after {} ms", timeout_ms);
                self.broker_state = ConnectionState::Disconnected;
                return Err(FatalFault::BrokerTimeout);
            }
            clock.delay_ms(self.poll_ms);
        }
    }

    // ── Runtime maintenance ───────────────────────────────────────

    /// One maintenance step, called every supervisor iteration.
    ///
    /// Never sleeps while the link is up: a down broker gets at most one
    /// connect attempt per backoff window.  A lost link is fatal if it does
    /// not return within the connect timeout.
    pub fn tick(&mut self, clock: &mut impl Clock) -> Result<Commands, FatalFault> {
        if !self.network.is_link_up() {
            self.recover_link(clock)?;
            self.link_recovered = true;
        }

        let now = clock.now_ms();
        if self.broker.is_connected() {
            if self.broker_state != ConnectionState::Connected {
                // The client re-established the session on its own.
                self.on_broker_connected();
            }
        } else {
            if self.broker_state == ConnectionState::Connected {
                warn!("MQTT: session lost");
                self.broker_state = ConnectionState::Disconnected;
                self.next_broker_attempt_ms = None;
            }
            let due = self.next_broker_attempt_ms.is_none_or(|at| now >= at);
            if due {
                self.broker_state = ConnectionState::Connecting;
                if !self.try_broker_connect() {
                    self.broker_state = ConnectionState::Disconnected;
                    self.next_broker_attempt_ms = Some(now + self.backoff_ms);
                }
            }
        }

        Ok(self.drain_inbound())
    }

    /// Disconnect, reconnect and wait for the link to return.
    fn recover_link(&mut self, clock: &mut impl Clock) -> Result<(), FatalFault> {
        warn!("WiFi: link lost, reconnecting");
        self.network_state = ConnectionState::Connecting;
        self.broker_state = ConnectionState::Disconnected;
        self.network.disconnect();
        if let Err(e) = self.network.reconnect() {
            warn!("WiFi: reconnect failed: {}", e);
        }
        self.wait_for_link(clock, self.reconnect_timeout)
    }

    fn wait_for_link(&mut self, clock: &mut impl Clock, timeout: Duration) -> Result<(), FatalFault> {
        let started = clock.now_ms();
        let timeout_ms = timeout.as_millis() as u64;
        while !self.network.is_link_up() {
            if clock.now_ms().saturating_sub(started) >= timeout_ms {
                error!("WiFi: no link after {} ms", timeout_ms);
                self.network_state = ConnectionState::Disconnected;
                return Err(FatalFault::NetworkTimeout);
            }
            clock.delay_ms(self.poll_ms);
        }
        self.network_state = ConnectionState::Connected;
        match self.network.local_ip() {
            Some(ip) => info!("WiFi: connected, IP {}", ip),
            None => info!("WiFi: connected"),
        }
        Ok(())
    }

    /// Single handshake attempt; on success re-subscribes everything.
    fn try_broker_connect(&mut self) -> bool {
        match self.broker.connect(self.client_id, self.username, self.password) {
            Ok(()) if self.broker.is_connected() => {
                self.on_broker_connected();
                true
            }
            Ok(()) => false,
            Err(e) => {
                warn!("MQTT: connect failed: {}", e);
                false
            }
        }
    }

    fn on_broker_connected(&mut self) {
        self.broker_state = ConnectionState::Connected;
        self.next_broker_attempt_ms = None;
        info!("MQTT: connected");
        for (topic, _) in &self.subscriptions {
            if let Err(e) = self.broker.subscribe(topic) {
                warn!("MQTT: subscribe {} failed: {}", topic, e);
            }
        }
    }

    fn drain_inbound(&mut self) -> Commands {
        let mut commands = Commands::new();
        for _ in 0..MAX_INBOUND_PER_TICK {
            let Some(msg) = self.broker.poll() else {
                break;
            };
            let handler = self
                .subscriptions
                .iter()
                .find(|(topic, _)| *topic == msg.topic.as_str())
                .map(|(_, h)| *h);
            let Some(handler) = handler else {
                continue;
            };
            if let Some(cmd) = handler(&msg.payload) {
                if !commands.contains(&cmd) {
                    // Capacity equals the drain bound.
                    let _ = commands.push(cmd);
                }
            }
        }
        commands
    }
}

impl<N: NetworkPort, B: BrokerPort> PublishPort for ConnectivityManager<N, B> {
    fn is_ready(&self) -> bool {
        self.broker_state == ConnectionState::Connected && self.broker.is_connected()
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        if !self.is_ready() {
            return Err(PublishError::NotConnected);
        }
        self.broker.publish(topic, payload)?;
        Ok(())
    }
}
