//! MQTT client adapter.
//!
//! Implements [`BrokerPort`] over the ESP-IDF MQTT client.
//!
//! The ESP-IDF client runs in its own task and reconnects on its own.  Its
//! event callback only touches two things owned by this adapter: an atomic
//! connection flag and a bounded inbound queue.  The control loop reads both
//! through [`BrokerPort::is_connected`] and [`BrokerPort::poll`].
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`.
//! - **all other targets**: in-memory loopback for host runs.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};

use crate::app::ports::{BrokerPort, InboundMessage};
use crate::config::DeviceConfig;
use crate::error::BrokerError;

/// Inbound messages buffered between two control loop iterations.
pub const INBOUND_QUEUE_DEPTH: usize = 8;

type InboundQueue = heapless::Deque<InboundMessage, INBOUND_QUEUE_DEPTH>;

/// State shared with the client task.
struct Shared {
    connected: AtomicBool,
    inbound: Mutex<InboundQueue>,
}

impl Shared {
    fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            inbound: Mutex::new(InboundQueue::new()),
        }
    }

    fn push(&self, topic: &str, payload: &[u8]) {
        let Ok(mut q) = self.inbound.lock() else {
            return;
        };
        if q.push_back(InboundMessage::new(topic, payload)).is_err() {
            warn!("MQTT: inbound queue full, dropping message on {}", topic);
        }
    }

    fn pop(&self) -> Option<InboundMessage> {
        self.inbound.lock().ok()?.pop_front()
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod platform {
    use super::*;

    use std::sync::Arc;

    use esp_idf_svc::mqtt::client::{
        EspMqttClient, EventPayload, MqttClientConfiguration, QoS,
    };

    pub struct MqttAdapter {
        url: heapless::String<64>,
        buffer_size: usize,
        client: Option<EspMqttClient<'static>>,
        shared: Arc<Shared>,
    }

    impl MqttAdapter {
        pub fn new(config: &DeviceConfig) -> Self {
            Self {
                url: config.broker_url(),
                buffer_size: config.max_packet_size,
                client: None,
                shared: Arc::new(Shared::new()),
            }
        }
    }

    impl BrokerPort for MqttAdapter {
        /// The first call creates the client; the ESP-IDF client then keeps
        /// (re)connecting by itself and later calls only report.
        fn connect(
            &mut self,
            client_id: &str,
            username: &str,
            password: &str,
        ) -> Result<(), BrokerError> {
            if self.client.is_some() {
                return Ok(());
            }

            let conf = MqttClientConfiguration {
                client_id: Some(client_id),
                username: (!username.is_empty()).then_some(username),
                password: (!password.is_empty()).then_some(password),
                buffer_size: self.buffer_size,
                out_buffer_size: self.buffer_size,
                ..Default::default()
            };

            let shared = Arc::clone(&self.shared);
            let client = EspMqttClient::new_cb(&self.url, &conf, move |event| {
                match event.payload() {
                    EventPayload::Connected(_) => shared.connected.store(true, Ordering::Release),
                    EventPayload::Disconnected => shared.connected.store(false, Ordering::Release),
                    EventPayload::Received {
                        topic: Some(topic),
                        data,
                        ..
                    } => shared.push(topic, data),
                    EventPayload::Error(e) => debug!("MQTT: client error {:?}", e),
                    _ => {}
                }
            })
            .map_err(|e| {
                warn!("MQTT: client init failed: {}", e);
                BrokerError::ConnectFailed
            })?;

            self.client = Some(client);
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.shared.connected.load(Ordering::Acquire)
        }

        fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
            let client = self.client.as_mut().ok_or(BrokerError::NotConnected)?;
            client
                .enqueue(topic, QoS::AtMostOnce, false, payload)
                .map(|_| ())
                .map_err(|_| BrokerError::Rejected)
        }

        fn subscribe(&mut self, topic: &str) -> Result<(), BrokerError> {
            let client = self.client.as_mut().ok_or(BrokerError::NotConnected)?;
            client
                .subscribe(topic, QoS::AtMostOnce)
                .map(|_| ())
                .map_err(|_| BrokerError::Rejected)
        }

        fn poll(&mut self) -> Option<InboundMessage> {
            self.shared.pop()
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod platform {
    use super::*;

    use log::info;

    /// Loopback broker: accepts every connect and logs what would be sent.
    pub struct MqttAdapter {
        url: heapless::String<64>,
        shared: Shared,
        subscriptions: heapless::Vec<heapless::String<64>, 4>,
        published: u32,
    }

    impl MqttAdapter {
        pub fn new(config: &DeviceConfig) -> Self {
            Self {
                url: config.broker_url(),
                shared: Shared::new(),
                subscriptions: heapless::Vec::new(),
                published: 0,
            }
        }

        /// Simulation hook: deliver a message as if the broker sent it.
        pub fn sim_inject(&mut self, topic: &str, payload: &[u8]) {
            if self.subscriptions.iter().any(|t| t.as_str() == topic) {
                self.shared.push(topic, payload);
            }
        }

        /// Simulation hook: drop the session.
        pub fn sim_drop_session(&mut self) {
            self.shared.connected.store(false, Ordering::Release);
        }

        pub fn published(&self) -> u32 {
            self.published
        }
    }

    impl BrokerPort for MqttAdapter {
        fn connect(
            &mut self,
            client_id: &str,
            _username: &str,
            _password: &str,
        ) -> Result<(), BrokerError> {
            self.shared.connected.store(true, Ordering::Release);
            info!("MQTT(sim): {} connected to {}", client_id, self.url);
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.shared.connected.load(Ordering::Acquire)
        }

        fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
            if !self.is_connected() {
                return Err(BrokerError::NotConnected);
            }
            self.published += 1;
            debug!(
                "MQTT(sim): {} <- {}",
                topic,
                core::str::from_utf8(payload).unwrap_or("<binary>")
            );
            Ok(())
        }

        fn subscribe(&mut self, topic: &str) -> Result<(), BrokerError> {
            if !self.is_connected() {
                return Err(BrokerError::NotConnected);
            }
            if self.subscriptions.iter().any(|t| t.as_str() == topic) {
                return Ok(());
            }
            let mut t = heapless::String::new();
            t.push_str(topic).map_err(|_| BrokerError::Rejected)?;
            self.subscriptions.push(t).map_err(|_| BrokerError::Rejected)
        }

        fn poll(&mut self) -> Option<InboundMessage> {
            self.shared.pop()
        }
    }
}

pub use platform::MqttAdapter;
