//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ConnectivityManager / SensorReader / Supervisor
//! ```
//!
//! Driven adapters (WiFi, MQTT client, ENS160, display, clock, event sinks)
//! implement these traits.  The domain core consumes them via generics, so
//! it never touches ESP-IDF directly and every component is testable with
//! mocks on the host.

use crate::error::{BrokerError, DriverError, NetworkError, PublishError};

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

// ───────────────────────────────────────────────────────────────
// Network link port
// ───────────────────────────────────────────────────────────────

/// Station-mode network link.
///
/// All calls are non-blocking; the
/// [`ConnectivityManager`](crate::connectivity::ConnectivityManager) owns the
/// waiting policy.
pub trait NetworkPort {
    /// Apply the static IP configuration (no-op for DHCP).
    fn configure(&mut self) -> Result<(), NetworkError>;

    /// Start association with the configured access point.
    fn begin(&mut self) -> Result<(), NetworkError>;

    /// Whether the link is associated and has an address.
    fn is_link_up(&self) -> bool;

    /// Drop the current association.
    fn disconnect(&mut self);

    /// Re-start association after [`disconnect`](Self::disconnect).
    fn reconnect(&mut self) -> Result<(), NetworkError>;

    /// Station MAC address (valid before the link is up).
    fn mac_address(&self) -> MacAddress;

    /// Current IPv4 address, if any.
    fn local_ip(&self) -> Option<core::net::Ipv4Addr>;
}

// ───────────────────────────────────────────────────────────────
// Broker client port
// ───────────────────────────────────────────────────────────────

/// Maximum topic length accepted for inbound messages.
pub const INBOUND_TOPIC_CAP: usize = 64;
/// Maximum payload length accepted for inbound messages.
pub const INBOUND_PAYLOAD_CAP: usize = 64;

/// A message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: heapless::String<INBOUND_TOPIC_CAP>,
    pub payload: heapless::Vec<u8, INBOUND_PAYLOAD_CAP>,
}

impl InboundMessage {
    /// Build a message, truncating anything past the fixed capacities.
    pub fn new(topic: &str, payload: &[u8]) -> Self {
        let mut t = heapless::String::new();
        for c in topic.chars() {
            if t.push(c).is_err() {
                break;
            }
        }
        let len = payload.len().min(INBOUND_PAYLOAD_CAP);
        let mut p = heapless::Vec::new();
        let _ = p.extend_from_slice(&payload[..len]);
        Self { topic: t, payload: p }
    }
}

/// MQTT client primitives.
pub trait BrokerPort {
    /// One handshake attempt.
    fn connect(&mut self, client_id: &str, username: &str, password: &str)
        -> Result<(), BrokerError>;

    /// Whether the client currently holds a broker session.
    fn is_connected(&self) -> bool;

    /// Fire-and-forget publish.
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError>;

    /// Subscribe to `topic`.
    fn subscribe(&mut self, topic: &str) -> Result<(), BrokerError>;

    /// Service keepalive and return the next pending inbound message.
    fn poll(&mut self) -> Option<InboundMessage>;
}

// ───────────────────────────────────────────────────────────────
// Publish port (what discovery and telemetry need from connectivity)
// ───────────────────────────────────────────────────────────────

/// Narrow publishing view of the connectivity layer.
pub trait PublishPort {
    /// Whether a publish would currently reach the broker.
    fn is_ready(&self) -> bool;

    /// Publish `payload` on `topic`; fails without side effects when not ready.
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError>;
}

// ───────────────────────────────────────────────────────────────
// Air quality sensor port
// ───────────────────────────────────────────────────────────────

/// Validity state reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Normal,
    WarmUp,
    InitialStartUp,
    InvalidOutput,
}

/// Air quality sensor driver (ENS160 semantics).
pub trait AirQualityDriver {
    /// Probe the device.
    fn begin(&mut self) -> Result<(), DriverError>;

    /// Switch to standard gas sensing mode.
    fn set_standard_mode(&mut self) -> Result<(), DriverError>;

    fn status(&mut self) -> Result<DeviceStatus, DriverError>;

    /// UBA air quality index (1–5).
    fn aqi(&mut self) -> Result<u16, DriverError>;

    /// Equivalent CO2 (ppm).
    fn eco2(&mut self) -> Result<u16, DriverError>;

    /// Total volatile organic compounds (ppb).
    fn tvoc(&mut self) -> Result<u16, DriverError>;
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

/// Widget-level interface to the UI toolkit.
pub trait DisplayPort {
    fn init(&mut self);

    /// Periodic toolkit handler (animations, flushing).
    fn handler(&mut self);

    fn set_aqi_arrow_y(&mut self, y: i16);
    fn set_eco2_arrow_y(&mut self, y: i16);
    fn set_aqi_label(&mut self, text: &str);
    fn set_eco2_label(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source plus a blocking delay.
pub trait Clock {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;

    /// Block the calling task for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
