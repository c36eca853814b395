//! Unified error types for the air quality monitor firmware.
//!
//! Three classes of failure exist and each has its own home here:
//!
//! | Class          | Type            | Recovery                          |
//! |----------------|-----------------|-----------------------------------|
//! | Fatal          | [`FatalFault`]  | full device restart               |
//! | Transient      | (none)          | broker retried forever, no error  |
//! | Silent         | [`PublishError`]| caller may ignore, retriggered    |
//!
//! All variants are `Copy` so they can be passed through the supervisor
//! and event sink without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Fatal faults
// ---------------------------------------------------------------------------

/// A fault whose only recovery is a full device restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalFault {
    /// The static IP configuration was rejected by the network stack.
    NetworkConfig,
    /// The network link did not come up within the connect timeout.
    NetworkTimeout,
    /// A broker connection was requested while the network link was down.
    NetworkDown,
    /// The broker handshake did not succeed within the connect timeout.
    BrokerTimeout,
    /// The sensor never answered `begin()` within the connect timeout.
    SensorInit,
    /// A running poll of the sensor failed.
    Sensor(SensorFault),
}

impl fmt::Display for FatalFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkConfig => write!(f, "network configuration rejected"),
            Self::NetworkTimeout => write!(f, "network connect timed out"),
            Self::NetworkDown => write!(f, "broker connect attempted without network"),
            Self::BrokerTimeout => write!(f, "broker connect timed out"),
            Self::SensorInit => write!(f, "sensor did not start"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
        }
    }
}

impl From<SensorFault> for FatalFault {
    fn from(e: SensorFault) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor faults
// ---------------------------------------------------------------------------

/// Why a sensor poll produced no usable sample.
///
/// Bus faults and invalid readings share the same recovery (restart); the
/// distinction exists only for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFault {
    /// The I2C transaction failed.
    Bus,
    /// The device reports its output as invalid.
    InvalidOutput,
    /// At least one of the readings was zero.
    ZeroReading { aqi: u16, eco2: u16, tvoc: u16 },
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "bus error"),
            Self::InvalidOutput => write!(f, "device reports invalid output"),
            Self::ZeroReading { aqi, eco2, tvoc } => {
                write!(f, "zero reading (AQI={aqi} eCO2={eco2} TVOC={tvoc})")
            }
        }
    }
}

impl From<DriverError> for SensorFault {
    fn from(_: DriverError) -> Self {
        Self::Bus
    }
}

// ---------------------------------------------------------------------------
// Driver errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// The underlying bus reported an error.
    Bus,
    /// The device answered with an unexpected part id.
    UnknownDevice(u16),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "I2C bus error"),
            Self::UnknownDevice(id) => write!(f, "unexpected part id 0x{id:04X}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    /// SSID or password does not fit the driver's limits.
    InvalidCredentials,
    /// Static IP settings were rejected.
    ConfigRejected,
    /// The driver refused to start or reconnect.
    DriverFailed,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid WiFi credentials"),
            Self::ConfigRejected => write!(f, "IP configuration rejected"),
            Self::DriverFailed => write!(f, "WiFi driver failure"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerError {
    /// The handshake did not complete.
    ConnectFailed,
    /// The client is not connected.
    NotConnected,
    /// The client refused to enqueue the message.
    Rejected,
}

impl fmt::Display for BrokerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed => write!(f, "MQTT connect failed"),
            Self::NotConnected => write!(f, "MQTT not connected"),
            Self::Rejected => write!(f, "MQTT client rejected message"),
        }
    }
}

/// Outcome of a fire-and-forget publish.
///
/// Callers are allowed to drop this: discovery is re-sent whenever the hub
/// comes back online and telemetry is re-sent on the next interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishError {
    /// Broker state is not Connected; nothing was sent.
    NotConnected,
    /// The payload exceeds the maximum packet size.
    TooLarge(usize),
    /// The payload could not be serialised.
    Encode,
    /// The broker client refused the message.
    Broker(BrokerError),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "broker not connected"),
            Self::TooLarge(len) => write!(f, "payload too large ({len} bytes)"),
            Self::Encode => write!(f, "payload encoding failed"),
            Self::Broker(e) => write!(f, "{e}"),
        }
    }
}

impl From<BrokerError> for PublishError {
    fn from(e: BrokerError) -> Self {
        Self::Broker(e)
    }
}
