//! Device configuration parameters
//!
//! Everything is compiled in: there is no persistent configuration store.
//! Credentials come from the build environment so they never live in the
//! source tree:
//!
//! | Variable            | Field              |
//! |---------------------|--------------------|
//! | `AQM_WIFI_SSID`     | `wifi_ssid`        |
//! | `AQM_WIFI_PASSWORD` | `wifi_password`    |
//! | `AQM_MQTT_HOST`     | `broker_host`      |
//! | `AQM_MQTT_USER`     | `broker_username`  |
//! | `AQM_MQTT_PASSWORD` | `broker_password`  |

use core::fmt::{self, Write};

use serde::Serialize;

/// Topic Home Assistant uses to announce its own availability.
pub const HUB_STATUS_TOPIC: &str = "homeassistant/status";

/// Prefix of every discovery topic.
pub const DISCOVERY_PREFIX: &str = "homeassistant";

/// Node id segment shared by the status and discovery topics.
pub const NODE_ID: &str = "ESP32";

/// Fixed-capacity topic string.
pub type Topic = heapless::String<96>;

/// Static IPv4 settings applied before the link is started.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StaticIp {
    pub address: [u8; 4],
    pub gateway: [u8; 4],
    /// Subnet prefix length (16 = 255.255.0.0).
    pub prefix_len: u8,
}

/// Core device configuration
#[derive(Debug, Clone, Serialize)]
pub struct DeviceConfig {
    // --- Network ---
    pub wifi_ssid: &'static str,
    #[serde(skip)]
    pub wifi_password: &'static str,
    /// `None` falls back to DHCP.
    pub static_ip: Option<StaticIp>,

    // --- Broker ---
    pub broker_host: &'static str,
    pub broker_port: u16,
    pub broker_username: &'static str,
    #[serde(skip)]
    pub broker_password: &'static str,
    /// Largest MQTT packet the client is configured for (bytes).
    pub max_packet_size: usize,

    // --- Device description (discovery device block) ---
    pub device_name: &'static str,
    pub device_model: &'static str,
    pub sw_version: &'static str,
    pub manufacturer: &'static str,
    /// Short id used for the MQTT client id and every topic.
    pub abbreviation: &'static str,

    // --- Sensor ---
    /// 7-bit I2C address of the ENS160.
    pub sensor_i2c_address: u8,

    // --- Timing ---
    /// Boot-time connect timeout for sensor, network and broker (ms).
    pub connect_timeout_ms: u32,
    /// Poll period inside the boot-time busy waits (ms).
    pub connect_poll_ms: u32,
    /// Fixed backoff between broker reconnect attempts (ms).
    pub broker_retry_backoff_ms: u32,
    /// Telemetry publish interval (ms).
    pub telemetry_interval_ms: u32,
    /// Delay between supervisor ticks (ms).
    pub loop_delay_ms: u32,
    /// Task watchdog timeout (seconds).
    pub watchdog_timeout_secs: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            // Network
            wifi_ssid: option_env!("AQM_WIFI_SSID").unwrap_or(""),
            wifi_password: option_env!("AQM_WIFI_PASSWORD").unwrap_or(""),
            static_ip: Some(StaticIp {
                address: [192, 168, 1, 60],
                gateway: [192, 168, 1, 1],
                prefix_len: 16,
            }),

            // Broker
            broker_host: option_env!("AQM_MQTT_HOST").unwrap_or("192.168.1.2"),
            broker_port: 1883,
            broker_username: option_env!("AQM_MQTT_USER").unwrap_or(""),
            broker_password: option_env!("AQM_MQTT_PASSWORD").unwrap_or(""),
            max_packet_size: 600, // discovery descriptors do not fit the 256 B default

            // Device
            device_name: "Air Quality Monitor",
            device_model: "ESP32-S2",
            sw_version: "1.0",
            manufacturer: "Diggs",
            abbreviation: "AQM",

            // Sensor
            sensor_i2c_address: 0x53,

            // Timing
            connect_timeout_ms: 10_000,
            connect_poll_ms: 10,
            broker_retry_backoff_ms: 1_000,
            telemetry_interval_ms: 15_000,
            loop_delay_ms: 1,
            watchdog_timeout_secs: 30,
        }
    }
}

/// A configuration value failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigError(pub &'static str);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid config: {}", self.0)
    }
}

impl DeviceConfig {
    /// Reject values that would leave the device unable to boot or that
    /// break the timing invariants of the supervisor loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.abbreviation.is_empty() || self.abbreviation.contains(['/', '+', '#']) {
            return Err(ConfigError("abbreviation must be a non-empty topic segment"));
        }
        if self.broker_host.is_empty() {
            return Err(ConfigError("broker host is empty"));
        }
        if self.connect_timeout_ms == 0 || self.connect_poll_ms == 0 {
            return Err(ConfigError("connect timeout and poll period must be non-zero"));
        }
        if self.connect_poll_ms >= self.connect_timeout_ms {
            return Err(ConfigError("connect poll period must be shorter than the timeout"));
        }
        if self.telemetry_interval_ms == 0 {
            return Err(ConfigError("telemetry interval must be non-zero"));
        }
        if self.watchdog_timeout_secs.saturating_mul(1000) <= self.connect_timeout_ms {
            return Err(ConfigError("watchdog must outlast the longest blocking connect"));
        }
        if let Some(ip) = self.static_ip {
            if ip.prefix_len == 0 || ip.prefix_len > 32 {
                return Err(ConfigError("subnet prefix must be 1..=32"));
            }
        }
        Ok(())
    }

    /// Topic carrying the JSON status record: `ESP32/<abbrev>`.
    pub fn status_topic(&self) -> Topic {
        let mut topic = Topic::new();
        let _ = write!(topic, "{}/{}", NODE_ID, self.abbreviation);
        topic
    }

    /// URL handed to the MQTT client.
    pub fn broker_url(&self) -> heapless::String<64> {
        let mut url = heapless::String::new();
        let _ = write!(url, "mqtt://{}:{}", self.broker_host, self.broker_port);
        url
    }
}
