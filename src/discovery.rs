//! Home Assistant MQTT discovery.
//!
//! One config message per metric announces the entity to the
//! hub.  The whole set is re-sent on every hub restart (`online` on
//! [`HUB_STATUS_TOPIC`](crate::config::HUB_STATUS_TOPIC)), so publishing it
//! twice is always harmless.

use core::fmt::Write;

use log::{debug, warn};
use serde::Serialize;

use crate::app::commands::AppCommand;
use crate::app::ports::PublishPort;
use crate::config::{DISCOVERY_PREFIX, DeviceConfig, NODE_ID, Topic};
use crate::error::PublishError;
use crate::identity::DeviceIdentity;

/// Seconds after which the hub marks a metric unavailable without updates.
pub const EXPIRE_AFTER_SECS: u16 = 20;

/// Home Assistant entity platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Sensor,
    BinarySensor,
}

impl Component {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sensor => "sensor",
            Self::BinarySensor => "binary_sensor",
        }
    }
}

/// Static description of one published metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: &'static str,
    pub component: Component,
    pub unique_id_suffix: &'static str,
    pub device_class: &'static str,
    pub unit: Option<&'static str>,
    /// Key of the value inside the status record.
    pub value_field: &'static str,
    pub expire_after_secs: u16,
    pub entity_category: Option<&'static str>,
    pub payload_on: Option<&'static str>,
}

/// Every metric the device announces.
pub const METRICS: [MetricDescriptor; 4] = [
    MetricDescriptor {
        name: "TVOC",
        component: Component::Sensor,
        unique_id_suffix: "tvoc",
        device_class: "volatile_organic_compounds_parts",
        unit: Some("ppb"),
        value_field: "TVOC",
        expire_after_secs: EXPIRE_AFTER_SECS,
        entity_category: None,
        payload_on: None,
    },
    MetricDescriptor {
        name: "AQI",
        component: Component::Sensor,
        unique_id_suffix: "aqi",
        device_class: "aqi",
        unit: None,
        value_field: "AQI",
        expire_after_secs: EXPIRE_AFTER_SECS,
        entity_category: None,
        payload_on: None,
    },
    MetricDescriptor {
        name: "eCO2",
        component: Component::Sensor,
        unique_id_suffix: "eco2",
        device_class: "carbon_dioxide",
        unit: Some("ppm"),
        value_field: "eCO2",
        expire_after_secs: EXPIRE_AFTER_SECS,
        entity_category: None,
        payload_on: None,
    },
    MetricDescriptor {
        name: "State",
        component: Component::BinarySensor,
        unique_id_suffix: "state",
        device_class: "connectivity",
        unit: None,
        value_field: "State",
        expire_after_secs: EXPIRE_AFTER_SECS,
        entity_category: Some("diagnostic"),
        payload_on: Some("online"),
    },
];

// ── Wire format ───────────────────────────────────────────────────
//
// Struct field order is the JSON key order; keep payloads byte-stable
// across releases.

#[derive(Serialize)]
struct DeviceBlock<'a> {
    name: &'a str,
    model: &'a str,
    sw_version: &'a str,
    manufacturer: &'a str,
    identifiers: [&'a str; 1],
}

#[derive(Serialize)]
struct DiscoveryPayload<'a> {
    name: &'a str,
    unique_id: &'a str,
    device_class: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity_category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload_on: Option<&'a str>,
    state_topic: &'a str,
    value_template: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit_of_measurement: Option<&'a str>,
    expire_after: u16,
    device: DeviceBlock<'a>,
}

/// Builds and sends discovery descriptors.
pub struct DiscoveryPublisher {
    abbreviation: &'static str,
    device_name: &'static str,
    device_model: &'static str,
    sw_version: &'static str,
    manufacturer: &'static str,
    status_topic: Topic,
    max_packet_size: usize,
}

impl DiscoveryPublisher {
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            abbreviation: config.abbreviation,
            device_name: config.device_name,
            device_model: config.device_model,
            sw_version: config.sw_version,
            manufacturer: config.manufacturer,
            status_topic: config.status_topic(),
            max_packet_size: config.max_packet_size,
        }
    }

    /// `homeassistant/<component>/ESP32/<abbrev>_<suffix>/config`
    pub fn topic(&self, metric: &MetricDescriptor) -> Topic {
        let mut topic = Topic::new();
        let _ = write!(
            topic,
            "{}/{}/{}/{}_{}/config",
            DISCOVERY_PREFIX,
            metric.component.as_str(),
            NODE_ID,
            self.abbreviation,
            metric.unique_id_suffix
        );
        topic
    }

    /// Serialised descriptor for `metric`.
    pub fn payload(
        &self,
        identity: &DeviceIdentity,
        metric: &MetricDescriptor,
    ) -> Result<Vec<u8>, serde_json::Error> {
        let mut unique_id = heapless::String::<48>::new();
        let _ = write!(unique_id, "{}_{}", identity, metric.unique_id_suffix);
        let mut value_template = heapless::String::<64>::new();
        let _ = write!(value_template, "{{{{ value_json.{} | is_defined }}}}", metric.value_field);

        let payload = DiscoveryPayload {
            name: metric.name,
            unique_id: &unique_id,
            device_class: metric.device_class,
            entity_category: metric.entity_category,
            payload_on: metric.payload_on,
            state_topic: &self.status_topic,
            value_template: &value_template,
            unit_of_measurement: metric.unit,
            expire_after: metric.expire_after_secs,
            device: DeviceBlock {
                name: self.device_name,
                model: self.device_model,
                sw_version: self.sw_version,
                manufacturer: self.manufacturer,
                identifiers: [identity.as_str()],
            },
        };
        serde_json::to_vec(&payload)
    }

    /// Publish one descriptor per metric.  Failures are not escalated.
    ///
    /// Returns how many descriptors the broker client accepted.
    pub fn publish_all(
        &self,
        identity: &DeviceIdentity,
        metrics: &[MetricDescriptor],
        publisher: &mut impl PublishPort,
    ) -> usize {
        let mut accepted = 0;
        for metric in metrics {
            let topic = self.topic(metric);
            let payload = match self.payload(identity, metric) {
                Ok(p) => p,
                Err(e) => {
                    warn!("Discovery: cannot encode {}: {}", metric.name, e);
                    continue;
                }
            };
            let sent = if payload.len() > self.max_packet_size {
                Err(PublishError::TooLarge(payload.len()))
            } else {
                publisher.publish(&topic, &payload)
            };
            match sent {
                Ok(()) => accepted += 1,
                Err(e @ PublishError::TooLarge(_)) => warn!(
                    "Discovery: {} skipped, {} (max {})",
                    metric.name, e, self.max_packet_size
                ),
                Err(e) => debug!("Discovery: {} not sent: {}", metric.name, e),
            }
        }
        accepted
    }
}

/// Handler for [`HUB_STATUS_TOPIC`](crate::config::HUB_STATUS_TOPIC).
pub fn hub_status_handler(payload: &[u8]) -> Option<AppCommand> {
    (payload == b"online").then_some(AppCommand::RepublishDiscovery)
}
