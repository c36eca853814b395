//! Periodic status record: sample the sensor, publish, refresh the display.

use log::debug;
use serde::Serialize;

use crate::app::ports::{AirQualityDriver, DisplayPort, PublishPort};
use crate::config::{DeviceConfig, Topic};
use crate::display::GaugeReading;
use crate::error::{FatalFault, PublishError};
use crate::sensors::{Sample, SensorReader};

/// JSON body published on the status topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TelemetryRecord {
    #[serde(rename = "State")]
    pub state: &'static str,
    #[serde(rename = "TVOC")]
    pub tvoc: u16,
    #[serde(rename = "eCO2")]
    pub eco2: u16,
    #[serde(rename = "AQI")]
    pub aqi: u16,
}

impl From<&Sample> for TelemetryRecord {
    fn from(s: &Sample) -> Self {
        Self {
            state: "online",
            tvoc: s.tvoc,
            eco2: s.eco2,
            aqi: s.aqi,
        }
    }
}

/// Outcome of a telemetry tick that took a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryReport {
    pub sample: Sample,
    /// Whether the broker client accepted the record.
    pub published: bool,
}

pub struct TelemetryPublisher {
    interval_ms: u64,
    last_publish_ms: Option<u64>,
    status_topic: Topic,
}

impl TelemetryPublisher {
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            interval_ms: u64::from(config.telemetry_interval_ms),
            last_publish_ms: None,
            status_topic: config.status_topic(),
        }
    }

    /// True on the first call after boot and then once per interval.
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.last_publish_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.interval_ms)
    }

    /// Run one telemetry step.
    ///
    /// Returns `Ok(None)` when the interval has not elapsed.  A sensor fault
    /// is fatal; a failed publish is not.
    pub fn tick<D: AirQualityDriver>(
        &mut self,
        now_ms: u64,
        sensor: &mut SensorReader<D>,
        publisher: &mut impl PublishPort,
        display: &mut impl DisplayPort,
    ) -> Result<Option<TelemetryReport>, FatalFault> {
        if !self.is_due(now_ms) {
            return Ok(None);
        }
        self.last_publish_ms = Some(now_ms);

        let sample = sensor.poll(now_ms)?;

        let published = if publisher.is_ready() {
            match self.publish(&sample, publisher) {
                Ok(()) => true,
                Err(e) => {
                    debug!("Telemetry: not sent: {}", e);
                    false
                }
            }
        } else {
            false
        };

        GaugeReading::from_sample(&sample).apply(display);

        Ok(Some(TelemetryReport { sample, published }))
    }

    fn publish(&self, sample: &Sample, publisher: &mut impl PublishPort) -> Result<(), PublishError> {
        let body = serde_json::to_vec(&TelemetryRecord::from(sample))
            .map_err(|_| PublishError::Encode)?;
        publisher.publish(&self.status_topic, &body)
    }
}
