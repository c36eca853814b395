//! Sensor subsystem: the ENS160 driver and the validating [`SensorReader`].
//!
//! The reader owns the driver and produces a [`Sample`] per poll.  There is
//! no retry or last-good-value fallback: a sample that cannot be trusted is
//! a fault, and the supervisor restarts the device.

pub mod ens160;

use core::time::Duration;

use log::{error, info, warn};

use crate::app::ports::{AirQualityDriver, Clock, DeviceStatus};
use crate::error::{FatalFault, SensorFault};

/// One validated reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub aqi: u16,
    pub eco2: u16,
    pub tvoc: u16,
    /// Milliseconds since boot when the sample was taken.
    pub timestamp_ms: u64,
}

/// Classify raw readings.  Zero is outside the sensor's physical output
/// range, so any zero field marks the whole sample invalid.
pub fn validate(aqi: u16, eco2: u16, tvoc: u16) -> Result<(), SensorFault> {
    if aqi == 0 || eco2 == 0 || tvoc == 0 {
        return Err(SensorFault::ZeroReading { aqi, eco2, tvoc });
    }
    Ok(())
}

/// Polls the air quality sensor and rejects invalid samples.
pub struct SensorReader<D> {
    driver: D,
    last_sample: Option<Sample>,
}

impl<D: AirQualityDriver> SensorReader<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            last_sample: None,
        }
    }

    /// Probe the sensor until it answers or `timeout` elapses, then put it
    /// in standard mode.
    pub fn begin(
        &mut self,
        clock: &mut impl Clock,
        timeout: Duration,
        retry_delay_ms: u32,
    ) -> Result<(), FatalFault> {
        let started = clock.now_ms();
        let timeout_ms = timeout.as_millis() as u64;

        loop {
            match self.driver.begin() {
                Ok(()) => break,
                Err(e) => {
                    if clock.now_ms().saturating_sub(started) >= timeout_ms {
                        error!("Sensor: no answer after {} ms ({})", timeout_ms, e);
                        return Err(FatalFault::SensorInit);
                    }
                    warn!("Sensor: begin failed ({}), retrying", e);
                    clock.delay_ms(retry_delay_ms);
                }
            }
        }

        self.driver.set_standard_mode().map_err(|e| {
            error!("Sensor: cannot enter standard mode ({})", e);
            FatalFault::SensorInit
        })?;
        info!("Sensor: running in standard mode");
        Ok(())
    }

    /// Take one sample.
    ///
    /// The status register is read first; an invalid-output status or a bus
    /// error aborts before any data register is touched.
    pub fn poll(&mut self, now_ms: u64) -> Result<Sample, SensorFault> {
        if self.driver.status()? == DeviceStatus::InvalidOutput {
            return Err(SensorFault::InvalidOutput);
        }

        let aqi = self.driver.aqi()?;
        let eco2 = self.driver.eco2()?;
        let tvoc = self.driver.tvoc()?;
        validate(aqi, eco2, tvoc)?;

        let sample = Sample {
            aqi,
            eco2,
            tvoc,
            timestamp_ms: now_ms,
        };
        self.last_sample = Some(sample);
        Ok(sample)
    }

    /// Most recent valid sample.
    pub fn last_sample(&self) -> Option<Sample> {
        self.last_sample
    }
}
