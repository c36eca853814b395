//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink {
    telemetry_count: u32,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry { sample, published } => {
                self.telemetry_count += 1;
                info!(
                    "TELEM | #{} | AQI={} eCO2={}ppm TVOC={}ppb | t={}ms | {}",
                    self.telemetry_count,
                    sample.aqi,
                    sample.eco2,
                    sample.tvoc,
                    sample.timestamp_ms,
                    if *published { "sent" } else { "local only" },
                );
            }
            AppEvent::PhaseChanged { from, to } => {
                info!("PHASE | {:?} -> {:?}", from, to);
            }
            AppEvent::Identity(id) => {
                info!("IDENT | unique_id={}", id);
            }
            AppEvent::NetworkConnected => {
                info!("NET   | link up");
            }
            AppEvent::BrokerConnected => {
                info!("MQTT  | session up");
            }
            AppEvent::BrokerLost => {
                warn!("MQTT  | session lost, retrying");
            }
            AppEvent::DiscoveryPublished { accepted, total } => {
                if accepted == total {
                    info!("DISCO | {}/{} descriptors sent", accepted, total);
                } else {
                    warn!("DISCO | {}/{} descriptors sent", accepted, total);
                }
            }
            AppEvent::Fault(fault) => {
                error!("FAULT | {} (restarting)", fault);
            }
        }
    }
}
