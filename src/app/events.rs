//! Outbound application events.
//!
//! The [`Supervisor`](crate::supervisor::Supervisor) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them (serial log, test recorder).

use crate::error::FatalFault;
use crate::identity::DeviceIdentity;
use crate::sensors::Sample;
use crate::supervisor::Phase;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The supervisor moved between phases.
    PhaseChanged { from: Phase, to: Phase },

    /// The network link came up (boot or reconnect).
    NetworkConnected,

    /// A broker session was established (boot or reconnect).
    BrokerConnected,

    /// The broker session dropped mid-run; retries follow.
    BrokerLost,

    /// The discovery descriptor set was sent.
    DiscoveryPublished { accepted: usize, total: usize },

    /// A sample was taken on the telemetry cadence.
    Telemetry { sample: Sample, published: bool },

    /// The run ended; the device restarts next.
    Fault(FatalFault),

    /// Identity derived at startup.
    Identity(DeviceIdentity),
}
