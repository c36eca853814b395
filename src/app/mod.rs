//! Application boundary: port traits, inbound commands and outbound events.
//!
//! The domain components ([`connectivity`](crate::connectivity),
//! [`discovery`](crate::discovery), [`telemetry`](crate::telemetry),
//! [`sensors`](crate::sensors), [`supervisor`](crate::supervisor)) reach the
//! outside world only through the **port traits** defined in [`ports`],
//! keeping them fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
