//! Inbound commands to the application core.
//!
//! Subscription handlers turn broker messages into these; the
//! [`Supervisor`](crate::supervisor::Supervisor) interprets them after the
//! connectivity tick so handlers never need a reference to the publisher.

/// Commands that inbound messages can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Re-announce every discovery descriptor (hub came back online).
    RepublishDiscovery,
}

/// Inbound subscription handler: payload in, optional command out.
pub type InboundHandler = fn(&[u8]) -> Option<AppCommand>;
