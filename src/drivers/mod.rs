//! On-chip peripheral helpers.

pub mod watchdog;
