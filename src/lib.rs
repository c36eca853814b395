//! Air quality monitor firmware library.
//!
//! Exposes the pure-logic modules for integration testing and host
//! simulation.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod connectivity;
pub mod discovery;
pub mod display;
pub mod error;
pub mod identity;
pub mod sensors;
pub mod supervisor;
pub mod telemetry;

pub mod adapters;
pub mod drivers;
pub mod pins;
