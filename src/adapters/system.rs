//! Chip-level control.

/// Reset the chip.  Never returns.
#[cfg(target_os = "espidf")]
pub fn restart() -> ! {
    esp_idf_svc::hal::reset::restart()
}

/// Simulation: there is no chip to reset, so the process exits non-zero and
/// the surrounding runner decides whether to start it again.
#[cfg(not(target_os = "espidf"))]
pub fn restart() -> ! {
    log::warn!("System(sim): restart requested, exiting");
    std::process::exit(1)
}
