//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the control loop stalls for longer than the
//! configured timeout.  The supervisor feeds it once per loop iteration via
//! the `heartbeat` hook; the only blocking step inside the loop (a network
//! reconnect) is bounded well below the timeout.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    timeout_secs: u32,
}

impl Watchdog {
    /// Configure the TWDT and subscribe the calling task.
    pub fn new(timeout_secs: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms: timeout_ms(timeout_secs),
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!(
                        "TWDT reconfigure returned {} (may already be configured)",
                        ret
                    );
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    info!("Watchdog: subscribed ({}s timeout, panic on trigger)", timeout_secs);
                } else {
                    log::warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self { subscribed, timeout_secs }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("Watchdog(sim): {} ms timeout, no-op", timeout_ms(timeout_secs));
            Self { timeout_secs }
        }
    }

    /// Feed the watchdog.
    pub fn feed(&mut self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        timeout_ms(self.timeout_secs)
    }
}

fn timeout_ms(secs: u32) -> u32 {
    secs.saturating_mul(1000)
}
