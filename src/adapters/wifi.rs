//! WiFi station-mode adapter.
//!
//! Implements [`NetworkPort`]: the hexagonal boundary for the network link.
//! Every call returns immediately; waiting and timeouts belong to the
//! [`ConnectivityManager`](crate::connectivity::ConnectivityManager).
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::EspWifi` with a fixed
//!   IPv4 station netif when a static address is configured.
//! - **all other targets**: simulation stubs for host-side tests.

use crate::app::ports::{MacAddress, NetworkPort};
use crate::config::{DeviceConfig, StaticIp};
use crate::error::NetworkError;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// 1-32 printable bytes for the SSID; empty (open) or 8-64 bytes for WPA2.
pub fn validate_credentials(ssid: &str, password: &str) -> Result<(), NetworkError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(NetworkError::InvalidCredentials);
    }
    if !password.is_empty() && (password.len() < 8 || password.len() > 64) {
        return Err(NetworkError::InvalidCredentials);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod platform {
    use super::*;

    use log::{info, warn};

    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::modem::Modem;
    use esp_idf_svc::ipv4::{
        ClientConfiguration as IpClientConfiguration, ClientSettings,
        Configuration as IpConfiguration, Ipv4Addr, Mask, Subnet,
    };
    use esp_idf_svc::netif::{EspNetif, NetifConfiguration};
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::sys::EspError;
    use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

    pub struct WifiAdapter {
        wifi: EspWifi<'static>,
        ssid: &'static str,
        password: &'static str,
        static_ip: Option<StaticIp>,
    }

    impl WifiAdapter {
        pub fn new(
            modem: Modem,
            sysloop: EspSystemEventLoop,
            nvs: Option<EspDefaultNvsPartition>,
            config: &DeviceConfig,
        ) -> Result<Self, EspError> {
            Ok(Self {
                wifi: EspWifi::new(modem, sysloop, nvs)?,
                ssid: config.wifi_ssid,
                password: config.wifi_password,
                static_ip: config.static_ip,
            })
        }
    }

    fn fixed_netif(ip: &StaticIp) -> Result<EspNetif, EspError> {
        let [a, b, c, d] = ip.address;
        let [ga, gb, gc, gd] = ip.gateway;
        EspNetif::new_with_conf(&NetifConfiguration {
            ip_configuration: Some(IpConfiguration::Client(IpClientConfiguration::Fixed(
                ClientSettings {
                    ip: Ipv4Addr::new(a, b, c, d),
                    subnet: Subnet {
                        gateway: Ipv4Addr::new(ga, gb, gc, gd),
                        mask: Mask(ip.prefix_len),
                    },
                    dns: None,
                    secondary_dns: None,
                },
            ))),
            ..NetifConfiguration::wifi_default_client()
        })
    }

    impl NetworkPort for WifiAdapter {
        fn configure(&mut self) -> Result<(), NetworkError> {
            validate_credentials(self.ssid, self.password)?;

            if let Some(ip) = &self.static_ip {
                let netif = fixed_netif(ip).map_err(|e| {
                    warn!("WiFi: netif config failed: {}", e);
                    NetworkError::ConfigRejected
                })?;
                self.wifi
                    .swap_netif_sta(netif)
                    .map_err(|_| NetworkError::ConfigRejected)?;
                info!(
                    "WiFi: static IP {}.{}.{}.{}/{}",
                    ip.address[0], ip.address[1], ip.address[2], ip.address[3], ip.prefix_len
                );
            }

            let auth_method = if self.password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            };
            self.wifi
                .set_configuration(&Configuration::Client(ClientConfiguration {
                    ssid: self
                        .ssid
                        .try_into()
                        .map_err(|_| NetworkError::InvalidCredentials)?,
                    password: self
                        .password
                        .try_into()
                        .map_err(|_| NetworkError::InvalidCredentials)?,
                    auth_method,
                    ..Default::default()
                }))
                .map_err(|_| NetworkError::ConfigRejected)
        }

        fn begin(&mut self) -> Result<(), NetworkError> {
            self.wifi.start().map_err(|_| NetworkError::DriverFailed)?;
            self.wifi.connect().map_err(|_| NetworkError::DriverFailed)
        }

        fn is_link_up(&self) -> bool {
            self.wifi.is_up().unwrap_or(false)
        }

        fn disconnect(&mut self) {
            if let Err(e) = self.wifi.disconnect() {
                warn!("WiFi: disconnect returned {}", e);
            }
        }

        fn reconnect(&mut self) -> Result<(), NetworkError> {
            self.wifi.connect().map_err(|_| NetworkError::DriverFailed)
        }

        fn mac_address(&self) -> MacAddress {
            self.wifi
                .sta_netif()
                .get_mac()
                .unwrap_or_else(|_| crate::adapters::device_id::read_mac())
        }

        fn local_ip(&self) -> Option<core::net::Ipv4Addr> {
            let info = self.wifi.sta_netif().get_ip_info().ok()?;
            (!info.ip.is_unspecified()).then_some(info.ip)
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod platform {
    use super::*;

    use log::info;

    use crate::adapters::device_id;

    /// Simulated station: associates on `begin()`, stays up until told
    /// otherwise.
    pub struct WifiAdapter {
        ssid: &'static str,
        password: &'static str,
        static_ip: Option<StaticIp>,
        started: bool,
        link_up: bool,
    }

    impl WifiAdapter {
        pub fn new(config: &DeviceConfig) -> Self {
            Self {
                ssid: config.wifi_ssid,
                password: config.wifi_password,
                static_ip: config.static_ip,
                started: false,
                link_up: false,
            }
        }

        /// Simulation hook: drop the link as if the AP went away.
        pub fn sim_drop_link(&mut self) {
            self.link_up = false;
        }
    }

    impl NetworkPort for WifiAdapter {
        fn configure(&mut self) -> Result<(), NetworkError> {
            validate_credentials(self.ssid, self.password)?;
            if let Some(ip) = &self.static_ip {
                if ip.prefix_len == 0 || ip.prefix_len > 32 {
                    return Err(NetworkError::ConfigRejected);
                }
            }
            Ok(())
        }

        fn begin(&mut self) -> Result<(), NetworkError> {
            self.started = true;
            self.link_up = true;
            info!("WiFi(sim): associated with '{}'", self.ssid);
            Ok(())
        }

        fn is_link_up(&self) -> bool {
            self.link_up
        }

        fn disconnect(&mut self) {
            self.link_up = false;
            info!("WiFi(sim): disconnected");
        }

        fn reconnect(&mut self) -> Result<(), NetworkError> {
            if !self.started {
                return Err(NetworkError::DriverFailed);
            }
            self.link_up = true;
            Ok(())
        }

        fn mac_address(&self) -> MacAddress {
            device_id::read_mac()
        }

        fn local_ip(&self) -> Option<core::net::Ipv4Addr> {
            if !self.link_up {
                return None;
            }
            let [a, b, c, d] = self.static_ip.map_or([10, 0, 2, 15], |ip| ip.address);
            Some(core::net::Ipv4Addr::new(a, b, c, d))
        }
    }
}

pub use platform::WifiAdapter;

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
