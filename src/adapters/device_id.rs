//! Factory MAC address access.
//!
//! The WiFi adapter asks the station netif for its MAC; this eFuse read is
//! the fallback when the netif cannot answer and the source on host builds.
//! [`DeviceIdentity`](crate::identity::DeviceIdentity) is derived from it.

use core::fmt::Write;

use crate::app::ports::MacAddress;

/// Read the WiFi station MAC address (eFuse base MAC + station offset).
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_read_mac(
            mac.as_mut_ptr(),
            esp_idf_svc::sys::esp_mac_type_t_ESP_MAC_WIFI_STA,
        );
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Colon-separated, zero-padded form for logs: `de:ad:be:ef:ca:fe`.
pub fn format_mac(mac: &MacAddress) -> heapless::String<17> {
    let mut s = heapless::String::new();
    for (i, b) in mac.iter().enumerate() {
        let sep = if i == 0 { "" } else { ":" };
        let _ = write!(s, "{sep}{b:02x}");
    }
    s
}
