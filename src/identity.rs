//! Device identity derived from the station MAC address.
//!
//! The id is the six MAC bytes rendered as lower-case hex **without** zero
//! padding, concatenated (`0x0B` → `b`).  This matches the ids the device has
//! always registered with Home Assistant, so entities survive a firmware
//! swap.  It is:
//! - Deterministic across reboots (factory-burned eFuse MAC)
//! - The prefix of every discovery `unique_id`
//! - The single entry of the discovery device block's `identifiers`

use core::fmt::{self, Write};

use crate::app::ports::MacAddress;

/// Up to 12 hex digits.
pub type DeviceIdString = heapless::String<12>;

/// Immutable device identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity(DeviceIdString);

impl DeviceIdentity {
    pub fn from_mac(mac: &MacAddress) -> Self {
        let mut id = DeviceIdString::new();
        for byte in mac {
            // 12 chars max, cannot overflow.
            let _ = write!(id, "{byte:x}");
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
