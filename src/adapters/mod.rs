//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements   | Connects to                       |
//! |-------------|--------------|-----------------------------------|
//! | `wifi`      | NetworkPort  | ESP-IDF WiFi station + netif      |
//! | `mqtt`      | BrokerPort   | ESP-IDF MQTT client               |
//! | `time`      | Clock        | ESP32 high-resolution timer       |
//! | `display`   | DisplayPort  | Serial log (shadow widget state)  |
//! | `log_sink`  | EventSink    | Serial log output                 |
//! | `device_id` | (helper)     | eFuse MAC                         |
//! | `system`    | (helper)     | Chip restart                      |
//!
//! The ENS160 sensor driver lives in [`crate::sensors::ens160`]: it is
//! generic over `embedded_hal::i2c::I2c` rather than tied to ESP-IDF.

pub mod device_id;
pub mod display;
pub mod log_sink;
pub mod mqtt;
pub mod system;
pub mod time;
pub mod wifi;
