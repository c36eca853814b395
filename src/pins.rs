//! GPIO / peripheral pin assignments for the air quality monitor board.
//!
//! Single source of truth for the wiring.  `main.rs` takes the matching
//! typed pins from `Peripherals` and logs these numbers at bring-up.

// ---------------------------------------------------------------------------
// I²C bus (ENS160 gas sensor)
// ---------------------------------------------------------------------------

/// I²C data line.
pub const I2C_SDA_GPIO: i32 = 8;
/// I²C clock line.
pub const I2C_SCL_GPIO: i32 = 9;
/// Bus clock (Hz). The ENS160 supports fast mode; standard mode is plenty
/// for four register reads every 15 s.
pub const I2C_FREQ_HZ: u32 = 100_000;
