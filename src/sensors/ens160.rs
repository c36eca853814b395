//! ScioSense ENS160 digital metal-oxide gas sensor driver.
//!
//! Minimal register access over any `embedded_hal::i2c::I2c` bus: identity
//! check, operating mode, validity status and the three data registers.
//! Temperature/humidity compensation and the GPR registers are not used.
//!
//! ## Register map (subset)
//!
//! | Reg  | Name        | Use                                  |
//! |------|-------------|--------------------------------------|
//! | 0x00 | PART_ID     | must read 0x0160 (little-endian)     |
//! | 0x10 | OPMODE      | 0x02 = standard gas sensing          |
//! | 0x20 | DATA_STATUS | bits 3:2 validity flag               |
//! | 0x21 | DATA_AQI    | bits 2:0 UBA index                   |
//! | 0x22 | DATA_TVOC   | u16 LE, ppb                          |
//! | 0x24 | DATA_ECO2   | u16 LE, ppm                          |

use embedded_hal::i2c::I2c;

use crate::app::ports::{AirQualityDriver, DeviceStatus};
use crate::error::DriverError;

const REG_PART_ID: u8 = 0x00;
const REG_OPMODE: u8 = 0x10;
const REG_DATA_STATUS: u8 = 0x20;
const REG_DATA_AQI: u8 = 0x21;
const REG_DATA_TVOC: u8 = 0x22;
const REG_DATA_ECO2: u8 = 0x24;

const PART_ID: u16 = 0x0160;
const OPMODE_STANDARD: u8 = 0x02;

pub struct Ens160<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Ens160<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Give the bus back (tests, re-initialisation).
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_u8(&mut self, reg: u8) -> Result<u8, DriverError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|_| DriverError::Bus)?;
        Ok(buf[0])
    }

    fn read_u16(&mut self, reg: u8) -> Result<u16, DriverError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|_| DriverError::Bus)?;
        Ok(u16::from_le_bytes(buf))
    }
}

impl<I2C: I2c> AirQualityDriver for Ens160<I2C> {
    fn begin(&mut self) -> Result<(), DriverError> {
        let id = self.read_u16(REG_PART_ID)?;
        if id != PART_ID {
            return Err(DriverError::UnknownDevice(id));
        }
        Ok(())
    }

    fn set_standard_mode(&mut self) -> Result<(), DriverError> {
        self.i2c
            .write(self.address, &[REG_OPMODE, OPMODE_STANDARD])
            .map_err(|_| DriverError::Bus)
    }

    fn status(&mut self) -> Result<DeviceStatus, DriverError> {
        let raw = self.read_u8(REG_DATA_STATUS)?;
        Ok(match (raw >> 2) & 0x03 {
            0 => DeviceStatus::Normal,
            1 => DeviceStatus::WarmUp,
            2 => DeviceStatus::InitialStartUp,
            _ => DeviceStatus::InvalidOutput,
        })
    }

    fn aqi(&mut self) -> Result<u16, DriverError> {
        Ok(u16::from(self.read_u8(REG_DATA_AQI)? & 0x07))
    }

    fn eco2(&mut self) -> Result<u16, DriverError> {
        self.read_u16(REG_DATA_ECO2)
    }

    fn tvoc(&mut self) -> Result<u16, DriverError> {
        self.read_u16(REG_DATA_TVOC)
    }
}
