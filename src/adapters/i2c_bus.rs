//! [`RegisterBus`] over any `embedded-hal` 1.0 I2C controller.
//!
//! Reads are a one-byte register write followed by a repeated-start
//! read; writes are a single two-byte transaction.

use embedded_hal::i2c::I2c;
use log::trace;

use crate::app::ports::RegisterBus;
use crate::error::SensorError;

/// One peripheral at a fixed 7-bit address on an I2C bus.
pub struct I2cRegisterBus<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> I2cRegisterBus<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the underlying bus.
    pub fn free(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> RegisterBus for I2cRegisterBus<I2C> {
    fn read_byte(&mut self, reg: u8) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|e| {
                trace!("i2c read 0x{reg:02X} failed: {e:?}");
                SensorError::Bus
            })?;
        Ok(buf[0])
    }

    fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c.write(self.address, &[reg, value]).map_err(|e| {
            trace!("i2c write 0x{reg:02X}=0x{value:02X} failed: {e:?}");
            SensorError::Bus
        })
    }
}
