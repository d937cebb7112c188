use crate::bus::i2c::I2CError;

pub trait I2cTransport: Send {
    fn name(&self) -> String;
    fn write(&mut self, address: u8, data: &[u8]) -> Result<usize, I2CError>;
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, I2CError>;
}

// Bus implementations
pub mod i2c; // I2cController, RPPAL transport
pub mod i2c_sim; // SimulatedI2c
pub mod i2c_sysfs; // SysfsI2c
