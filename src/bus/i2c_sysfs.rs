use super::{i2c::I2CError, I2cTransport};
use i2c_linux::I2c;
use std::{
    fs::File,
    io::{Error, Read, Write},
    os::fd::AsRawFd,
    path::Path,
};

const I2C_CLASS_PATH: &str = "/sys/class/i2c-dev";
const I2C_DEVICE_PATH: &str = "/dev";

// helpers for plain (non-register) I2C devices
pub fn write_bytes<T: Write + AsRawFd>(bus: &mut I2c<T>, address: u8, data: &[u8]) -> Result<usize, Error> {
    bus.smbus_set_slave_address(address as u16, false)?;
    bus.write(data)
}

pub fn read_bytes<T: Read + AsRawFd>(bus: &mut I2c<T>, address: u8, buf: &mut [u8]) -> Result<usize, Error> {
    bus.smbus_set_slave_address(address as u16, false)?;
    bus.read(buf)
}

fn sysfs_map_err(err: Error, default_err_msg: &str) -> I2CError {
    I2CError::HardwareError(format!("{}: {}", default_err_msg, err))
}

pub struct SysfsI2c {
    bus_id: u8,
    bus: I2c<File>,
}

impl SysfsI2c {
    pub fn open(bus_id: u8) -> Result<Self, I2CError> {
        let path = Path::new(I2C_CLASS_PATH);
        if !path.exists() || !path.is_dir() {
            return Err(I2CError::OsError("I2C is not supported on this system".to_string()));
        }

        let device = Path::new(I2C_DEVICE_PATH).join(format!("i2c-{}", bus_id));
        if !device.exists() {
            return Err(I2CError::BusNotFound(bus_id));
        }

        let bus = I2c::from_path(&device)
            .map_err(|err| sysfs_map_err(err, &format!("Internal sysfs error while opening I2C bus {}", bus_id)))?;

        Ok(SysfsI2c { bus_id, bus })
    }
}

impl I2cTransport for SysfsI2c {
    fn name(&self) -> String {
        format!("i2c_sysfs ({}/i2c-{})", I2C_DEVICE_PATH, self.bus_id)
    }

    fn write(&mut self, address: u8, data: &[u8]) -> Result<usize, I2CError> {
        write_bytes(&mut self.bus, address, data)
            .map_err(|err| sysfs_map_err(err, &format!("failed to write to 0x{:02x}", address)))
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, I2CError> {
        read_bytes(&mut self.bus, address, buf)
            .map_err(|err| sysfs_map_err(err, &format!("failed to read from 0x{:02x}", address)))
    }
}
