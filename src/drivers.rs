use crate::bus::i2c::I2CError;
use std::fmt::Display;

#[derive(Debug, PartialEq)]
pub enum DeviceError {
    NotBound,
    BusNotInitialized,
    StaleBinding,
    InvalidArgument(String),
    HardwareError(String),
    InvalidConfig(String),
    Other(String),
}

impl Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            DeviceError::NotBound => format!("device is not bound to an I2C bus"),
            DeviceError::BusNotInitialized => format!("i2c not initialized"),
            DeviceError::StaleBinding => format!("the I2C session this device was bound to has been closed"),
            DeviceError::InvalidArgument(desc) => format!("invalid argument: {}", desc),
            DeviceError::HardwareError(desc) => format!("a hardware error has occurred: {}", desc),
            DeviceError::InvalidConfig(desc) => format!("invalid config: {}", desc),
            DeviceError::Other(desc) => format!("an unknown error has occurred: {}", desc),
        })
    }
}

impl std::error::Error for DeviceError {}

impl From<I2CError> for DeviceError {
    fn from(err: I2CError) -> Self {
        match err {
            I2CError::NotInitialized => DeviceError::BusNotInitialized,
            I2CError::InvalidAddress(_) => DeviceError::InvalidConfig(err.to_string()),
            _ => DeviceError::HardwareError(err.to_string()),
        }
    }
}

// Device drivers
pub mod pcf8574; // Pcf8574Driver
