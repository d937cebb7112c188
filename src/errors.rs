use crate::{bus::i2c::I2CError, drivers::DeviceError, gpio::GpioError};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Initialization,
    Precondition,
    Argument,
    Hardware,
    Config,
}

#[derive(Debug, PartialEq)]
pub struct ArgumentError(pub String);

impl Display for ArgumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid argument: {}", self.0)
    }
}

impl std::error::Error for ArgumentError {}

pub fn map_gpio_error(err: &GpioError) -> ErrorKind {
    match err {
        GpioError::NotInitialized => ErrorKind::Precondition,
        GpioError::NotOutput(_) => ErrorKind::Precondition,
        GpioError::InvalidPort(_) => ErrorKind::Argument,
        GpioError::InvalidMode(_) => ErrorKind::Argument,
        GpioError::AlreadyInitialized => ErrorKind::Initialization,
        GpioError::PermissionDenied(_) => ErrorKind::Initialization,
        GpioError::Unsupported(_) => ErrorKind::Initialization,
        GpioError::Busy(_) => ErrorKind::Hardware,
        GpioError::PinNotFound(_) => ErrorKind::Hardware,
        GpioError::OsError(_) => ErrorKind::Hardware,
        GpioError::Other(_) => ErrorKind::Hardware,
    }
}

pub fn map_i2c_error(err: &I2CError) -> ErrorKind {
    match err {
        I2CError::NotInitialized => ErrorKind::Precondition,
        I2CError::InvalidAddress(_) => ErrorKind::Argument,
        I2CError::AlreadyInitialized => ErrorKind::Initialization,
        I2CError::BusNotFound(_) => ErrorKind::Initialization,
        I2CError::NotSupported => ErrorKind::Initialization,
        I2CError::OsError(_) => ErrorKind::Initialization,
        I2CError::HardwareError(_) => ErrorKind::Hardware,
        I2CError::Other(_) => ErrorKind::Hardware,
    }
}

pub fn map_device_error(err: &DeviceError) -> ErrorKind {
    match err {
        DeviceError::NotBound => ErrorKind::Precondition,
        DeviceError::BusNotInitialized => ErrorKind::Precondition,
        DeviceError::StaleBinding => ErrorKind::Precondition,
        DeviceError::InvalidArgument(_) => ErrorKind::Argument,
        DeviceError::InvalidConfig(_) => ErrorKind::Config,
        DeviceError::HardwareError(_) => ErrorKind::Hardware,
        DeviceError::Other(_) => ErrorKind::Hardware,
    }
}
