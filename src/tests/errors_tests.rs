use crate::{
    bus::i2c::I2CError,
    drivers::DeviceError,
    errors::{map_device_error, map_gpio_error, map_i2c_error, ErrorKind},
    gpio::GpioError,
};

#[test]
fn gpio_error_kinds() {
    assert_eq!(map_gpio_error(&GpioError::NotInitialized), ErrorKind::Precondition);
    assert_eq!(map_gpio_error(&GpioError::NotOutput(17)), ErrorKind::Precondition);
    assert_eq!(map_gpio_error(&GpioError::InvalidMode(4)), ErrorKind::Argument);
    assert_eq!(map_gpio_error(&GpioError::InvalidPort(60)), ErrorKind::Argument);
    assert_eq!(map_gpio_error(&GpioError::AlreadyInitialized), ErrorKind::Initialization);
    assert_eq!(
        map_gpio_error(&GpioError::PermissionDenied("/dev/gpiomem".to_string())),
        ErrorKind::Initialization
    );
    assert_eq!(map_gpio_error(&GpioError::Busy(4)), ErrorKind::Hardware);
}

#[test]
fn i2c_error_kinds() {
    assert_eq!(map_i2c_error(&I2CError::NotInitialized), ErrorKind::Precondition);
    assert_eq!(map_i2c_error(&I2CError::BusNotFound(1)), ErrorKind::Initialization);
    assert_eq!(map_i2c_error(&I2CError::AlreadyInitialized), ErrorKind::Initialization);
    assert_eq!(map_i2c_error(&I2CError::InvalidAddress(0x80)), ErrorKind::Argument);
    assert_eq!(map_i2c_error(&I2CError::HardwareError("nack".to_string())), ErrorKind::Hardware);
}

#[test]
fn device_error_kinds() {
    assert_eq!(map_device_error(&DeviceError::NotBound), ErrorKind::Precondition);
    assert_eq!(map_device_error(&DeviceError::StaleBinding), ErrorKind::Precondition);
    assert_eq!(map_device_error(&DeviceError::InvalidArgument("line 9".to_string())), ErrorKind::Argument);
    assert_eq!(map_device_error(&DeviceError::InvalidConfig("0x80".to_string())), ErrorKind::Config);
}

#[test]
fn i2c_errors_convert_for_drivers() {
    assert_eq!(DeviceError::from(I2CError::NotInitialized), DeviceError::BusNotInitialized);
    assert!(matches!(DeviceError::from(I2CError::InvalidAddress(0x80)), DeviceError::InvalidConfig(_)));
    assert!(matches!(DeviceError::from(I2CError::BusNotFound(1)), DeviceError::HardwareError(_)));
}
