use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    bus::i2c::{I2cController, MAX_ADDRESS},
    config::ConfigError,
    drivers::DeviceError,
};

// A0..A2 tied low; PCF8574A parts start at 0x38
pub const DEFAULT_I2C_ADDR: u8 = 0x20;
pub const POWER_ON_STATE: u8 = 0xff;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Pcf8574Config {
    pub device_address: u8,
}

impl Default for Pcf8574Config {
    fn default() -> Self {
        Self {
            device_address: DEFAULT_I2C_ADDR,
        }
    }
}

impl Pcf8574Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_address > MAX_ADDRESS {
            return Err(ConfigError::InvalidEntry(format!(
                "invalid pcf8574 config: device address 0x{:02x} is not a 7-bit address",
                self.device_address
            )));
        }

        Ok(())
    }
}

struct Binding<'a> {
    bus: &'a I2cController,
    session: Uuid,
}

pub struct Pcf8574Driver<'a> {
    config: Pcf8574Config,
    binding: Option<Binding<'a>>,
    output: Option<u8>,
}

impl<'a> Pcf8574Driver<'a> {
    pub fn new(config: Pcf8574Config) -> Result<Self, DeviceError> {
        config.validate()
            .map_err(|e| DeviceError::InvalidConfig(e.to_string()))?;

        Ok(Pcf8574Driver {
            config,
            binding: None,
            output: None,
        })
    }

    pub fn with_address(device_address: u8) -> Result<Self, DeviceError> {
        Self::new(Pcf8574Config { device_address })
    }

    pub fn address(&self) -> u8 {
        self.config.device_address
    }

    pub fn init(&mut self, i2c: &'a I2cController) -> Result<(), DeviceError> {
        let session = match i2c.session_id() {
            Some(id) => id,
            None => return Err(DeviceError::BusNotInitialized),
        };

        if self.binding.is_some() {
            warn!("PCF8574 at 0x{:02x} rebound without release", self.config.device_address);
        }

        debug!("PCF8574 at 0x{:02x} bound to I2C bus {} (session {})", self.config.device_address, i2c.bus_id(), session);
        self.binding = Some(Binding { bus: i2c, session });
        self.output = None;
        Ok(())
    }

    pub fn release(&mut self) {
        if self.binding.take().is_some() {
            debug!("PCF8574 at 0x{:02x} released", self.config.device_address);
        }

        self.output = None;
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn output(&self) -> Option<u8> {
        self.output
    }

    fn bound(&self) -> Result<&Binding<'a>, DeviceError> {
        let binding = self.binding.as_ref().ok_or(DeviceError::NotBound)?;
        match binding.bus.session_id() {
            None => Err(DeviceError::BusNotInitialized),
            Some(id) if id != binding.session => Err(DeviceError::StaleBinding),
            Some(_) => Ok(binding),
        }
    }

    pub fn write(&mut self, data: i32) -> Result<(), DeviceError> {
        self.write_byte((data & 0xff) as u8)
    }

    pub fn write_byte(&mut self, data: u8) -> Result<(), DeviceError> {
        let binding = self.bound()?;
        binding.bus.write_in_session(Some(binding.session), self.config.device_address, &[data])
            .map_err(|e| match DeviceError::from(e) {
                // the session closed between the check and the transfer
                DeviceError::BusNotInitialized => DeviceError::StaleBinding,
                other => other,
            })?;

        self.output = Some(data);
        Ok(())
    }

    pub fn read(&self) -> Result<u8, DeviceError> {
        let binding = self.bound()?;
        let mut buf = [0u8; 1];
        binding.bus.read_in_session(Some(binding.session), self.config.device_address, &mut buf)
            .map_err(|e| match DeviceError::from(e) {
                DeviceError::BusNotInitialized => DeviceError::StaleBinding,
                other => other,
            })?;

        Ok(buf[0])
    }

    pub fn set_pin(&mut self, pin: u8, level: bool) -> Result<(), DeviceError> {
        if pin > 7 {
            return Err(DeviceError::InvalidArgument(format!("pcf8574 has no line {}", pin)));
        }

        let current = self.output.unwrap_or(POWER_ON_STATE);
        let next = match level {
            true => current | (1 << pin),
            false => current & !(1 << pin),
        };

        self.write_byte(next)
    }
}
