use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::bus::i2c::I2cConfigData;
use crate::drivers::pcf8574::Pcf8574Config;
use crate::gpio::GpioConfigData;

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    SerializeError(String),
    InvalidEntry(String),
    MissingEntry(String),
    IoError(String),
    Other(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            ConfigError::SerializeError(msg) => format!("serialize/parse error: {}", msg),
            ConfigError::InvalidEntry(msg) => format!("invalid config entry: {}", msg),
            ConfigError::MissingEntry(msg) => format!("missing config entry: {}", msg),
            ConfigError::IoError(msg) => format!("config file error: {}", msg),
            ConfigError::Other(msg) => format!("config error: {}", msg),
        })
    }
}

impl std::error::Error for ConfigError {}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Configuration {
    #[serde(default)]
    pub gpio_section: GpioConfigData,
    #[serde(default)]
    pub i2c_section: I2cConfigData,
    #[serde(default)]
    pub pcf8574_section: Pcf8574Config,
}

impl Configuration {
    pub fn new(gpio_section: GpioConfigData, i2c_section: I2cConfigData, pcf8574_section: Pcf8574Config) -> Self {
        Self { gpio_section, i2c_section, pcf8574_section }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gpio_section.validate()?;
        self.pcf8574_section.validate()?;
        Ok(())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Configuration, ConfigError> {
        let config: Configuration = match serde_json::from_reader(reader) {
            Ok(c) => c,
            Err(e) => {
                return Err(ConfigError::SerializeError(
                    format!("failed to deserialize config file: {}", e)
                ));
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_str(json_str: &str) -> Result<Configuration, ConfigError> {
        Self::from_reader(json_str.as_bytes())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Configuration, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::MissingEntry(format!("{} does not exist", path.display())));
        }

        let file = File::open(path)
            .map_err(|e| ConfigError::IoError(format!("failed to open {}: {}", path.display(), e)))?;
        Self::from_reader(file)
    }

    pub fn to_writer<W: Write>(&self, writer: W, pretty: bool) -> Result<(), ConfigError> {
        let result = match pretty {
            true => serde_json::to_writer_pretty(writer, self),
            false => serde_json::to_writer(writer, self),
        };

        result.map_err(|e| ConfigError::SerializeError(format!("failed to serialize config: {}", e)))
    }

    pub fn to_str(&self, pretty: bool) -> Result<String, ConfigError> {
        let result = match pretty {
            true => serde_json::to_string_pretty(self),
            false => serde_json::to_string(self),
        };

        result.map_err(|e| ConfigError::SerializeError(format!("failed to serialize config: {}", e)))
    }

    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| ConfigError::IoError(format!("failed to create {}: {}", path.display(), e)))?;
        self.to_writer(file, true)
    }
}
