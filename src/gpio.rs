use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Display};
use strum::{EnumIter, IntoEnumIterator};

use crate::config::ConfigError;

// Register backends
pub mod bcm; // Bcm2835Registers (in-memory register block)
pub mod raw; // RppalRegisters

pub const BCM_PIN_COUNT: u8 = 54;

// GPIOs routed to the 40-pin header
pub const HEADER_PIN_COUNT: u8 = 28;

#[derive(Debug, PartialEq)]
pub enum GpioError {
    NotInitialized,
    AlreadyInitialized,
    InvalidPort(i32),
    InvalidMode(i32),
    NotOutput(u8),
    Busy(u8),
    PinNotFound(u8),
    PermissionDenied(String),
    Unsupported(String),
    OsError(String),
    Other(String),
}

impl Display for GpioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            GpioError::NotInitialized => format!("gpio register block is not mapped"),
            GpioError::AlreadyInitialized => format!("gpio register block is already mapped"),
            GpioError::InvalidPort(p) => format!("port {} is out of range", p),
            GpioError::InvalidMode(m) => format!("pin mode {} is not one of IN(1), OUT(2), ALT0(3)", m),
            GpioError::NotOutput(p) => format!("port {} is not configured as an output", p),
            GpioError::Busy(p) => format!("pin {} is busy", p),
            GpioError::PinNotFound(p) => format!("pin {} is not available", p),
            GpioError::PermissionDenied(s) => format!("permission denied: {}", s),
            GpioError::Unsupported(s) => format!("not supported: {}", s),
            GpioError::OsError(s) => format!("os error: {}", s),
            GpioError::Other(s) => format!("{}", s),
        })
    }
}

impl std::error::Error for GpioError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, strum::Display)]
pub enum PinMode {
    #[strum(serialize = "IN")]
    In = 1,
    #[strum(serialize = "OUT")]
    Out = 2,
    #[strum(serialize = "ALT0")]
    Alt0 = 3,
}

impl PinMode {
    pub const fn value(self) -> i32 {
        self as i32
    }

    pub fn table() -> Vec<(String, i32)> {
        PinMode::iter().map(|m| (m.to_string(), m.value())).collect()
    }
}

impl TryFrom<i32> for PinMode {
    type Error = GpioError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        PinMode::iter()
            .find(|m| m.value() == value)
            .ok_or(GpioError::InvalidMode(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Port(u8);

impl Port {
    pub fn new(port: i32, pin_count: u8) -> Result<Self, GpioError> {
        if port < 0 || port >= pin_count.min(BCM_PIN_COUNT) as i32 {
            return Err(GpioError::InvalidPort(port));
        }

        Ok(Port(port as u8))
    }

    pub fn number(&self) -> u8 {
        self.0
    }
}

impl Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// Levels are written through the set/clear registers, never read-modify-write.
pub trait GpioRegisters: Send {
    fn name(&self) -> String;
    fn set_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), GpioError>;
    fn set_high(&mut self, pin: u8) -> Result<(), GpioError>;
    fn set_low(&mut self, pin: u8) -> Result<(), GpioError>;
    fn level(&self, pin: u8) -> Result<bool, GpioError>;
}

pub type RegisterMapper = Box<dyn Fn() -> Result<Box<dyn GpioRegisters>, GpioError> + Send + Sync>;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum GpioBackend {
    Rppal,
    Simulated,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GpioConfigData {
    pub backend: GpioBackend,
    pub pin_count: u8,
}

impl Default for GpioConfigData {
    fn default() -> Self {
        Self {
            backend: GpioBackend::Simulated,
            pin_count: HEADER_PIN_COUNT,
        }
    }
}

impl GpioConfigData {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pin_count == 0 || self.pin_count > BCM_PIN_COUNT {
            return Err(ConfigError::InvalidEntry(format!(
                "invalid gpio config: pin_count must be between 1 and {}, got {}",
                BCM_PIN_COUNT, self.pin_count
            )));
        }

        Ok(())
    }
}

pub struct GpioController {
    config: GpioConfigData,
    mapper: RegisterMapper,
    registers: Option<Box<dyn GpioRegisters>>,
    modes: HashMap<Port, PinMode>,
}

impl GpioController {
    pub fn new(config: GpioConfigData) -> Self {
        let mapper: RegisterMapper = match config.backend {
            GpioBackend::Rppal => Box::new(|| Ok(Box::new(raw::RppalRegisters::new()?) as Box<dyn GpioRegisters>)),
            GpioBackend::Simulated => Box::new(|| Ok(Box::new(bcm::Bcm2835Registers::new(bcm::MemoryBlock::new())) as Box<dyn GpioRegisters>)),
        };

        Self::with_mapper(config, mapper)
    }

    pub fn with_mapper(config: GpioConfigData, mapper: RegisterMapper) -> Self {
        GpioController {
            config,
            mapper,
            registers: None,
            modes: HashMap::new(),
        }
    }

    pub fn pin_count(&self) -> u8 {
        self.config.pin_count.min(BCM_PIN_COUNT)
    }

    pub fn is_open(&self) -> bool {
        self.registers.is_some()
    }

    pub fn try_init(&mut self) -> Result<(), GpioError> {
        if self.registers.is_some() {
            return Err(GpioError::AlreadyInitialized);
        }

        let registers = (self.mapper)()?;
        debug!("Mapped GPIO register block ({})", registers.name());
        self.registers = Some(registers);
        self.modes.clear();
        Ok(())
    }

    /// Maps the register block. Failures are logged and reported as `false`.
    pub fn init(&mut self) -> bool {
        match self.try_init() {
            Ok(_) => true,
            Err(GpioError::AlreadyInitialized) => {
                warn!("GPIO init called while the register block is already mapped");
                false
            }
            Err(e) => {
                error!("Failed to map GPIO register block: {}", e);
                false
            }
        }
    }

    pub fn release(&mut self) {
        if let Some(registers) = self.registers.take() {
            debug!("Unmapped GPIO register block ({})", registers.name());
        }

        self.modes.clear();
    }

    pub fn port(&self, port: i32) -> Result<Port, GpioError> {
        Port::new(port, self.pin_count())
    }

    fn check_open(&self) -> Result<(), GpioError> {
        match self.registers.is_some() {
            true => Ok(()),
            false => Err(GpioError::NotInitialized),
        }
    }

    pub fn cfg(&mut self, port: i32, mode: i32) -> Result<(), GpioError> {
        self.check_open()?;
        let mode = PinMode::try_from(mode)?;
        let port = self.port(port)?;
        self.configure(port, mode)
    }

    pub fn configure(&mut self, port: Port, mode: PinMode) -> Result<(), GpioError> {
        let registers = self.registers.as_mut().ok_or(GpioError::NotInitialized)?;
        if port.number() >= self.config.pin_count {
            return Err(GpioError::InvalidPort(port.number() as i32));
        }

        registers.set_mode(port.number(), mode)?;
        debug!("{} -> {}", port, mode);
        self.modes.insert(port, mode);
        Ok(())
    }

    pub fn set(&mut self, port: i32, level: bool) -> Result<(), GpioError> {
        self.check_open()?;
        let port = self.port(port)?;
        self.write(port, level)
    }

    pub fn write(&mut self, port: Port, level: bool) -> Result<(), GpioError> {
        let registers = self.registers.as_mut().ok_or(GpioError::NotInitialized)?;
        match self.modes.get(&port) {
            Some(PinMode::Out) => (),
            _ => return Err(GpioError::NotOutput(port.number())),
        }

        match level {
            true => registers.set_high(port.number()),
            false => registers.set_low(port.number()),
        }
    }

    pub fn read(&self, port: i32) -> Result<bool, GpioError> {
        let registers = self.registers.as_ref().ok_or(GpioError::NotInitialized)?;
        let port = self.port(port)?;
        registers.level(port.number())
    }

    pub fn mode(&self, port: Port) -> Option<PinMode> {
        self.modes.get(&port).copied()
    }
}

impl Drop for GpioController {
    fn drop(&mut self) {
        self.release();
    }
}
