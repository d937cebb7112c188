use crate::bus::{i2c_sim::SimulatedI2c, i2c_sysfs::SysfsI2c, I2cTransport};
use log::{debug, error, warn};
use parking_lot::Mutex;
use rppal::i2c::{Error, I2c};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

pub const MAX_ADDRESS: u8 = 0x7f;

#[derive(Debug, PartialEq)]
pub enum I2CError {
    BusNotFound(u8),
    NotInitialized,
    AlreadyInitialized,
    InvalidAddress(u16),
    NotSupported,
    HardwareError(String),
    OsError(String),
    Other(String),
}

impl Display for I2CError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            I2CError::BusNotFound(bus_id) => format!("I2C bus {} does not exist", bus_id),
            I2CError::NotInitialized => format!("I2C bus is not open"),
            I2CError::AlreadyInitialized => format!("I2C bus is already open"),
            I2CError::InvalidAddress(device_address) => format!("invalid slave address: {}", device_address),
            I2CError::NotSupported => format!("not supported"),
            I2CError::HardwareError(msg) => format!("hardware error: {}", msg),
            I2CError::OsError(msg) => format!("os error: {}", msg),
            I2CError::Other(msg) => format!("{}", msg),
        })
    }
}

impl std::error::Error for I2CError {}

fn rppal_map_err(err: Error, default_err_msg: &str) -> I2CError {
    match err {
        Error::Io(e) => I2CError::HardwareError(format!("I/O error: {}", e)),
        Error::InvalidSlaveAddress(addr) => I2CError::InvalidAddress(addr),
        Error::FeatureNotSupported => I2CError::NotSupported,
        _ => I2CError::Other(default_err_msg.to_string()),
    }
}

pub struct RppalI2c {
    bus: I2c,
    slave_address: Option<u8>,
}

impl RppalI2c {
    pub fn open(bus_id: u8) -> Result<Self, I2CError> {
        let bus = I2c::with_bus(bus_id)
            .map_err(|err| rppal_map_err(err, &format!("Internal RPPAL error while opening I2C bus {}", bus_id)))?;

        Ok(RppalI2c { bus, slave_address: None })
    }

    fn select(&mut self, address: u8) -> Result<(), I2CError> {
        if self.slave_address != Some(address) {
            self.bus.set_slave_address(address as u16)
                .map_err(|err| rppal_map_err(err, "Internal RPPAL error while setting slave address"))?;
            self.slave_address = Some(address);
        }

        Ok(())
    }
}

impl I2cTransport for RppalI2c {
    fn name(&self) -> String {
        "rppal".to_string()
    }

    fn write(&mut self, address: u8, data: &[u8]) -> Result<usize, I2CError> {
        self.select(address)?;
        self.bus.write(data)
            .map_err(|err| rppal_map_err(err, "Internal RPPAL error while writing"))
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, I2CError> {
        self.select(address)?;
        self.bus.read(buf)
            .map_err(|err| rppal_map_err(err, "Internal RPPAL error while reading"))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum I2cBackend {
    Rppal,
    Sysfs,
    Simulated,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct I2cConfigData {
    pub backend: I2cBackend,
    pub bus_id: u8,
}

impl Default for I2cConfigData {
    fn default() -> Self {
        Self {
            backend: I2cBackend::Simulated,
            bus_id: 1,
        }
    }
}

pub type TransportConnector = Box<dyn Fn(u8) -> Result<Box<dyn I2cTransport>, I2CError> + Send + Sync>;

struct I2cSession {
    id: Uuid,
    transport: Box<dyn I2cTransport>,
}

pub struct I2cController {
    config: I2cConfigData,
    connector: TransportConnector,
    session: Mutex<Option<I2cSession>>,
}

impl I2cController {
    pub fn new(config: I2cConfigData) -> Self {
        let connector: TransportConnector = match config.backend {
            I2cBackend::Rppal => Box::new(|bus_id| Ok(Box::new(RppalI2c::open(bus_id)?) as Box<dyn I2cTransport>)),
            I2cBackend::Sysfs => Box::new(|bus_id| Ok(Box::new(SysfsI2c::open(bus_id)?) as Box<dyn I2cTransport>)),
            I2cBackend::Simulated => Box::new(|_| Ok(Box::new(SimulatedI2c::new()) as Box<dyn I2cTransport>)),
        };

        Self::with_connector(config, connector)
    }

    pub fn with_connector(config: I2cConfigData, connector: TransportConnector) -> Self {
        I2cController {
            config,
            connector,
            session: Mutex::new(None),
        }
    }

    pub fn bus_id(&self) -> u8 {
        self.config.bus_id
    }

    pub fn try_init(&self) -> Result<Uuid, I2CError> {
        let mut session = self.session.lock();
        if session.is_some() {
            return Err(I2CError::AlreadyInitialized);
        }

        let transport = (self.connector)(self.config.bus_id)?;
        let id = Uuid::new_v4();
        debug!("Opened I2C bus {} via {} (session {})", self.config.bus_id, transport.name(), id);
        *session = Some(I2cSession { id, transport });
        Ok(id)
    }

    /// Opens the bus device. Failures are logged and reported as `false`.
    pub fn init(&self) -> bool {
        match self.try_init() {
            Ok(_) => true,
            Err(I2CError::AlreadyInitialized) => {
                warn!("I2C init called while bus {} is already open", self.config.bus_id);
                false
            }
            Err(e) => {
                error!("Failed to open I2C bus {}: {}", self.config.bus_id, e);
                false
            }
        }
    }

    pub fn initialized(&self) -> bool {
        self.session.lock().is_some()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session.lock().as_ref().map(|s| s.id)
    }

    pub fn release(&self) {
        if let Some(session) = self.session.lock().take() {
            debug!("Closed I2C bus {} (session {})", self.config.bus_id, session.id);
        }
    }

    pub fn write(&self, address: u8, data: &[u8]) -> Result<(), I2CError> {
        self.write_in_session(None, address, data)
    }

    pub fn read(&self, address: u8, buf: &mut [u8]) -> Result<(), I2CError> {
        self.read_in_session(None, address, buf)
    }

    // session check and transfer happen under one lock
    pub fn write_in_session(&self, expected: Option<Uuid>, address: u8, data: &[u8]) -> Result<(), I2CError> {
        let mut guard = self.session.lock();
        let session = open_session(&mut guard, expected)?;
        check_address(address)?;

        let written = session.transport.write(address, data)?;
        if written != data.len() {
            return Err(I2CError::HardwareError(format!(
                "short write to 0x{:02x}: {} of {} byte(s)", address, written, data.len()
            )));
        }

        debug!("I2C bus {} -> 0x{:02x}: {:02x?}", self.config.bus_id, address, data);
        Ok(())
    }

    pub fn read_in_session(&self, expected: Option<Uuid>, address: u8, buf: &mut [u8]) -> Result<(), I2CError> {
        let mut guard = self.session.lock();
        let session = open_session(&mut guard, expected)?;
        check_address(address)?;

        let read = session.transport.read(address, buf)?;
        if read != buf.len() {
            return Err(I2CError::HardwareError(format!(
                "short read from 0x{:02x}: {} of {} byte(s)", address, read, buf.len()
            )));
        }

        debug!("I2C bus {} <- 0x{:02x}: {:02x?}", self.config.bus_id, address, buf);
        Ok(())
    }
}

fn check_address(address: u8) -> Result<(), I2CError> {
    match address <= MAX_ADDRESS {
        true => Ok(()),
        false => Err(I2CError::InvalidAddress(address as u16)),
    }
}

fn open_session(session: &mut Option<I2cSession>, expected: Option<Uuid>) -> Result<&mut I2cSession, I2CError> {
    match session {
        Some(s) if expected.map_or(true, |id| id == s.id) => Ok(s),
        _ => Err(I2CError::NotInitialized),
    }
}

impl Drop for I2cController {
    fn drop(&mut self) {
        self.release();
    }
}
