use super::{i2c::I2CError, I2cTransport};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

#[derive(Debug, Clone, PartialEq)]
pub enum Transaction {
    Write { address: u8, data: Vec<u8> },
    Read { address: u8, len: usize },
}

#[derive(Debug, Clone, Default)]
pub struct TransactionLog(Arc<Mutex<Vec<Transaction>>>);

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, transaction: Transaction) {
        self.0.lock().push(transaction);
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.0.lock().clone()
    }

    pub fn writes_to(&self, address: u8) -> Vec<Vec<u8>> {
        self.0.lock().iter().filter_map(|t| match t {
            Transaction::Write { address: a, data } if *a == address => Some(data.clone()),
            _ => None,
        }).collect()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

// every device is an 8-bit latch; unwritten addresses read 0xff
pub struct SimulatedI2c {
    log: TransactionLog,
    latches: HashMap<u8, u8>,
}

impl SimulatedI2c {
    pub fn new() -> Self {
        Self::with_log(TransactionLog::new())
    }

    pub fn with_log(log: TransactionLog) -> Self {
        SimulatedI2c { log, latches: HashMap::new() }
    }
}

impl Default for SimulatedI2c {
    fn default() -> Self {
        Self::new()
    }
}

impl I2cTransport for SimulatedI2c {
    fn name(&self) -> String {
        "simulated".to_string()
    }

    fn write(&mut self, address: u8, data: &[u8]) -> Result<usize, I2CError> {
        if let Some(last) = data.last() {
            self.latches.insert(address, *last);
        }

        self.log.push(Transaction::Write { address, data: data.to_vec() });
        Ok(data.len())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, I2CError> {
        let value = self.latches.get(&address).copied().unwrap_or(0xff);
        buf.fill(value);
        self.log.push(Transaction::Read { address, len: buf.len() });
        Ok(buf.len())
    }
}
