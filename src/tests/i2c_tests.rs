use crate::bus::{
    i2c::{I2CError, I2cBackend, I2cConfigData, I2cController},
    i2c_sim::{SimulatedI2c, Transaction, TransactionLog},
    I2cTransport,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

pub fn simulated_i2c() -> (I2cController, TransactionLog) {
    let log = TransactionLog::new();
    let shared = log.clone();
    let i2c = I2cController::with_connector(
        I2cConfigData::default(),
        Box::new(move |_| Ok(Box::new(SimulatedI2c::with_log(shared.clone())) as Box<dyn I2cTransport>)),
    );

    (i2c, log)
}

/// Accepts the slave address but transfers fewer bytes than asked for.
struct ShortTransport;

impl I2cTransport for ShortTransport {
    fn name(&self) -> String {
        "short".to_string()
    }

    fn write(&mut self, _address: u8, data: &[u8]) -> Result<usize, I2CError> {
        Ok(data.len().saturating_sub(1))
    }

    fn read(&mut self, _address: u8, _buf: &mut [u8]) -> Result<usize, I2CError> {
        Err(I2CError::HardwareError("nack".to_string()))
    }
}

#[test]
fn init_and_initialized() {
    let (i2c, _) = simulated_i2c();
    assert!(!i2c.initialized());
    assert_eq!(i2c.session_id(), None);
    assert!(i2c.init());
    assert!(i2c.initialized());
    assert!(i2c.session_id().is_some());
}

#[test]
fn double_init_fails() {
    let (i2c, _) = simulated_i2c();
    assert!(i2c.init());
    let session = i2c.session_id();
    assert!(!i2c.init());
    assert_eq!(i2c.try_init(), Err(I2CError::AlreadyInitialized));
    // the original session survives
    assert_eq!(i2c.session_id(), session);
}

#[test]
fn init_failure_is_false() {
    let i2c = I2cController::with_connector(
        I2cConfigData::default(),
        Box::new(|bus_id| Err(I2CError::BusNotFound(bus_id))),
    );

    assert!(!i2c.init());
    assert!(!i2c.initialized());
    assert_eq!(i2c.try_init(), Err(I2CError::BusNotFound(1)));
}

#[test]
fn double_release() {
    let (i2c, _) = simulated_i2c();
    i2c.release();
    assert!(i2c.init());
    i2c.release();
    i2c.release();
    assert!(!i2c.initialized());
}

#[test]
fn reinit_opens_new_session() {
    let (i2c, _) = simulated_i2c();
    assert!(i2c.init());
    let first = i2c.session_id();
    i2c.release();
    assert!(i2c.init());
    assert!(i2c.session_id().is_some());
    assert_ne!(i2c.session_id(), first);
}

#[test]
fn write_and_read() {
    let (i2c, log) = simulated_i2c();
    assert!(i2c.init());

    assert_eq!(i2c.write(0x27, &[0x5a]), Ok(()));
    let mut buf = [0u8; 1];
    assert_eq!(i2c.read(0x27, &mut buf), Ok(()));
    assert_eq!(buf, [0x5a]);

    let mut untouched = [0u8; 2];
    assert_eq!(i2c.read(0x21, &mut untouched), Ok(()));
    assert_eq!(untouched, [0xff, 0xff]);

    assert_eq!(
        log.transactions(),
        vec![
            Transaction::Write { address: 0x27, data: vec![0x5a] },
            Transaction::Read { address: 0x27, len: 1 },
            Transaction::Read { address: 0x21, len: 2 },
        ]
    );
}

#[test]
fn transfers_require_open_bus() {
    let (i2c, log) = simulated_i2c();
    assert_eq!(i2c.write(0x20, &[0x00]), Err(I2CError::NotInitialized));
    let mut buf = [0u8; 1];
    assert_eq!(i2c.read(0x20, &mut buf), Err(I2CError::NotInitialized));

    assert!(i2c.init());
    i2c.release();
    assert_eq!(i2c.write(0x20, &[0x00]), Err(I2CError::NotInitialized));
    assert!(log.is_empty());
}

#[test]
fn rejects_ten_bit_addresses() {
    let (i2c, log) = simulated_i2c();
    assert!(i2c.init());
    assert_eq!(i2c.write(0x80, &[0x00]), Err(I2CError::InvalidAddress(0x80)));
    assert!(log.is_empty());
}

#[test]
fn session_mismatch() {
    let (i2c, log) = simulated_i2c();
    assert!(i2c.init());
    let old = i2c.session_id();
    i2c.release();
    assert!(i2c.init());

    assert_eq!(i2c.write_in_session(old, 0x20, &[0x01]), Err(I2CError::NotInitialized));
    assert_eq!(i2c.write_in_session(i2c.session_id(), 0x20, &[0x01]), Ok(()));
    assert_eq!(log.len(), 1);
}

#[test]
fn short_transfers_are_errors() {
    let i2c = I2cController::with_connector(
        I2cConfigData::default(),
        Box::new(|_| Ok(Box::new(ShortTransport) as Box<dyn I2cTransport>)),
    );
    assert!(i2c.init());

    assert!(matches!(i2c.write(0x20, &[0x01, 0x02]), Err(I2CError::HardwareError(_))));
    let mut buf = [0u8; 1];
    assert_eq!(i2c.read(0x20, &mut buf), Err(I2CError::HardwareError("nack".to_string())));
    // a failed transfer does not close the bus
    assert!(i2c.initialized());
}

#[test]
fn simulated_backend_from_config() {
    let i2c = I2cController::new(I2cConfigData { backend: I2cBackend::Simulated, bus_id: 3 });
    assert_eq!(i2c.bus_id(), 3);
    assert!(i2c.init());
    assert_eq!(i2c.write(0x38, &[0xaa]), Ok(()));
}

struct CountingTransport {
    drops: Arc<AtomicUsize>,
}

impl I2cTransport for CountingTransport {
    fn name(&self) -> String {
        "counting".to_string()
    }

    fn write(&mut self, _address: u8, data: &[u8]) -> Result<usize, I2CError> {
        Ok(data.len())
    }

    fn read(&mut self, _address: u8, buf: &mut [u8]) -> Result<usize, I2CError> {
        Ok(buf.len())
    }
}

impl Drop for CountingTransport {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

fn counting_i2c(drops: &Arc<AtomicUsize>) -> I2cController {
    let drops = drops.clone();
    I2cController::with_connector(
        I2cConfigData::default(),
        Box::new(move |_| Ok(Box::new(CountingTransport { drops: drops.clone() }) as Box<dyn I2cTransport>)),
    )
}

#[test]
fn drop_closes_open_bus() {
    let drops = Arc::new(AtomicUsize::new(0));
    {
        let i2c = counting_i2c(&drops);
        assert!(i2c.init());
        assert_eq!(drops.load(Ordering::SeqCst), 0);
    }
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn release_closes_exactly_once() {
    let drops = Arc::new(AtomicUsize::new(0));
    let i2c = counting_i2c(&drops);
    assert!(i2c.init());
    i2c.release();
    i2c.release();
    drop(i2c);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn closed_bus_reported_before_bad_address() {
    let (i2c, _) = simulated_i2c();
    assert_eq!(i2c.write(0x80, &[0x00]), Err(I2CError::NotInitialized));
}
