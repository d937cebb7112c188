use log::{info, warn, LevelFilter};
use rpi_io::{
    bus::i2c::I2cController,
    config::{ConfigError, Configuration},
    delay::delay,
    drivers::pcf8574::Pcf8574Driver,
    gpio::{GpioController, PinMode},
};
use simple_logger::SimpleLogger;
use std::{
    env,
    error::Error,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

const DEFAULT_CONFIG_PATH: &str = "config.json";
const BLINK_PORT: i32 = 17;
const CYCLES: u32 = 64;
const STEP_MICROS: u32 = 250_000;

fn load_config(path: &str) -> Result<Configuration, ConfigError> {
    match Configuration::from_path(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::MissingEntry(msg)) => {
            warn!("{}, writing default configuration", msg);
            let config = Configuration::default();
            config.to_path(path)?;
            Ok(config)
        }
        Err(e) => Err(e),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    SimpleLogger::new().with_level(LevelFilter::Debug).init()?;

    let path = env::args().nth(1).unwrap_or(DEFAULT_CONFIG_PATH.to_string());
    info!("Loading configuration from {}", path);
    let config = load_config(&path)?;

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))?;

    let mut gpio = GpioController::new(config.gpio_section.clone());
    if !gpio.init() {
        return Err("gpio init failed".into());
    }
    gpio.cfg(BLINK_PORT, PinMode::Out.value())?;

    let i2c = I2cController::new(config.i2c_section.clone());
    if !i2c.init() {
        return Err("i2c init failed".into());
    }

    let mut pcf8574 = Pcf8574Driver::new(config.pcf8574_section.clone())?;
    pcf8574.init(&i2c)?;

    info!("Running, press Ctrl-C to stop");
    let mut cycle = 0;
    while running.load(Ordering::SeqCst) && cycle < CYCLES {
        gpio.set(BLINK_PORT, cycle % 2 == 0)?;
        pcf8574.write(1 << (cycle % 8))?;
        delay(STEP_MICROS);
        cycle += 1;
    }

    info!("Stopping after {} cycle(s)", cycle);
    gpio.set(BLINK_PORT, false)?;
    pcf8574.release();
    i2c.release();
    gpio.release();
    Ok(())
}
