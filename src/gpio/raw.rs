use log::debug;
use rppal::gpio::{Error, Gpio, IoPin, Level, Mode};
use std::collections::HashMap;

use super::{GpioError, GpioRegisters, PinMode};

fn rppal_map_err(err: Error, default_err_msg: &str) -> GpioError {
    match err {
        Error::PinNotAvailable(p) => GpioError::PinNotFound(p),
        Error::PinUsed(p) => GpioError::Busy(p),
        Error::PermissionDenied(s) => GpioError::PermissionDenied(s),
        Error::UnknownModel => GpioError::Unsupported("unknown SoC model".to_string()),
        Error::Io(e) => GpioError::OsError(format!("{}: {}", default_err_msg, e)),
        _ => GpioError::Other(String::from(default_err_msg)),
    }
}

const fn rppal_mode(mode: PinMode) -> Mode {
    match mode {
        PinMode::In => Mode::Input,
        PinMode::Out => Mode::Output,
        PinMode::Alt0 => Mode::Alt0,
    }
}

// RPPAL maps /dev/gpiomem on construction and unmaps it on drop
pub struct RppalRegisters {
    gpio_controller: Gpio,
    owned_pins: HashMap<u8, IoPin>,
}

impl RppalRegisters {
    pub fn new() -> Result<Self, GpioError> {
        let gpio = Gpio::new()
            .map_err(|err| rppal_map_err(err, "Internal RPPAL error while initializing Gpio interface"))?;

        Ok(RppalRegisters {
            gpio_controller: gpio,
            owned_pins: HashMap::new(),
        })
    }

    fn pin(&mut self, bcm_id: u8) -> Result<&mut IoPin, GpioError> {
        if !self.owned_pins.contains_key(&bcm_id) {
            let pin = self.gpio_controller.get(bcm_id)
                .map_err(|err| rppal_map_err(err, &format!("Internal RPPAL error while opening pin (BCM {})", bcm_id)))?;

            let mode = pin.mode();
            let mut io = pin.into_io(mode);
            // pins keep their function and level after the block is unmapped
            io.set_reset_on_drop(false);
            debug!("Claimed BCM {} (current mode {:?})", bcm_id, mode);
            self.owned_pins.insert(bcm_id, io);
        }

        self.owned_pins.get_mut(&bcm_id).ok_or(GpioError::PinNotFound(bcm_id))
    }
}

impl GpioRegisters for RppalRegisters {
    fn name(&self) -> String {
        "rppal".to_string()
    }

    fn set_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), GpioError> {
        self.pin(pin)?.set_mode(rppal_mode(mode));
        Ok(())
    }

    fn set_high(&mut self, pin: u8) -> Result<(), GpioError> {
        self.pin(pin)?.set_high();
        Ok(())
    }

    fn set_low(&mut self, pin: u8) -> Result<(), GpioError> {
        self.pin(pin)?.set_low();
        Ok(())
    }

    fn level(&self, pin: u8) -> Result<bool, GpioError> {
        if let Some(io) = self.owned_pins.get(&pin) {
            return Ok(io.read() == Level::High);
        }

        let pin = self.gpio_controller.get(pin)
            .map_err(|err| rppal_map_err(err, &format!("Internal RPPAL error while reading pin (BCM {})", pin)))?;

        Ok(pin.read() == Level::High)
    }
}
