use parking_lot::Mutex;
use std::sync::Arc;

use super::{GpioError, GpioRegisters, PinMode, BCM_PIN_COUNT};

pub const GPFSEL0: usize = 0x00;
pub const GPSET0: usize = 0x1c / 4;
pub const GPCLR0: usize = 0x28 / 4;
pub const GPLEV0: usize = 0x34 / 4;
pub const REGISTER_WORDS: usize = 0xb4 / 4;

const FSEL_INPUT: u32 = 0b000;
const FSEL_OUTPUT: u32 = 0b001;
const FSEL_ALT0: u32 = 0b100;
const FSEL_MASK: u32 = 0b111;

const fn fsel_bits(mode: PinMode) -> u32 {
    match mode {
        PinMode::In => FSEL_INPUT,
        PinMode::Out => FSEL_OUTPUT,
        PinMode::Alt0 => FSEL_ALT0,
    }
}

pub const fn fsel_position(pin: u8) -> (usize, u32) {
    (GPFSEL0 + pin as usize / 10, (pin as u32 % 10) * 3)
}

pub const fn bank_position(base: usize, pin: u8) -> (usize, u32) {
    (base + pin as usize / 32, 1 << (pin % 32))
}

// GPSET/GPCLR writes act on GPLEV like the hardware does
#[derive(Clone)]
pub struct MemoryBlock {
    words: Arc<Mutex<[u32; REGISTER_WORDS]>>,
}

impl MemoryBlock {
    pub fn new() -> Self {
        MemoryBlock {
            words: Arc::new(Mutex::new([0; REGISTER_WORDS])),
        }
    }

    /// Words past the end of the block read as 0.
    pub fn read(&self, offset: usize) -> u32 {
        self.words.lock().get(offset).copied().unwrap_or(0)
    }

    /// Writes past the end of the block are dropped.
    pub fn write(&self, offset: usize, value: u32) {
        let mut words = self.words.lock();
        match offset {
            o if o == GPSET0 || o == GPSET0 + 1 => words[GPLEV0 + (o - GPSET0)] |= value,
            o if o == GPCLR0 || o == GPCLR0 + 1 => words[GPLEV0 + (o - GPCLR0)] &= !value,
            o => {
                if let Some(word) = words.get_mut(o) {
                    *word = value;
                }
            }
        }
    }

    pub fn fsel(&self, pin: u8) -> u32 {
        let (offset, shift) = fsel_position(pin);
        (self.read(offset) >> shift) & FSEL_MASK
    }

    pub fn level(&self, pin: u8) -> bool {
        let (offset, bit) = bank_position(GPLEV0, pin);
        self.read(offset) & bit != 0
    }
}

impl Default for MemoryBlock {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Bcm2835Registers {
    block: MemoryBlock,
}

impl Bcm2835Registers {
    pub fn new(block: MemoryBlock) -> Self {
        Bcm2835Registers { block }
    }

    fn check_pin(pin: u8) -> Result<(), GpioError> {
        match pin < BCM_PIN_COUNT {
            true => Ok(()),
            false => Err(GpioError::PinNotFound(pin)),
        }
    }
}

impl GpioRegisters for Bcm2835Registers {
    fn name(&self) -> String {
        "bcm2835".to_string()
    }

    fn set_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), GpioError> {
        Self::check_pin(pin)?;
        // function-select words have no set/clear twins, so this one is a
        // read-modify-write of a single 3-bit field
        let (offset, shift) = fsel_position(pin);
        let value = self.block.read(offset) & !(FSEL_MASK << shift);
        self.block.write(offset, value | (fsel_bits(mode) << shift));
        Ok(())
    }

    fn set_high(&mut self, pin: u8) -> Result<(), GpioError> {
        Self::check_pin(pin)?;
        let (offset, bit) = bank_position(GPSET0, pin);
        self.block.write(offset, bit);
        Ok(())
    }

    fn set_low(&mut self, pin: u8) -> Result<(), GpioError> {
        Self::check_pin(pin)?;
        let (offset, bit) = bank_position(GPCLR0, pin);
        self.block.write(offset, bit);
        Ok(())
    }

    fn level(&self, pin: u8) -> Result<bool, GpioError> {
        Self::check_pin(pin)?;
        Ok(self.block.level(pin))
    }
}
