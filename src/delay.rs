use std::{thread, time::Duration};

use crate::errors::ArgumentError;

pub fn delay(micros: u32) {
    if micros == 0 {
        return;
    }

    thread::sleep(Duration::from_micros(micros as u64));
}

/// `delay` for untyped callers: negative or oversized durations are rejected.
pub fn delay_checked(micros: i64) -> Result<(), ArgumentError> {
    let micros = u32::try_from(micros)
        .map_err(|_| ArgumentError(format!("delay of {}us is out of range", micros)))?;

    delay(micros);
    Ok(())
}
