use crate::{
    delay::{delay, delay_checked},
    errors::ArgumentError,
};
use std::time::{Duration, Instant};

#[test]
fn delay_blocks_at_least_duration() {
    let start = Instant::now();
    delay(2_000);
    assert!(start.elapsed() >= Duration::from_micros(2_000));
}

#[test]
fn zero_delay() {
    delay(0);
    assert_eq!(delay_checked(0), Ok(()));
}

#[test]
fn negative_delay_rejected() {
    assert!(matches!(delay_checked(-1), Err(ArgumentError(_))));
    assert!(delay_checked(u32::MAX as i64 + 1).is_err());
}

#[test]
fn checked_delay_blocks() {
    let start = Instant::now();
    assert_eq!(delay_checked(1_000), Ok(()));
    assert!(start.elapsed() >= Duration::from_micros(1_000));
}
