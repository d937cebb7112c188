pub mod bus;
pub mod config;
pub mod delay;
pub mod drivers;
pub mod errors;
pub mod gpio;

#[cfg(test)]
mod tests;
