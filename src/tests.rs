mod delay_tests;
mod errors_tests;
mod i2c_tests;
