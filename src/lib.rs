//! Async driver for the Sensirion SHT31 humidity/temperature sensor.
//!
//! The driver is platform independent: it speaks through any bus
//! implementing [`embedded_hal_async::i2c::I2c`] and waits through any
//! [`embedded_hal_async::delay::DelayNs`]. See
//! `demos/read-sht31-sensor-rp.rs` for a complete RP2040 setup.

#![no_std]

// This module must go first so the others see its macros.
mod fmt;

#[cfg(test)]
extern crate std;

mod bus;
mod sht31;

pub use sht31::{Address, Repeatability, SHT31Sensor, SHT31Status};

use thiserror::Error;

/// One single-shot answer from the sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SHT31Measurement {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub humidity: f32,
}

/// Ways a sensor transaction can fail.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SHT31Error<E> {
    /// The underlying bus transfer failed.
    #[error("i2c bus error")]
    I2c(E),
    /// A word read from the sensor did not match its trailing checksum.
    #[error("checksum mismatch: frame carried {expected:#04x}, computed {computed:#04x}")]
    Crc {
        /// Checksum byte the frame carried.
        expected: u8,
        /// Checksum computed from the received data word.
        computed: u8,
    },
}
