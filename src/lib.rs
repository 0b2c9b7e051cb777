// src/lib.rs

//! Blocking driver for the Silicon Labs Si1132 UV index and ambient light
//! sensor on I2C.
//!
//! The driver is generic over a small bus/timer trait pair
//! ([`Si1132Bus`], [`Si1132Timer`]). With the `impl-native` feature,
//! [`HalInterface`](common::HalInterface) adapts any `embedded-hal` 1.0 `I2c`
//! and `DelayNs` pair.
//!
//! ```ignore
//! use si1132::{common::HalInterface, Si1132};
//!
//! let mut sensor = Si1132::new(HalInterface::new(i2c, delay));
//! sensor.initialize()?;
//! sensor.configure()?;
//! let sample = sensor.trigger_and_read()?;
//! let uv_index = sample.uv_index();
//! ```

#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod common;
pub mod driver;

// Re-export key types for convenience
pub use common::{
    AdcGain, ChipIdentity, Diagnostic, DiagnosticSink, DriverState, MeasurementSample, Si1132Bus,
    Si1132Config, Si1132Error, Si1132Timer,
};
pub use driver::Si1132;
