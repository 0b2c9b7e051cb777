// src/common/hal_traits.rs

use core::fmt::Debug;

/// Abstraction for timer/delay operations required by the driver.
///
/// All protocol waits are fixed sleeps; the driver never needs a clock.
pub trait Si1132Timer {
    /// Delay for at least the specified number of microseconds.
    fn delay_us(&mut self, us: u32);

    /// Delay for at least the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Register-level access to a device on a two-wire bus.
///
/// Each call is one complete bus transaction that either succeeds or fails.
/// Implementations must not retry internally.
pub trait Si1132Bus {
    /// Associated error type for bus errors.
    type Error: Debug;

    /// Writes `payload` starting at `register` on the device at `device`.
    fn write_bytes(&mut self, device: u8, register: u8, payload: &[u8]) -> Result<(), Self::Error>;

    /// Reads a single register.
    fn read_byte(&mut self, device: u8, register: u8) -> Result<u8, Self::Error>;

    /// Reads consecutive registers starting at `register` into `buf`.
    ///
    /// Returns the number of bytes actually received. The driver treats any
    /// count other than `buf.len()` as a failed read.
    fn read_bytes(&mut self, device: u8, register: u8, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Largest payload sent in a single write transaction by [`HalInterface`].
#[cfg(any(feature = "impl-native", test))]
const MAX_WRITE_CHUNK: usize = 8;

/// Adapts an `embedded-hal` v1.0 I²C bus and delay provider to the driver's
/// [`Si1132Bus`] and [`Si1132Timer`] traits.
///
/// Requires the `impl-native` feature.
#[cfg(any(feature = "impl-native", test))]
#[derive(Debug)]
pub struct HalInterface<I2C, D> {
    i2c: I2C,
    delay: D,
}

#[cfg(any(feature = "impl-native", test))]
impl<I2C, D> HalInterface<I2C, D>
where
    I2C: embedded_hal::i2c::I2c,
    D: embedded_hal::delay::DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        HalInterface { i2c, delay }
    }

    /// Return the underlying I²C peripheral and delay provider.
    pub fn free(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

#[cfg(any(feature = "impl-native", test))]
impl<I2C, D> Si1132Bus for HalInterface<I2C, D>
where
    I2C: embedded_hal::i2c::I2c,
    D: embedded_hal::delay::DelayNs,
{
    type Error = I2C::Error;

    fn write_bytes(&mut self, device: u8, register: u8, payload: &[u8]) -> Result<(), Self::Error> {
        // Register address auto-increments, so long payloads are split into
        // back-to-back transactions at the matching offset.
        let mut frame = [0u8; 1 + MAX_WRITE_CHUNK];
        for (i, chunk) in payload.chunks(MAX_WRITE_CHUNK).enumerate() {
            let offset = (i * MAX_WRITE_CHUNK) as u8;
            frame[0] = register.wrapping_add(offset);
            frame[1..=chunk.len()].copy_from_slice(chunk);
            self.i2c.write(device, &frame[..=chunk.len()])?;
        }
        Ok(())
    }

    fn read_byte(&mut self, device: u8, register: u8) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(device, core::slice::from_ref(&register), &mut buf)?;
        Ok(buf[0])
    }

    fn read_bytes(&mut self, device: u8, register: u8, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.i2c.write_read(device, core::slice::from_ref(&register), buf)?;
        Ok(buf.len())
    }
}

#[cfg(any(feature = "impl-native", test))]
impl<I2C, D> Si1132Timer for HalInterface<I2C, D>
where
    I2C: embedded_hal::i2c::I2c,
    D: embedded_hal::delay::DelayNs,
{
    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
