// src/driver/io_helpers.rs

use super::Si1132;
use crate::common::{
    diagnostics::{Diagnostic, DiagnosticSink},
    error::Si1132Error,
    hal_traits::{Si1132Bus, Si1132Timer},
};
use core::time::Duration;
use nb::Result as NbResult;

// Implementation block for register I/O and retry helpers
impl<IF, D> Si1132<IF, D>
where
    IF: Si1132Bus + Si1132Timer,
    D: DiagnosticSink,
{
    /// Writes one register.
    pub(super) fn write_register(&mut self, register: u8, value: u8) -> Result<(), Si1132Error<IF::Error>> {
        let address = self.address();
        self.interface
            .write_bytes(address, register, &[value])
            .map_err(|e| self.bus_error(register, e))
    }

    /// Reads one register.
    pub(super) fn read_register(&mut self, register: u8) -> Result<u8, Si1132Error<IF::Error>> {
        let address = self.address();
        self.interface
            .read_byte(address, register)
            .map_err(|e| self.bus_error(register, e))
    }

    /// Burst-reads `buf.len()` consecutive registers. A short read is an error.
    pub(super) fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Si1132Error<IF::Error>> {
        let address = self.address();
        let got = self
            .interface
            .read_bytes(address, register, buf)
            .map_err(|e| self.bus_error(register, e))?;

        if got != buf.len() {
            let expected = buf.len();
            self.emit(Diagnostic::ShortRead { register, expected, got });
            return Err(Si1132Error::ShortRead { register, expected, got });
        }
        Ok(())
    }

    /// Sleeps through the injected timer.
    pub(super) fn pause(&mut self, duration: Duration) {
        self.interface.delay_us(duration.as_micros() as u32);
    }

    /// Drives a non-blocking poll (`f`) until it stops returning `WouldBlock`
    /// or `attempts` calls have been made. `f` receives the attempt number and
    /// is responsible for any pause between attempts.
    ///
    /// Returns `Ok(None)` when the attempts are exhausted.
    pub(super) fn poll_with_retries<FN, T>(
        &mut self,
        attempts: usize,
        mut f: FN,
    ) -> Result<Option<T>, Si1132Error<IF::Error>>
    where
        FN: FnMut(&mut Self, usize) -> NbResult<T, Si1132Error<IF::Error>>,
    {
        for attempt in 0..attempts {
            match f(self, attempt) {
                Ok(result) => return Ok(Some(result)),
                Err(nb::Error::WouldBlock) => continue,
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
        Ok(None)
    }

    fn bus_error(&mut self, register: u8, e: IF::Error) -> Si1132Error<IF::Error> {
        self.emit(Diagnostic::BusError { register });
        Si1132Error::Transport(e)
    }
}

// --- Unit Tests for I/O Helpers ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::diagnostics::DiagnosticLog;
    use crate::driver::mock::{MockBusError, MockSi1132};

    fn driver() -> Si1132<MockSi1132, DiagnosticLog<16>> {
        Si1132::with_diagnostics(MockSi1132::si1132(), DiagnosticLog::new())
    }

    #[test]
    fn test_register_round_trip() {
        let mut drv = driver();
        drv.write_register(0x13, 0x7B).unwrap();
        assert_eq!(drv.read_register(0x13).unwrap(), 0x7B);
        assert_eq!(drv.interface.writes[0], (0x13, 0x7B));
    }

    #[test]
    fn test_bus_error_is_reported() {
        let mut drv = driver();
        drv.interface.fail_register = Some(0x20);
        assert_eq!(drv.read_register(0x20), Err(Si1132Error::Transport(MockBusError)));
        assert!(drv.diagnostics().contains(&Diagnostic::BusError { register: 0x20 }));
    }

    #[test]
    fn test_short_burst_read() {
        let mut drv = driver();
        drv.interface.short_read = Some((0x22, 3));
        let mut buf = [0u8; 4];
        assert_eq!(
            drv.read_registers(0x22, &mut buf),
            Err(Si1132Error::ShortRead { register: 0x22, expected: 4, got: 3 })
        );
        assert!(drv.diagnostics().contains(&Diagnostic::ShortRead { register: 0x22, expected: 4, got: 3 }));
    }

    #[test]
    fn test_poll_with_retries_outcomes() {
        let mut drv = driver();

        let ready: Option<u8> = drv
            .poll_with_retries(5, |d, attempt| {
                d.pause(Duration::from_millis(1));
                if attempt < 2 { Err(nb::Error::WouldBlock) } else { Ok(42) }
            })
            .unwrap();
        assert_eq!(ready, Some(42));
        assert_eq!(drv.interface.elapsed_ms(), 3);

        let mut calls = 0;
        let exhausted: Option<()> = drv
            .poll_with_retries(4, |_, _| {
                calls += 1;
                Err(nb::Error::WouldBlock)
            })
            .unwrap();
        assert_eq!(exhausted, None);
        assert_eq!(calls, 4);

        let failed: Result<Option<()>, _> =
            drv.poll_with_retries(4, |_, _| Err(nb::Error::Other(Si1132Error::Transport(MockBusError))));
        assert_eq!(failed, Err(Si1132Error::Transport(MockBusError)));
    }
}
