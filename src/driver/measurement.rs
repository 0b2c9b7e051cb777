// src/driver/measurement.rs

use super::Si1132;
use crate::common::{
    command::Command,
    diagnostics::{Diagnostic, DiagnosticSink},
    error::Si1132Error,
    hal_traits::{Si1132Bus, Si1132Timer},
    registers::{self, CALIBRATION_LEN},
    timing,
    types::{ChipState, MeasurementMode, MeasurementSample},
};

impl<IF, D> Si1132<IF, D>
where
    IF: Si1132Bus + Si1132Timer,
    D: DiagnosticSink,
{
    /// Forces one measurement, waits for it to settle and reads the result.
    ///
    /// A force command that was written but not acknowledged is reported and
    /// the read goes ahead. If the response counter never cleared, the force
    /// was not sent and the call fails. Any failure leaves the stored sample
    /// unchanged.
    pub fn trigger_and_read(&mut self) -> Result<MeasurementSample, Si1132Error<IF::Error>> {
        self.ensure_ready()?;

        match self.send_command(Command::AlsForce) {
            Ok(_) => {}
            Err(Si1132Error::ProtocolTimeout { .. }) => self.emit(Diagnostic::ForceNotAcknowledged),
            Err(e) => return Err(e),
        }
        self.pause(timing::MEASUREMENT_SETTLE);

        self.read_sample()
    }

    /// Reads the data registers without forcing a measurement. Meant for
    /// autonomous mode, where the chip refreshes them on its own.
    pub fn read_latest(&mut self) -> Result<MeasurementSample, Si1132Error<IF::Error>> {
        self.ensure_ready()?;
        self.read_sample()
    }

    /// Starts periodic measurement. `rate` is in units of 31.25 µs and must be
    /// non-zero.
    pub fn start_autonomous(&mut self, rate: u16) -> Result<(), Si1132Error<IF::Error>> {
        self.ensure_ready()?;
        if rate == 0 {
            self.emit(Diagnostic::InvalidRate);
            return Err(Si1132Error::InvalidRate);
        }

        let [low, high] = rate.to_le_bytes();
        let rates = self.rate_registers;
        self.write_register(rates.rate0, low)?;
        self.write_register(rates.rate1, high)?;
        self.send_command(Command::AlsAuto)?;
        self.mode = MeasurementMode::Autonomous { rate };
        Ok(())
    }

    /// Returns to forced mode.
    pub fn stop_autonomous(&mut self) -> Result<(), Si1132Error<IF::Error>> {
        self.ensure_ready()?;
        self.enter_forced_mode()
    }

    /// Fetches the factory calibration block.
    ///
    /// GET_CAL overwrites the data registers, so the stored sample is the only
    /// copy of the last reading afterwards.
    pub fn read_calibration(&mut self) -> Result<[u8; CALIBRATION_LEN], Si1132Error<IF::Error>> {
        self.ensure_identified()?;
        self.send_command(Command::GetCal)?;
        let mut block = [0u8; CALIBRATION_LEN];
        self.read_registers(registers::ALS_VIS_DATA0, &mut block)?;
        Ok(block)
    }

    pub fn calibration_index(&mut self) -> Result<u8, Si1132Error<IF::Error>> {
        self.ensure_identified()?;
        self.send_command(Command::GetCalIndex)?;
        self.read_register(registers::PARAM_RD)
    }

    pub fn chip_state(&mut self) -> Result<ChipState, Si1132Error<IF::Error>> {
        self.read_register(registers::CHIP_STAT).map(ChipState)
    }

    /// Polls `CHIP_STAT` until the chip reports sleep.
    pub fn wait_until_sleep(&mut self) -> Result<(), Si1132Error<IF::Error>> {
        let mut last = ChipState(0);
        let slept = self.poll_with_retries(timing::SLEEP_POLL_MAX_ATTEMPTS, |drv, attempt| {
            if attempt > 0 {
                drv.pause(timing::SLEEP_POLL_INTERVAL);
            }
            last = drv.chip_state().map_err(nb::Error::Other)?;
            if last.is_sleep() {
                Ok(())
            } else {
                Err(nb::Error::WouldBlock)
            }
        })?;

        slept.ok_or_else(|| {
            self.emit(Diagnostic::ChipBusy { state: last.0 });
            Si1132Error::ChipBusy { state: last.0 }
        })
    }

    fn read_sample(&mut self) -> Result<MeasurementSample, Si1132Error<IF::Error>> {
        let mut aux = [0u8; 2];
        if let Err(e) = self.read_registers(registers::AUX_DATA0, &mut aux) {
            self.emit(Diagnostic::SampleReadFailed { register: registers::AUX_DATA0 });
            return Err(e);
        }

        let mut als = [0u8; 4];
        if let Err(e) = self.read_registers(registers::ALS_VIS_DATA0, &mut als) {
            self.emit(Diagnostic::SampleReadFailed { register: registers::ALS_VIS_DATA0 });
            return Err(e);
        }

        let sample = MeasurementSample::from_registers(aux, als);
        self.last_sample = Some(sample);
        Ok(sample)
    }
}
