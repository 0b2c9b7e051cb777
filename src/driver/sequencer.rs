// src/driver/sequencer.rs

use super::Si1132;
use crate::common::{
    command::{Command, ParamIndex},
    diagnostics::{Diagnostic, DiagnosticSink},
    error::Si1132Error,
    hal_traits::{Si1132Bus, Si1132Timer},
    registers::{self, param, MeasureRateRegisters},
    timing,
    types::{ChipIdentity, DriverState, MeasurementMode},
};

impl<IF, D> Si1132<IF, D>
where
    IF: Si1132Bus + Si1132Timer,
    D: DiagnosticSink,
{
    /// Probes the chip identity.
    ///
    /// Fails permanently with `IdentityMismatch` unless `PART_ID` is 0x32.
    /// A sequence 0x01 part switches the driver to the shifted measurement-rate
    /// registers for the rest of its lifetime.
    ///
    /// A re-probe first discards the previous identity, so any failure leaves
    /// the driver `Uninitialized`.
    pub fn initialize(&mut self) -> Result<ChipIdentity, Si1132Error<IF::Error>> {
        self.identity = None;
        self.rate_registers = MeasureRateRegisters::DEFAULT;
        self.mode = MeasurementMode::Forced;
        self.state = DriverState::Uninitialized;

        let part_id = self.read_register(registers::PART_ID)?;
        if part_id != registers::EXPECTED_PART_ID {
            self.emit(Diagnostic::IdentityMismatch { found: part_id });
            return Err(Si1132Error::IdentityMismatch { found: part_id });
        }

        let revision_id = self.read_register(registers::REV_ID)?;
        let sequence_id = self.read_register(registers::SEQ_ID)?;
        let identity = ChipIdentity { part_id, revision_id, sequence_id };
        self.emit(Diagnostic::ChipIdentified(identity));

        self.rate_registers = identity.rate_registers();
        if identity.requires_rate_erratum() {
            self.emit(Diagnostic::RateErratumApplied {
                rate0: self.rate_registers.rate0,
                rate1: self.rate_registers.rate1,
            });
        }

        self.identity = Some(identity);
        self.advance(DriverState::IdentityConfirmed);
        Ok(identity)
    }

    /// Resets the chip and applies the current configuration, leaving it in
    /// forced measurement mode.
    ///
    /// Can be re-run to apply a changed configuration. On failure the driver
    /// stays in the last state reached and is not ready for measurement.
    pub fn configure(&mut self) -> Result<(), Si1132Error<IF::Error>> {
        self.ensure_identified()?;
        self.state = DriverState::IdentityConfirmed;

        let result = self.run_configuration();
        if result.is_err() {
            let stage = self.state;
            self.emit(Diagnostic::ConfigurationAborted { stage });
        }
        result
    }

    fn run_configuration(&mut self) -> Result<(), Si1132Error<IF::Error>> {
        self.reset()?;
        self.advance(DriverState::Reset);

        self.load_uv_coefficients()?;
        self.advance(DriverState::BaseCalibrationLoaded);

        self.configure_channels()?;
        self.advance(DriverState::ChannelsConfigured);

        self.enter_forced_mode()?;
        self.advance(DriverState::Ready);
        Ok(())
    }

    /// Quiesces interrupts and measurement, resets, then unlocks with HW_KEY.
    fn reset(&mut self) -> Result<(), Si1132Error<IF::Error>> {
        let rates = self.rate_registers;
        self.write_register(rates.rate0, 0x00)?;
        self.write_register(rates.rate1, 0x00)?;
        self.write_register(registers::IRQ_ENABLE, 0x00)?;
        self.write_register(registers::INT_CFG, 0x00)?;
        self.write_register(registers::IRQ_STATUS, registers::IRQ_STATUS_CLEAR_ALL)?;

        self.send_command(Command::Reset)?;
        self.mode = MeasurementMode::Forced;
        self.pause(timing::RESET_SETTLE);
        self.write_register(registers::HW_KEY, registers::HW_KEY_VALUE)?;
        self.pause(timing::RESET_SETTLE);
        Ok(())
    }

    fn load_uv_coefficients(&mut self) -> Result<(), Si1132Error<IF::Error>> {
        let ucoef = [registers::UCOEF0, registers::UCOEF1, registers::UCOEF2, registers::UCOEF3];
        for (register, value) in ucoef.into_iter().zip(registers::DEFAULT_UCOEF) {
            self.write_register(register, value)?;
        }
        Ok(())
    }

    fn configure_channels(&mut self) -> Result<(), Si1132Error<IF::Error>> {
        let config = self.config;

        // UV index, ALS IR and ALS visible
        self.set_parameter(ParamIndex::CHLIST, param::CHLIST_UV_IR_VIS)?;

        // Visible, clock divide = 1
        self.set_parameter(ParamIndex::ALS_VIS_ADC_GAIN, config.visible_gain.gain_register_value())?;
        self.set_parameter(ParamIndex::ALS_VIS_ADC_COUNTER, config.visible_gain.counter_register_value())?;
        self.set_parameter(ParamIndex::ALS_VIS_ADC_MISC, config.visible_misc_value())?;

        // Infrared, clock divide = 1
        self.set_parameter(ParamIndex::ALS_IR_ADC_GAIN, config.infrared_gain.gain_register_value())?;
        self.set_parameter(ParamIndex::ALS_IR_ADC_COUNTER, config.infrared_gain.counter_register_value())?;
        self.set_parameter(ParamIndex::ALS_IR_ADCMUX, param::ADCMUX_SMALL_IR)?;

        // IR range shares ALS_IR_ADC_MISC with other bits: read-modify-write.
        let current = self.read_parameter_or_zero(ParamIndex::ALS_IR_ADC_MISC)?;
        self.set_parameter(ParamIndex::ALS_IR_ADC_MISC, config.infrared_misc_value(current))?;
        Ok(())
    }

    /// Zero measurement rate: one sample per ALS_FORCE.
    pub(super) fn enter_forced_mode(&mut self) -> Result<(), Si1132Error<IF::Error>> {
        let rates = self.rate_registers;
        self.write_register(rates.rate0, 0x00)?;
        self.write_register(rates.rate1, 0x00)?;
        self.mode = MeasurementMode::Forced;
        Ok(())
    }
}
