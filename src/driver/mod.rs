// src/driver/mod.rs

// Submodules hold the impl blocks for the different concerns of the driver.
mod io_helpers;
mod measurement;
mod protocol;
mod sequencer;

#[cfg(test)]
pub(crate) mod mock;

use crate::common::{
    diagnostics::{Diagnostic, DiagnosticSink, NoDiagnostics},
    error::Si1132Error,
    hal_traits::{Si1132Bus, Si1132Timer},
    registers::{MeasureRateRegisters, DEVICE_ADDRESS},
    types::{AdcGain, ChipIdentity, DriverState, MeasurementMode, MeasurementSample, Si1132Config},
};

/// Blocking driver for one Si1132 on a two-wire bus.
///
/// The driver owns the bus interface for its lifetime; every operation takes
/// `&mut self`, so only one command can be in flight at a time.
///
/// Lifecycle: [`new`](Self::new) → [`initialize`](Self::initialize) →
/// [`configure`](Self::configure) → [`trigger_and_read`](Self::trigger_and_read)
/// repeatedly.
#[derive(Debug)]
pub struct Si1132<IF, D = NoDiagnostics>
where
    IF: Si1132Bus + Si1132Timer,
    D: DiagnosticSink,
{
    interface: IF,
    diagnostics: D,
    config: Si1132Config,
    state: DriverState,
    identity: Option<ChipIdentity>,
    rate_registers: MeasureRateRegisters,
    mode: MeasurementMode,
    last_sample: Option<MeasurementSample>,
}

impl<IF> Si1132<IF, NoDiagnostics>
where
    IF: Si1132Bus + Si1132Timer,
{
    /// Creates an uninitialized driver. No bus traffic until `initialize()`.
    pub fn new(interface: IF) -> Self {
        Self::with_diagnostics(interface, NoDiagnostics)
    }

    /// Creates a driver and runs the identity probe.
    ///
    /// The interface is dropped on failure; use `new` and `initialize`
    /// separately to keep it.
    pub fn new_initialized(interface: IF) -> Result<Self, Si1132Error<IF::Error>> {
        let mut driver = Self::new(interface);
        driver.initialize()?;
        Ok(driver)
    }
}

impl<IF, D> Si1132<IF, D>
where
    IF: Si1132Bus + Si1132Timer,
    D: DiagnosticSink,
{
    /// Creates an uninitialized driver reporting to `diagnostics`.
    pub fn with_diagnostics(interface: IF, diagnostics: D) -> Self {
        Si1132 {
            interface,
            diagnostics,
            config: Si1132Config::new(),
            state: DriverState::Uninitialized,
            identity: None,
            rate_registers: MeasureRateRegisters::DEFAULT,
            mode: MeasurementMode::Forced,
            last_sample: None,
        }
    }

    /// Sets the configuration applied by the next `configure()`.
    pub fn with_config(mut self, config: Si1132Config) -> Self {
        self.config = config;
        self
    }

    /// Return the underlying bus interface.
    pub fn free(self) -> IF {
        self.interface
    }

    /// Return the underlying bus interface and diagnostic sink.
    pub fn release(self) -> (IF, D) {
        (self.interface, self.diagnostics)
    }

    // --- State ---

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn identity(&self) -> Option<ChipIdentity> {
        self.identity
    }

    /// Registers that take the measurement rate on this part.
    pub fn rate_registers(&self) -> MeasureRateRegisters {
        self.rate_registers
    }

    pub fn mode(&self) -> MeasurementMode {
        self.mode
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut D {
        &mut self.diagnostics
    }

    // --- Results ---

    /// Most recent successful sample. A failed read leaves this unchanged.
    pub fn last_sample(&self) -> Option<MeasurementSample> {
        self.last_sample
    }

    pub fn uv(&self) -> Option<u16> {
        self.last_sample.map(|s| s.uv)
    }

    pub fn visible(&self) -> Option<u16> {
        self.last_sample.map(|s| s.visible)
    }

    pub fn infrared(&self) -> Option<u16> {
        self.last_sample.map(|s| s.infrared)
    }

    // --- Configuration ---
    // Changes take effect on the next `configure()`.

    pub fn config(&self) -> Si1132Config {
        self.config
    }

    pub fn set_config(&mut self, config: Si1132Config) {
        self.config = config;
    }

    pub fn visible_adc_gain(&self) -> u8 {
        self.config.visible_gain.as_u8()
    }

    /// Bits above the 3-bit gain field are dropped.
    pub fn set_visible_adc_gain(&mut self, setting: u8) {
        self.config.visible_gain = AdcGain::from_bits_truncate(setting);
    }

    pub fn infrared_adc_gain(&self) -> u8 {
        self.config.infrared_gain.as_u8()
    }

    /// Bits above the 3-bit gain field are dropped.
    pub fn set_infrared_adc_gain(&mut self, setting: u8) {
        self.config.infrared_gain = AdcGain::from_bits_truncate(setting);
    }

    pub fn is_visible_high_signal_range(&self) -> bool {
        self.config.visible_high_range
    }

    pub fn set_visible_high_signal_range(&mut self, setting: bool) {
        self.config.visible_high_range = setting;
    }

    pub fn is_infrared_high_signal_range(&self) -> bool {
        self.config.infrared_high_range
    }

    pub fn set_infrared_high_signal_range(&mut self, setting: bool) {
        self.config.infrared_high_range = setting;
    }

    // --- Internal ---

    #[inline]
    fn address(&self) -> u8 {
        DEVICE_ADDRESS
    }

    fn emit(&mut self, event: Diagnostic) {
        self.diagnostics.record(event);
    }

    fn advance(&mut self, state: DriverState) {
        self.state = state;
        self.emit(Diagnostic::StateChanged(state));
    }

    fn ensure_identified(&mut self) -> Result<(), Si1132Error<IF::Error>> {
        if self.state.is_identified() {
            return Ok(());
        }
        self.emit(Diagnostic::OutOfSequence { state: self.state });
        Err(Si1132Error::NotIdentified)
    }

    fn ensure_ready(&mut self) -> Result<(), Si1132Error<IF::Error>> {
        if self.state.is_ready() {
            return Ok(());
        }
        self.emit(Diagnostic::OutOfSequence { state: self.state });
        Err(Si1132Error::NotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockSi1132;
    use super::*;

    #[test]
    fn test_driver_construction() {
        let drv = Si1132::new(MockSi1132::si1132());
        assert_eq!(drv.state(), DriverState::Uninitialized);
        assert_eq!(drv.identity(), None);
        assert_eq!(drv.last_sample(), None);
        assert_eq!(drv.mode(), MeasurementMode::Forced);
        // Construction performs no bus traffic.
        assert!(drv.free().writes.is_empty());
    }

    #[test]
    fn test_new_initialized_probes_identity() {
        let drv = Si1132::new_initialized(MockSi1132::new(0x32, 0x01)).unwrap();
        assert_eq!(drv.state(), DriverState::IdentityConfirmed);
        assert_eq!(drv.rate_registers(), MeasureRateRegisters::SEQUENCE_01_ERRATUM);

        let err = Si1132::new_initialized(MockSi1132::new(0x45, 0x00)).unwrap_err();
        assert_eq!(err, Si1132Error::IdentityMismatch { found: 0x45 });
    }

    #[test]
    fn test_gain_setters_mask_to_three_bits() {
        let mut drv = Si1132::new(MockSi1132::si1132());
        drv.set_visible_adc_gain(0x0F);
        drv.set_infrared_adc_gain(5);
        assert_eq!(drv.visible_adc_gain(), 0x07);
        assert_eq!(drv.infrared_adc_gain(), 5);

        drv.set_visible_high_signal_range(true);
        assert!(drv.is_visible_high_signal_range());
        assert!(!drv.is_infrared_high_signal_range());
        drv.set_infrared_high_signal_range(true);
        assert!(drv.config().infrared_high_range);
    }

    #[test]
    fn test_with_config() {
        let cfg = Si1132Config::new().with_visible_gain(AdcGain::new(3).unwrap());
        let drv = Si1132::new(MockSi1132::si1132()).with_config(cfg);
        assert_eq!(drv.visible_adc_gain(), 3);
        assert_eq!(drv.infrared_adc_gain(), 0);
    }

    #[test]
    fn test_operations_require_sequence() {
        let mut drv = Si1132::new(MockSi1132::si1132());
        assert!(matches!(drv.configure(), Err(Si1132Error::NotIdentified)));
        assert!(matches!(drv.trigger_and_read(), Err(Si1132Error::NotReady)));
        assert!(drv.free().writes.is_empty());
    }
}
