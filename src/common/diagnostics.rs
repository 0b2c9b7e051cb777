// src/common/diagnostics.rs

use super::types::{ChipIdentity, DriverState};

/// Structured event emitted by the driver on progress and failure paths.
///
/// Every error returned by a driver operation is preceded by at least one
/// event carrying the register, parameter or state context of the failure.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Diagnostic {
    /// Identity registers read and accepted.
    ChipIdentified(ChipIdentity),
    /// Part ID register held something other than the Si1132 identity.
    IdentityMismatch { found: u8 },
    /// Sequence 0x01 part; rate registers moved to these addresses.
    RateErratumApplied { rate0: u8, rate1: u8 },
    /// Sequencer moved to a new state.
    StateChanged(DriverState),
    /// Bus transaction failed on this register.
    BusError { register: u8 },
    /// Burst read came back short.
    ShortRead { register: u8, expected: usize, got: usize },
    /// Response counter was non-zero before a command; draining.
    StaleResponse { response: u8 },
    /// Response counter never returned to zero.
    DrainTimeout { command: u8, response: u8 },
    /// Command was never acknowledged.
    CommandTimeout { command: u8 },
    /// Forced measurement was not acknowledged; the read continues anyway.
    ForceNotAcknowledged,
    /// PARAM_SET failed at the protocol level. `final_value` is the
    /// best-effort readback, if the query succeeded.
    ParameterWriteFailed { param: u8, requested: u8, final_value: Option<u8> },
    /// PARAM_SET acknowledged but the readback disagrees.
    ParameterMismatch { param: u8, requested: u8, actual: u8 },
    /// PARAM_QUERY failed; the caller sees the sentinel value.
    ParameterReadFailed { param: u8 },
    /// `configure()` stopped in this state.
    ConfigurationAborted { stage: DriverState },
    /// A measurement read failed; the stored sample is unchanged.
    SampleReadFailed { register: u8 },
    /// CHIP_STAT never reported sleep; last value read.
    ChipBusy { state: u8 },
    /// Operation called before the sequencer reached the state it needs.
    OutOfSequence { state: DriverState },
    /// Autonomous mode requested with a zero rate.
    InvalidRate,
}

impl Diagnostic {
    /// True for events that report a failure.
    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            Diagnostic::ChipIdentified(_)
                | Diagnostic::RateErratumApplied { .. }
                | Diagnostic::StateChanged(_)
                | Diagnostic::StaleResponse { .. }
        )
    }
}

/// Receiver for driver diagnostics.
pub trait DiagnosticSink {
    fn record(&mut self, event: Diagnostic);
}

/// Discards every event. Default sink of the driver.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoDiagnostics;

impl DiagnosticSink for NoDiagnostics {
    #[inline]
    fn record(&mut self, _event: Diagnostic) {}
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &mut T {
    fn record(&mut self, event: Diagnostic) {
        (**self).record(event)
    }
}

/// Forwards events to the `log` facade: failures at `warn`, identity at
/// `info`, everything else at `debug`.
#[cfg(feature = "log")]
#[derive(Debug, Default, Copy, Clone)]
pub struct LogDiagnostics;

#[cfg(feature = "log")]
impl DiagnosticSink for LogDiagnostics {
    fn record(&mut self, event: Diagnostic) {
        match event {
            Diagnostic::ChipIdentified(id) => log::info!(
                "Found Si1132 with revision ID = {:#04x}, sequence ID = {:#04x}",
                id.revision_id,
                id.sequence_id
            ),
            e if e.is_failure() => log::warn!("si1132: {:?}", e),
            e => log::debug!("si1132: {:?}", e),
        }
    }
}

/// Fixed-capacity ring of the most recent events. The oldest event is dropped
/// when full.
#[cfg(any(feature = "use_heapless", test))]
#[derive(Debug, Default)]
pub struct DiagnosticLog<const N: usize> {
    events: heapless::Deque<Diagnostic, N>,
    dropped: usize,
}

#[cfg(any(feature = "use_heapless", test))]
impl<const N: usize> DiagnosticLog<N> {
    pub const fn new() -> Self {
        DiagnosticLog {
            events: heapless::Deque::new(),
            dropped: 0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events pushed out by newer ones since the last `clear`.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn latest(&self) -> Option<&Diagnostic> {
        self.events.back()
    }

    pub fn contains(&self, event: &Diagnostic) -> bool {
        self.events.iter().any(|e| e == event)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Diagnostic> {
        self.events.iter().filter(|e| e.is_failure())
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.dropped = 0;
    }
}

#[cfg(any(feature = "use_heapless", test))]
impl<const N: usize> DiagnosticSink for DiagnosticLog<N> {
    fn record(&mut self, event: Diagnostic) {
        if self.events.is_full() {
            self.events.pop_front();
            self.dropped += 1;
        }
        // Cannot fail after the pop above; a zero-capacity log drops everything.
        if self.events.push_back(event).is_err() {
            self.dropped += 1;
        }
    }
}
