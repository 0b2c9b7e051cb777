// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod command;
pub mod diagnostics;
pub mod error;
pub mod hal_traits;
pub mod registers;
pub mod timing;
pub mod types;

// --- Re-export key types/traits for easier access ---

// From command.rs
pub use command::{Command, ParamIndex};

// From diagnostics.rs
pub use diagnostics::{Diagnostic, DiagnosticSink, NoDiagnostics};

// From error.rs
pub use error::Si1132Error;

// From hal_traits.rs
pub use hal_traits::{Si1132Bus, Si1132Timer}; // Core sync traits

// From registers.rs (register constants stay under common::registers::*)
pub use registers::MeasureRateRegisters;

// From types.rs
pub use types::{
    AdcGain, ChipIdentity, ChipState, DriverState, MeasurementMode, MeasurementSample, Si1132Config,
};

// --- Feature-gated re-exports ---

#[cfg(feature = "log")]
pub use diagnostics::LogDiagnostics;

#[cfg(any(feature = "use_heapless", test))]
pub use diagnostics::DiagnosticLog;

// Native HAL adapter (from hal_traits.rs)
#[cfg(any(feature = "impl-native", test))]
pub use hal_traits::HalInterface;
