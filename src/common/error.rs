// src/common/error.rs

use core::fmt::Debug;

/// All failures the driver can report.
///
/// Bus failures are always propagated as `Transport`/`ShortRead` and are never
/// retried inside the bus call itself. The remaining variants come from the
/// chip's command protocol or from driver sequencing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Si1132Error<E = ()>
where
    E: Debug,
{
    /// Underlying bus error from the HAL implementation.
    #[error("I/O error: {0:?}")]
    Transport(E),

    /// A burst read returned fewer bytes than requested.
    #[error("Short read at register {register:#04x}: expected {expected} bytes, got {got}")]
    ShortRead {
        register: u8,
        expected: usize,
        got: usize,
    },

    /// The response counter never acknowledged the command within the retry bound.
    #[error("Command {command:#04x} was not acknowledged by the chip")]
    ProtocolTimeout { command: u8 },

    /// The response counter never returned to zero, so the command was not sent.
    #[error("Response counter stuck at {response:#04x}; command {command:#04x} not sent")]
    ResponseNotCleared { command: u8, response: u8 },

    /// Part ID register did not hold the Si1132 identity byte.
    #[error("Unexpected part ID {found:#04x}")]
    IdentityMismatch { found: u8 },

    /// Parameter write was acknowledged but the readback disagrees.
    #[error("Parameter {param:#04x} set to {requested:#04x} but reads back {actual:#04x}")]
    ParameterMismatch { param: u8, requested: u8, actual: u8 },

    /// CHIP_STAT never reported sleep within the poll bound.
    #[error("Chip did not enter sleep (CHIP_STAT = {state:#04x})")]
    ChipBusy { state: u8 },

    /// `initialize()` has not confirmed the chip identity yet.
    #[error("Chip identity not confirmed")]
    NotIdentified,

    /// `configure()` has not completed successfully.
    #[error("Driver not configured for measurement")]
    NotReady,

    /// ADC gain outside the 3-bit range.
    #[error("Invalid ADC gain: {0}")]
    InvalidGain(u8),

    /// Parameter index outside the 5-bit range.
    #[error("Invalid parameter index: {0:#04x}")]
    InvalidParameter(u8),

    /// Byte does not decode to a known command opcode.
    #[error("Unknown command opcode: {0:#04x}")]
    UnknownCommand(u8),

    /// Autonomous measurement rate of zero (zero selects forced mode).
    #[error("Autonomous measurement rate must be non-zero")]
    InvalidRate,
}

impl<E: Debug> From<E> for Si1132Error<E> {
    fn from(e: E) -> Self {
        Si1132Error::Transport(e)
    }
}

impl<E: Debug> Si1132Error<E> {
    /// True for failures that came from the bus rather than the chip protocol.
    pub fn is_transport(&self) -> bool {
        matches!(self, Si1132Error::Transport(_) | Si1132Error::ShortRead { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct MockBusError;

    #[test]
    fn test_from_bus_error() {
        let err: Si1132Error<MockBusError> = MockBusError.into();
        assert_eq!(err, Si1132Error::Transport(MockBusError));
        assert!(err.is_transport());
    }

    #[test]
    fn test_short_read_is_transport() {
        let err: Si1132Error<MockBusError> = Si1132Error::ShortRead { register: 0x22, expected: 4, got: 2 };
        assert!(err.is_transport());
        assert!(!Si1132Error::<MockBusError>::ProtocolTimeout { command: 0xA1 }.is_transport());
    }

    #[test]
    fn test_display_messages() {
        use core::fmt::Write;
        let mut out = heapless::String::<96>::new();
        let err: Si1132Error<MockBusError> = Si1132Error::ParameterMismatch { param: 0x11, requested: 0x03, actual: 0x00 };
        write!(out, "{}", err).unwrap();
        assert_eq!(out.as_str(), "Parameter 0x11 set to 0x03 but reads back 0x00");

        out.clear();
        write!(out, "{}", Si1132Error::<MockBusError>::IdentityMismatch { found: 0x45 }).unwrap();
        assert_eq!(out.as_str(), "Unexpected part ID 0x45");

        out.clear();
        write!(out, "{}", Si1132Error::<MockBusError>::ResponseNotCleared { command: 0x06, response: 0x03 }).unwrap();
        assert_eq!(out.as_str(), "Response counter stuck at 0x03; command 0x06 not sent");
    }
}
