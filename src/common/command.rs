//! Si1132 command definitions.
//!
//! Every command goes through the single `COMMAND` register and is
//! acknowledged through the `RESPONSE` counter. See the Si1132 datasheet,
//! Section 4 "Command Protocol".

use core::convert::TryFrom;
use core::fmt;

use super::Si1132Error;

/// Base opcode of a parameter read; OR'd with a 5-bit index.
pub const PARAM_QUERY: u8 = 0x80;
/// Base opcode of a parameter write; OR'd with a 5-bit index.
pub const PARAM_SET: u8 = 0xA0;

const PARAM_INDEX_MASK: u8 = 0x1F;

/// 5-bit index into the chip's parameter table.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParamIndex(u8);

impl ParamIndex {
    pub const CHLIST: ParamIndex = ParamIndex(super::registers::param::CHLIST);
    pub const ALS_IR_ADCMUX: ParamIndex = ParamIndex(super::registers::param::ALS_IR_ADCMUX);
    pub const ALS_VIS_ADC_COUNTER: ParamIndex = ParamIndex(super::registers::param::ALS_VIS_ADC_COUNTER);
    pub const ALS_VIS_ADC_GAIN: ParamIndex = ParamIndex(super::registers::param::ALS_VIS_ADC_GAIN);
    pub const ALS_VIS_ADC_MISC: ParamIndex = ParamIndex(super::registers::param::ALS_VIS_ADC_MISC);
    pub const ALS_IR_ADC_COUNTER: ParamIndex = ParamIndex(super::registers::param::ALS_IR_ADC_COUNTER);
    pub const ALS_IR_ADC_GAIN: ParamIndex = ParamIndex(super::registers::param::ALS_IR_ADC_GAIN);
    pub const ALS_IR_ADC_MISC: ParamIndex = ParamIndex(super::registers::param::ALS_IR_ADC_MISC);

    /// Creates a new `ParamIndex` if the value fits in 5 bits.
    /// Validation cannot cause an I/O error, hence `Si1132Error<()>`.
    pub fn new(index: u8) -> Result<Self, Si1132Error<()>> {
        if index & !PARAM_INDEX_MASK == 0 {
            Ok(ParamIndex(index))
        } else {
            Err(Si1132Error::InvalidParameter(index))
        }
    }

    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ParamIndex {
    type Error = Si1132Error<()>;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ParamIndex> for u8 {
    fn from(value: ParamIndex) -> Self {
        value.0
    }
}

impl fmt::Display for ParamIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// A command written to the `COMMAND` register.
///
/// All variants share one response protocol, dispatched by the driver's
/// `send_command`. The `Display` implementation gives the datasheet mnemonic.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `RESET` - software reset; clears the response counter and parameter table.
    Reset,
    /// `ALS_FORCE` - single forced ALS/UV measurement.
    AlsForce,
    /// `ALS_AUTO` - start autonomous measurements at `MEAS_RATE`.
    AlsAuto,
    /// `GET_CAL_INDEX` - report the calibration index in `PARAM_RD`.
    GetCalIndex,
    /// `GET_CAL` - report calibration data in the measurement data registers.
    GetCal,
    /// `PARAM_QUERY | index` - copy a parameter into `PARAM_RD`.
    ParamQuery(ParamIndex),
    /// `PARAM_SET | index` - store `PARAM_WR` into a parameter.
    ParamSet(ParamIndex),
}

impl Command {
    /// Opcode written to the `COMMAND` register.
    pub const fn code(&self) -> u8 {
        match self {
            Command::Reset => 0x01,
            Command::AlsForce => 0x06,
            Command::AlsAuto => 0x0E,
            Command::GetCalIndex => 0x11,
            Command::GetCal => 0x12,
            Command::ParamQuery(index) => PARAM_QUERY | index.0,
            Command::ParamSet(index) => PARAM_SET | index.0,
        }
    }

    /// Parameter index for the parameter commands.
    pub fn parameter(&self) -> Option<ParamIndex> {
        match self {
            Command::ParamQuery(index) | Command::ParamSet(index) => Some(*index),
            _ => None,
        }
    }

    /// Reset restarts the response counter at zero, so it is written directly
    /// rather than through the drain/acknowledge handshake.
    pub fn is_acknowledged(&self) -> bool {
        !matches!(self, Command::Reset)
    }
}

impl TryFrom<u8> for Command {
    type Error = Si1132Error<()>;

    /// Decodes an opcode as seen on the `COMMAND` register.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Command::Reset),
            0x06 => Ok(Command::AlsForce),
            0x0E => Ok(Command::AlsAuto),
            0x11 => Ok(Command::GetCalIndex),
            0x12 => Ok(Command::GetCal),
            0x80..=0x9F => Ok(Command::ParamQuery(ParamIndex(value & PARAM_INDEX_MASK))),
            0xA0..=0xBF => Ok(Command::ParamSet(ParamIndex(value & PARAM_INDEX_MASK))),
            _ => Err(Si1132Error::UnknownCommand(value)),
        }
    }
}

impl From<Command> for u8 {
    fn from(value: Command) -> Self {
        value.code()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Reset => f.write_str("RESET"),
            Command::AlsForce => f.write_str("ALS_FORCE"),
            Command::AlsAuto => f.write_str("ALS_AUTO"),
            Command::GetCalIndex => f.write_str("GET_CAL_INDEX"),
            Command::GetCal => f.write_str("GET_CAL"),
            Command::ParamQuery(index) => write!(f, "PARAM_QUERY({})", index),
            Command::ParamSet(index) => write!(f, "PARAM_SET({})", index),
        }
    }
}
