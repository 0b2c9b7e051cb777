// src/common/types.rs

use core::convert::TryFrom;

use super::error::Si1132Error;
use super::registers::{self, chip_stat, MeasureRateRegisters};

// --- Chip Identity ---

/// Identification registers read during `initialize()`. Immutable afterwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipIdentity {
    pub part_id: u8,
    pub revision_id: u8,
    pub sequence_id: u8,
}

impl ChipIdentity {
    /// True if this part needs the shifted measurement-rate registers.
    pub const fn requires_rate_erratum(&self) -> bool {
        self.sequence_id == registers::ERRATUM_SEQUENCE_ID
    }

    /// Measurement-rate registers to use for this part.
    pub const fn rate_registers(&self) -> MeasureRateRegisters {
        MeasureRateRegisters::for_sequence(self.sequence_id)
    }
}

// --- ADC Gain ---

/// 3-bit ALS ADC gain setting (0-7). Each step doubles the integration time.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcGain(u8);

impl AdcGain {
    pub const MIN: AdcGain = AdcGain(0);
    pub const MAX: AdcGain = AdcGain(7);

    const MASK: u8 = 0b0000_0111;

    /// Creates a new `AdcGain` if the value fits in 3 bits.
    pub fn new(gain: u8) -> Result<Self, Si1132Error<()>> {
        if gain & !Self::MASK == 0 {
            Ok(AdcGain(gain))
        } else {
            Err(Si1132Error::InvalidGain(gain))
        }
    }

    /// Keeps bits 0-2 and drops the rest.
    #[inline]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        AdcGain(bits & Self::MASK)
    }

    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    /// Value for the `ALS_*_ADC_GAIN` parameter.
    #[inline]
    pub const fn gain_register_value(&self) -> u8 {
        self.0 & Self::MASK
    }

    /// Value for the `ALS_*_ADC_COUNTER` parameter: the one's complement of the
    /// gain in bits 4-6.
    #[inline]
    pub const fn counter_register_value(&self) -> u8 {
        (!self.0 << 4) & 0b0111_0000
    }
}

impl TryFrom<u8> for AdcGain {
    type Error = Si1132Error<()>;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AdcGain> for u8 {
    fn from(value: AdcGain) -> Self {
        value.0
    }
}

// --- Driver Configuration ---

/// Caller-chosen gain and range settings, applied by `configure()`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Si1132Config {
    pub visible_gain: AdcGain,
    pub infrared_gain: AdcGain,
    pub visible_high_range: bool,
    pub infrared_high_range: bool,
}

impl Si1132Config {
    pub const fn new() -> Self {
        Si1132Config {
            visible_gain: AdcGain::MIN,
            infrared_gain: AdcGain::MIN,
            visible_high_range: false,
            infrared_high_range: false,
        }
    }

    pub const fn with_visible_gain(mut self, gain: AdcGain) -> Self {
        self.visible_gain = gain;
        self
    }

    pub const fn with_infrared_gain(mut self, gain: AdcGain) -> Self {
        self.infrared_gain = gain;
        self
    }

    pub const fn with_visible_high_range(mut self, high: bool) -> Self {
        self.visible_high_range = high;
        self
    }

    pub const fn with_infrared_high_range(mut self, high: bool) -> Self {
        self.infrared_high_range = high;
        self
    }

    /// `ALS_VIS_ADC_MISC` value. Visible owns the whole parameter.
    pub const fn visible_misc_value(&self) -> u8 {
        if self.visible_high_range {
            registers::param::RANGE_HIGH_SIGNAL
        } else {
            0x00
        }
    }

    /// `ALS_IR_ADC_MISC` value given its current contents. Only the range bit
    /// changes.
    pub const fn infrared_misc_value(&self, current: u8) -> u8 {
        if self.infrared_high_range {
            registers::param::RANGE_HIGH_SIGNAL | current
        } else {
            registers::param::RANGE_CLEAR_MASK & current
        }
    }
}

// --- Measurement Sample ---

/// One set of readings from a measurement cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeasurementSample {
    /// UV index in hundredths (AUX_DATA).
    pub uv: u16,
    /// Visible ALS counts.
    pub visible: u16,
    /// Infrared ALS counts.
    pub infrared: u16,
}

impl MeasurementSample {
    /// Assembles a sample from the `AUX_DATA0..1` and `ALS_VIS_DATA0..ALS_IR_DATA1`
    /// register blocks. Low byte at the lower address.
    pub fn from_registers(aux: [u8; 2], als: [u8; 4]) -> Self {
        MeasurementSample {
            uv: u16::from_le_bytes(aux),
            visible: u16::from_le_bytes([als[0], als[1]]),
            infrared: u16::from_le_bytes([als[2], als[3]]),
        }
    }

    /// UV index as a float (the chip reports hundredths).
    pub fn uv_index(&self) -> f32 {
        self.uv as f32 / 100.0
    }
}

// --- Driver State ---

/// Initialization sequencer states, in order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverState {
    Uninitialized,
    IdentityConfirmed,
    Reset,
    BaseCalibrationLoaded,
    ChannelsConfigured,
    Ready,
}

impl DriverState {
    pub const fn is_identified(&self) -> bool {
        !matches!(self, DriverState::Uninitialized)
    }

    pub const fn is_ready(&self) -> bool {
        matches!(self, DriverState::Ready)
    }
}

/// How the chip takes measurements once configured.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasurementMode {
    /// One sample per ALS_FORCE command.
    Forced,
    /// Periodic sampling at the given `MEAS_RATE` (units of 31.25 µs).
    Autonomous { rate: u16 },
}

// --- Chip State ---

/// Contents of the `CHIP_STAT` register.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipState(pub u8);

impl ChipState {
    pub const fn is_sleep(&self) -> bool {
        self.0 & chip_stat::SLEEP != 0
    }

    pub const fn is_suspend(&self) -> bool {
        self.0 & chip_stat::SUSPEND != 0
    }

    pub const fn is_running(&self) -> bool {
        self.0 & chip_stat::RUNNING != 0
    }
}
