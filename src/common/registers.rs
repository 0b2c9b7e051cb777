// src/common/registers.rs

// Register map, bus address and parameter table indices of the Si1132.
// Values are bit-exact with the datasheet.

/// Fixed 7-bit I²C address of the Si1132.
pub const DEVICE_ADDRESS: u8 = 0x60;

/// Value of `PART_ID` for an Si1132.
pub const EXPECTED_PART_ID: u8 = 0x32;

/// Sequence ID of the silicon revision with the measurement-rate erratum.
pub const ERRATUM_SEQUENCE_ID: u8 = 0x01;

// === Identification ===

pub const PART_ID: u8 = 0x00;
pub const REV_ID: u8 = 0x01;
pub const SEQ_ID: u8 = 0x02;

// === Interrupts & Control ===

pub const INT_CFG: u8 = 0x03;
pub const IRQ_ENABLE: u8 = 0x04;
pub const HW_KEY: u8 = 0x07;
pub const MEAS_RATE0: u8 = 0x08;
pub const MEAS_RATE1: u8 = 0x09;

// === UV Coefficients ===

pub const UCOEF0: u8 = 0x13;
pub const UCOEF1: u8 = 0x14;
pub const UCOEF2: u8 = 0x15;
pub const UCOEF3: u8 = 0x16;

// === Command Interface ===

pub const PARAM_WR: u8 = 0x17;
pub const COMMAND: u8 = 0x18;
pub const RESPONSE: u8 = 0x20;
pub const IRQ_STATUS: u8 = 0x21;
pub const PARAM_RD: u8 = 0x2E;
pub const CHIP_STAT: u8 = 0x30;

// === Measurement Data ===

pub const ALS_VIS_DATA0: u8 = 0x22;
pub const ALS_VIS_DATA1: u8 = 0x23;
pub const ALS_IR_DATA0: u8 = 0x24;
pub const ALS_IR_DATA1: u8 = 0x25;
pub const AUX_DATA0: u8 = 0x2C;
pub const AUX_DATA1: u8 = 0x2D;

/// Number of calibration bytes GET_CAL places at `ALS_VIS_DATA0..=AUX_DATA1`.
pub const CALIBRATION_LEN: usize = (AUX_DATA1 - ALS_VIS_DATA0 + 1) as usize;

// === Register Values ===

/// No-op written to `COMMAND` to clear the response counter.
pub const CMD_NOP: u8 = 0x00;
/// Unlock value for `HW_KEY` after reset.
pub const HW_KEY_VALUE: u8 = 0x17;
/// Writing all ones to `IRQ_STATUS` clears every pending flag.
pub const IRQ_STATUS_CLEAR_ALL: u8 = 0xFF;
/// Default UV index coefficients for `UCOEF0..=UCOEF3`.
pub const DEFAULT_UCOEF: [u8; 4] = [0x7B, 0x6B, 0x01, 0x00];

/// Pair of registers holding the 16-bit measurement rate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeasureRateRegisters {
    /// Register taking the low byte of the rate.
    pub rate0: u8,
    /// Register taking the high byte of the rate.
    pub rate1: u8,
}

impl MeasureRateRegisters {
    pub const DEFAULT: MeasureRateRegisters = MeasureRateRegisters {
        rate0: MEAS_RATE0,
        rate1: MEAS_RATE1,
    };

    /// Sequence 0x01 parts decode the rate registers at shifted addresses.
    pub const SEQUENCE_01_ERRATUM: MeasureRateRegisters = MeasureRateRegisters {
        rate0: 0x0A,
        rate1: 0x08,
    };

    /// Selects the register pair for a chip's sequence ID.
    pub const fn for_sequence(sequence_id: u8) -> Self {
        if sequence_id == ERRATUM_SEQUENCE_ID {
            Self::SEQUENCE_01_ERRATUM
        } else {
            Self::DEFAULT
        }
    }
}

impl Default for MeasureRateRegisters {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Indices into the chip's internal parameter table.
pub mod param {
    pub const CHLIST: u8 = 0x01;
    pub const ALS_IR_ADCMUX: u8 = 0x0E;
    pub const ALS_VIS_ADC_COUNTER: u8 = 0x10;
    pub const ALS_VIS_ADC_GAIN: u8 = 0x11;
    pub const ALS_VIS_ADC_MISC: u8 = 0x12;
    pub const ALS_IR_ADC_COUNTER: u8 = 0x1D;
    pub const ALS_IR_ADC_GAIN: u8 = 0x1E;
    pub const ALS_IR_ADC_MISC: u8 = 0x1F;

    /// CHLIST bits enabling UV index, ALS IR and ALS visible.
    pub const CHLIST_UV_IR_VIS: u8 = 0b1011_0000;
    /// IR ADC mux setting for the small photodiode.
    pub const ADCMUX_SMALL_IR: u8 = 0x00;
    /// High-signal range bit in the ALS misc parameters.
    pub const RANGE_HIGH_SIGNAL: u8 = 0b0010_0000;
    /// Mask preserving every misc bit except the range bit.
    pub const RANGE_CLEAR_MASK: u8 = 0b1101_1111;
}

/// Bits of `CHIP_STAT`.
pub mod chip_stat {
    pub const SLEEP: u8 = 0b0000_0001;
    pub const SUSPEND: u8 = 0b0000_0010;
    pub const RUNNING: u8 = 0b0000_0100;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_registers_for_sequence() {
        assert_eq!(MeasureRateRegisters::for_sequence(0x00), MeasureRateRegisters::DEFAULT);
        assert_eq!(MeasureRateRegisters::for_sequence(0x02), MeasureRateRegisters::DEFAULT);
        let erratum = MeasureRateRegisters::for_sequence(0x01);
        assert_eq!(erratum.rate0, 0x0A);
        assert_eq!(erratum.rate1, 0x08);
    }

    #[test]
    fn test_calibration_block_length() {
        assert_eq!(CALIBRATION_LEN, 12);
    }
}
