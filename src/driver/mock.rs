// src/driver/mock.rs

// Register-level simulation of an Si1132 for driver tests. Models the
// command/response counter, the parameter table and a handful of fault
// injections (stale counter, busy chip, readback mismatch, short reads).

use crate::common::{
    command::Command,
    hal_traits::{Si1132Bus, Si1132Timer},
    registers::{self, DEVICE_ADDRESS},
};
use core::convert::TryFrom;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct MockBusError;

#[derive(Debug)]
pub(crate) struct MockSi1132 {
    pub regs: [u8; 256],
    pub params: [u8; 32],
    pub response: u8,
    /// Every register write as (register, value), in order.
    pub writes: heapless::Vec<(u8, u8), 512>,
    /// Every byte written to COMMAND, NOPs included.
    pub commands: heapless::Vec<u8, 256>,
    pub elapsed_us: u64,
    /// NOP writes that leave the stale response in place.
    pub sticky_nops: usize,
    /// Command writes ignored before the chip processes one.
    pub busy_commands: usize,
    /// PARAM_SET is never acknowledged.
    pub drop_param_sets: bool,
    /// (param, value) forced into PARAM_RD after a PARAM_SET of that param.
    pub readback_override: Option<(u8, u8)>,
    /// (register, count) burst reads there return only `count` bytes.
    pub short_read: Option<(u8, usize)>,
    /// Any access to this register fails.
    pub fail_register: Option<u8>,
    /// Set if a real command arrived while the response counter was non-zero.
    pub command_while_stale: bool,
    pub calibration: [u8; registers::CALIBRATION_LEN],
    pub calibration_index: u8,
}

impl MockSi1132 {
    pub fn new(part_id: u8, sequence_id: u8) -> Self {
        let mut regs = [0u8; 256];
        regs[registers::PART_ID as usize] = part_id;
        regs[registers::REV_ID as usize] = 0x00;
        regs[registers::SEQ_ID as usize] = sequence_id;
        regs[registers::CHIP_STAT as usize] = registers::chip_stat::SLEEP;
        MockSi1132 {
            regs,
            params: [0u8; 32],
            response: 0,
            writes: heapless::Vec::new(),
            commands: heapless::Vec::new(),
            elapsed_us: 0,
            sticky_nops: 0,
            busy_commands: 0,
            drop_param_sets: false,
            readback_override: None,
            short_read: None,
            fail_register: None,
            command_while_stale: false,
            calibration: [0u8; registers::CALIBRATION_LEN],
            calibration_index: 0,
        }
    }

    /// A sequence-0 Si1132.
    pub fn si1132() -> Self {
        Self::new(registers::EXPECTED_PART_ID, 0x00)
    }

    pub fn stage_sample(&mut self, aux: [u8; 2], als: [u8; 4]) {
        let aux_at = registers::AUX_DATA0 as usize;
        let als_at = registers::ALS_VIS_DATA0 as usize;
        self.regs[aux_at..aux_at + 2].copy_from_slice(&aux);
        self.regs[als_at..als_at + 4].copy_from_slice(&als);
    }

    pub fn writes_to(&self, register: u8) -> impl Iterator<Item = u8> + '_ {
        self.writes.iter().filter(move |(r, _)| *r == register).map(|(_, v)| *v)
    }

    pub fn count_command(&self, code: u8) -> usize {
        self.commands.iter().filter(|c| **c == code).count()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_us / 1000
    }

    fn handle_command(&mut self, value: u8) {
        let _ = self.commands.push(value);

        if value == registers::CMD_NOP {
            if self.sticky_nops > 0 {
                self.sticky_nops -= 1;
            } else {
                self.response = 0;
            }
            return;
        }

        let command = match Command::try_from(value) {
            Ok(cmd) => cmd,
            Err(_) => return,
        };

        if command == Command::Reset {
            self.response = 0;
            self.params = [0u8; 32];
            return;
        }

        if self.response != 0 {
            self.command_while_stale = true;
        }
        if self.busy_commands > 0 {
            self.busy_commands -= 1;
            return;
        }

        let param_rd = registers::PARAM_RD as usize;
        match command {
            Command::ParamSet(index) => {
                if self.drop_param_sets {
                    return;
                }
                let i = index.as_u8() as usize;
                self.params[i] = self.regs[registers::PARAM_WR as usize];
                self.regs[param_rd] = match self.readback_override {
                    Some((p, v)) if p == index.as_u8() => v,
                    _ => self.params[i],
                };
            }
            Command::ParamQuery(index) => {
                self.regs[param_rd] = self.params[index.as_u8() as usize];
            }
            Command::GetCal => {
                let at = registers::ALS_VIS_DATA0 as usize;
                self.regs[at..at + registers::CALIBRATION_LEN].copy_from_slice(&self.calibration);
            }
            Command::GetCalIndex => {
                self.regs[param_rd] = self.calibration_index;
            }
            Command::AlsForce | Command::AlsAuto | Command::Reset => {}
        }
        self.response = (self.response + 1) & 0x0F;
    }

    fn check(&self, device: u8, register: u8) -> Result<(), MockBusError> {
        if device != DEVICE_ADDRESS || self.fail_register == Some(register) {
            return Err(MockBusError);
        }
        Ok(())
    }
}

impl Si1132Bus for MockSi1132 {
    type Error = MockBusError;

    fn write_bytes(&mut self, device: u8, register: u8, payload: &[u8]) -> Result<(), Self::Error> {
        self.check(device, register)?;
        for (i, value) in payload.iter().enumerate() {
            let reg = register.wrapping_add(i as u8);
            let _ = self.writes.push((reg, *value));
            match reg {
                registers::COMMAND => self.handle_command(*value),
                registers::IRQ_STATUS => self.regs[reg as usize] &= !*value,
                _ => self.regs[reg as usize] = *value,
            }
        }
        Ok(())
    }

    fn read_byte(&mut self, device: u8, register: u8) -> Result<u8, Self::Error> {
        self.check(device, register)?;
        if register == registers::RESPONSE {
            return Ok(self.response);
        }
        Ok(self.regs[register as usize])
    }

    fn read_bytes(&mut self, device: u8, register: u8, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.check(device, register)?;
        let count = match self.short_read {
            Some((r, n)) if r == register => n.min(buf.len()),
            _ => buf.len(),
        };
        let at = register as usize;
        buf[..count].copy_from_slice(&self.regs[at..at + count]);
        Ok(count)
    }
}

impl Si1132Timer for MockSi1132 {
    fn delay_us(&mut self, us: u32) {
        self.elapsed_us += us as u64;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_us += (ms as u64) * 1000;
    }
}
