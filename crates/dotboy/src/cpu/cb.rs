//! Extended (`0xCB`-prefixed) opcode space: rotates, shifts, and bit
//! operations on the eight operands.

use super::alu::{self, Shift};
use super::dispatch::{CpuControl, DispatchTable};
use super::opcodes::{OpcodeInfo, PREFIX_CB};
use super::operands::{read_operand, write_operand};
use super::regs::{FlagUpdate, Registers};
use crate::error::Result;
use crate::memory::Memory;

pub(super) fn register(table: &mut DispatchTable) -> Result<()> {
    let extended = |range: std::ops::RangeInclusive<u16>| {
        range.map(|byte| ((PREFIX_CB as u16) << 8) | byte)
    };
    table.register_all(extended(0x00..=0x3F), exec_shift)?;
    table.register_all(extended(0x40..=0x7F), exec_bit)?;
    table.register_all(extended(0x80..=0xBF), exec_res)?;
    table.register_all(extended(0xC0..=0xFF), exec_set)?;
    Ok(())
}

fn exec_shift(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let code = info.code();
    let value = read_operand(regs, mem, code)?;
    let result = alu::shift(regs, Shift::from_index(code >> 3), value, false);
    write_operand(regs, mem, code, result)?;
    Ok(None)
}

/// BIT b,r: Z = !bit, N = 0, H = 1, C kept.
fn exec_bit(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let code = info.code();
    let bit = (code >> 3) & 0x07;
    let value = read_operand(regs, mem, code)?;
    regs.set_flags(
        FlagUpdate::default()
            .zero(value & (1 << bit) == 0)
            .subtract(false)
            .half_carry(true),
    );
    Ok(None)
}

fn exec_res(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let code = info.code();
    let bit = (code >> 3) & 0x07;
    let value = read_operand(regs, mem, code)?;
    write_operand(regs, mem, code, value & !(1 << bit))?;
    Ok(None)
}

fn exec_set(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let code = info.code();
    let bit = (code >> 3) & 0x07;
    let value = read_operand(regs, mem, code)?;
    write_operand(regs, mem, code, value | (1 << bit))?;
    Ok(None)
}
