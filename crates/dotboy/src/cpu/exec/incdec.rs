use crate::cpu::alu;
use crate::cpu::dispatch::{CpuControl, DispatchTable};
use crate::cpu::opcodes::OpcodeInfo;
use crate::cpu::operands::{read_operand, read_wide, write_operand, write_wide};
use crate::cpu::regs::Registers;
use crate::error::Result;
use crate::memory::Memory;

use super::{column, quad};

pub(super) fn register(table: &mut DispatchTable) -> Result<()> {
    table.register_all(column(0x04), exec_inc8)?;
    table.register_all(column(0x05), exec_dec8)?;
    table.register_all(quad(0x03), exec_inc16)?;
    table.register_all(quad(0x0B), exec_dec16)?;
    Ok(())
}

fn exec_inc8(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let index = info.code() >> 3;
    let value = read_operand(regs, mem, index)?;
    let result = alu::inc8(regs, value);
    write_operand(regs, mem, index, result)?;
    Ok(None)
}

fn exec_dec8(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let index = info.code() >> 3;
    let value = read_operand(regs, mem, index)?;
    let result = alu::dec8(regs, value);
    write_operand(regs, mem, index, result)?;
    Ok(None)
}

// 16-bit INC/DEC leave the flags alone.

fn exec_inc16(
    regs: &mut Registers,
    _mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let index = info.code() >> 4;
    let value = read_wide(regs, index).wrapping_add(1);
    write_wide(regs, index, value);
    Ok(None)
}

fn exec_dec16(
    regs: &mut Registers,
    _mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let index = info.code() >> 4;
    let value = read_wide(regs, index).wrapping_sub(1);
    write_wide(regs, index, value);
    Ok(None)
}
