use crate::cpu::dispatch::{CpuControl, DispatchTable};
use crate::cpu::opcodes::OpcodeInfo;
use crate::cpu::operands::{condition, imm16, imm8_signed, jump_to, next_pc};
use crate::cpu::regs::Registers;
use crate::error::Result;
use crate::memory::Memory;

use super::codes;

pub(super) fn register(table: &mut DispatchTable) -> Result<()> {
    table.register(0x18, exec_jr)?;
    table.register_all(codes(&[0x20, 0x28, 0x30, 0x38]), exec_jr_cc)?;
    table.register(0xC3, exec_jp_a16)?;
    table.register_all(codes(&[0xC2, 0xCA, 0xD2, 0xDA]), exec_jp_cc)?;
    table.register(0xE9, exec_jp_hl)?;
    Ok(())
}

/// Relative target: the address after the instruction plus a signed offset.
fn relative_target(regs: &Registers, mem: &mut dyn Memory, info: &OpcodeInfo) -> Result<u16> {
    let offset = imm8_signed(regs, mem)?;
    Ok(next_pc(regs, info).wrapping_add(offset as i16 as u16))
}

fn exec_jr(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let target = relative_target(regs, mem, info)?;
    jump_to(regs, info, target);
    Ok(None)
}

fn exec_jr_cc(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let taken = condition(regs, info.code());
    if taken {
        let target = relative_target(regs, mem, info)?;
        jump_to(regs, info, target);
    }
    Ok(Some(info.cycles.branch(taken)))
}

fn exec_jp_a16(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let target = imm16(regs, mem)?;
    jump_to(regs, info, target);
    Ok(None)
}

fn exec_jp_cc(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let taken = condition(regs, info.code());
    if taken {
        let target = imm16(regs, mem)?;
        jump_to(regs, info, target);
    }
    Ok(Some(info.cycles.branch(taken)))
}

fn exec_jp_hl(
    regs: &mut Registers,
    _mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let target = regs.hl();
    jump_to(regs, info, target);
    Ok(None)
}
