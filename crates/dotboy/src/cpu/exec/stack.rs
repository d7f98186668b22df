use crate::cpu::dispatch::{CpuControl, DispatchTable};
use crate::cpu::opcodes::OpcodeInfo;
use crate::cpu::operands::{condition, imm16, jump_to, next_pc, pop16, push16};
use crate::cpu::regs::{Reg16, Registers};
use crate::error::Result;
use crate::memory::Memory;

use super::{codes, column, quad};

pub(super) fn register(table: &mut DispatchTable) -> Result<()> {
    table.register_all(quad(0xC5), exec_push_rr)?;
    table.register_all(quad(0xC1), exec_pop_rr)?;
    table.register(0xCD, exec_call_a16)?;
    table.register_all(codes(&[0xC4, 0xCC, 0xD4, 0xDC]), exec_call_cc)?;
    table.register(0xC9, exec_ret)?;
    table.register_all(codes(&[0xC0, 0xC8, 0xD0, 0xD8]), exec_ret_cc)?;
    table.register(0xD9, exec_reti)?;
    table.register_all(column(0xC7), exec_rst)?;
    Ok(())
}

/// PUSH/POP pair selected by bits 4-5: BC, DE, HL, AF.
fn stack_pair(opcode: u8) -> Reg16 {
    match (opcode >> 4) & 0x03 {
        0 => Reg16::BC,
        1 => Reg16::DE,
        2 => Reg16::HL,
        _ => Reg16::AF,
    }
}

fn exec_push_rr(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let value = regs.pair(stack_pair(info.code()));
    push16(regs, mem, value)?;
    Ok(None)
}

/// POP AF drops the low nibble of F.
fn exec_pop_rr(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let value = pop16(regs, mem)?;
    regs.set_pair(stack_pair(info.code()), value);
    Ok(None)
}

fn call(regs: &mut Registers, mem: &mut dyn Memory, info: &OpcodeInfo, target: u16) -> Result<()> {
    let ret = next_pc(regs, info);
    push16(regs, mem, ret)?;
    jump_to(regs, info, target);
    Ok(())
}

fn exec_call_a16(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let target = imm16(regs, mem)?;
    call(regs, mem, info, target)?;
    Ok(None)
}

fn exec_call_cc(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let taken = condition(regs, info.code());
    if taken {
        let target = imm16(regs, mem)?;
        call(regs, mem, info, target)?;
    }
    Ok(Some(info.cycles.branch(taken)))
}

fn ret(regs: &mut Registers, mem: &mut dyn Memory, info: &OpcodeInfo) -> Result<()> {
    let target = pop16(regs, mem)?;
    jump_to(regs, info, target);
    Ok(())
}

fn exec_ret(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    ret(regs, mem, info)?;
    Ok(None)
}

fn exec_ret_cc(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let taken = condition(regs, info.code());
    if taken {
        ret(regs, mem, info)?;
    }
    Ok(Some(info.cycles.branch(taken)))
}

fn exec_reti(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    ret(regs, mem, info)?;
    ctl.enable_interrupts();
    Ok(None)
}

fn exec_rst(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let vector = (info.code() & 0x38) as u16;
    call(regs, mem, info, vector)?;
    Ok(None)
}
