use crate::cpu::alu;
use crate::cpu::dispatch::{CpuControl, DispatchTable};
use crate::cpu::opcodes::{OpcodeInfo, OPCODE_HALT};
use crate::cpu::operands::{imm16, imm8, imm8_signed, read_operand, write_operand, write_wide};
use crate::cpu::regs::Registers;
use crate::error::Result;
use crate::memory::Memory;

use super::{codes, column, quad};

pub(super) fn register(table: &mut DispatchTable) -> Result<()> {
    table.register_all(quad(0x01), exec_ld_rr_d16)?;
    table.register_all(column(0x06), exec_ld_r_d8)?;
    table.register_all(
        (0x40..=0x7Fu16).filter(|&op| op != OPCODE_HALT),
        exec_ld_r_r,
    )?;
    table.register_all(quad(0x02), exec_ld_indirect_a)?;
    table.register_all(quad(0x0A), exec_ld_a_indirect)?;
    table.register(0x08, exec_ld_a16_sp)?;
    table.register_all(codes(&[0xE0, 0xF0]), exec_ldh_a8)?;
    table.register_all(codes(&[0xE2, 0xF2]), exec_ldh_c)?;
    table.register_all(codes(&[0xEA, 0xFA]), exec_ld_a16_a)?;
    table.register(0xF8, exec_ld_hl_sp_r8)?;
    table.register(0xF9, exec_ld_sp_hl)?;
    Ok(())
}

fn exec_ld_rr_d16(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let value = imm16(regs, mem)?;
    write_wide(regs, info.code() >> 4, value);
    Ok(None)
}

fn exec_ld_r_d8(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let value = imm8(regs, mem)?;
    write_operand(regs, mem, info.code() >> 3, value)?;
    Ok(None)
}

fn exec_ld_r_r(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let opcode = info.code();
    let value = read_operand(regs, mem, opcode)?;
    write_operand(regs, mem, opcode >> 3, value)?;
    Ok(None)
}

/// Address for `(BC)`, `(DE)`, `(HL+)`, `(HL-)`, post-adjusting HL.
fn indirect_address(regs: &mut Registers, opcode: u8) -> u16 {
    match (opcode >> 4) & 0x03 {
        0 => regs.bc(),
        1 => regs.de(),
        2 => {
            let hl = regs.hl();
            regs.set_hl(hl.wrapping_add(1));
            hl
        }
        _ => {
            let hl = regs.hl();
            regs.set_hl(hl.wrapping_sub(1));
            hl
        }
    }
}

fn exec_ld_indirect_a(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let addr = indirect_address(regs, info.code());
    mem.write8(addr, regs.a)?;
    Ok(None)
}

fn exec_ld_a_indirect(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let addr = indirect_address(regs, info.code());
    regs.a = mem.read8(addr)?;
    Ok(None)
}

fn exec_ld_a16_sp(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    _info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let addr = imm16(regs, mem)?;
    mem.write16(addr, regs.sp)?;
    Ok(None)
}

fn exec_ldh_a8(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let addr = 0xFF00 | imm8(regs, mem)? as u16;
    if info.code() == 0xE0 {
        mem.write8(addr, regs.a)?;
    } else {
        regs.a = mem.read8(addr)?;
    }
    Ok(None)
}

fn exec_ldh_c(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let addr = 0xFF00 | regs.c as u16;
    if info.code() == 0xE2 {
        mem.write8(addr, regs.a)?;
    } else {
        regs.a = mem.read8(addr)?;
    }
    Ok(None)
}

fn exec_ld_a16_a(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let addr = imm16(regs, mem)?;
    if info.code() == 0xEA {
        mem.write8(addr, regs.a)?;
    } else {
        regs.a = mem.read8(addr)?;
    }
    Ok(None)
}

fn exec_ld_hl_sp_r8(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    _info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let offset = imm8_signed(regs, mem)?;
    let sp = regs.sp;
    let result = alu::add16_signed(regs, sp, offset);
    regs.set_hl(result);
    Ok(None)
}

fn exec_ld_sp_hl(
    regs: &mut Registers,
    _mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    _info: &OpcodeInfo,
) -> Result<Option<u32>> {
    regs.sp = regs.hl();
    Ok(None)
}
