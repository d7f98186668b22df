use crate::cpu::alu::{self, Shift};
use crate::cpu::dispatch::{CpuControl, DispatchTable};
use crate::cpu::opcodes::OpcodeInfo;
use crate::cpu::operands::{imm8, imm8_signed, read_operand, read_wide};
use crate::cpu::regs::{FlagUpdate, Flags, Registers};
use crate::error::Result;
use crate::memory::Memory;

use super::{codes, quad};

pub(super) fn register(table: &mut DispatchTable) -> Result<()> {
    table.register_all(0x80..=0xBFu16, exec_alu_reg)?;
    table.register_all(
        codes(&[0xC6, 0xCE, 0xD6, 0xDE, 0xE6, 0xEE, 0xF6, 0xFE]),
        exec_alu_imm,
    )?;
    table.register_all(codes(&[0x07, 0x0F, 0x17, 0x1F]), exec_rotate_a)?;
    table.register_all(quad(0x09), exec_add_hl_rr)?;
    table.register(0xE8, exec_add_sp_r8)?;
    table.register(0x27, exec_daa)?;
    table.register(0x2F, exec_cpl)?;
    table.register(0x37, exec_scf)?;
    table.register(0x3F, exec_ccf)?;
    Ok(())
}

/// Apply the accumulator operation selected by bits 3-5.
fn apply(regs: &mut Registers, operation: u8, value: u8) {
    match operation & 0x07 {
        0 => alu::add8(regs, value, false),
        1 => alu::add8(regs, value, true),
        2 => alu::sub8(regs, value, false),
        3 => alu::sub8(regs, value, true),
        4 => alu::and8(regs, value),
        5 => alu::xor8(regs, value),
        6 => alu::or8(regs, value),
        _ => alu::cp8(regs, value),
    }
}

fn exec_alu_reg(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let opcode = info.code();
    let value = read_operand(regs, mem, opcode)?;
    apply(regs, opcode >> 3, value);
    Ok(None)
}

fn exec_alu_imm(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let value = imm8(regs, mem)?;
    apply(regs, info.code() >> 3, value);
    Ok(None)
}

/// RLCA, RRCA, RLA, RRA.
fn exec_rotate_a(
    regs: &mut Registers,
    _mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let op = Shift::from_index(info.code() >> 3);
    let a = regs.a;
    regs.a = alu::shift(regs, op, a, true);
    Ok(None)
}

fn exec_add_hl_rr(
    regs: &mut Registers,
    _mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let value = read_wide(regs, info.code() >> 4);
    alu::add16_hl(regs, value);
    Ok(None)
}

fn exec_add_sp_r8(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    _info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let offset = imm8_signed(regs, mem)?;
    let sp = regs.sp;
    regs.sp = alu::add16_signed(regs, sp, offset);
    Ok(None)
}

fn exec_daa(
    regs: &mut Registers,
    _mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    _info: &OpcodeInfo,
) -> Result<Option<u32>> {
    alu::daa(regs);
    Ok(None)
}

fn exec_cpl(
    regs: &mut Registers,
    _mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    _info: &OpcodeInfo,
) -> Result<Option<u32>> {
    regs.a = !regs.a;
    regs.set_flags(FlagUpdate::default().subtract(true).half_carry(true));
    Ok(None)
}

fn exec_scf(
    regs: &mut Registers,
    _mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    _info: &OpcodeInfo,
) -> Result<Option<u32>> {
    regs.set_flags(FlagUpdate::default().subtract(false).half_carry(false).carry(true));
    Ok(None)
}

fn exec_ccf(
    regs: &mut Registers,
    _mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    _info: &OpcodeInfo,
) -> Result<Option<u32>> {
    let carry = regs.flag(Flags::CARRY);
    regs.set_flags(FlagUpdate::default().subtract(false).half_carry(false).carry(!carry));
    Ok(None)
}
