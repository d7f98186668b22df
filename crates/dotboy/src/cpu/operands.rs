use crate::error::Result;
use crate::memory::Memory;

use super::opcodes::OpcodeInfo;
use super::regs::{Flags, Registers};

/// First immediate byte of the instruction at PC.
#[inline]
pub(super) fn imm8(regs: &Registers, mem: &mut dyn Memory) -> Result<u8> {
    mem.read8(regs.pc.wrapping_add(1))
}

/// Immediate byte reinterpreted as a signed displacement.
#[inline]
pub(super) fn imm8_signed(regs: &Registers, mem: &mut dyn Memory) -> Result<i8> {
    Ok(imm8(regs, mem)? as i8)
}

/// Little-endian 16-bit immediate following the opcode.
#[inline]
pub(super) fn imm16(regs: &Registers, mem: &mut dyn Memory) -> Result<u16> {
    mem.read16(regs.pc.wrapping_add(1))
}

/// Read an 8-bit operand by its encoding index.
///
/// 0=B, 1=C, 2=D, 3=E, 4=H, 5=L, 6=(HL), 7=A.
#[inline]
pub(super) fn read_operand(regs: &Registers, mem: &mut dyn Memory, index: u8) -> Result<u8> {
    Ok(match index & 0x07 {
        0 => regs.b,
        1 => regs.c,
        2 => regs.d,
        3 => regs.e,
        4 => regs.h,
        5 => regs.l,
        6 => mem.read8(regs.hl())?,
        _ => regs.a,
    })
}

/// Write an 8-bit operand by its encoding index (see [`read_operand`]).
#[inline]
pub(super) fn write_operand(
    regs: &mut Registers,
    mem: &mut dyn Memory,
    index: u8,
    value: u8,
) -> Result<()> {
    match index & 0x07 {
        0 => regs.b = value,
        1 => regs.c = value,
        2 => regs.d = value,
        3 => regs.e = value,
        4 => regs.h = value,
        5 => regs.l = value,
        6 => mem.write8(regs.hl(), value)?,
        _ => regs.a = value,
    }
    Ok(())
}

/// Read the 16-bit operand selected by bits 4-5 of `INC rr`/`LD rr,d16`
/// style opcodes: BC, DE, HL, SP.
#[inline]
pub(super) fn read_wide(regs: &Registers, index: u8) -> u16 {
    match index & 0x03 {
        0 => regs.bc(),
        1 => regs.de(),
        2 => regs.hl(),
        _ => regs.sp,
    }
}

#[inline]
pub(super) fn write_wide(regs: &mut Registers, index: u8, value: u16) {
    use super::regs::Reg16;
    match index & 0x03 {
        0 => regs.set_pair(Reg16::BC, value),
        1 => regs.set_pair(Reg16::DE, value),
        2 => regs.set_pair(Reg16::HL, value),
        _ => regs.sp = value,
    }
}

/// Condition selected by bits 3-4 of conditional jumps, calls and returns.
#[inline]
pub(super) fn condition(regs: &Registers, opcode: u8) -> bool {
    match (opcode >> 3) & 0x03 {
        0 => !regs.flag(Flags::ZERO),
        1 => regs.flag(Flags::ZERO),
        2 => !regs.flag(Flags::CARRY),
        _ => regs.flag(Flags::CARRY),
    }
}

/// Address of the instruction following the current one.
#[inline]
pub(super) fn next_pc(regs: &Registers, info: &OpcodeInfo) -> u16 {
    regs.pc.wrapping_add(info.length as u16)
}

/// Redirect execution to `target`.
///
/// The step loop always adds the instruction length after the handler
/// returns, so the stored PC is `target - length`.
#[inline]
pub(super) fn jump_to(regs: &mut Registers, info: &OpcodeInfo, target: u16) {
    regs.pc = target.wrapping_sub(info.length as u16);
}

pub(crate) fn push16(regs: &mut Registers, mem: &mut dyn Memory, value: u16) -> Result<()> {
    let [hi, lo] = value.to_be_bytes();
    // Stack grows downward: memory[SP] = low, memory[SP+1] = high.
    regs.sp = regs.sp.wrapping_sub(1);
    mem.write8(regs.sp, hi)?;
    regs.sp = regs.sp.wrapping_sub(1);
    mem.write8(regs.sp, lo)
}

pub(crate) fn pop16(regs: &mut Registers, mem: &mut dyn Memory) -> Result<u16> {
    let value = mem.read16(regs.sp)?;
    regs.sp = regs.sp.wrapping_add(2);
    Ok(value)
}
