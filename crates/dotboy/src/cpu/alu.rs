use super::regs::{FlagUpdate, Flags, Registers};

/// 8-bit ADD/ADC into A.
///
/// `use_carry` selects between ADD (false) and ADC (true). The half-carry
/// includes the incoming carry.
pub(super) fn add8(regs: &mut Registers, value: u8, use_carry: bool) {
    let a = regs.a;
    let carry_in = u8::from(use_carry && regs.flag(Flags::CARRY));

    let half = (a & 0x0F) + (value & 0x0F) + carry_in;
    let full = a as u16 + value as u16 + carry_in as u16;
    let result = full as u8;

    regs.a = result;
    regs.set_flags(FlagUpdate::all(result == 0, false, half > 0x0F, full > 0xFF));
}

/// 8-bit SUB/SBC from A.
pub(super) fn sub8(regs: &mut Registers, value: u8, use_carry: bool) {
    regs.a = compare(regs, value, use_carry);
}

/// Flags of `A - value - carry`, returning the difference without storing it.
fn compare(regs: &mut Registers, value: u8, use_carry: bool) -> u8 {
    let a = regs.a;
    let carry_in = i16::from(use_carry && regs.flag(Flags::CARRY));

    let half = (a & 0x0F) as i16 - (value & 0x0F) as i16 - carry_in;
    let full = a as i16 - value as i16 - carry_in;
    let result = full as u8;

    regs.set_flags(FlagUpdate::all(result == 0, true, half < 0, full < 0));
    result
}

/// CP: flags as for SUB, A unchanged.
#[inline]
pub(super) fn cp8(regs: &mut Registers, value: u8) {
    compare(regs, value, false);
}

#[inline]
pub(super) fn and8(regs: &mut Registers, value: u8) {
    regs.a &= value;
    regs.set_flags(FlagUpdate::all(regs.a == 0, false, true, false));
}

#[inline]
pub(super) fn or8(regs: &mut Registers, value: u8) {
    regs.a |= value;
    regs.set_flags(FlagUpdate::all(regs.a == 0, false, false, false));
}

#[inline]
pub(super) fn xor8(regs: &mut Registers, value: u8) {
    regs.a ^= value;
    regs.set_flags(FlagUpdate::all(regs.a == 0, false, false, false));
}

/// Decimal adjust A after a BCD addition or subtraction. N is kept.
pub(super) fn daa(regs: &mut Registers) {
    let mut a = regs.a;
    let mut adjust: u8 = if regs.flag(Flags::CARRY) { 0x60 } else { 0x00 };
    if regs.flag(Flags::HALF_CARRY) {
        adjust |= 0x06;
    }

    if !regs.flag(Flags::SUBTRACT) {
        if (a & 0x0F) > 0x09 {
            adjust |= 0x06;
        }
        if a > 0x99 {
            adjust |= 0x60;
        }
        a = a.wrapping_add(adjust);
    } else {
        a = a.wrapping_sub(adjust);
    }

    regs.a = a;
    regs.set_flags(
        FlagUpdate::default()
            .zero(a == 0)
            .half_carry(false)
            .carry(adjust >= 0x60),
    );
}

/// INC for 8-bit operands. C is kept.
#[inline]
pub(super) fn inc8(regs: &mut Registers, value: u8) -> u8 {
    let result = value.wrapping_add(1);
    regs.set_flags(
        FlagUpdate::default()
            .zero(result == 0)
            .subtract(false)
            .half_carry(value & 0x0F == 0x0F),
    );
    result
}

/// DEC for 8-bit operands. C is kept.
#[inline]
pub(super) fn dec8(regs: &mut Registers, value: u8) -> u8 {
    let result = value.wrapping_sub(1);
    regs.set_flags(
        FlagUpdate::default()
            .zero(result == 0)
            .subtract(true)
            .half_carry(value & 0x0F == 0),
    );
    result
}

/// `ADD HL,rr`: Z kept, H from bit 11, C from bit 15.
pub(super) fn add16_hl(regs: &mut Registers, value: u16) {
    let hl = regs.hl();
    regs.set_flags(
        FlagUpdate::default()
            .subtract(false)
            .half_carry((hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF)
            .carry(hl as u32 + value as u32 > 0xFFFF),
    );
    regs.set_hl(hl.wrapping_add(value));
}

/// Signed 8-bit offset added to a 16-bit base (`ADD SP,r8`, `LD HL,SP+r8`).
///
/// Z and N are cleared; H and C come from the unsigned low-byte addition.
pub(super) fn add16_signed(regs: &mut Registers, base: u16, offset: i8) -> u16 {
    let raw = offset as u8 as u16;
    regs.set_flags(FlagUpdate::all(
        false,
        false,
        (base & 0x000F) + (raw & 0x000F) > 0x000F,
        (base & 0x00FF) + raw > 0x00FF,
    ));
    base.wrapping_add(offset as i16 as u16)
}

/// Rotate/shift group shared by the accumulator rotates and the extended
/// opcode space, selected by bits 3-5 of the opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Shift {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl Shift {
    pub(super) fn from_index(index: u8) -> Self {
        match index & 0x07 {
            0 => Shift::Rlc,
            1 => Shift::Rrc,
            2 => Shift::Rl,
            3 => Shift::Rr,
            4 => Shift::Sla,
            5 => Shift::Sra,
            6 => Shift::Swap,
            _ => Shift::Srl,
        }
    }

    /// Apply the operation, returning the result and the carry out.
    pub(super) fn apply(self, value: u8, carry_in: bool) -> (u8, bool) {
        let low = value & 0x01 != 0;
        let high = value & 0x80 != 0;
        match self {
            Shift::Rlc => (value.rotate_left(1), high),
            Shift::Rrc => (value.rotate_right(1), low),
            Shift::Rl => ((value << 1) | u8::from(carry_in), high),
            Shift::Rr => ((value >> 1) | (u8::from(carry_in) << 7), low),
            Shift::Sla => (value << 1, high),
            Shift::Sra => ((value >> 1) | (value & 0x80), low),
            Shift::Swap => (value.rotate_left(4), false),
            Shift::Srl => (value >> 1, low),
        }
    }
}

/// Shift `value` and update flags. `accumulator` selects the RLCA family,
/// which always clears Z.
pub(super) fn shift(regs: &mut Registers, op: Shift, value: u8, accumulator: bool) -> u8 {
    let (result, carry) = op.apply(value, regs.flag(Flags::CARRY));
    let zero = !accumulator && result == 0;
    regs.set_flags(FlagUpdate::all(zero, false, false, carry));
    result
}
