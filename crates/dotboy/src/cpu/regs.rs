use bitflags::bitflags;

use crate::config::BootState;
use crate::error::{EmuError, Result};

pub const DEFAULT_PC: u16 = 0x0100;
pub const DEFAULT_SP: u16 = 0xFFFE;

bitflags! {
    /// Condition flags packed into the upper nibble of F.
    ///
    /// The lower nibble does not exist on hardware; `from_bits_truncate`
    /// drops it so F can never carry stray low bits.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Flags: u8 {
        const ZERO = 0b1000_0000;
        const SUBTRACT = 0b0100_0000;
        const HALF_CARRY = 0b0010_0000;
        const CARRY = 0b0001_0000;
    }
}

/// Partial flag update: `Some` overwrites, `None` keeps the current value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlagUpdate {
    pub zero: Option<bool>,
    pub subtract: Option<bool>,
    pub half_carry: Option<bool>,
    pub carry: Option<bool>,
}

impl FlagUpdate {
    /// Update that sets all four flags.
    #[inline]
    pub const fn all(zero: bool, subtract: bool, half_carry: bool, carry: bool) -> Self {
        Self {
            zero: Some(zero),
            subtract: Some(subtract),
            half_carry: Some(half_carry),
            carry: Some(carry),
        }
    }

    #[inline]
    pub const fn zero(mut self, value: bool) -> Self {
        self.zero = Some(value);
        self
    }

    #[inline]
    pub const fn subtract(mut self, value: bool) -> Self {
        self.subtract = Some(value);
        self
    }

    #[inline]
    pub const fn half_carry(mut self, value: bool) -> Self {
        self.half_carry = Some(value);
        self
    }

    #[inline]
    pub const fn carry(mut self, value: bool) -> Self {
        self.carry = Some(value);
        self
    }
}

/// Named 8-bit registers. `F` is synthesized from [`Flags`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg8 {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
}

/// 16-bit register pairs, high register first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg16 {
    AF,
    BC,
    DE,
    HL,
}

impl Reg16 {
    #[inline]
    pub const fn halves(self) -> (Reg8, Reg8) {
        match self {
            Reg16::AF => (Reg8::A, Reg8::F),
            Reg16::BC => (Reg8::B, Reg8::C),
            Reg16::DE => (Reg8::D, Reg8::E),
            Reg16::HL => (Reg8::H, Reg8::L),
        }
    }
}

/// Register set of the SM83 core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    flags: Flags,
    pub pc: u16,
    pub sp: u16,
}

impl Default for Registers {
    fn default() -> Self {
        Self {
            a: 0,
            b: 0,
            c: 0,
            d: 0,
            e: 0,
            h: 0,
            l: 0,
            flags: Flags::empty(),
            pc: DEFAULT_PC,
            sp: DEFAULT_SP,
        }
    }
}

impl Registers {
    pub fn new(boot: BootState) -> Self {
        match boot {
            BootState::Zeroed => Self::default(),
            BootState::PostBoot => {
                let mut regs = Self::default();
                regs.set_pair(Reg16::AF, 0x01B0);
                regs.set_pair(Reg16::BC, 0x0013);
                regs.set_pair(Reg16::DE, 0x00D8);
                regs.set_pair(Reg16::HL, 0x014D);
                regs
            }
        }
    }

    #[inline]
    pub fn get(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::A => self.a,
            Reg8::F => self.flags.bits(),
            Reg8::B => self.b,
            Reg8::C => self.c,
            Reg8::D => self.d,
            Reg8::E => self.e,
            Reg8::H => self.h,
            Reg8::L => self.l,
        }
    }

    #[inline]
    pub fn set(&mut self, reg: Reg8, value: u8) {
        match reg {
            Reg8::A => self.a = value,
            Reg8::F => self.flags = Flags::from_bits_truncate(value),
            Reg8::B => self.b = value,
            Reg8::C => self.c = value,
            Reg8::D => self.d = value,
            Reg8::E => self.e = value,
            Reg8::H => self.h = value,
            Reg8::L => self.l = value,
        }
    }

    /// Store `value mod 256`, matching the register's wraparound.
    #[inline]
    pub fn set_wrapping(&mut self, reg: Reg8, value: i64) {
        self.set(reg, value.rem_euclid(0x100) as u8);
    }

    #[inline]
    pub fn pair(&self, pair: Reg16) -> u16 {
        let (hi, lo) = pair.halves();
        u16::from_be_bytes([self.get(hi), self.get(lo)])
    }

    #[inline]
    pub fn set_pair(&mut self, pair: Reg16, value: u16) {
        let (hi, lo) = pair.halves();
        let [h, l] = value.to_be_bytes();
        self.set(hi, h);
        self.set(lo, l);
    }

    /// Store `value mod 65536` into a pair.
    #[inline]
    pub fn set_pair_wrapping(&mut self, pair: Reg16, value: i64) {
        self.set_pair(pair, value.rem_euclid(0x1_0000) as u16);
    }

    #[inline]
    pub fn af(&self) -> u16 {
        self.pair(Reg16::AF)
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        self.pair(Reg16::BC)
    }

    #[inline]
    pub fn de(&self) -> u16 {
        self.pair(Reg16::DE)
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        self.pair(Reg16::HL)
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        self.set_pair(Reg16::HL, value);
    }

    #[inline]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    #[inline]
    pub fn flag(&self, flag: Flags) -> bool {
        self.flags.contains(flag)
    }

    /// Apply a partial update and return the resulting flags.
    pub fn set_flags(&mut self, update: FlagUpdate) -> Flags {
        let fields = [
            (Flags::ZERO, update.zero),
            (Flags::SUBTRACT, update.subtract),
            (Flags::HALF_CARRY, update.half_carry),
            (Flags::CARRY, update.carry),
        ];
        for (flag, value) in fields {
            if let Some(value) = value {
                self.flags.set(flag, value);
            }
        }
        self.flags
    }

    /// Checked PC store for callers holding a wider integer.
    pub fn try_set_pc(&mut self, value: u32) -> Result<()> {
        self.pc = u16::try_from(value).map_err(|_| EmuError::InvalidProgramCounter(value))?;
        Ok(())
    }

    /// Checked SP store for callers holding a wider integer.
    pub fn try_set_sp(&mut self, value: u32) -> Result<()> {
        self.sp = u16::try_from(value).map_err(|_| EmuError::InvalidStackPointer(value))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_REGS: [Reg8; 8] = [
        Reg8::A,
        Reg8::F,
        Reg8::B,
        Reg8::C,
        Reg8::D,
        Reg8::E,
        Reg8::H,
        Reg8::L,
    ];

    #[test]
    fn byte_stores_wrap_modulo_256() {
        let mut regs = Registers::default();
        for value in [-1i64, 0, 0x7F, 0xFF, 0x100, 0x1234, -0x101] {
            for reg in ALL_REGS {
                regs.set_wrapping(reg, value);
                let expected = value.rem_euclid(256) as u8;
                if reg == Reg8::F {
                    assert_eq!(regs.get(reg), expected & 0xF0);
                } else {
                    assert_eq!(regs.get(reg), expected, "{reg:?} <- {value}");
                }
                assert_eq!(regs.get(Reg8::F) & 0x0F, 0);
            }
        }
    }

    #[test]
    fn pairs_round_trip_and_compose_big_endian() {
        let mut regs = Registers::default();
        for pair in [Reg16::BC, Reg16::DE, Reg16::HL] {
            regs.set_pair(pair, 0xBEEF);
            assert_eq!(regs.pair(pair), 0xBEEF);
        }

        regs.set(Reg8::H, 0x12);
        regs.set(Reg8::L, 0x34);
        assert_eq!(regs.hl(), 0x1234);

        regs.set_pair_wrapping(Reg16::DE, 0x1_0005);
        assert_eq!(regs.de(), 0x0005);
    }

    #[test]
    fn af_pair_drops_low_nibble_of_f() {
        let mut regs = Registers::default();
        regs.set_pair(Reg16::AF, 0x12FF);
        assert_eq!(regs.a, 0x12);
        assert_eq!(regs.af(), 0x12F0);
        assert!(regs.flag(Flags::ZERO));
        assert!(regs.flag(Flags::CARRY));
    }

    #[test]
    fn partial_flag_update_preserves_omitted_flags() {
        let mut regs = Registers::default();
        regs.set_flags(FlagUpdate::all(true, true, false, true));

        let flags = regs.set_flags(FlagUpdate::default().subtract(false).half_carry(true));
        assert_eq!(
            flags,
            Flags::ZERO | Flags::HALF_CARRY | Flags::CARRY,
        );
    }

    #[test]
    fn checked_pc_and_sp_reject_out_of_range() {
        let mut regs = Registers::default();
        assert!(regs.try_set_pc(0xFFFF).is_ok());
        assert_eq!(regs.pc, 0xFFFF);
        assert_eq!(
            regs.try_set_pc(0x1_0000),
            Err(EmuError::InvalidProgramCounter(0x1_0000))
        );
        assert_eq!(
            regs.try_set_sp(0x2_0000),
            Err(EmuError::InvalidStackPointer(0x2_0000))
        );
        assert_eq!(regs.pc, 0xFFFF);
    }

    #[test]
    fn post_boot_state_matches_dmg() {
        let regs = Registers::new(BootState::PostBoot);
        assert_eq!(regs.af(), 0x01B0);
        assert_eq!(regs.bc(), 0x0013);
        assert_eq!(regs.de(), 0x00D8);
        assert_eq!(regs.hl(), 0x014D);
        assert_eq!(regs.pc, 0x0100);
        assert_eq!(regs.sp, 0xFFFE);
    }
}
