use std::borrow::Cow;

use lazy_static::lazy_static;

use crate::error::{EmuError, Result};

/// Escape byte that introduces the extended (CB) opcode space.
pub const PREFIX_CB: u8 = 0xCB;
pub const OPCODE_HALT: u16 = 0x76;

/// Cycle cost of an instruction in T-cycles.
///
/// `not_taken` is only present for conditional jumps, calls and returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cycles {
    pub taken: u32,
    pub not_taken: Option<u32>,
}

impl Cycles {
    /// Cost of a conditional instruction given whether its branch was taken.
    #[inline]
    pub fn branch(&self, taken: bool) -> u32 {
        if taken {
            self.taken
        } else {
            self.not_taken.unwrap_or(self.taken)
        }
    }
}

/// Static description of a single opcode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// `0x00..=0xFF`, or `0xCB00 | byte` for the extended space.
    pub opcode: u16,
    pub mnemonic: Cow<'static, str>,
    pub length: u8,
    pub cycles: Cycles,
}

impl OpcodeInfo {
    #[inline]
    pub fn is_extended(&self) -> bool {
        self.opcode & 0xFF00 == (PREFIX_CB as u16) << 8
    }

    /// The low opcode byte (the second byte for extended opcodes).
    #[inline]
    pub fn code(&self) -> u8 {
        self.opcode as u8
    }
}

#[derive(Clone, Copy)]
struct Entry {
    mnemonic: &'static str,
    length: u8,
    taken: u32,
    not_taken: Option<u32>,
}

const fn op(mnemonic: &'static str, length: u8, cycles: u32) -> Option<Entry> {
    Some(Entry {
        mnemonic,
        length,
        taken: cycles,
        not_taken: None,
    })
}

const fn cond(mnemonic: &'static str, length: u8, taken: u32, not_taken: u32) -> Option<Entry> {
    Some(Entry {
        mnemonic,
        length,
        taken,
        not_taken: Some(not_taken),
    })
}

/// Unprefixed opcode space. `None` marks the hardware opcode holes.
#[rustfmt::skip]
const UNPREFIXED: [Option<Entry>; 256] = [
    // 0x00
    op("NOP", 1, 4), op("LD BC,d16", 3, 12), op("LD (BC),A", 1, 8), op("INC BC", 1, 8),
    op("INC B", 1, 4), op("DEC B", 1, 4), op("LD B,d8", 2, 8), op("RLCA", 1, 4),
    op("LD (a16),SP", 3, 20), op("ADD HL,BC", 1, 8), op("LD A,(BC)", 1, 8), op("DEC BC", 1, 8),
    op("INC C", 1, 4), op("DEC C", 1, 4), op("LD C,d8", 2, 8), op("RRCA", 1, 4),
    // 0x10
    op("STOP 0", 2, 4), op("LD DE,d16", 3, 12), op("LD (DE),A", 1, 8), op("INC DE", 1, 8),
    op("INC D", 1, 4), op("DEC D", 1, 4), op("LD D,d8", 2, 8), op("RLA", 1, 4),
    op("JR r8", 2, 12), op("ADD HL,DE", 1, 8), op("LD A,(DE)", 1, 8), op("DEC DE", 1, 8),
    op("INC E", 1, 4), op("DEC E", 1, 4), op("LD E,d8", 2, 8), op("RRA", 1, 4),
    // 0x20
    cond("JR NZ,r8", 2, 12, 8), op("LD HL,d16", 3, 12), op("LD (HL+),A", 1, 8), op("INC HL", 1, 8),
    op("INC H", 1, 4), op("DEC H", 1, 4), op("LD H,d8", 2, 8), op("DAA", 1, 4),
    cond("JR Z,r8", 2, 12, 8), op("ADD HL,HL", 1, 8), op("LD A,(HL+)", 1, 8), op("DEC HL", 1, 8),
    op("INC L", 1, 4), op("DEC L", 1, 4), op("LD L,d8", 2, 8), op("CPL", 1, 4),
    // 0x30
    cond("JR NC,r8", 2, 12, 8), op("LD SP,d16", 3, 12), op("LD (HL-),A", 1, 8), op("INC SP", 1, 8),
    op("INC (HL)", 1, 12), op("DEC (HL)", 1, 12), op("LD (HL),d8", 2, 12), op("SCF", 1, 4),
    cond("JR C,r8", 2, 12, 8), op("ADD HL,SP", 1, 8), op("LD A,(HL-)", 1, 8), op("DEC SP", 1, 8),
    op("INC A", 1, 4), op("DEC A", 1, 4), op("LD A,d8", 2, 8), op("CCF", 1, 4),
    // 0x40
    op("LD B,B", 1, 4), op("LD B,C", 1, 4), op("LD B,D", 1, 4), op("LD B,E", 1, 4),
    op("LD B,H", 1, 4), op("LD B,L", 1, 4), op("LD B,(HL)", 1, 8), op("LD B,A", 1, 4),
    op("LD C,B", 1, 4), op("LD C,C", 1, 4), op("LD C,D", 1, 4), op("LD C,E", 1, 4),
    op("LD C,H", 1, 4), op("LD C,L", 1, 4), op("LD C,(HL)", 1, 8), op("LD C,A", 1, 4),
    // 0x50
    op("LD D,B", 1, 4), op("LD D,C", 1, 4), op("LD D,D", 1, 4), op("LD D,E", 1, 4),
    op("LD D,H", 1, 4), op("LD D,L", 1, 4), op("LD D,(HL)", 1, 8), op("LD D,A", 1, 4),
    op("LD E,B", 1, 4), op("LD E,C", 1, 4), op("LD E,D", 1, 4), op("LD E,E", 1, 4),
    op("LD E,H", 1, 4), op("LD E,L", 1, 4), op("LD E,(HL)", 1, 8), op("LD E,A", 1, 4),
    // 0x60
    op("LD H,B", 1, 4), op("LD H,C", 1, 4), op("LD H,D", 1, 4), op("LD H,E", 1, 4),
    op("LD H,H", 1, 4), op("LD H,L", 1, 4), op("LD H,(HL)", 1, 8), op("LD H,A", 1, 4),
    op("LD L,B", 1, 4), op("LD L,C", 1, 4), op("LD L,D", 1, 4), op("LD L,E", 1, 4),
    op("LD L,H", 1, 4), op("LD L,L", 1, 4), op("LD L,(HL)", 1, 8), op("LD L,A", 1, 4),
    // 0x70
    op("LD (HL),B", 1, 8), op("LD (HL),C", 1, 8), op("LD (HL),D", 1, 8), op("LD (HL),E", 1, 8),
    op("LD (HL),H", 1, 8), op("LD (HL),L", 1, 8), op("HALT", 1, 4), op("LD (HL),A", 1, 8),
    op("LD A,B", 1, 4), op("LD A,C", 1, 4), op("LD A,D", 1, 4), op("LD A,E", 1, 4),
    op("LD A,H", 1, 4), op("LD A,L", 1, 4), op("LD A,(HL)", 1, 8), op("LD A,A", 1, 4),
    // 0x80
    op("ADD A,B", 1, 4), op("ADD A,C", 1, 4), op("ADD A,D", 1, 4), op("ADD A,E", 1, 4),
    op("ADD A,H", 1, 4), op("ADD A,L", 1, 4), op("ADD A,(HL)", 1, 8), op("ADD A,A", 1, 4),
    op("ADC A,B", 1, 4), op("ADC A,C", 1, 4), op("ADC A,D", 1, 4), op("ADC A,E", 1, 4),
    op("ADC A,H", 1, 4), op("ADC A,L", 1, 4), op("ADC A,(HL)", 1, 8), op("ADC A,A", 1, 4),
    // 0x90
    op("SUB B", 1, 4), op("SUB C", 1, 4), op("SUB D", 1, 4), op("SUB E", 1, 4),
    op("SUB H", 1, 4), op("SUB L", 1, 4), op("SUB (HL)", 1, 8), op("SUB A", 1, 4),
    op("SBC A,B", 1, 4), op("SBC A,C", 1, 4), op("SBC A,D", 1, 4), op("SBC A,E", 1, 4),
    op("SBC A,H", 1, 4), op("SBC A,L", 1, 4), op("SBC A,(HL)", 1, 8), op("SBC A,A", 1, 4),
    // 0xA0
    op("AND B", 1, 4), op("AND C", 1, 4), op("AND D", 1, 4), op("AND E", 1, 4),
    op("AND H", 1, 4), op("AND L", 1, 4), op("AND (HL)", 1, 8), op("AND A", 1, 4),
    op("XOR B", 1, 4), op("XOR C", 1, 4), op("XOR D", 1, 4), op("XOR E", 1, 4),
    op("XOR H", 1, 4), op("XOR L", 1, 4), op("XOR (HL)", 1, 8), op("XOR A", 1, 4),
    // 0xB0
    op("OR B", 1, 4), op("OR C", 1, 4), op("OR D", 1, 4), op("OR E", 1, 4),
    op("OR H", 1, 4), op("OR L", 1, 4), op("OR (HL)", 1, 8), op("OR A", 1, 4),
    op("CP B", 1, 4), op("CP C", 1, 4), op("CP D", 1, 4), op("CP E", 1, 4),
    op("CP H", 1, 4), op("CP L", 1, 4), op("CP (HL)", 1, 8), op("CP A", 1, 4),
    // 0xC0
    cond("RET NZ", 1, 20, 8), op("POP BC", 1, 12), cond("JP NZ,a16", 3, 16, 12), op("JP a16", 3, 16),
    cond("CALL NZ,a16", 3, 24, 12), op("PUSH BC", 1, 16), op("ADD A,d8", 2, 8), op("RST 00H", 1, 16),
    cond("RET Z", 1, 20, 8), op("RET", 1, 16), cond("JP Z,a16", 3, 16, 12), op("PREFIX CB", 1, 4),
    cond("CALL Z,a16", 3, 24, 12), op("CALL a16", 3, 24), op("ADC A,d8", 2, 8), op("RST 08H", 1, 16),
    // 0xD0
    cond("RET NC", 1, 20, 8), op("POP DE", 1, 12), cond("JP NC,a16", 3, 16, 12), None,
    cond("CALL NC,a16", 3, 24, 12), op("PUSH DE", 1, 16), op("SUB d8", 2, 8), op("RST 10H", 1, 16),
    cond("RET C", 1, 20, 8), op("RETI", 1, 16), cond("JP C,a16", 3, 16, 12), None,
    cond("CALL C,a16", 3, 24, 12), None, op("SBC A,d8", 2, 8), op("RST 18H", 1, 16),
    // 0xE0
    op("LDH (a8),A", 2, 12), op("POP HL", 1, 12), op("LD (C),A", 1, 8), None,
    None, op("PUSH HL", 1, 16), op("AND d8", 2, 8), op("RST 20H", 1, 16),
    op("ADD SP,r8", 2, 16), op("JP (HL)", 1, 4), op("LD (a16),A", 3, 16), None,
    None, None, op("XOR d8", 2, 8), op("RST 28H", 1, 16),
    // 0xF0
    op("LDH A,(a8)", 2, 12), op("POP AF", 1, 12), op("LD A,(C)", 1, 8), op("DI", 1, 4),
    None, op("PUSH AF", 1, 16), op("OR d8", 2, 8), op("RST 30H", 1, 16),
    op("LD HL,SP+r8", 2, 12), op("LD SP,HL", 1, 8), op("LD A,(a16)", 3, 16), op("EI", 1, 4),
    None, None, op("CP d8", 2, 8), op("RST 38H", 1, 16),
];

/// Operand names in encoding order (index 6 is the memory operand).
pub(crate) const OPERAND_NAMES: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];

const CB_SHIFT_NAMES: [&str; 8] = ["RLC", "RRC", "RL", "RR", "SLA", "SRA", "SWAP", "SRL"];

fn extended_info(byte: u8) -> OpcodeInfo {
    let x = byte >> 6;
    let y = (byte >> 3) & 0x07;
    let z = (byte & 0x07) as usize;
    let target = OPERAND_NAMES[z];
    let memory = z == 6;

    let (mnemonic, cycles) = match x {
        0 => (
            format!("{} {}", CB_SHIFT_NAMES[y as usize], target),
            if memory { 16 } else { 8 },
        ),
        1 => (format!("BIT {y},{target}"), if memory { 12 } else { 8 }),
        2 => (format!("RES {y},{target}"), if memory { 16 } else { 8 }),
        _ => (format!("SET {y},{target}"), if memory { 16 } else { 8 }),
    };

    OpcodeInfo {
        opcode: ((PREFIX_CB as u16) << 8) | byte as u16,
        mnemonic: Cow::Owned(mnemonic),
        length: 2,
        cycles: Cycles {
            taken: cycles,
            not_taken: None,
        },
    }
}

fn build_unprefixed() -> Vec<Option<OpcodeInfo>> {
    UNPREFIXED
        .iter()
        .enumerate()
        .map(|(opcode, entry)| {
            entry.map(|entry| OpcodeInfo {
                opcode: opcode as u16,
                mnemonic: Cow::Borrowed(entry.mnemonic),
                length: entry.length,
                cycles: Cycles {
                    taken: entry.taken,
                    not_taken: entry.not_taken,
                },
            })
        })
        .collect()
}

lazy_static! {
    static ref UNPREFIXED_INFO: Vec<Option<OpcodeInfo>> = build_unprefixed();
    static ref EXTENDED_INFO: Vec<OpcodeInfo> = (0..=0xFFu8).map(extended_info).collect();
}

/// Look up the metadata for a decoded opcode.
///
/// `opcode` is either a single byte or `0xCB00 | byte`. Holes in the
/// unprefixed table are reported as [`EmuError::UndefinedOpcode`]; `pc` is
/// only used for the error report.
pub fn opcode_info(opcode: u16, pc: u16) -> Result<&'static OpcodeInfo> {
    let undefined = EmuError::UndefinedOpcode { opcode, pc };
    match opcode >> 8 {
        0 => UNPREFIXED_INFO[opcode as usize].as_ref().ok_or(undefined),
        hi if hi == PREFIX_CB as u16 => Ok(&EXTENDED_INFO[(opcode & 0xFF) as usize]),
        _ => Err(undefined),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holes_are_undefined() {
        for hole in [0xD3u16, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD] {
            assert_eq!(
                opcode_info(hole, 0x1234),
                Err(EmuError::UndefinedOpcode {
                    opcode: hole,
                    pc: 0x1234
                })
            );
        }
        let defined = (0u16..=0xFF).filter(|&op| opcode_info(op, 0).is_ok()).count();
        assert_eq!(defined, 256 - 11);
    }

    #[test]
    fn extended_space_is_complete() {
        for byte in 0u16..=0xFF {
            let info = opcode_info(0xCB00 | byte, 0).unwrap();
            assert_eq!(info.length, 2);
            assert!(info.is_extended());
        }
        assert_eq!(opcode_info(0xCB7E, 0).unwrap().mnemonic, "BIT 7,(HL)");
        assert_eq!(opcode_info(0xCB7E, 0).unwrap().cycles.taken, 12);
        assert_eq!(opcode_info(0xCB37, 0).unwrap().mnemonic, "SWAP A");
        assert_eq!(opcode_info(0xCBC6, 0).unwrap().cycles.taken, 16);
    }

    #[test]
    fn conditional_entries_carry_two_costs() {
        let jr_nz = opcode_info(0x20, 0).unwrap();
        assert_eq!(jr_nz.cycles.branch(true), 12);
        assert_eq!(jr_nz.cycles.branch(false), 8);

        let call = opcode_info(0xCD, 0).unwrap();
        assert_eq!(call.cycles.not_taken, None);
        assert_eq!(call.cycles.branch(false), 24);
    }

    #[test]
    fn lengths_match_operand_kinds() {
        for op in 0u16..=0xFF {
            let Ok(info) = opcode_info(op, 0) else {
                continue;
            };
            let name = info.mnemonic.as_ref();
            let expected = if name.contains("d16") || name.contains("a16") {
                3
            } else if ["d8", "a8", "r8", "STOP"].iter().any(|token| name.contains(token)) {
                2
            } else {
                1
            };
            assert_eq!(info.length, expected, "{}", info.mnemonic);
        }
    }
}
