use std::collections::VecDeque;
use std::fmt;

use crate::error::Result;
use crate::memory::Memory;

use super::opcodes::OpcodeInfo;
use super::regs::Registers;

/// One executed instruction as recorded by [`InstructionTrace`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceEntry {
    pub pc: u16,
    pub opcode: u16,
    /// Mnemonic with resolved operand data, e.g. `LDH A,(a8) {[0xFF44] 0x90}`.
    pub text: String,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}: [0x{:02X}] {}", self.pc, self.opcode, self.text)
    }
}

/// Bounded history of executed instructions, oldest first.
#[derive(Clone, Debug, Default)]
pub struct InstructionTrace {
    capacity: usize,
    entries: VecDeque<TraceEntry>,
}

impl InstructionTrace {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    pub fn push(&mut self, entry: TraceEntry) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&TraceEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// `{[addr] value}` annotation. The operand may be a store target the
/// instruction never reads, so a faulting read renders as `??`.
fn memory_note(mem: &mut dyn Memory, addr: u16) -> String {
    match mem.read8(addr) {
        Ok(value) => format!("{{[0x{addr:04X}] 0x{value:02X}}}"),
        Err(_) => format!("{{[0x{addr:04X}] ??}}"),
    }
}

/// Render the instruction at `regs.pc`, annotating immediate and indirect
/// operands with the data they currently refer to.
pub fn render(regs: &Registers, mem: &mut dyn Memory, info: &OpcodeInfo) -> Result<String> {
    let mnemonic = info.mnemonic.as_ref();
    let Some((name, operands)) = mnemonic.split_once(' ') else {
        return Ok(mnemonic.to_owned());
    };

    let imm = regs.pc.wrapping_add(1);
    let mut notes = Vec::new();
    for operand in operands.split(',') {
        match operand {
            "d16" | "a16" => notes.push(format!("{{0x{:04X}}}", mem.read16(imm)?)),
            "d8" | "r8" => notes.push(format!("{{0x{:02X}}}", mem.read8(imm)?)),
            "a8" => notes.push(format!("{{0x{:04X}}}", 0xFF00 | mem.read8(imm)? as u16)),
            "(a8)" => {
                let addr = 0xFF00 | mem.read8(imm)? as u16;
                notes.push(memory_note(mem, addr));
            }
            "(a16)" => {
                let addr = mem.read16(imm)?;
                notes.push(memory_note(mem, addr));
            }
            "(HL+)" | "(HL-)" => notes.push(memory_note(mem, regs.hl())),
            _ => {}
        }
    }

    let mut text = format!("{name} {operands}");
    for note in notes {
        text.push(' ');
        text.push_str(&note);
    }
    Ok(text)
}
