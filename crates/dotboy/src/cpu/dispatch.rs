use lazy_static::lazy_static;

use crate::error::{EmuError, Result};
use crate::memory::Memory;

use super::exec;
use super::opcodes::{OpcodeInfo, PREFIX_CB};
use super::regs::Registers;

/// The part of the CPU that handlers may change besides registers and memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuControl {
    /// Global interrupt-enable latch (IME).
    pub interrupts_enabled: bool,
}

impl CpuControl {
    #[inline]
    pub fn enable_interrupts(&mut self) {
        self.interrupts_enabled = true;
    }

    #[inline]
    pub fn disable_interrupts(&mut self) {
        self.interrupts_enabled = false;
    }
}

/// Executes one opcode. Returns `Some(cycles)` to override the table cost
/// (conditional branches), or `None` to use it.
pub type Handler =
    fn(&mut Registers, &mut dyn Memory, &mut CpuControl, &OpcodeInfo) -> Result<Option<u32>>;

const SLOTS: usize = 512;

/// Opcode-indexed handler table covering both opcode spaces.
pub struct DispatchTable {
    handlers: [Option<Handler>; SLOTS],
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchTable {
    pub const fn new() -> Self {
        Self {
            handlers: [None; SLOTS],
        }
    }

    #[inline]
    fn slot(opcode: u16) -> usize {
        let base = if opcode >> 8 == PREFIX_CB as u16 { 0x100 } else { 0 };
        base + (opcode & 0xFF) as usize
    }

    /// Register `handler` for `opcode`, refusing to overwrite an entry.
    pub fn register(&mut self, opcode: u16, handler: Handler) -> Result<()> {
        let slot = &mut self.handlers[Self::slot(opcode)];
        if slot.is_some() {
            return Err(EmuError::DuplicateHandler(opcode));
        }
        *slot = Some(handler);
        Ok(())
    }

    /// Register `handler` for every opcode in `opcodes`.
    pub fn register_all<I>(&mut self, opcodes: I, handler: Handler) -> Result<()>
    where
        I: IntoIterator<Item = u16>,
    {
        for opcode in opcodes {
            self.register(opcode, handler)?;
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, opcode: u16) -> Option<Handler> {
        self.handlers[Self::slot(opcode)]
    }

    pub fn len(&self) -> usize {
        self.handlers.iter().filter(|h| h.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build the table with every implemented instruction family.
    pub fn full() -> Result<Self> {
        let mut table = Self::new();
        exec::register_all(&mut table)?;
        Ok(table)
    }
}

lazy_static! {
    /// Complete handler table, assembled on first use.
    pub static ref INSTRUCTIONS: DispatchTable = DispatchTable::full()
        .unwrap_or_else(|err| panic!("instruction table is inconsistent: {err}"));
}
