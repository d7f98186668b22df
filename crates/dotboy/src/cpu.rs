mod alu;
mod cb;
mod dispatch;
mod exec;
pub mod opcodes;
mod operands;
pub mod regs;
pub mod trace;

pub use dispatch::{CpuControl, DispatchTable, Handler, INSTRUCTIONS};
pub use opcodes::{opcode_info, Cycles, OpcodeInfo};
pub use regs::{FlagUpdate, Flags, Reg16, Reg8, Registers};
pub use trace::{InstructionTrace, TraceEntry};

use crate::config::BootState;
use crate::error::Result;
use crate::memory::Memory;

use opcodes::{OPCODE_HALT, PREFIX_CB};

/// Cycles consumed by a step while halted, and by HALT itself.
pub const IDLE_CYCLES: u32 = 4;

/// Copy of the CPU state for debuggers and frame dumps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub regs: Registers,
    pub interrupts_enabled: bool,
    pub halted: bool,
    pub has_unimplemented: bool,
}

/// SM83 interpreter.
///
/// Owns the register set and the control latches; memory is borrowed per
/// step so the same core can run against the machine bus or a test bus.
#[derive(Clone)]
pub struct Cpu {
    pub regs: Registers,
    control: CpuControl,
    halted: bool,
    has_unimplemented: bool,
    table: &'static DispatchTable,
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("regs", &self.regs)
            .field("control", &self.control)
            .field("halted", &self.halted)
            .field("has_unimplemented", &self.has_unimplemented)
            .finish_non_exhaustive()
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new(BootState::default())
    }
}

impl Cpu {
    pub fn new(boot: BootState) -> Self {
        Self::with_table(boot, &INSTRUCTIONS)
    }

    /// CPU that dispatches through a caller-provided handler table.
    pub fn with_table(boot: BootState, table: &'static DispatchTable) -> Self {
        Self {
            regs: Registers::new(boot),
            control: CpuControl::default(),
            halted: false,
            has_unimplemented: false,
            table,
        }
    }

    #[inline]
    pub fn interrupts_enabled(&self) -> bool {
        self.control.interrupts_enabled
    }

    #[inline]
    pub fn set_interrupts_enabled(&mut self, enabled: bool) {
        self.control.interrupts_enabled = enabled;
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Set once an opcode without a handler has been skipped.
    #[inline]
    pub fn has_unimplemented(&self) -> bool {
        self.has_unimplemented
    }

    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            regs: self.regs,
            interrupts_enabled: self.control.interrupts_enabled,
            halted: self.halted,
            has_unimplemented: self.has_unimplemented,
        }
    }

    /// Read the opcode at `addr`, folding the CB prefix into `0xCB00 | byte`.
    fn fetch_opcode(mem: &mut dyn Memory, addr: u16) -> Result<u16> {
        let byte = mem.read8(addr)?;
        if byte == PREFIX_CB {
            let ext = mem.read8(addr.wrapping_add(1))?;
            Ok(((PREFIX_CB as u16) << 8) | ext as u16)
        } else {
            Ok(byte as u16)
        }
    }

    /// Execute one instruction and return the cycles it consumed.
    pub fn step(&mut self, mem: &mut dyn Memory) -> Result<u32> {
        self.step_inner(mem, None)
    }

    /// Like [`Cpu::step`], recording the rendered instruction in `trace`.
    pub fn step_traced(
        &mut self,
        mem: &mut dyn Memory,
        trace: &mut InstructionTrace,
    ) -> Result<u32> {
        self.step_inner(mem, Some(trace))
    }

    fn step_inner(
        &mut self,
        mem: &mut dyn Memory,
        trace: Option<&mut InstructionTrace>,
    ) -> Result<u32> {
        if self.halted {
            return Ok(IDLE_CYCLES);
        }

        let pc = self.regs.pc;
        let opcode = Self::fetch_opcode(mem, pc)?;
        let info = opcode_info(opcode, pc)?;

        if let Some(trace) = trace.filter(|t| t.is_enabled()) {
            let entry = TraceEntry {
                pc,
                opcode,
                text: trace::render(&self.regs, mem, info)?,
            };
            log::trace!("{entry}");
            trace.push(entry);
        }

        if opcode == OPCODE_HALT {
            self.regs.pc = pc.wrapping_add(info.length as u16);
            if self.control.interrupts_enabled {
                self.halted = true;
            } else {
                let next = self.regs.pc;
                let following = opcode_info(Self::fetch_opcode(mem, next)?, next)?;
                self.regs.pc = next.wrapping_add(following.length as u16);
            }
            return Ok(IDLE_CYCLES);
        }

        let Some(handler) = self.table.get(opcode) else {
            self.has_unimplemented = true;
            log::warn!(
                "instruction [0x{opcode:02X} - {}] has not been implemented (PC=0x{pc:04X})",
                info.mnemonic
            );
            self.regs.pc = pc.wrapping_add(info.length as u16);
            return Ok(info.cycles.taken);
        };

        let cycles = handler(&mut self.regs, mem, &mut self.control, info)?;
        self.regs.pc = self.regs.pc.wrapping_add(info.length as u16);
        Ok(cycles.unwrap_or(info.cycles.taken))
    }

    /// Enter an interrupt service routine at `vector`.
    ///
    /// Ignored while IME is clear. Otherwise wakes the CPU, clears IME and
    /// pushes the current PC.
    pub fn interrupt(&mut self, vector: u16, mem: &mut dyn Memory) -> Result<()> {
        if !self.control.interrupts_enabled {
            return Ok(());
        }
        self.halted = false;
        self.control.disable_interrupts();
        let pc = self.regs.pc;
        operands::push16(&mut self.regs, mem, pc)?;
        self.regs.pc = vector;
        log::trace!("interrupt: 0x{pc:04X} -> 0x{vector:04X}");
        Ok(())
    }

    /// Render the instruction at `addr` with its operand data.
    pub fn disassemble(&self, mem: &mut dyn Memory, addr: u16) -> Result<String> {
        let opcode = Self::fetch_opcode(mem, addr)?;
        let info = opcode_info(opcode, addr)?;
        let mut regs = self.regs;
        regs.pc = addr;
        trace::render(&regs, mem, info)
    }
}
