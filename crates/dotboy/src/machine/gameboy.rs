use crate::config::MachineConfig;
use crate::cpu::{Cpu, CpuSnapshot, InstructionTrace};
use crate::error::{EmuError, LoadError, Result};

use super::bus::Bus;
use super::cartridge::Cartridge;
use super::interrupts::InterruptController;
use super::mbc::BankController;
use super::ppu::{Ppu, PpuEvents};

/// Outcome of [`GameBoy::step_frame`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Cycles executed during this frame, including any overshoot.
    pub cycles: u32,
    /// V-Blank edges seen by the PPU, whether or not the CPU took the
    /// interrupt.
    pub vblanks: u32,
    /// The frame ended before its cycle budget because an opcode without a
    /// handler was skipped.
    pub stopped_early: bool,
}

/// High-level DMG machine.
///
/// Owns the CPU, the cartridge-aware memory, the interrupt controller and
/// the PPU, and drives them in lockstep one instruction at a time.
pub struct GameBoy {
    pub cpu: Cpu,
    memory: BankController,
    interrupts: InterruptController,
    ppu: Ppu,
    config: MachineConfig,
    trace: InstructionTrace,
    /// Cycles into the current frame.
    frame_cycles: u32,
}

impl GameBoy {
    pub fn new(cartridge: Cartridge, config: MachineConfig) -> Self {
        Self {
            cpu: Cpu::new(config.boot_state),
            memory: BankController::new(cartridge, Bus::new()),
            interrupts: InterruptController::new(),
            ppu: Ppu::new(),
            trace: InstructionTrace::new(config.trace_capacity),
            config,
            frame_cycles: 0,
        }
    }

    /// Decode `rom` and build a machine around it.
    pub fn from_rom(rom: Vec<u8>, config: MachineConfig) -> Result<Self, LoadError> {
        Ok(Self::new(Cartridge::from_bytes(rom)?, config))
    }

    #[inline]
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    #[inline]
    pub fn cartridge(&self) -> &Cartridge {
        self.memory.cartridge()
    }

    /// Flat bus behind the bank controller.
    #[inline]
    pub fn bus(&self) -> &Bus {
        self.memory.bus()
    }

    /// Cartridge-aware memory as seen by the CPU.
    #[inline]
    pub fn memory_mut(&mut self) -> &mut BankController {
        &mut self.memory
    }

    #[inline]
    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    #[inline]
    pub fn trace(&self) -> &InstructionTrace {
        &self.trace
    }

    #[inline]
    pub fn frame_cycles(&self) -> u32 {
        self.frame_cycles
    }

    pub fn snapshot(&self) -> CpuSnapshot {
        self.cpu.snapshot()
    }

    /// Render the instruction at PC, for debuggers.
    pub fn next_instruction(&mut self) -> Result<String> {
        let pc = self.cpu.regs.pc;
        self.cpu.disassemble(&mut self.memory, pc)
    }

    /// One machine step. The returned flag is set when the step closed the
    /// current frame.
    fn step_events(&mut self) -> Result<(u32, PpuEvents, bool)> {
        let cycles = if self.trace.is_enabled() {
            self.cpu.step_traced(&mut self.memory, &mut self.trace)?
        } else {
            self.cpu.step(&mut self.memory)?
        };
        self.frame_cycles += cycles;

        let events = self
            .ppu
            .step(self.frame_cycles, &mut self.memory, &self.interrupts)?;

        if self.interrupts.has_pending(&mut self.memory)? {
            self.interrupts.dispatch(&mut self.cpu, &mut self.memory)?;
        }
        self.interrupts.clear_all(&mut self.memory)?;

        // Cycles past the budget carry into the next frame.
        let frame_done = self.frame_cycles >= self.config.frame_cycles;
        if frame_done {
            self.frame_cycles -= self.config.frame_cycles;
        }

        Ok((cycles, events, frame_done))
    }

    /// Run one instruction, then the PPU and interrupt pass. Returns the
    /// cycles the instruction consumed.
    pub fn step(&mut self) -> Result<u32> {
        self.step_events().map(|(cycles, _, _)| cycles)
    }

    /// Run until the frame's cycle budget is spent.
    pub fn step_frame(&mut self) -> Result<FrameReport> {
        let mut report = FrameReport::default();
        loop {
            let (cycles, events, frame_done) = self.step_events().map_err(|err| {
                self.log_fatal(&err);
                err
            })?;
            report.cycles += cycles;
            if events.contains(PpuEvents::VBLANK) {
                report.vblanks += 1;
            }
            if frame_done {
                return Ok(report);
            }
            if self.config.stop_on_unimplemented && self.cpu.has_unimplemented() {
                report.stopped_early = true;
                return Ok(report);
            }
        }
    }

    fn log_fatal(&self, err: &EmuError) {
        let regs = &self.cpu.regs;
        log::error!(
            "{err} (PC=0x{:04X} SP=0x{:04X} AF=0x{:04X} BC=0x{:04X} DE=0x{:04X} HL=0x{:04X})",
            regs.pc,
            regs.sp,
            regs.af(),
            regs.bc(),
            regs.de(),
            regs.hl(),
        );
        for entry in self.trace.entries() {
            log::error!("  {entry}");
        }
    }

    /// Copy the last presented frame as 160x144 RGB24.
    pub fn video_frame(&self, out: &mut [u8]) {
        self.ppu.copy_visible_rgb(out);
    }
}
