use bitflags::bitflags;

use crate::cpu::Cpu;
use crate::error::Result;
use crate::memory::{Memory, REG_IE, REG_IF};

bitflags! {
    /// Bit layout shared by IF (0xFF0F) and IE (0xFFFF).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct InterruptFlags: u8 {
        const VBLANK = 0b0000_0001;
        const LCDC = 0b0000_0010;
        const TIMER = 0b0000_0100;
        const SERIAL = 0b0000_1000;
        const BUTTON = 0b0001_0000;
    }
}

/// Interrupt sources in dispatch priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InterruptKind {
    VBlank,
    Lcdc,
    Timer,
    Serial,
    Button,
}

impl InterruptKind {
    pub const PRIORITY: [InterruptKind; 5] = [
        InterruptKind::VBlank,
        InterruptKind::Lcdc,
        InterruptKind::Timer,
        InterruptKind::Serial,
        InterruptKind::Button,
    ];

    #[inline]
    pub const fn flag(self) -> InterruptFlags {
        match self {
            InterruptKind::VBlank => InterruptFlags::VBLANK,
            InterruptKind::Lcdc => InterruptFlags::LCDC,
            InterruptKind::Timer => InterruptFlags::TIMER,
            InterruptKind::Serial => InterruptFlags::SERIAL,
            InterruptKind::Button => InterruptFlags::BUTTON,
        }
    }

    /// Service routine address.
    #[inline]
    pub const fn vector(self) -> u16 {
        match self {
            InterruptKind::VBlank => 0x0040,
            InterruptKind::Lcdc => 0x0048,
            InterruptKind::Timer => 0x0050,
            InterruptKind::Serial => 0x0058,
            InterruptKind::Button => 0x0060,
        }
    }
}

/// Stateless coordinator over the IF and IE registers.
#[derive(Clone, Copy, Debug, Default)]
pub struct InterruptController;

impl InterruptController {
    pub fn new() -> Self {
        Self
    }

    fn flags(mem: &mut dyn Memory, addr: u16) -> Result<InterruptFlags> {
        Ok(InterruptFlags::from_bits_truncate(mem.read8(addr)?))
    }

    /// Request `kind`, keeping any other pending bits.
    pub fn fire(&self, kind: InterruptKind, mem: &mut dyn Memory) -> Result<()> {
        let raised = mem.read8(REG_IF)? | kind.flag().bits();
        mem.write8(REG_IF, raised)
    }

    pub fn has_pending(&self, mem: &mut dyn Memory) -> Result<bool> {
        let requested = Self::flags(mem, REG_IF)?;
        let enabled = Self::flags(mem, REG_IE)?;
        Ok(requested.intersects(enabled))
    }

    /// Vector the highest-priority requested and enabled interrupt.
    ///
    /// At most one interrupt is delivered per call. Returns the kind that
    /// was handed to the CPU, which ignores it while IME is clear.
    pub fn dispatch(&self, cpu: &mut Cpu, mem: &mut dyn Memory) -> Result<Option<InterruptKind>> {
        let pending = Self::flags(mem, REG_IF)? & Self::flags(mem, REG_IE)?;
        let Some(kind) = InterruptKind::PRIORITY
            .into_iter()
            .find(|kind| pending.contains(kind.flag()))
        else {
            return Ok(None);
        };
        if cpu.interrupts_enabled() {
            log::debug!("dispatching {kind:?} to 0x{:04X}", kind.vector());
        }
        cpu.interrupt(kind.vector(), mem)?;
        Ok(Some(kind))
    }

    pub fn clear_all(&self, mem: &mut dyn Memory) -> Result<()> {
        mem.write8(REG_IF, 0)
    }
}
