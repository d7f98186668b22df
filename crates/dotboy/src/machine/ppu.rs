mod framebuffer;
mod render;
pub mod timing;

pub use framebuffer::{DoubleBuffer, FrameBuffer, BUFFER_SIDE};
pub use render::SHADES;

use bitflags::bitflags;

use crate::error::Result;
use crate::memory::{Memory, REG_LYC, REG_STAT};

use super::interrupts::{InterruptController, InterruptKind};
use timing::{Phase, VBLANK_START, VISIBLE_LINES};

/// STAT bit mirroring LY == LYC.
const STAT_COINCIDENCE: u8 = 0b0000_0100;
const STAT_MODE: u8 = 0b0000_0011;

bitflags! {
    /// What happened during one [`Ppu::step`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct PpuEvents: u8 {
        const LINE_STARTED = 0b0001;
        const LYC_MATCH = 0b0010;
        const LINE_RENDERED = 0b0100;
        const VBLANK = 0b1000;
    }
}

/// Scanline state machine driven by the cumulative cycle count of the
/// current frame.
pub struct Ppu {
    /// Line most recently entered; `None` before the first step.
    line: Option<u8>,
    rendered: bool,
    vblank: bool,
    frames: DoubleBuffer,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            line: None,
            rendered: false,
            vblank: false,
            frames: DoubleBuffer::default(),
        }
    }

    /// Line currently being scanned, as last published to LY.
    #[inline]
    pub fn line(&self) -> Option<u8> {
        self.line
    }

    /// Last frame completed at a V-Blank edge.
    #[inline]
    pub fn presented(&self) -> &FrameBuffer {
        self.frames.front()
    }

    pub fn copy_visible_rgb(&self, out: &mut [u8]) {
        self.presented().copy_visible_rgb(out);
    }

    /// Advance to `cycle` cycles into the current frame.
    pub fn step(
        &mut self,
        cycle: u32,
        mem: &mut dyn Memory,
        interrupts: &InterruptController,
    ) -> Result<PpuEvents> {
        let mut events = PpuEvents::empty();
        let (line, dot) = timing::position(cycle);

        if self.line != Some(line) {
            self.line = Some(line);
            self.rendered = false;
            mem.write_ly_internal(line);
            events |= PpuEvents::LINE_STARTED;

            if mem.read8(REG_LYC)? == line {
                interrupts.fire(InterruptKind::Lcdc, mem)?;
                events |= PpuEvents::LYC_MATCH;
                log::debug!("LY=LYC at line {line}");
            }
        }

        let phase = if line as u32 >= VISIBLE_LINES {
            Phase::VBlank
        } else {
            Phase::at_dot(dot)
        };

        let coincidence = if mem.read8(REG_LYC)? == line {
            STAT_COINCIDENCE
        } else {
            0
        };
        let stat = mem.read8(REG_STAT)? & !(STAT_MODE | STAT_COINCIDENCE);
        mem.write_stat_internal(stat | coincidence | phase.stat_bits());

        if phase == Phase::HBlank && !self.rendered {
            render::render_line(mem, line, self.frames.back_mut().row_mut(line as usize))?;
            self.rendered = true;
            events |= PpuEvents::LINE_RENDERED;
        }

        if cycle >= VBLANK_START {
            if !self.vblank {
                self.vblank = true;
                interrupts.fire(InterruptKind::VBlank, mem)?;
                self.frames.swap();
                events |= PpuEvents::VBLANK;
                log::debug!("V-Blank at cycle {cycle}");
            }
        } else {
            self.vblank = false;
        }

        Ok(events)
    }
}
