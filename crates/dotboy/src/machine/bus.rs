use crate::error::Result;
use crate::memory::{oam_dma, Memory, REG_DMA, REG_LY, REG_STAT};

use super::MEMORY_SIZE;

mod init;
mod mmio;

/// STAT bits owned by the PPU: mode (0-1) and LY coincidence (2).
const STAT_PPU_BITS: u8 = 0b0000_0111;

/// Flat 64 KiB address space.
///
/// Every address is plain storage except a handful of I/O registers: LY
/// ignores caller writes, STAT keeps its PPU-owned bits, and a write to
/// the DMA register copies into OAM. Accesses never fail.
pub struct Bus {
    memory: Box<[u8; MEMORY_SIZE]>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            memory: Box::new([0; MEMORY_SIZE]),
        }
    }

    /// Raw load without any register side effects.
    #[inline]
    pub fn peek(&self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    /// Raw store without any register side effects.
    #[inline]
    pub(crate) fn store(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }
}

impl Memory for Bus {
    fn read8(&mut self, addr: u16) -> Result<u8> {
        let value = self.memory[addr as usize];
        if let Some(name) = mmio::register_name(addr) {
            log::trace!("read {name} (0x{addr:04X}) = 0b{value:08b}");
        }
        Ok(value)
    }

    fn write8(&mut self, addr: u16, value: u8) -> Result<()> {
        if let Some(name) = mmio::register_name(addr) {
            log::trace!("write {name} (0x{addr:04X}) <- 0b{value:08b}");
        }
        match addr {
            REG_LY => {}
            REG_STAT => {
                let owned = self.memory[addr as usize] & STAT_PPU_BITS;
                self.store(addr, (value & !STAT_PPU_BITS) | owned);
            }
            REG_DMA => {
                self.store(addr, value);
                oam_dma(self, value)?;
            }
            _ => self.store(addr, value),
        }
        Ok(())
    }

    fn write_stat_internal(&mut self, value: u8) {
        self.store(REG_STAT, value);
    }

    fn write_ly_internal(&mut self, value: u8) {
        self.store(REG_LY, value);
    }
}
