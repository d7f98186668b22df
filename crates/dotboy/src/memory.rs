use crate::error::Result;

pub const REG_IF: u16 = 0xFF0F;
pub const REG_LCDC: u16 = 0xFF40;
pub const REG_STAT: u16 = 0xFF41;
pub const REG_SCY: u16 = 0xFF42;
pub const REG_SCX: u16 = 0xFF43;
pub const REG_LY: u16 = 0xFF44;
pub const REG_LYC: u16 = 0xFF45;
pub const REG_DMA: u16 = 0xFF46;
pub const REG_BGP: u16 = 0xFF47;
pub const REG_WY: u16 = 0xFF4A;
pub const REG_WX: u16 = 0xFF4B;
pub const REG_IE: u16 = 0xFFFF;

/// Start of the sprite attribute table, the destination of OAM DMA.
pub const OAM_START: u16 = 0xFE00;
/// Number of bytes copied by a single DMA trigger.
pub const DMA_LENGTH: u16 = 0x8C;

/// Byte-addressable view of the 64 KiB address space.
///
/// Implemented by the flat [`crate::machine::Bus`] and by the bank controller
/// that decorates it. Reads are fallible because cartridge ROM is bounded;
/// the flat bus itself never fails.
pub trait Memory {
    fn read8(&mut self, addr: u16) -> Result<u8>;
    fn write8(&mut self, addr: u16, value: u8) -> Result<()>;

    /// Store STAT without the caller write mask. Only the PPU uses this to
    /// publish its mode and coincidence bits.
    fn write_stat_internal(&mut self, value: u8);

    /// Store LY. Caller writes to LY are ignored; only the PPU moves it.
    fn write_ly_internal(&mut self, value: u8);

    /// Little-endian 16-bit read.
    fn read16(&mut self, addr: u16) -> Result<u16> {
        let lo = self.read8(addr)?;
        let hi = self.read8(addr.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Little-endian 16-bit write.
    fn write16(&mut self, addr: u16, value: u16) -> Result<()> {
        let [lo, hi] = value.to_le_bytes();
        self.write8(addr, lo)?;
        self.write8(addr.wrapping_add(1), hi)
    }
}

/// Copy `DMA_LENGTH` bytes from `page << 8` into OAM.
///
/// Reads go through `mem` so that sources in banked ROM or cartridge RAM see
/// the active banks.
pub(crate) fn oam_dma<M: Memory + ?Sized>(mem: &mut M, page: u8) -> Result<()> {
    let source = (page as u16) << 8;
    log::debug!("OAM DMA from 0x{source:04X}");
    for i in 0..DMA_LENGTH {
        let byte = mem.read8(source.wrapping_add(i))?;
        mem.write8(OAM_START + i, byte)?;
    }
    Ok(())
}
