use crate::error::Result;
use crate::memory::{oam_dma, Memory, REG_DMA};

use super::bus::Bus;
use super::cartridge::{Cartridge, ControllerKind, Mbc1, RAM_BANK_SIZE, ROM_BANK_SIZE};

enum Controller {
    RomOnly,
    Mbc1(Mbc1),
}

/// Cartridge-aware view of the address space.
///
/// Decorates the flat [`Bus`]: ROM reads are served from the cartridge
/// image through the active bank, 0x0000-0x7FFF writes drive the controller
/// registers, and 0xA000-0xBFFF maps the cartridge RAM. Everything else
/// goes straight to the bus.
pub struct BankController {
    bus: Bus,
    cartridge: Cartridge,
    controller: Controller,
    ram: Vec<u8>,
}

impl BankController {
    /// Wrap `bus` and apply the post-boot I/O register values.
    pub fn new(cartridge: Cartridge, mut bus: Bus) -> Self {
        let meta = cartridge.metadata();
        let controller = match meta.controller {
            ControllerKind::RomOnly => Controller::RomOnly,
            ControllerKind::Mbc1 => Controller::Mbc1(Mbc1::new()),
        };
        let ram = vec![0; meta.ram_size];
        bus.apply_post_boot_io();
        Self {
            bus,
            cartridge,
            controller,
            ram,
        }
    }

    #[inline]
    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    #[inline]
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    #[inline]
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// ROM bank currently mapped at 0x4000-0x7FFF.
    pub fn rom_bank(&self) -> usize {
        match &self.controller {
            Controller::RomOnly => 1,
            Controller::Mbc1(mbc) => mbc.rom_bank(),
        }
    }

    fn ram_enabled(&self) -> bool {
        match &self.controller {
            // Unbanked RAM on plain cartridges is always mapped.
            Controller::RomOnly => true,
            Controller::Mbc1(mbc) => mbc.ram_enabled(),
        }
    }

    fn ram_offset(&self, addr: u16) -> Option<usize> {
        if self.ram.is_empty() || !self.ram_enabled() {
            return None;
        }
        let bank = match &self.controller {
            Controller::RomOnly => 0,
            Controller::Mbc1(mbc) => mbc.ram_bank(),
        };
        let offset = bank * RAM_BANK_SIZE + (addr - 0xA000) as usize;
        Some(offset % self.ram.len())
    }

    fn read_rom(&self, addr: u16) -> Result<u8> {
        let offset = match addr {
            0x0000..=0x3FFF => addr as usize,
            _ => self.rom_bank() * ROM_BANK_SIZE + (addr - 0x4000) as usize,
        };
        self.cartridge.read_byte(addr, offset)
    }
}

impl Memory for BankController {
    fn read8(&mut self, addr: u16) -> Result<u8> {
        match addr {
            0x0000..=0x7FFF => self.read_rom(addr),
            0xA000..=0xBFFF => Ok(self
                .ram_offset(addr)
                .map_or(0xFF, |offset| self.ram[offset])),
            _ => self.bus.read8(addr),
        }
    }

    fn write8(&mut self, addr: u16, value: u8) -> Result<()> {
        match addr {
            0x0000..=0x7FFF => {
                if let Controller::Mbc1(mbc) = &mut self.controller {
                    mbc.write_control(addr, value);
                }
            }
            0xA000..=0xBFFF => {
                if let Some(offset) = self.ram_offset(addr) {
                    self.ram[offset] = value;
                }
            }
            REG_DMA => {
                self.bus.store(addr, value);
                oam_dma(self, value)?;
            }
            _ => self.bus.write8(addr, value)?,
        }
        Ok(())
    }

    fn write_stat_internal(&mut self, value: u8) {
        self.bus.write_stat_internal(value);
    }

    fn write_ly_internal(&mut self, value: u8) {
        self.bus.write_ly_internal(value);
    }
}
