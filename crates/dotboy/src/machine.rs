mod bus;
pub mod cartridge;
mod gameboy;
pub mod interrupts;
mod mbc;
pub mod ppu;

pub use bus::Bus;
pub use cartridge::{Cartridge, CartridgeMetadata, ControllerKind, Destination};
pub use gameboy::{FrameReport, GameBoy};
pub use interrupts::{InterruptController, InterruptFlags, InterruptKind};
pub use mbc::BankController;
pub use ppu::{Ppu, PpuEvents};

/// Total addressable memory (64 KiB).
const MEMORY_SIZE: usize = 0x10000;

#[cfg(test)]
mod tests;
