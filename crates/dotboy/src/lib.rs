pub mod config;
pub mod cpu;
pub mod error;
pub mod machine;
pub mod memory;

pub use config::{BootState, MachineConfig};
pub use error::{EmuError, LoadError};
pub use machine::{Cartridge, FrameReport, GameBoy};
pub use memory::Memory;

/// Logical screen width in pixels for the Game Boy DMG.
pub const SCREEN_WIDTH: usize = 160;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 144;
