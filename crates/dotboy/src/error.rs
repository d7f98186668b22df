use thiserror::Error;

/// Fatal errors raised while a session is running.
///
/// None of these are recoverable: the core is a deterministic state machine,
/// so the caller is expected to stop stepping and surface the error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmuError {
    #[error("undefined opcode 0x{opcode:02X} at PC=0x{pc:04X}")]
    UndefinedOpcode { opcode: u16, pc: u16 },

    #[error("cartridge ROM read out of bounds: addr=0x{addr:04X} offset=0x{offset:X} rom_size=0x{rom_size:X}")]
    RomOutOfBounds {
        addr: u16,
        offset: usize,
        rom_size: usize,
    },

    #[error("program counter cannot hold 0x{0:X} (valid range 0x0000..=0xFFFF)")]
    InvalidProgramCounter(u32),

    #[error("stack pointer cannot hold 0x{0:X} (valid range 0x0000..=0xFFFF)")]
    InvalidStackPointer(u32),

    #[error("handler for opcode 0x{0:04X} registered twice")]
    DuplicateHandler(u16),
}

/// Errors raised while turning a raw image into a cartridge, before any
/// CPU/PPU session exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("ROM image is {len} bytes, too short to contain a cartridge header")]
    TooShort { len: usize },

    #[error("unsupported bank controller type 0x{0:02X}")]
    UnsupportedController(u8),

    #[error("unknown ROM size code 0x{0:02X}")]
    UnknownRomSize(u8),

    #[error("unknown RAM size code 0x{0:02X}")]
    UnknownRamSize(u8),
}

pub type Result<T, E = EmuError> = std::result::Result<T, E>;
