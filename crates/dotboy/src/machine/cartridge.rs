mod header;
mod mbc1;

pub use header::{cartridge_type_name, HEADER_END, RAM_BANK_SIZE, ROM_BANK_SIZE};
pub(super) use mbc1::Mbc1;

use crate::error::{EmuError, LoadError, Result};

/// Bank controller family wired into the cartridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerKind {
    /// Plain 32 KiB ROM, optionally with unbanked RAM.
    RomOnly,
    Mbc1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Destination {
    Japanese,
    Overseas,
}

/// Header fields decoded once at load time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartridgeMetadata {
    pub title: String,
    pub cartridge_type: u8,
    pub cartridge_type_name: &'static str,
    pub controller: ControllerKind,
    pub color_compatible: bool,
    pub rom_size_code: u8,
    pub rom_size: usize,
    pub rom_banks: usize,
    pub ram_size_code: u8,
    pub ram_size: usize,
    pub ram_banks: usize,
    pub destination: Destination,
    pub version: u8,
}

/// Immutable cartridge image plus its decoded header.
#[derive(Clone, Debug)]
pub struct Cartridge {
    rom: Vec<u8>,
    metadata: CartridgeMetadata,
}

impl Cartridge {
    pub fn from_bytes(rom: Vec<u8>) -> Result<Self, LoadError> {
        if rom.len() < HEADER_END {
            return Err(LoadError::TooShort { len: rom.len() });
        }

        let metadata = decode_header(&rom)?;
        if rom.len() < metadata.rom_size {
            log::warn!(
                "ROM image is 0x{:X} bytes but the header declares 0x{:X}",
                rom.len(),
                metadata.rom_size
            );
        }
        log::info!(
            "loaded \"{}\": {} ({} ROM banks, {} RAM banks), version {}",
            metadata.title,
            metadata.cartridge_type_name,
            metadata.rom_banks,
            metadata.ram_banks,
            metadata.version
        );

        Ok(Self { rom, metadata })
    }

    #[inline]
    pub fn metadata(&self) -> &CartridgeMetadata {
        &self.metadata
    }

    /// Size of the image as loaded.
    #[inline]
    pub fn len(&self) -> usize {
        self.rom.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rom.is_empty()
    }

    /// Byte at absolute image `offset`; `addr` is the CPU address reported
    /// on failure.
    ///
    /// Offsets past the declared ROM size or past the end of the image are
    /// fatal.
    pub fn read_byte(&self, addr: u16, offset: usize) -> Result<u8> {
        let limit = self.metadata.rom_size.min(self.rom.len());
        if offset >= limit {
            return Err(EmuError::RomOutOfBounds {
                addr,
                offset,
                rom_size: limit,
            });
        }
        Ok(self.rom[offset])
    }
}

fn decode_header(rom: &[u8]) -> Result<CartridgeMetadata, LoadError> {
    let cartridge_type = rom[header::CARTRIDGE_TYPE];
    let controller = match cartridge_type {
        0x00 | 0x08 | 0x09 => ControllerKind::RomOnly,
        0x01..=0x03 => ControllerKind::Mbc1,
        other => return Err(LoadError::UnsupportedController(other)),
    };

    let rom_size_code = rom[header::ROM_SIZE];
    let (rom_size, rom_banks) =
        header::rom_size(rom_size_code).ok_or(LoadError::UnknownRomSize(rom_size_code))?;
    let ram_size_code = rom[header::RAM_SIZE];
    let (ram_size, ram_banks) =
        header::ram_size(ram_size_code).ok_or(LoadError::UnknownRamSize(ram_size_code))?;

    let title_bytes = &rom[header::TITLE_START..header::TITLE_END];
    let title_len = title_bytes
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(title_bytes.len());
    let title = String::from_utf8_lossy(&title_bytes[..title_len]).into_owned();

    Ok(CartridgeMetadata {
        title,
        cartridge_type,
        cartridge_type_name: cartridge_type_name(cartridge_type),
        controller,
        color_compatible: rom[header::COLOR_FLAG] & 0x80 != 0,
        rom_size_code,
        rom_size,
        rom_banks,
        ram_size_code,
        ram_size,
        ram_banks,
        destination: if rom[header::DESTINATION] == 0 {
            Destination::Japanese
        } else {
            Destination::Overseas
        },
        version: rom[header::VERSION],
    })
}
