//! Fixed-offset cartridge header fields and their lookup tables.

pub(super) const TITLE_START: usize = 0x134;
pub(super) const TITLE_END: usize = 0x143;
pub(super) const COLOR_FLAG: usize = 0x143;
pub(super) const CARTRIDGE_TYPE: usize = 0x147;
pub(super) const ROM_SIZE: usize = 0x148;
pub(super) const RAM_SIZE: usize = 0x149;
pub(super) const DESTINATION: usize = 0x14A;
pub(super) const VERSION: usize = 0x14C;

/// Smallest image that still contains a complete header.
pub const HEADER_END: usize = 0x150;

pub const ROM_BANK_SIZE: usize = 0x4000;
pub const RAM_BANK_SIZE: usize = 0x2000;

/// `(bytes, banks)` for a ROM size code.
pub(super) fn rom_size(code: u8) -> Option<(usize, usize)> {
    match code {
        0x00..=0x08 => Some((0x8000 << code, 2 << code)),
        0x52 => Some((1152 * 1024, 72)),
        0x53 => Some((1280 * 1024, 80)),
        0x54 => Some((1536 * 1024, 96)),
        _ => None,
    }
}

/// `(bytes, banks)` for a RAM size code.
pub(super) fn ram_size(code: u8) -> Option<(usize, usize)> {
    match code {
        0x00 => Some((0, 0)),
        0x01 => Some((2 * 1024, 1)),
        0x02 => Some((8 * 1024, 1)),
        0x03 => Some((32 * 1024, 4)),
        0x04 => Some((128 * 1024, 16)),
        0x05 => Some((64 * 1024, 8)),
        _ => None,
    }
}

/// Printable name of a controller-type byte.
pub fn cartridge_type_name(code: u8) -> &'static str {
    match code {
        0x00 => "ROM",
        0x01 => "ROM+MBC1",
        0x02 => "ROM+MBC1+RAM",
        0x03 => "ROM+MBC1+RAM+BATT",
        0x05 => "ROM+MBC2",
        0x06 => "ROM+MBC2+BATT",
        0x08 => "ROM+RAM",
        0x09 => "ROM+RAM+BATT",
        0x0B => "ROM+MMM01",
        0x0C => "ROM+MMM01+SRAM",
        0x0D => "ROM+MMM01+SRAM+BATT",
        0x0F => "ROM+MBC3+TIMER+BATT",
        0x10 => "ROM+MBC3+TIMER+RAM+BATT",
        0x11 => "ROM+MBC3",
        0x12 => "ROM+MBC3+RAM",
        0x13 => "ROM+MBC3+RAM+BATT",
        0x19 => "ROM+MBC5",
        0x1A => "ROM+MBC5+RAM",
        0x1B => "ROM+MBC5+RAM+BATT",
        0x1C => "ROM+MBC5+RUMBLE",
        0x1D => "ROM+MBC5+RUMBLE+SRAM",
        0x1E => "ROM+MBC5+RUMBLE+SRAM+BATT",
        0x1F => "Pocket Camera",
        0xFD => "Bandai TAMA5",
        0xFE => "Hudson HuC-3",
        0xFF => "Hudson HuC-1",
        _ => "unknown",
    }
}
