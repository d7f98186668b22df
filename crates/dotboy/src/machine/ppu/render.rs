use crate::error::Result;
use crate::memory::{Memory, REG_BGP, REG_LCDC, REG_SCX, REG_SCY, REG_WX, REG_WY};
use crate::SCREEN_WIDTH;

/// Fixed DMG grey ramp indexed by palette output.
pub const SHADES: [u8; 4] = [0xFF, 0xAA, 0x55, 0x00];

const LCDC_ENABLE: u8 = 0x80;
const LCDC_WINDOW_MAP: u8 = 0x40;
const LCDC_WINDOW_ENABLE: u8 = 0x20;
const LCDC_TILE_DATA: u8 = 0x10;
const LCDC_BG_MAP: u8 = 0x08;
const LCDC_BG_ENABLE: u8 = 0x01;

/// Tile-pattern addressing selected by LCDC bit 4.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TileData {
    /// 0x8000 base, tile index unsigned.
    Unsigned,
    /// 0x9000 base, tile index signed.
    Signed,
}

impl TileData {
    fn row_address(self, tile: u8, fine_y: u8) -> u16 {
        let base = match self {
            TileData::Unsigned => 0x8000u16.wrapping_add(tile as u16 * 16),
            TileData::Signed => 0x9000u16.wrapping_add((tile as i8 as i16 * 16) as u16),
        };
        base.wrapping_add(fine_y as u16 * 2)
    }
}

/// Register snapshot taken once per line.
struct LineRegs {
    lcdc: u8,
    scx: u8,
    scy: u8,
    bgp: u8,
    wx: u8,
    wy: u8,
}

impl LineRegs {
    fn read(mem: &mut dyn Memory) -> Result<Self> {
        Ok(Self {
            lcdc: mem.read8(REG_LCDC)?,
            scx: mem.read8(REG_SCX)?,
            scy: mem.read8(REG_SCY)?,
            bgp: mem.read8(REG_BGP)?,
            wx: mem.read8(REG_WX)?,
            wy: mem.read8(REG_WY)?,
        })
    }

    fn tile_data(&self) -> TileData {
        if self.lcdc & LCDC_TILE_DATA != 0 {
            TileData::Unsigned
        } else {
            TileData::Signed
        }
    }

    fn map_base(&self, select_bit: u8) -> u16 {
        if self.lcdc & select_bit != 0 {
            0x9C00
        } else {
            0x9800
        }
    }

    fn shade(&self, color: u8) -> u8 {
        SHADES[((self.bgp >> (color * 2)) & 0x03) as usize]
    }
}

/// 2-bit colour index of the pixel at (`x`, `y`) of the 256x256 plane
/// described by the tile map at `map_base`.
fn color_index(
    mem: &mut dyn Memory,
    map_base: u16,
    tile_data: TileData,
    x: u8,
    y: u8,
) -> Result<u8> {
    let map_addr = map_base + (y as u16 / 8) * 32 + x as u16 / 8;
    let tile = mem.read8(map_addr)?;
    let row = tile_data.row_address(tile, y & 0x07);
    let lo = mem.read8(row)?;
    let hi = mem.read8(row.wrapping_add(1))?;
    let bit = 7 - (x & 0x07);
    Ok((((hi >> bit) & 0x01) << 1) | ((lo >> bit) & 0x01))
}

/// Draw background and window for line `ly` into `row`.
///
/// Only the first [`SCREEN_WIDTH`] entries of `row` are written.
pub fn render_line(mem: &mut dyn Memory, ly: u8, row: &mut [u8]) -> Result<()> {
    let regs = LineRegs::read(mem)?;
    let width = SCREEN_WIDTH.min(row.len());

    if regs.lcdc & LCDC_ENABLE == 0 || regs.lcdc & LCDC_BG_ENABLE == 0 {
        row[..width].fill(SHADES[0]);
        return Ok(());
    }

    let tile_data = regs.tile_data();
    let bg_map = regs.map_base(LCDC_BG_MAP);
    let bg_y = ly.wrapping_add(regs.scy);
    for (x, pixel) in row[..width].iter_mut().enumerate() {
        let bg_x = (x as u8).wrapping_add(regs.scx);
        let color = color_index(mem, bg_map, tile_data, bg_x, bg_y)?;
        *pixel = regs.shade(color);
    }

    if regs.lcdc & LCDC_WINDOW_ENABLE != 0 && ly >= regs.wy {
        let win_map = regs.map_base(LCDC_WINDOW_MAP);
        let win_y = ly - regs.wy;
        let left = regs.wx as i32 - 7;
        for (x, pixel) in row[..width].iter_mut().enumerate() {
            let win_x = x as i32 - left;
            if !(0..256).contains(&win_x) {
                continue;
            }
            let color = color_index(mem, win_map, tile_data, win_x as u8, win_y)?;
            *pixel = regs.shade(color);
        }
    }

    Ok(())
}
