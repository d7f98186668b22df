use crate::memory::{REG_BGP, REG_LCDC, REG_STAT};

use super::Bus;

impl Bus {
    /// Apply the I/O register values the DMG boot ROM leaves behind.
    pub(crate) fn apply_post_boot_io(&mut self) {
        self.store(REG_LCDC, 0x91);
        self.store(REG_STAT, 0x85);
        self.store(REG_BGP, 0xFC);
    }
}
