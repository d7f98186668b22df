//! DMG scanline timing.

pub const LINE_CYCLES: u32 = 456;
pub const LINES_PER_FRAME: u32 = 154;
pub const VISIBLE_LINES: u32 = 144;
/// Cumulative frame cycle at which V-Blank begins.
pub const VBLANK_START: u32 = VISIBLE_LINES * LINE_CYCLES;

/// End of OAM search within a line (1/6 of the line).
pub const OAM_END: u32 = LINE_CYCLES / 6;
/// End of pixel transfer within a line (a further 2/6).
pub const TRANSFER_END: u32 = OAM_END + LINE_CYCLES * 2 / 6;

/// Scanline sub-phase, numbered as the STAT mode bits report it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    HBlank = 0,
    VBlank = 1,
    OamSearch = 2,
    Transfer = 3,
}

impl Phase {
    /// Phase of a visible line at `dot` cycles into it.
    pub fn at_dot(dot: u32) -> Self {
        if dot < OAM_END {
            Phase::OamSearch
        } else if dot < TRANSFER_END {
            Phase::Transfer
        } else {
            Phase::HBlank
        }
    }

    #[inline]
    pub fn stat_bits(self) -> u8 {
        self as u8
    }
}

/// Line index and in-line dot for a cumulative frame cycle.
#[inline]
pub fn position(cycle: u32) -> (u8, u32) {
    let line = (cycle / LINE_CYCLES) % LINES_PER_FRAME;
    (line as u8, cycle % LINE_CYCLES)
}
