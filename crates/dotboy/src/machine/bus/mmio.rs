/// Human-readable name of the I/O registers worth tracing on access.
pub(super) fn register_name(addr: u16) -> Option<&'static str> {
    Some(match addr {
        0xFF00 => "P1",
        0xFF01 => "SB",
        0xFF02 => "SC",
        0xFF04 => "DIV",
        0xFF05 => "TIMA",
        0xFF06 => "TMA",
        0xFF07 => "TAC",
        0xFF40 => "LCDC",
        0xFF42 => "SCY",
        0xFF43 => "SCX",
        0xFF46 => "DMA",
        0xFF47 => "BGP",
        0xFF48 => "OBP0",
        0xFF49 => "OBP1",
        0xFF4A => "WY",
        0xFF4B => "WX",
        _ => return None,
    })
}
