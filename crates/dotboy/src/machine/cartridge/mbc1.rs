/// Banking mode selected through 0x6000-0x7FFF.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BankingMode {
    /// The 2-bit register extends the ROM bank; RAM is fixed to bank 0.
    #[default]
    Rom,
    /// The 2-bit register selects the RAM bank; ROM uses the low 5 bits.
    Ram,
}

/// MBC1 control registers.
///
/// Only the register file lives here; the address decoding and backing
/// RAM belong to the bank controller that owns this state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mbc1 {
    ram_enabled: bool,
    lower5: u8,
    upper2: u8,
    mode: BankingMode,
}

impl Default for Mbc1 {
    fn default() -> Self {
        Self {
            ram_enabled: false,
            lower5: 1,
            upper2: 0,
            mode: BankingMode::Rom,
        }
    }
}

impl Mbc1 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a write to the 0x0000-0x7FFF control window.
    pub fn write_control(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => {
                // RAM enable: lower 4 bits must be 0x0A.
                self.ram_enabled = (value & 0x0F) == 0x0A;
            }
            0x2000..=0x3FFF => {
                self.lower5 = match value & 0x1F {
                    0 => 1,
                    bank => bank,
                };
                log::debug!("MBC1: ROM bank low bits = {}", self.lower5);
            }
            0x4000..=0x5FFF => {
                self.upper2 = value & 0x03;
                log::debug!("MBC1: upper bank bits = {}", self.upper2);
            }
            0x6000..=0x7FFF => {
                self.mode = if value & 0x01 == 0 {
                    BankingMode::Rom
                } else {
                    BankingMode::Ram
                };
                log::debug!("MBC1: banking mode {:?}", self.mode);
            }
            _ => {}
        }
    }

    #[inline]
    pub fn ram_enabled(&self) -> bool {
        self.ram_enabled
    }

    #[inline]
    pub fn mode(&self) -> BankingMode {
        self.mode
    }

    /// Bank mapped at 0x4000-0x7FFF.
    pub fn rom_bank(&self) -> usize {
        match self.mode {
            BankingMode::Rom => ((self.upper2 as usize) << 5) | self.lower5 as usize,
            BankingMode::Ram => self.lower5 as usize,
        }
    }

    /// Bank mapped at 0xA000-0xBFFF.
    pub fn ram_bank(&self) -> usize {
        match self.mode {
            BankingMode::Rom => 0,
            BankingMode::Ram => self.upper2 as usize,
        }
    }
}
