use std::collections::BTreeSet;

use once_cell::sync::Lazy;

use super::{
    BankController, Bus, Cartridge, ControllerKind, Destination, GameBoy, InterruptController,
    InterruptFlags, Ppu, PpuEvents,
};
use crate::config::{BootState, MachineConfig, FRAME_CYCLES};
use crate::cpu::{Cpu, DispatchTable};
use crate::error::{EmuError, LoadError};
use crate::memory::{
    Memory, DMA_LENGTH, OAM_START, REG_DMA, REG_IE, REG_IF, REG_LCDC, REG_LY, REG_LYC, REG_STAT,
};
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Offset inside each ROM bank holding the bank's own index.
const BANK_MARKER: usize = 0x10;

/// Synthetic image with a valid header and each bank tagged at
/// [`BANK_MARKER`].
fn build_rom(cartridge_type: u8, rom_code: u8, ram_code: u8) -> Vec<u8> {
    let size = 0x8000usize << rom_code;
    let mut rom = vec![0u8; size];
    for (bank, chunk) in rom.chunks_mut(0x4000).enumerate() {
        chunk[BANK_MARKER] = bank as u8;
    }
    rom[0x134..0x134 + 6].copy_from_slice(b"DOTBOY");
    rom[0x147] = cartridge_type;
    rom[0x148] = rom_code;
    rom[0x149] = ram_code;
    rom[0x14A] = 0x01;
    rom[0x14C] = 0x02;
    rom
}

/// 128 KiB MBC1 image with 32 KiB of banked RAM.
static MBC1_ROM: Lazy<Vec<u8>> = Lazy::new(|| build_rom(0x03, 0x02, 0x03));

/// 32 KiB plain image.
static PLAIN_ROM: Lazy<Vec<u8>> = Lazy::new(|| build_rom(0x00, 0x00, 0x00));

fn mbc1_controller() -> BankController {
    let cart = Cartridge::from_bytes(MBC1_ROM.clone()).unwrap();
    BankController::new(cart, Bus::new())
}

/// Plain cartridge with `program` placed at the entry point.
fn machine_with(program: &[u8], config: MachineConfig) -> GameBoy {
    let mut rom = PLAIN_ROM.clone();
    rom[0x100..0x100 + program.len()].copy_from_slice(program);
    GameBoy::from_rom(rom, config).unwrap()
}

#[test]
fn header_metadata_is_decoded() {
    let cart = Cartridge::from_bytes(MBC1_ROM.clone()).unwrap();
    let meta = cart.metadata();
    assert_eq!(meta.title, "DOTBOY");
    assert_eq!(meta.controller, ControllerKind::Mbc1);
    assert_eq!(meta.cartridge_type_name, "ROM+MBC1+RAM+BATT");
    assert_eq!(meta.rom_size, 128 * 1024);
    assert_eq!(meta.rom_banks, 8);
    assert_eq!(meta.ram_size, 32 * 1024);
    assert_eq!(meta.ram_banks, 4);
    assert_eq!(meta.destination, Destination::Overseas);
    assert_eq!(meta.version, 2);
    assert!(!meta.color_compatible);
}

#[test]
fn color_flag_comes_from_bit_seven() {
    let mut rom = PLAIN_ROM.clone();
    rom[0x143] = 0x80;
    let cart = Cartridge::from_bytes(rom).unwrap();
    assert!(cart.metadata().color_compatible);
    // The flag byte is not part of the title.
    assert_eq!(cart.metadata().title, "DOTBOY");
}

#[test]
fn malformed_images_are_rejected() {
    assert_eq!(
        Cartridge::from_bytes(vec![0; 0x100]).unwrap_err(),
        LoadError::TooShort { len: 0x100 }
    );

    let mut rom = PLAIN_ROM.clone();
    rom[0x147] = 0x05;
    assert_eq!(
        Cartridge::from_bytes(rom).unwrap_err(),
        LoadError::UnsupportedController(0x05)
    );

    let mut rom = PLAIN_ROM.clone();
    rom[0x148] = 0x09;
    assert_eq!(
        Cartridge::from_bytes(rom).unwrap_err(),
        LoadError::UnknownRomSize(0x09)
    );

    let mut rom = PLAIN_ROM.clone();
    rom[0x149] = 0x06;
    assert_eq!(
        Cartridge::from_bytes(rom).unwrap_err(),
        LoadError::UnknownRamSize(0x06)
    );
}

#[test]
fn controller_applies_post_boot_io() {
    let mem = mbc1_controller();
    assert_eq!(mem.bus().peek(REG_LCDC), 0x91);
    assert_eq!(mem.bus().peek(REG_STAT), 0x85);
    assert_eq!(mem.bus().peek(0xFF47), 0xFC);
}

#[test]
fn mbc1_switches_rom_banks() {
    let mut mem = mbc1_controller();
    assert_eq!(mem.read8(BANK_MARKER as u16).unwrap(), 0);
    assert_eq!(mem.read8(0x4000 + BANK_MARKER as u16).unwrap(), 1);

    mem.write8(0x2000, 0x03).unwrap();
    assert_eq!(mem.rom_bank(), 3);
    assert_eq!(mem.read8(0x4000 + BANK_MARKER as u16).unwrap(), 3);
    // Bank 0 stays fixed.
    assert_eq!(mem.read8(BANK_MARKER as u16).unwrap(), 0);

    mem.write8(0x2000, 0x00).unwrap();
    assert_eq!(mem.read8(0x4000 + BANK_MARKER as u16).unwrap(), 1);
}

#[test]
fn reads_past_declared_rom_are_fatal() {
    let mut mem = mbc1_controller();
    // Upper bits select bank 0x21, far beyond the eight banks present.
    mem.write8(0x4000, 0x01).unwrap();
    let err = mem.read8(0x4000).unwrap_err();
    assert!(matches!(
        err,
        EmuError::RomOutOfBounds {
            addr: 0x4000,
            offset: 0x84000,
            rom_size: 0x20000,
        }
    ));
}

#[test]
fn mbc1_ram_requires_enable_and_banks_in_ram_mode() {
    let mut mem = mbc1_controller();
    assert_eq!(mem.read8(0xA000).unwrap(), 0xFF);
    mem.write8(0xA000, 0x42).unwrap();

    mem.write8(0x0000, 0x0A).unwrap();
    assert_eq!(mem.read8(0xA000).unwrap(), 0x00);
    mem.write8(0xA000, 0x42).unwrap();
    assert_eq!(mem.read8(0xA000).unwrap(), 0x42);

    mem.write8(0x6000, 0x01).unwrap();
    mem.write8(0x4000, 0x02).unwrap();
    assert_eq!(mem.read8(0xA000).unwrap(), 0x00);
    mem.write8(0xA000, 0x43).unwrap();

    mem.write8(0x4000, 0x00).unwrap();
    assert_eq!(mem.read8(0xA000).unwrap(), 0x42);
    mem.write8(0x4000, 0x02).unwrap();
    assert_eq!(mem.read8(0xA000).unwrap(), 0x43);

    mem.write8(0x0000, 0x00).unwrap();
    assert_eq!(mem.read8(0xA000).unwrap(), 0xFF);
}

#[test]
fn plain_cartridge_ignores_control_writes() {
    let cart = Cartridge::from_bytes(PLAIN_ROM.clone()).unwrap();
    let mut mem = BankController::new(cart, Bus::new());
    mem.write8(0x2000, 0x03).unwrap();
    assert_eq!(mem.rom_bank(), 1);
    assert_eq!(mem.read8(0x4000 + BANK_MARKER as u16).unwrap(), 1);
    // No cartridge RAM: reads float high.
    assert_eq!(mem.read8(0xA123).unwrap(), 0xFF);
}

#[test]
fn bus_dma_copies_fixed_length_into_oam() {
    let mut bus = Bus::new();
    for i in 0..0x100u16 {
        bus.write8(0xC000 + i, (i as u8).wrapping_add(1)).unwrap();
    }
    bus.write8(REG_DMA, 0xC0).unwrap();

    assert_eq!(bus.peek(REG_DMA), 0xC0);
    for i in 0..DMA_LENGTH {
        assert_eq!(bus.peek(OAM_START + i), (i as u8).wrapping_add(1));
    }
    assert_eq!(bus.peek(OAM_START + DMA_LENGTH), 0);
}

#[test]
fn controller_dma_reads_through_active_bank() {
    let mut mem = mbc1_controller();
    mem.write8(0x2000, 0x05).unwrap();
    mem.write8(REG_DMA, 0x40).unwrap();
    assert_eq!(mem.bus().peek(OAM_START + BANK_MARKER as u16), 5);
    assert_eq!(mem.bus().peek(OAM_START), 0);
}

#[test]
fn ly_ignores_caller_writes_and_stat_keeps_ppu_bits() {
    let mut bus = Bus::new();
    bus.write_ly_internal(0x42);
    bus.write8(REG_LY, 0x10).unwrap();
    assert_eq!(bus.read8(REG_LY).unwrap(), 0x42);

    bus.write_stat_internal(0b0000_0110);
    bus.write8(REG_STAT, 0b0100_0001).unwrap();
    assert_eq!(bus.read8(REG_STAT).unwrap(), 0b0100_0110);
}

#[test]
fn ppu_frame_covers_every_line_and_fires_one_vblank() {
    let mut bus = Bus::new();
    let interrupts = InterruptController::new();
    let mut ppu = Ppu::new();

    let mut lines = BTreeSet::new();
    let mut vblanks = 0;
    for cycle in (4..FRAME_CYCLES).step_by(4) {
        let events = ppu.step(cycle, &mut bus, &interrupts).unwrap();
        lines.insert(bus.peek(REG_LY));
        if events.contains(PpuEvents::VBLANK) {
            vblanks += 1;
            assert_eq!(bus.peek(REG_LY), 144);
        }
    }
    assert_eq!(vblanks, 1);
    assert_eq!(lines, (0..=153).collect::<BTreeSet<u8>>());
    assert!(InterruptFlags::from_bits_truncate(bus.peek(REG_IF)).contains(InterruptFlags::VBLANK));

    // The next frame starts over at line 0 and can raise V-Blank again.
    let events = ppu.step(4, &mut bus, &interrupts).unwrap();
    assert!(events.contains(PpuEvents::LINE_STARTED));
    assert_eq!(bus.peek(REG_LY), 0);
    let events = ppu.step(65_664, &mut bus, &interrupts).unwrap();
    assert!(events.contains(PpuEvents::VBLANK));
}

#[test]
fn ppu_reports_stat_modes_and_lyc_match() {
    let mut bus = Bus::new();
    let interrupts = InterruptController::new();
    let mut ppu = Ppu::new();
    bus.write8(REG_LYC, 10).unwrap();

    let line = 10 * 456;
    let events = ppu.step(line, &mut bus, &interrupts).unwrap();
    assert!(events.contains(PpuEvents::LYC_MATCH));
    assert!(InterruptFlags::from_bits_truncate(bus.peek(REG_IF)).contains(InterruptFlags::LCDC));
    assert_eq!(bus.peek(REG_STAT) & 0x07, 0b110);

    ppu.step(line + 100, &mut bus, &interrupts).unwrap();
    assert_eq!(bus.peek(REG_STAT) & 0x03, 3);

    let events = ppu.step(line + 300, &mut bus, &interrupts).unwrap();
    assert_eq!(bus.peek(REG_STAT) & 0x03, 0);
    assert!(events.contains(PpuEvents::LINE_RENDERED));
    // Rendered once per line.
    let events = ppu.step(line + 304, &mut bus, &interrupts).unwrap();
    assert!(!events.contains(PpuEvents::LINE_RENDERED));

    ppu.step(11 * 456, &mut bus, &interrupts).unwrap();
    assert_eq!(bus.peek(REG_STAT) & 0x07, 0b010);

    ppu.step(145 * 456 + 300, &mut bus, &interrupts).unwrap();
    assert_eq!(bus.peek(REG_STAT) & 0x03, 1);
}

#[test]
fn vblank_vector_is_taken_once_per_frame() {
    let program = [
        0x3E, 0x01, // LD A,0x01
        0xE0, 0xFF, // LDH (IE),A
        0xAF, // XOR A
        0xFB, // EI
        0x18, 0xFE, // JR -2
    ];
    let mut rom = PLAIN_ROM.clone();
    rom[0x100..0x100 + program.len()].copy_from_slice(&program);
    rom[0x40] = 0x3C; // INC A
    rom[0x41] = 0xD9; // RETI
    let mut gb = GameBoy::from_rom(rom, MachineConfig::default()).unwrap();

    let report = gb.step_frame().unwrap();
    assert_eq!(report.vblanks, 1);
    assert!(!report.stopped_early);
    assert!(report.cycles >= FRAME_CYCLES);
    assert_eq!(gb.cpu.regs.a, 1);
    assert!(gb.cpu.interrupts_enabled());
    assert_eq!(gb.cpu.regs.pc, 0x106);
    assert_eq!(gb.memory_mut().read8(REG_IE).unwrap(), 0x01);

    let report = gb.step_frame().unwrap();
    assert_eq!(report.vblanks, 1);
    assert_eq!(gb.cpu.regs.a, 2);
}

#[test]
fn pending_flags_clear_after_each_step() {
    let mut gb = machine_with(&[], MachineConfig::default());
    gb.memory_mut().write8(REG_IF, 0x1F).unwrap();
    gb.step().unwrap();
    assert_eq!(gb.bus().peek(REG_IF), 0);
    // IME is clear after boot, so nothing was vectored.
    assert_eq!(gb.cpu.regs.pc, 0x101);
}

#[test]
fn frame_overshoot_carries_forward() {
    let config = MachineConfig::builder().frame_cycles(10).build();
    let mut gb = machine_with(&[], config);

    let report = gb.step_frame().unwrap();
    assert_eq!(report.cycles, 12);
    assert_eq!(gb.frame_cycles(), 2);

    let report = gb.step_frame().unwrap();
    assert_eq!(report.cycles, 8);
    assert_eq!(gb.frame_cycles(), 0);
}

#[test]
fn missing_handler_stops_frame_when_configured() {
    let table: &'static DispatchTable = Box::leak(Box::new(DispatchTable::new()));

    let mut gb = machine_with(&[], MachineConfig::default());
    gb.cpu = Cpu::with_table(BootState::PostBoot, table);
    let report = gb.step_frame().unwrap();
    assert!(report.stopped_early);
    assert_eq!(report.cycles, 4);
    assert_eq!(gb.cpu.regs.pc, 0x101);
    assert!(gb.snapshot().has_unimplemented);

    let config = MachineConfig::builder().stop_on_unimplemented(false).build();
    let mut gb = machine_with(&[], config);
    gb.cpu = Cpu::with_table(BootState::PostBoot, table);
    let report = gb.step_frame().unwrap();
    assert!(!report.stopped_early);
    assert_eq!(report.vblanks, 1);
}

#[test]
fn undefined_opcode_aborts_frame() {
    let mut gb = machine_with(&[0x00, 0xD3], MachineConfig::default());
    let err = gb.step_frame().unwrap_err();
    assert_eq!(
        err,
        EmuError::UndefinedOpcode {
            opcode: 0xD3,
            pc: 0x101
        }
    );
}

#[test]
fn trace_keeps_most_recent_instructions() {
    let config = MachineConfig::builder().trace_capacity(3).build();
    let mut gb = machine_with(&[0x00, 0x00, 0x3E, 0x12, 0x00], config);
    for _ in 0..4 {
        gb.step().unwrap();
    }
    assert_eq!(gb.trace().len(), 3);
    let pcs: Vec<u16> = gb.trace().entries().map(|e| e.pc).collect();
    assert_eq!(pcs, vec![0x101, 0x102, 0x104]);
    assert_eq!(gb.trace().entries().nth(1).unwrap().text, "LD A,d8 {0x12}");
    assert_eq!(gb.cpu.regs.a, 0x12);
    assert_eq!(gb.next_instruction().unwrap(), "NOP");
}

#[test]
fn presented_frame_reflects_vram() {
    let mut gb = machine_with(&[], MachineConfig::default());
    // Tile 0 solid colour 3; the whole background map points at it.
    for addr in 0x8000..0x8010u16 {
        gb.memory_mut().write8(addr, 0xFF).unwrap();
    }

    let mut before = vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT * 3];
    gb.video_frame(&mut before);
    assert!(before.iter().all(|&b| b == 0xFF));

    gb.step_frame().unwrap();
    let mut after = vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT * 3];
    gb.video_frame(&mut after);
    assert!(after.iter().all(|&b| b == 0x00));
}

#[test]
fn single_steps_take_vblank_every_frame() {
    let program = [
        0x3E, 0x01, // LD A,0x01
        0xE0, 0xFF, // LDH (IE),A
        0xAF, // XOR A
        0xFB, // EI
        0x18, 0xFE, // JR -2
    ];
    let mut rom = PLAIN_ROM.clone();
    rom[0x100..0x100 + program.len()].copy_from_slice(&program);
    rom[0x40] = 0x3C; // INC A
    rom[0x41] = 0xD9; // RETI
    let mut gb = GameBoy::from_rom(rom, MachineConfig::default()).unwrap();

    let mut elapsed = 0;
    while elapsed < 3 * FRAME_CYCLES {
        elapsed += gb.step().unwrap();
        assert!(gb.frame_cycles() < FRAME_CYCLES);
    }
    assert_eq!(gb.cpu.regs.a, 3);
    assert_eq!(gb.frame_cycles(), elapsed - 3 * FRAME_CYCLES);
}

#[test]
fn tracing_store_to_unmapped_bank_does_not_fault() {
    let program = [
        0x3E, 0x01, // LD A,0x01
        0xEA, 0x00, 0x40, // LD (0x4000),A: selects bank 0x21
        0xEA, 0x00, 0x40, // LD (0x4000),A
    ];
    let mut rom = MBC1_ROM.clone();
    rom[0x100..0x100 + program.len()].copy_from_slice(&program);
    let config = MachineConfig::builder().trace_capacity(4).build();
    let mut gb = GameBoy::from_rom(rom, config).unwrap();

    for _ in 0..3 {
        gb.step().unwrap();
    }
    assert_eq!(gb.memory_mut().rom_bank(), 0x21);
    assert_eq!(gb.trace().last().unwrap().text, "LD (a16),A {[0x4000] ??}");
    assert_eq!(gb.cpu.regs.pc, 0x108);
}
