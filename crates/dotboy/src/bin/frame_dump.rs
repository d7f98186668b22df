use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use dotboy::{GameBoy, MachineConfig, SCREEN_HEIGHT, SCREEN_WIDTH};

const USAGE: &str = "Usage: dotboy_frame_dump <rom_path> <out_rgb24_path> [frames]";

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(rom_path), Some(out_path)) = (args.next(), args.next()) else {
        bail!(USAGE);
    };
    let rom_path = PathBuf::from(rom_path);
    let out_path = PathBuf::from(out_path);
    let frames: u32 = match args.next() {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("invalid frame count '{arg}'"))?,
        None => 60,
    };

    let rom = std::fs::read(&rom_path)
        .with_context(|| format!("failed to read ROM '{}'", rom_path.display()))?;
    let config = MachineConfig::builder().trace_capacity(16).build();
    let mut gb = GameBoy::from_rom(rom, config).context("failed to load cartridge")?;

    let mut ran = 0;
    for _ in 0..frames {
        let report = gb.step_frame()?;
        ran += 1;
        if report.stopped_early {
            log::warn!("stopped after {ran} frames on an unimplemented instruction");
            break;
        }
    }
    log::info!("{:?}", gb.snapshot());

    let mut buffer = vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT * 3];
    gb.video_frame(&mut buffer);
    std::fs::write(&out_path, &buffer)
        .with_context(|| format!("failed to write '{}'", out_path.display()))?;

    println!(
        "Wrote {} bytes ({}x{} rgb24) after {} frames to '{}'",
        buffer.len(),
        SCREEN_WIDTH,
        SCREEN_HEIGHT,
        ran,
        out_path.display()
    );
    Ok(())
}
