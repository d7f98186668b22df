use crate::cpu::dispatch::{CpuControl, DispatchTable};
use crate::cpu::opcodes::OpcodeInfo;
use crate::cpu::regs::Registers;
use crate::error::Result;
use crate::memory::Memory;

use super::codes;

pub(super) fn register(table: &mut DispatchTable) -> Result<()> {
    table.register_all(codes(&[0x00, 0x10]), exec_nop)?;
    table.register(0xF3, exec_di)?;
    table.register(0xFB, exec_ei)?;
    Ok(())
}

/// NOP, and STOP which is treated as a two-byte no-op.
fn exec_nop(
    _regs: &mut Registers,
    _mem: &mut dyn Memory,
    _ctl: &mut CpuControl,
    _info: &OpcodeInfo,
) -> Result<Option<u32>> {
    Ok(None)
}

fn exec_di(
    _regs: &mut Registers,
    _mem: &mut dyn Memory,
    ctl: &mut CpuControl,
    _info: &OpcodeInfo,
) -> Result<Option<u32>> {
    ctl.disable_interrupts();
    Ok(None)
}

/// EI takes effect immediately; there is no one-instruction delay.
fn exec_ei(
    _regs: &mut Registers,
    _mem: &mut dyn Memory,
    ctl: &mut CpuControl,
    _info: &OpcodeInfo,
) -> Result<Option<u32>> {
    ctl.enable_interrupts();
    Ok(None)
}
