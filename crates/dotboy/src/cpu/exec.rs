//! Instruction handlers, grouped by family.
//!
//! Each family exposes a `register` function that claims its opcodes in a
//! [`DispatchTable`]. Handlers see PC pointing at the opcode byte; the step
//! loop advances PC by the instruction length afterwards.

mod alu;
mod control;
mod incdec;
mod ld;
mod stack;
mod system;

use super::cb;
use super::dispatch::DispatchTable;
use crate::error::Result;

/// Assemble every family into `table`.
pub(super) fn register_all(table: &mut DispatchTable) -> Result<()> {
    system::register(table)?;
    ld::register(table)?;
    incdec::register(table)?;
    alu::register(table)?;
    control::register(table)?;
    stack::register(table)?;
    cb::register(table)?;
    Ok(())
}

/// Widen a list of single-byte opcodes for registration.
fn codes(opcodes: &'static [u8]) -> impl Iterator<Item = u16> {
    opcodes.iter().map(|&op| op as u16)
}

/// Opcodes in `0x00..=0x3F` that differ only in bits 3-5, starting at `base`.
fn column(base: u8) -> impl Iterator<Item = u16> {
    (0..8u8).map(move |y| (base | (y << 3)) as u16)
}

/// Opcodes that differ only in bits 4-5, starting at `base`.
fn quad(base: u8) -> impl Iterator<Item = u16> {
    (0..4u8).map(move |p| (base | (p << 4)) as u16)
}
