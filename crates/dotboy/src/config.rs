use typed_builder::TypedBuilder;

/// One DMG frame: 154 scanlines of 456 cycles each.
pub const FRAME_CYCLES: u32 = 70_224;

/// Register values the CPU starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootState {
    /// Values left behind by the DMG boot ROM when it jumps to 0x0100.
    #[default]
    PostBoot,
    /// All general-purpose registers and flags cleared.
    Zeroed,
}

/// Session configuration for [`crate::GameBoy`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct MachineConfig {
    #[builder(default = FRAME_CYCLES)]
    pub frame_cycles: u32,
    /// Number of rendered instructions kept in the trace ring buffer.
    /// Zero disables tracing.
    #[builder(default = 0)]
    pub trace_capacity: usize,
    #[builder(default = true)]
    pub stop_on_unimplemented: bool,
    #[builder(default)]
    pub boot_state: BootState,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
