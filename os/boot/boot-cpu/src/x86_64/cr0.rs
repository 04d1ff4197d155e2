use bitfield_struct::bitfield;

/// CR0 as the boot CPU reports it. Only paging state is consulted; the
/// remaining control bits are decoded for diagnostics.
#[bitfield(u64)]
pub struct Cr0 {
    pub protected_mode: bool,
    pub monitor_fpu: bool,
    pub emulate_fpu: bool,
    pub task_switched: bool,
    /// Hardwired to 1 on anything that runs UEFI.
    pub extension_type: bool,
    pub native_fpu_errors: bool,
    #[bits(10)]
    _bits_6_15: u16,
    /// Supervisor writes fault on read-only pages.
    pub write_protect: bool,
    _bit_17: bool,
    pub alignment_checks: bool,
    #[bits(10)]
    _bits_19_28: u16,
    pub no_write_through: bool,
    pub caches_disabled: bool,
    pub paging: bool,
    #[bits(32)]
    _bits_32_63: u32,
}

#[cfg(feature = "asm")]
super::read_control_register!(Cr0, "mov {}, cr0");
