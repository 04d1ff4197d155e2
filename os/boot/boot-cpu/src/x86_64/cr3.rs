use bitfield_struct::bitfield;

/// CR3 without PCIDs: where the current PML4 (or PML5) lives.
#[bitfield(u64)]
pub struct Cr3 {
    #[bits(3)]
    _bits_0_2: u8,
    pub root_write_through: bool,
    pub root_uncached: bool,
    #[bits(7)]
    _bits_5_11: u8,
    #[bits(40)]
    root_frame: u64,
    #[bits(12)]
    _bits_52_63: u16,
}

impl Cr3 {
    const FRAME_SHIFT: u32 = 12;

    /// Physical address of the root page table.
    #[must_use]
    pub const fn root_table(&self) -> u64 {
        self.root_frame() << Self::FRAME_SHIFT
    }

    /// A CR3 that points at `table`, which must be page aligned.
    #[must_use]
    pub const fn with_root_table(self, table: u64) -> Self {
        self.with_root_frame(table >> Self::FRAME_SHIFT)
    }
}

#[cfg(feature = "asm")]
super::read_control_register!(Cr3, "mov {}, cr3");
