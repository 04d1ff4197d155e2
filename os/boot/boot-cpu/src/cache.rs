use bitfield_struct::bitfield;

/// Instruction-stream coherence after code has been written as data.
///
/// Call [`CodeCache::code_update`] for every modified range, then
/// [`CodeCache::code_update_commit`] once before executing any of it.
pub trait CodeCache {
    /// Clean the data cache for `[va, va + len)` to the point of
    /// unification and wait for completion.
    ///
    /// # Safety
    /// The whole range must be mapped.
    unsafe fn code_update(&self, va: u64, len: usize);

    /// Invalidate the instruction cache and synchronize the pipeline.
    fn code_update_commit(&self);
}

/// AArch64 Cache Type Register (`CTR_EL0`).
///
/// Line sizes are encoded as log2 of the number of 4-byte words.
#[bitfield(u64)]
pub struct CtrEl0 {
    /// Bits 0..=3: log2 words of the smallest instruction cache line.
    #[bits(4)]
    pub iminline: u8,

    #[bits(10)]
    _reserved_4_13: u16,

    /// Bits 14..=15: L1 instruction cache indexing policy.
    #[bits(2)]
    pub l1ip: u8,

    /// Bits 16..=19: log2 words of the smallest data cache line.
    #[bits(4)]
    pub dminline: u8,

    /// Bits 20..=23: exclusives reservation granule.
    #[bits(4)]
    pub erg: u8,

    /// Bits 24..=27: cache writeback granule.
    #[bits(4)]
    pub cwg: u8,

    /// Bit 28: data cache clean to PoU not required for I/D coherence.
    pub idc: bool,

    /// Bit 29: instruction cache invalidation to PoU not required.
    pub dic: bool,

    #[bits(34)]
    _reserved_30_63: u64,
}

impl CtrEl0 {
    /// Smallest data cache line, in bytes.
    #[must_use]
    pub const fn dminline_bytes(&self) -> u64 {
        4 << self.dminline()
    }

    /// Smallest instruction cache line, in bytes.
    #[must_use]
    pub const fn iminline_bytes(&self) -> u64 {
        4 << self.iminline()
    }
}

/// Line-aligned addresses covering `[va, va + len)` for a cache with
/// `line`-byte lines (a power of two).
pub fn cache_lines(va: u64, len: usize, line: u64) -> impl Iterator<Item = u64> {
    let end = va.saturating_add(len as u64);
    let first = va & !(line - 1);
    (first..end).step_by(usize::try_from(line).unwrap_or(usize::MAX))
}
