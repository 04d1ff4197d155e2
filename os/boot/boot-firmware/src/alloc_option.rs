/// Placement policy for [`Firmware::allocate`](crate::Firmware::allocate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocOption {
    /// Anywhere in physical memory.
    Any,
    /// Entirely below 4 GiB.
    Below4G,
    /// Exactly at the given address; fails if the range is not free.
    Fixed(u64),
    /// Reserve the given range without handing memory out (blacklisting).
    Force(u64),
}

impl AllocOption {
    /// Highest acceptable end address (exclusive) for the allocation.
    #[must_use]
    pub const fn limit(self) -> u64 {
        match self {
            Self::Below4G => 1 << 32,
            Self::Any | Self::Fixed(_) | Self::Force(_) => u64::MAX,
        }
    }

    #[must_use]
    pub const fn address(self) -> Option<u64> {
        match self {
            Self::Fixed(addr) | Self::Force(addr) => Some(addr),
            Self::Any | Self::Below4G => None,
        }
    }
}
