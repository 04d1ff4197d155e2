use crate::Clock;

/// The time-stamp counter.
///
/// The TSC rate is not architecturally discoverable; the caller calibrates
/// it against a firmware timer and passes the result in.
#[derive(Debug, Clone, Copy)]
pub struct Tsc {
    hz: u64,
}

impl Tsc {
    #[must_use]
    pub const fn with_frequency(hz: u64) -> Self {
        Self { hz }
    }

    #[must_use]
    pub fn read() -> u64 {
        // Safety: RDTSC is unprivileged unless CR4.TSD is set, which firmware
        // never does.
        unsafe { core::arch::x86_64::_rdtsc() }
    }
}

impl Clock for Tsc {
    fn ticks(&self) -> u64 {
        Self::read()
    }

    fn frequency(&self) -> u64 {
        self.hz
    }
}
