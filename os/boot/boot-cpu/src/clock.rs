use core::time::Duration;

/// A free-running, monotonic counter.
pub trait Clock {
    /// Current counter value.
    fn ticks(&self) -> u64;

    /// Counter increments per second.
    fn frequency(&self) -> u64;

    /// Counter increments for `d`, saturating.
    fn ticks_for(&self, d: Duration) -> u64 {
        let ticks = u128::from(self.frequency()) * d.as_nanos() / 1_000_000_000;
        u64::try_from(ticks).unwrap_or(u64::MAX)
    }

    /// A deadline `d` from now.
    fn deadline(&self, d: Duration) -> Deadline {
        Deadline(self.ticks().saturating_add(self.ticks_for(d)))
    }
}

/// A point in time measured in [`Clock`] ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline(pub u64);

impl Deadline {
    #[must_use]
    pub fn expired(self, clock: &(impl Clock + ?Sized)) -> bool {
        clock.ticks() > self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn ticks(&self) -> u64 {
        (**self).ticks()
    }

    fn frequency(&self) -> u64 {
        (**self).frequency()
    }
}
