use crate::BootLock;
use boot_error::{Error, Result};

/// A process-wide slot with explicit `init` and `shutdown`.
pub struct BootState<T> {
    slot: BootLock<Option<T>>,
}

impl<T> Default for BootState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BootState<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: BootLock::new(None),
        }
    }

    /// Install `value`, returning the previous state if there was one.
    pub fn init(&self, value: T) -> Option<T> {
        self.slot.with_lock(|slot| slot.replace(value))
    }

    /// Install the result of `init` unless a state already exists, then run
    /// `update` on whichever state is current.
    ///
    /// # Errors
    /// [`Error::NotReady`] when called re-entrantly.
    pub fn get_or_init<R>(
        &self,
        init: impl FnOnce() -> T,
        update: impl FnOnce(&mut T) -> R,
    ) -> Result<R> {
        self.slot
            .try_with_lock(|slot| update(slot.get_or_insert_with(init)))
            .ok_or(Error::NotReady)
    }

    /// Tear the state down.
    pub fn shutdown(&self) -> Option<T> {
        self.slot.with_lock(Option::take)
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.try_with_lock(|slot| slot.is_some()).unwrap_or(true)
    }

    /// Run `f` on the state.
    ///
    /// # Errors
    /// [`Error::NotStarted`] before `init` (or after `shutdown`),
    /// [`Error::NotReady`] when called re-entrantly.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        self.slot
            .try_with_lock(|slot| slot.as_mut().map(f).ok_or(Error::NotStarted))
            .ok_or(Error::NotReady)?
    }
}
