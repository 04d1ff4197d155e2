use core::cell::UnsafeCell;
use core::hint::spin_loop;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

/// Guards `T` with a single flag; see the crate docs for when it spins.
pub struct BootLock<T> {
    taken: AtomicBool,
    value: UnsafeCell<T>,
}

// Safety: the flag serialises every access to `value`.
unsafe impl<T: Send> Sync for BootLock<T> {}

impl<T> BootLock<T> {
    pub const fn new(value: T) -> Self {
        Self {
            taken: AtomicBool::new(false),
            value: UnsafeCell::new(value),
        }
    }

    fn acquire(&self) -> bool {
        self.taken
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// `None` if the lock is taken, which on the boot context means the
    /// caller re-entered.
    #[inline]
    pub fn try_lock(&self) -> Option<BootLockGuard<'_, T>> {
        self.acquire().then_some(BootLockGuard { owner: self })
    }

    /// Spins until the lock is free. Re-entrant paths must use
    /// [`Self::try_lock`] instead.
    #[inline]
    pub fn lock(&self) -> BootLockGuard<'_, T> {
        while !self.acquire() {
            while self.is_held() {
                spin_loop();
            }
        }
        BootLockGuard { owner: self }
    }

    #[inline]
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock())
    }

    #[inline]
    pub fn try_with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.try_lock().map(|mut guard| f(&mut guard))
    }

    #[inline]
    pub const fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    pub fn is_held(&self) -> bool {
        self.taken.load(Ordering::Relaxed)
    }
}

/// Releases the lock on drop.
pub struct BootLockGuard<'a, T> {
    owner: &'a BootLock<T>,
}

impl<T> Deref for BootLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Safety: the guard holds the lock.
        unsafe { &*self.owner.value.get() }
    }
}

impl<T> DerefMut for BootLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // Safety: as above, and `&mut self` makes the borrow unique.
        unsafe { &mut *self.owner.value.get() }
    }
}

impl<T> Drop for BootLockGuard<'_, T> {
    fn drop(&mut self) {
        self.owner.taken.store(false, Ordering::Release);
    }
}
