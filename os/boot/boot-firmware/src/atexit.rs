//! # Exit Handlers
//!
//! Buffers and devices acquired during boot are released when the
//! application returns to firmware. Handlers run in reverse registration
//! order.

use alloc::boxed::Box;
use alloc::vec::Vec;
use boot_error::{Error, Result};
use boot_sync::BootLock;

type Handler = Box<dyn FnOnce() + Send>;

/// LIFO list of exit handlers.
#[derive(Default)]
pub struct AtExit {
    handlers: Vec<Handler>,
}

impl AtExit {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Queue `handler`; it runs before every handler registered earlier.
    ///
    /// # Errors
    /// [`Error::OutOfResources`] if the list cannot grow.
    pub fn register(&mut self, handler: impl FnOnce() + Send + 'static) -> Result<()> {
        self.handlers
            .try_reserve(1)
            .map_err(|_| Error::OutOfResources)?;
        self.handlers.push(Box::new(handler));
        Ok(())
    }

    /// Pop and invoke every handler, newest first.
    pub fn run(&mut self) {
        while let Some(handler) = self.handlers.pop() {
            handler();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

static AT_EXIT: BootLock<AtExit> = BootLock::new(AtExit::new());

/// Register a process-wide exit handler.
///
/// # Errors
/// [`Error::NotReady`] if the registry lock is contended, or
/// [`Error::OutOfResources`]. Handlers running under [`do_atexit`] may
/// register further handlers; those run in the same pass.
pub fn atexit(handler: impl FnOnce() + Send + 'static) -> Result<()> {
    AT_EXIT
        .try_with_lock(|list| list.register(handler))
        .ok_or(Error::NotReady)?
}

/// Run every registered exit handler, newest first.
pub fn do_atexit() {
    // Pop one at a time so handlers may register further handlers.
    loop {
        let Some(handler) = AT_EXIT.with_lock(|list| list.handlers.pop()) else {
            break;
        };
        handler();
    }
}
