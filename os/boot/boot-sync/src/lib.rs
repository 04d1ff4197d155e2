//! # Process-wide State for Boot Services
//!
//! Boot applications run on a single execution context, yet a handful of
//! subsystems keep process-wide state (the syslog buffer, the console
//! registry, the framebuffer console cursor). Two small primitives cover
//! those cases:
//!
//! * [`BootLock`]: a test-and-test-and-set lock. Inside firmware it never
//!   contends; a failed [`BootLock::try_lock`] means the caller re-entered
//!   (for example a log sink that logs).
//! * [`BootState`]: an explicitly initialised slot built on [`BootLock`].
//!   Access before `init` or after `shutdown` is reported as
//!   [`Error::NotStarted`], re-entry as [`Error::NotReady`].
//!
//! [`Error::NotStarted`]: boot_error::Error::NotStarted
//! [`Error::NotReady`]: boot_error::Error::NotReady

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod boot_lock;
mod boot_state;

pub use boot_lock::{BootLock, BootLockGuard};
pub use boot_state::BootState;
