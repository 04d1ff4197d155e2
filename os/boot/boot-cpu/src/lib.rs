//! # CPU Capabilities for Boot Code
//!
//! Architecture intrinsics the boot libraries need, behind small
//! capability traits so the portable code never issues an instruction
//! itself:
//!
//! * [`CodeCache`]: make freshly written instructions visible to
//!   instruction fetch (`cpu_code_update` followed by one
//!   `cpu_code_update_commit`).
//! * [`SysRegReader`]: read an AArch64 system register by its [`SysReg`]
//!   encoding (the `MRS` used by match predicates).
//! * [`Clock`]: a free-running counter and its frequency.
//!
//! [`NativeCpu`] implements all three for the CPU the code runs on. Tests
//! substitute recording mocks.
//!
//! Typed registers are only ever read here: [`LoadRegister`] for those
//! any privilege level may read, [`LoadRegisterUnsafe`] for the rest.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod cache;
mod clock;
pub mod sysreg;

#[cfg(target_arch = "aarch64")]
pub mod aarch64;
#[cfg(target_arch = "x86_64")]
pub mod x86_64;

pub use cache::{CodeCache, CtrEl0, cache_lines};
pub use clock::{Clock, Deadline};
pub use sysreg::{SysReg, SysRegReader};

#[cfg(target_arch = "aarch64")]
pub use aarch64::NativeCpu;
#[cfg(target_arch = "x86_64")]
pub use x86_64::NativeCpu;

/// Reading needs privilege: EL2 on AArch64, ring 0 on x86.
pub trait LoadRegisterUnsafe {
    /// # Safety
    /// The CPU must be at the privilege level the register demands.
    unsafe fn load_unsafe() -> Self;
}

/// Readable from any privilege level without side effects.
pub trait LoadRegister {
    fn load() -> Self;
}

impl<T: LoadRegister> LoadRegisterUnsafe for T {
    #[inline]
    unsafe fn load_unsafe() -> Self {
        T::load()
    }
}
