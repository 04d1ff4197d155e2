//! # `x86_64` Registers and Capabilities

/// `LoadRegisterUnsafe` for a control register read with `$insn`.
#[cfg(feature = "asm")]
macro_rules! read_control_register {
    ($reg:ty, $insn:literal) => {
        impl $crate::LoadRegisterUnsafe for $reg {
            unsafe fn load_unsafe() -> Self {
                let bits: u64;
                unsafe {
                    core::arch::asm!($insn, out(reg) bits, options(nomem, nostack, preserves_flags));
                }
                Self::from_bits(bits)
            }
        }
    };
}
#[cfg(feature = "asm")]
use read_control_register;

#[cfg(feature = "cr0")]
mod cr0;
#[cfg(feature = "cr3")]
mod cr3;
mod tsc;

#[cfg(feature = "cr0")]
pub use cr0::Cr0;
#[cfg(feature = "cr3")]
pub use cr3::Cr3;
pub use tsc::Tsc;

use crate::{CodeCache, SysReg, SysRegReader};
use boot_error::{Error, Result};

/// The executing CPU.
///
/// Instruction fetch is coherent with data writes on x86, so code updates
/// need no cache maintenance, and there are no AArch64 system registers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCpu;

impl NativeCpu {
    /// Whether CR0.PG is set.
    #[cfg(all(feature = "cr0", feature = "asm"))]
    #[must_use]
    pub fn paging_enabled(&self) -> bool {
        use crate::LoadRegisterUnsafe;
        // Safety: boot code runs in ring 0.
        unsafe { Cr0::load_unsafe() }.paging()
    }

    /// Physical address of the root page table.
    #[cfg(all(feature = "cr3", feature = "asm"))]
    #[must_use]
    pub fn page_table_root(&self) -> u64 {
        use crate::LoadRegisterUnsafe;
        // Safety: boot code runs in ring 0.
        unsafe { Cr3::load_unsafe() }.root_table()
    }
}

impl CodeCache for NativeCpu {
    unsafe fn code_update(&self, _va: u64, _len: usize) {
        core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
    }

    fn code_update_commit(&self) {
        core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
    }
}

impl SysRegReader for NativeCpu {
    fn read_sysreg(&self, _reg: SysReg) -> Result<u64> {
        Err(Error::NotFound)
    }
}
