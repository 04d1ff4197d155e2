//! # AArch64 Registers and Capabilities

mod counter;
mod ctr;

pub use counter::GenericTimer;

use crate::{CodeCache, CtrEl0, LoadRegister, SysReg, SysRegReader, cache_lines};
use boot_error::Result;
use core::arch::asm;

/// The executing CPU.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCpu;

macro_rules! mrs {
    ($reg:literal) => {{
        let value: u64;
        // Safety: every register in the table is readable at EL1 and EL2.
        unsafe {
            asm!(concat!("mrs {}, ", $reg), out(reg) value, options(nomem, nostack, preserves_flags));
        }
        value
    }};
}

impl NativeCpu {
    /// Exception level the boot code runs at.
    #[must_use]
    pub fn current_el(&self) -> u8 {
        ((mrs!("CurrentEL") >> 2) & 0x3) as u8
    }

    #[must_use]
    pub fn el_is_hyp(&self) -> bool {
        self.current_el() == 2
    }

    /// Whether the stage 1 MMU of the current exception level is on.
    #[must_use]
    pub fn paging_enabled(&self) -> bool {
        let sctlr = if self.el_is_hyp() {
            mrs!("sctlr_el2")
        } else {
            mrs!("sctlr_el1")
        };
        sctlr & 1 != 0
    }

    /// Physical address held in the current `TTBR0`.
    #[must_use]
    pub fn page_table_root(&self) -> u64 {
        if self.el_is_hyp() {
            mrs!("ttbr0_el2")
        } else {
            mrs!("ttbr0_el1")
        }
    }
}

impl CodeCache for NativeCpu {
    unsafe fn code_update(&self, va: u64, len: usize) {
        let line = CtrEl0::load().dminline_bytes();
        for addr in cache_lines(va, len, line) {
            unsafe {
                asm!("dc cvau, {}", in(reg) addr, options(nostack, preserves_flags));
            }
        }
        unsafe {
            asm!("dsb sy", options(nostack, preserves_flags));
        }
    }

    fn code_update_commit(&self) {
        unsafe {
            asm!("ic iallu", "dsb sy", "isb", options(nostack, preserves_flags));
        }
    }
}

impl SysRegReader for NativeCpu {
    fn read_sysreg(&self, reg: SysReg) -> Result<u64> {
        Ok(match reg {
            SysReg::CurrentEl => mrs!("CurrentEL"),
            SysReg::MidrEl1 => mrs!("MIDR_EL1"),
            SysReg::MpidrEl1 => mrs!("MPIDR_EL1"),
            SysReg::RevidrEl1 => mrs!("REVIDR_EL1"),
            SysReg::IdAa64Pfr0El1 => mrs!("ID_AA64PFR0_EL1"),
            SysReg::IdAa64Pfr1El1 => mrs!("ID_AA64PFR1_EL1"),
            SysReg::IdAa64Zfr0El1 => mrs!("S3_0_C0_C4_4"),
            SysReg::IdAa64Dfr0El1 => mrs!("ID_AA64DFR0_EL1"),
            SysReg::IdAa64Dfr1El1 => mrs!("ID_AA64DFR1_EL1"),
            SysReg::IdAa64Afr0El1 => mrs!("ID_AA64AFR0_EL1"),
            SysReg::IdAa64Afr1El1 => mrs!("ID_AA64AFR1_EL1"),
            SysReg::IdAa64Isar0El1 => mrs!("ID_AA64ISAR0_EL1"),
            SysReg::IdAa64Isar1El1 => mrs!("ID_AA64ISAR1_EL1"),
            SysReg::IdAa64Isar2El1 => mrs!("S3_0_C0_C6_2"),
            SysReg::IdAa64Mmfr0El1 => mrs!("ID_AA64MMFR0_EL1"),
            SysReg::IdAa64Mmfr1El1 => mrs!("ID_AA64MMFR1_EL1"),
            SysReg::IdAa64Mmfr2El1 => mrs!("ID_AA64MMFR2_EL1"),
        })
    }
}
