//! # AArch64 System Register Identifiers
//!
//! Match predicates name a system register by the `MRS` operand encoding
//! packed into 32 bits:
//!
//! ```text
//!  31    20  19   18-16  15-12  11-8   7-5   4-0
//! ┌────────┬────┬──────┬──────┬──────┬─────┬─────┐
//! │   0    │op0 │ op1  │ CRn  │ CRm  │ op2 │  0  │
//! └────────┴────┴──────┴──────┴──────┴─────┴─────┘
//!           (bit 0 of op0 only)
//! ```

use boot_error::Result;

/// Pack an `MRS`/`MSR` operand into a register id.
#[must_use]
pub const fn encode(op0: u32, op1: u32, crn: u32, crm: u32, op2: u32) -> u32 {
    (op0 & 1) << 19 | op1 << 16 | crn << 12 | crm << 8 | op2 << 5
}

macro_rules! sysreg_table {
    ($($name:ident => $text:literal ($op0:literal, $op1:literal, $crn:literal, $crm:literal, $op2:literal),)*) => {
        /// A system register a match predicate may test.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum SysReg {
            $($name = encode($op0, $op1, $crn, $crm, $op2),)*
        }

        impl SysReg {
            pub const ALL: &'static [Self] = &[$(Self::$name),*];

            /// Assembler name of the register.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$name => $text,)*
                }
            }
        }
    };
}

sysreg_table! {
    CurrentEl => "CurrentEL" (3, 0, 4, 2, 2),
    MidrEl1 => "MIDR_EL1" (3, 0, 0, 0, 0),
    MpidrEl1 => "MPIDR_EL1" (3, 0, 0, 0, 5),
    RevidrEl1 => "REVIDR_EL1" (3, 0, 0, 0, 6),
    IdAa64Pfr0El1 => "ID_AA64PFR0_EL1" (3, 0, 0, 4, 0),
    IdAa64Pfr1El1 => "ID_AA64PFR1_EL1" (3, 0, 0, 4, 1),
    IdAa64Zfr0El1 => "ID_AA64ZFR0_EL1" (3, 0, 0, 4, 4),
    IdAa64Dfr0El1 => "ID_AA64DFR0_EL1" (3, 0, 0, 5, 0),
    IdAa64Dfr1El1 => "ID_AA64DFR1_EL1" (3, 0, 0, 5, 1),
    IdAa64Afr0El1 => "ID_AA64AFR0_EL1" (3, 0, 0, 5, 4),
    IdAa64Afr1El1 => "ID_AA64AFR1_EL1" (3, 0, 0, 5, 5),
    IdAa64Isar0El1 => "ID_AA64ISAR0_EL1" (3, 0, 0, 6, 0),
    IdAa64Isar1El1 => "ID_AA64ISAR1_EL1" (3, 0, 0, 6, 1),
    IdAa64Isar2El1 => "ID_AA64ISAR2_EL1" (3, 0, 0, 6, 2),
    IdAa64Mmfr0El1 => "ID_AA64MMFR0_EL1" (3, 0, 0, 7, 0),
    IdAa64Mmfr1El1 => "ID_AA64MMFR1_EL1" (3, 0, 0, 7, 1),
    IdAa64Mmfr2El1 => "ID_AA64MMFR2_EL1" (3, 0, 0, 7, 2),
}

impl SysReg {
    #[must_use]
    pub const fn id(self) -> u32 {
        self as u32
    }

    #[must_use]
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.id() == id)
    }
}

/// Reads system registers on behalf of match predicates.
pub trait SysRegReader {
    /// Current value of `reg`.
    ///
    /// # Errors
    /// [`boot_error::Error::NotFound`] if the register cannot be read on
    /// this CPU.
    fn read_sysreg(&self, reg: SysReg) -> Result<u64>;
}

impl<R: SysRegReader + ?Sized> SysRegReader for &R {
    fn read_sysreg(&self, reg: SysReg) -> Result<u64> {
        (**self).read_sysreg(reg)
    }
}
