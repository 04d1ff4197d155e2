//! # Match Predicates
//!
//! One record of `.match_patch_group` (natural alignment, 32 bytes):
//!
//! ```text
//! 0x00 u32  patch_group_id
//! 0x04 u32  kind (1 ARM system register, 2 ACPI OEM id)
//! 0x08 u32  sysreg id            | char signature[4]
//! 0x10 u64  mask                 | char oem_table_id[8]
//! 0x18 u64  expected value       | char oem_id[6], u8 table_id_len, u8 oem_id_len
//! ```

use boot_acpi::{SdtHeader, acpi_find_sdt};
use boot_cpu::{SysReg, SysRegReader};
use boot_error::{Error, Result};
use log::debug;

const MATCH_ARM_SYSREG: u32 = 1;
const MATCH_ACPI_OEM: u32 = 2;

/// The platform test of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// `(read(sysreg) & mask) == value`
    ArmSysReg { sysreg: u32, mask: u64, value: u64 },
    /// The table `signature` carries the given OEM ids, compared over the
    /// first `oem_id_len` / `table_id_len` characters.
    AcpiOem {
        signature: [u8; 4],
        oem_id: [u8; 6],
        oem_table_id: [u8; 8],
        oem_id_len: u8,
        table_id_len: u8,
    },
    Unknown(u32),
}

/// Decoded `.match_patch_group` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPredicate {
    pub group: u32,
    pub kind: MatchKind,
}

/// Looks up ACPI table headers for OEM predicates.
pub trait AcpiLookup {
    fn find_header(&self, signature: &[u8; 4]) -> Option<SdtHeader>;
}

impl<F: Fn(&[u8; 4]) -> Option<SdtHeader>> AcpiLookup for F {
    fn find_header(&self, signature: &[u8; 4]) -> Option<SdtHeader> {
        self(signature)
    }
}

/// The tables found by [`boot_acpi::acpi_init`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalAcpi;

impl AcpiLookup for GlobalAcpi {
    fn find_header(&self, signature: &[u8; 4]) -> Option<SdtHeader> {
        acpi_find_sdt(signature).map(|sdt| sdt.header)
    }
}

impl MatchPredicate {
    pub const SIZE: usize = 32;

    #[must_use]
    pub fn from_bytes(b: &[u8; Self::SIZE]) -> Self {
        let u32_at = |at: usize| u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]]);
        let u64_at = |at: usize| u64::from(u32_at(at)) | (u64::from(u32_at(at + 4)) << 32);

        let kind = match u32_at(0x04) {
            MATCH_ARM_SYSREG => MatchKind::ArmSysReg {
                sysreg: u32_at(0x08),
                mask: u64_at(0x10),
                value: u64_at(0x18),
            },
            MATCH_ACPI_OEM => {
                let mut signature = [0; 4];
                let mut oem_table_id = [0; 8];
                let mut oem_id = [0; 6];
                signature.copy_from_slice(&b[0x08..0x0c]);
                oem_table_id.copy_from_slice(&b[0x10..0x18]);
                oem_id.copy_from_slice(&b[0x18..0x1e]);
                MatchKind::AcpiOem {
                    signature,
                    oem_id,
                    oem_table_id,
                    table_id_len: b[0x1e],
                    oem_id_len: b[0x1f],
                }
            }
            other => MatchKind::Unknown(other),
        };

        Self {
            group: u32_at(0x00),
            kind,
        }
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut b = [0u8; Self::SIZE];
        b[0x00..0x04].copy_from_slice(&self.group.to_le_bytes());
        match self.kind {
            MatchKind::ArmSysReg { sysreg, mask, value } => {
                b[0x04..0x08].copy_from_slice(&MATCH_ARM_SYSREG.to_le_bytes());
                b[0x08..0x0c].copy_from_slice(&sysreg.to_le_bytes());
                b[0x10..0x18].copy_from_slice(&mask.to_le_bytes());
                b[0x18..0x20].copy_from_slice(&value.to_le_bytes());
            }
            MatchKind::AcpiOem {
                signature,
                oem_id,
                oem_table_id,
                oem_id_len,
                table_id_len,
            } => {
                b[0x04..0x08].copy_from_slice(&MATCH_ACPI_OEM.to_le_bytes());
                b[0x08..0x0c].copy_from_slice(&signature);
                b[0x10..0x18].copy_from_slice(&oem_table_id);
                b[0x18..0x1e].copy_from_slice(&oem_id);
                b[0x1e] = table_id_len;
                b[0x1f] = oem_id_len;
            }
            MatchKind::Unknown(kind) => b[0x04..0x08].copy_from_slice(&kind.to_le_bytes()),
        }
        b
    }

    /// Whether this platform is the one the predicate describes.
    ///
    /// An unreadable or unlisted system register and a missing ACPI table
    /// are plain mismatches.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] for an unknown predicate kind.
    pub fn evaluate(&self, sysregs: &impl SysRegReader, acpi: &impl AcpiLookup) -> Result<bool> {
        match self.kind {
            MatchKind::ArmSysReg { sysreg, mask, value } => {
                let Some(reg) = SysReg::from_id(sysreg) else {
                    debug!("Unknown system register id {sysreg:#x}");
                    return Ok(false);
                };
                let read = sysregs.read_sysreg(reg);
                debug!("{} = {read:x?}, mask {mask:#x}, expected {value:#x}", reg.name());
                Ok(read.is_ok_and(|v| v & mask == value))
            }
            MatchKind::AcpiOem {
                signature,
                oem_id,
                oem_table_id,
                oem_id_len,
                table_id_len,
            } => {
                let header = acpi.find_header(&signature);
                debug!(
                    "AcpiTableSig {} present: {}",
                    signature.escape_ascii(),
                    header.is_some()
                );
                Ok(header.is_some_and(|h| {
                    strncmp_eq(&h.oem_id, &oem_id, oem_id_len)
                        && strncmp_eq(&h.oem_table_id, &oem_table_id, table_id_len)
                }))
            }
            MatchKind::Unknown(_) => Err(Error::InvalidParameter),
        }
    }
}

/// C `strncmp(a, b, n) == 0` over fixed arrays; bytes past the end read as NUL.
fn strncmp_eq(a: &[u8], b: &[u8], n: u8) -> bool {
    for i in 0..usize::from(n) {
        let (x, y) = (a.get(i).copied().unwrap_or(0), b.get(i).copied().unwrap_or(0));
        if x != y {
            return false;
        }
        if x == 0 {
            break;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Regs(u64);

    impl SysRegReader for Regs {
        fn read_sysreg(&self, reg: SysReg) -> Result<u64> {
            match reg {
                SysReg::MidrEl1 => Ok(self.0),
                _ => Err(Error::NotFound),
            }
        }
    }

    fn no_acpi(_: &[u8; 4]) -> Option<SdtHeader> {
        None
    }

    #[test]
    fn strncmp_stops_at_nul_and_length() {
        assert!(strncmp_eq(b"VMWARE", b"VMWxxx", 3));
        assert!(!strncmp_eq(b"VMWARE", b"VMWxxx", 4));
        assert!(strncmp_eq(b"AB\0xyz", b"AB\0qrs", 6));
        assert!(strncmp_eq(b"anything", b"else", 0));
        assert!(!strncmp_eq(b"ABCDEF", b"ABC", 6));
    }

    #[test]
    fn sysreg_mask_and_compare() {
        let midr = MatchPredicate {
            group: 1,
            kind: MatchKind::ArmSysReg {
                sysreg: SysReg::MidrEl1.id(),
                mask: 0xff00_0000,
                value: 0x4100_0000,
            },
        };
        assert_eq!(midr.evaluate(&Regs(0x410f_d083), &no_acpi), Ok(true));
        assert_eq!(midr.evaluate(&Regs(0x510f_8000), &no_acpi), Ok(false));

        let unreadable = MatchPredicate {
            group: 1,
            kind: MatchKind::ArmSysReg {
                sysreg: SysReg::CurrentEl.id(),
                mask: 0,
                value: 0,
            },
        };
        assert_eq!(unreadable.evaluate(&Regs(0), &no_acpi), Ok(false));

        let unlisted = MatchPredicate {
            group: 1,
            kind: MatchKind::ArmSysReg {
                sysreg: 0x1234,
                mask: 0,
                value: 0,
            },
        };
        assert_eq!(unlisted.evaluate(&Regs(0), &no_acpi), Ok(false));
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let mut bytes = [0u8; MatchPredicate::SIZE];
        bytes[0] = 5;
        bytes[4] = 9;
        let predicate = MatchPredicate::from_bytes(&bytes);
        assert_eq!(predicate.kind, MatchKind::Unknown(9));
        assert_eq!(predicate.group, 5);
        assert_eq!(
            predicate.evaluate(&Regs(0), &no_acpi),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn acpi_record_layout() {
        let predicate = MatchPredicate {
            group: 2,
            kind: MatchKind::AcpiOem {
                signature: *b"FACP",
                oem_id: *b"VMWARE",
                oem_table_id: *b"VMW HYP ",
                oem_id_len: 6,
                table_id_len: 3,
            },
        };
        let bytes = predicate.to_bytes();
        assert_eq!(&bytes[0x08..0x0c], b"FACP");
        assert_eq!(&bytes[0x10..0x18], b"VMW HYP ");
        assert_eq!(&bytes[0x18..0x1e], b"VMWARE");
        assert_eq!((bytes[0x1e], bytes[0x1f]), (3, 6));
        assert_eq!(MatchPredicate::from_bytes(&bytes), predicate);
    }
}
