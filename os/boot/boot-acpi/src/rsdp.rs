//! # Root System Description Pointer
//!
//! ```text
//! offset  size  field
//!      0     8  "RSD PTR "
//!      8     1  checksum of bytes 0..20
//!      9     6  OEM ID
//!     15     1  revision (0 = ACPI 1.0, 2 = ACPI 2.0+)
//!     16     4  RSDT physical address
//!  --- ACPI 2.0+ only ---
//!     20     4  length of the whole structure
//!     24     8  XSDT physical address
//!     32     1  checksum of all `length` bytes
//!     33     3  reserved
//! ```

use crate::{PhysMapRo, is_valid_firmware_table};
use boot_error::{Error, Result};
use log::warn;

pub const RSDP_SIGNATURE: &[u8; 8] = b"RSD PTR ";
/// Size of the ACPI 1.0 structure.
pub const RSDP_V1_LEN: usize = 20;
/// Size of the ACPI 2.0 structure.
pub const XSDP_LEN: usize = 36;
/// First revision carrying an XSDT pointer.
pub const RSDP_REVISION_2: u8 = 2;
/// Largest extended structure that is checksummed.
const XSDP_MAX_LEN: usize = 4096;

/// Root table pointers from a validated RSDP/XSDP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcpiRoots {
    pub revision: u8,
    pub oem_id: [u8; 6],
    /// RSDT address; `None` if the field is zero.
    pub rsdt_addr: Option<u64>,
    /// XSDT address; only reported for revision 2 and later.
    pub xsdt_addr: Option<u64>,
}

impl AcpiRoots {
    /// Decode the RSDP at `rsdp_addr`.
    ///
    /// An ACPI 2.0 part with a bad length or extended checksum only drops
    /// the XSDT; the RSDT stays usable.
    ///
    /// # Errors
    /// [`Error::NotFound`] on a bad signature, [`Error::CrcError`] if the
    /// ACPI 1.0 part fails its checksum.
    ///
    /// # Safety
    /// `rsdp_addr` must be readable through `map` for the size of the
    /// structure it claims to be.
    pub unsafe fn parse(map: &impl PhysMapRo, rsdp_addr: u64) -> Result<Self> {
        let v1 = unsafe { map.map_ro(rsdp_addr, RSDP_V1_LEN) };
        Self::parse_bytes(v1, |len| unsafe { map.map_ro(rsdp_addr, len) })
    }

    fn parse_bytes<'a>(v1: &'a [u8], extended: impl Fn(usize) -> &'a [u8]) -> Result<Self> {
        if &v1[..8] != RSDP_SIGNATURE {
            return Err(Error::NotFound);
        }
        if !is_valid_firmware_table(&v1[..RSDP_V1_LEN]) {
            return Err(Error::CrcError);
        }

        let revision = v1[15];
        let mut oem_id = [0u8; 6];
        oem_id.copy_from_slice(&v1[9..15]);
        let rsdt = u32::from_le_bytes([v1[16], v1[17], v1[18], v1[19]]);

        let mut xsdt_addr = None;
        if revision >= RSDP_REVISION_2 {
            let head = extended(XSDP_LEN);
            let length = u32::from_le_bytes([head[20], head[21], head[22], head[23]]) as usize;
            if !(XSDP_LEN..=XSDP_MAX_LEN).contains(&length) {
                warn!("XSDP length {length} out of range, using the RSDT");
            } else if !is_valid_firmware_table(extended(length)) {
                warn!("XSDP checksum mismatch, using the RSDT");
            } else {
                let mut xsdt = [0u8; 8];
                xsdt.copy_from_slice(&head[24..32]);
                xsdt_addr = Some(u64::from_le_bytes(xsdt)).filter(|&a| a != 0);
            }
        }

        Ok(Self {
            revision,
            oem_id,
            rsdt_addr: Some(u64::from(rsdt)).filter(|&a| a != 0),
            xsdt_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum;

    fn rsdp_v1(rsdt: u32) -> [u8; RSDP_V1_LEN] {
        let mut b = [0u8; RSDP_V1_LEN];
        b[..8].copy_from_slice(RSDP_SIGNATURE);
        b[9..15].copy_from_slice(b"BOCHS ");
        b[16..20].copy_from_slice(&rsdt.to_le_bytes());
        b[8] = 0u8.wrapping_sub(checksum(&b));
        b
    }

    #[test]
    fn acpi_1_has_no_xsdt() {
        let b = rsdp_v1(0x7fe1_4000);
        let roots = AcpiRoots::parse_bytes(&b, |_| unreachable!()).unwrap();
        assert_eq!(roots.revision, 0);
        assert_eq!(&roots.oem_id, b"BOCHS ");
        assert_eq!(roots.rsdt_addr, Some(0x7fe1_4000));
        assert_eq!(roots.xsdt_addr, None);
    }

    #[test]
    fn rejects_bad_signature_and_checksum() {
        let mut b = rsdp_v1(0x1000);
        b[19] ^= 1;
        assert_eq!(AcpiRoots::parse_bytes(&b, |_| unreachable!()), Err(Error::CrcError));
        b[0] = b'X';
        assert_eq!(AcpiRoots::parse_bytes(&b, |_| unreachable!()), Err(Error::NotFound));
    }
}
