//! # ACPI Table Discovery
//!
//! Boot applications only need a thin slice of ACPI: find the root
//! table, look up a few tables by signature (SPCR for the console UART,
//! OEM IDs for platform quirks) and occasionally publish a table of their
//! own. This crate does exactly that and nothing more.
//!
//! ## Architecture
//!
//! ```text
//! Firmware (EFI configuration table / BIOS scan)
//!     ↓
//! RSDP (ACPI 1.0) or XSDP (ACPI 2.0+)
//!     ↓
//! RSDT (32-bit entries) or XSDT (64-bit entries)
//!     ↓
//! Individual tables (SPCR, FACP, APIC, ...)
//! ```
//!
//! ## Root Table Selection
//!
//! * RSDP revision >= 2 with a non-zero XSDT address: walk the XSDT with
//!   8-byte entries.
//! * Anything else: walk the RSDT with 4-byte entries.
//!
//! [`AcpiTables`] remembers the entry array bounds and the entry size;
//! [`AcpiTables::find_sdt`] walks it linearly, skipping NULL entries,
//! and returns the first table whose signature matches. Only the
//! signature is compared; checksums of individual tables are checked by
//! callers that care, using [`is_valid_firmware_table`].
//!
//! ## Memory Access
//!
//! Tables live in firmware-owned memory and are never copied. All reads
//! go through [`PhysMapRo`]; boot firmware runs identity mapped, so
//! [`IdentityMap`] is what the process-wide functions use.
//!
//! ## Process-wide State
//!
//! [`acpi_init`] stores the walker in a process-wide slot; [`acpi_find_sdt`]
//! reads it. Both are no-ops (or `None`) on platforms without ACPI.
//!
//! ```rust
//! use boot_acpi::{AcpiTables, IdentityMap, SdtHeader, checksum};
//!
//! // An empty XSDT, and an ACPI 2.0 XSDP pointing at it.
//! let mut xsdt = vec![0u8; SdtHeader::SIZE];
//! xsdt[..4].copy_from_slice(b"XSDT");
//! xsdt[4..8].copy_from_slice(&(SdtHeader::SIZE as u32).to_le_bytes());
//!
//! let mut xsdp = [0u8; 36];
//! xsdp[..8].copy_from_slice(b"RSD PTR ");
//! xsdp[15] = 2;
//! xsdp[20..24].copy_from_slice(&36u32.to_le_bytes());
//! xsdp[24..32].copy_from_slice(&(xsdt.as_ptr() as u64).to_le_bytes());
//! xsdp[8] = 0u8.wrapping_sub(checksum(&xsdp[..20]));
//! xsdp[32] = 0u8.wrapping_sub(checksum(&xsdp));
//!
//! let tables = unsafe { AcpiTables::from_rsdp(&IdentityMap, xsdp.as_ptr() as u64) }.unwrap();
//! assert_eq!(tables.entry_size(), 8);
//! assert!(unsafe { tables.find_sdt(&IdentityMap, b"SPCR") }.is_none());
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod global;
pub mod rsdp;
mod sdt;
pub mod spcr;

pub use global::{
    acpi_find_sdt, acpi_init, acpi_install_table, acpi_is_present, acpi_shutdown,
    acpi_tables, acpi_uninstall_table,
};
pub use rsdp::AcpiRoots;
pub use sdt::{AcpiTables, Sdt, SdtEntries, SdtHeader};
pub use spcr::{Spcr, spcr_serial_port};

/// Map a physical region and return a *read-only* byte slice for its contents.
/// You provide the implementation (identity map, kmap, etc.).
pub trait PhysMapRo {
    /// # Safety
    /// The implementor must ensure the returned slice is valid for `len` bytes.
    unsafe fn map_ro<'a>(&self, paddr: u64, len: usize) -> &'a [u8];
}

/// Physical addresses are virtual addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMap;

impl PhysMapRo for IdentityMap {
    #[allow(clippy::cast_possible_truncation)]
    unsafe fn map_ro<'a>(&self, paddr: u64, len: usize) -> &'a [u8] {
        unsafe { core::slice::from_raw_parts(paddr as usize as *const u8, len) }
    }
}

/// Byte sum modulo 256.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |a, &b| a.wrapping_add(b))
}

/// Whether the bytes of a firmware table sum to zero.
#[must_use]
pub fn is_valid_firmware_table(bytes: &[u8]) -> bool {
    checksum(bytes) == 0
}
