//! # ACPI Table Protocol
//!
//! `EFI_ACPI_TABLE_PROTOCOL`, which publishes tables into the RSDT/XSDT.

use core::ffi::c_void;
use uefi::proto::unsafe_protocol;
use uefi::{Result, Status, StatusExt};

#[repr(C)]
#[unsafe_protocol("ffe06bdd-6107-46a6-7bb2-5a9c7ec5275c")]
pub struct AcpiTableProtocol {
    install_acpi_table: unsafe extern "efiapi" fn(
        this: *const Self,
        buffer: *const c_void,
        size: usize,
        key: *mut usize,
    ) -> Status,
    uninstall_acpi_table: unsafe extern "efiapi" fn(this: *const Self, key: usize) -> Status,
}

impl AcpiTableProtocol {
    /// Publish a copy of `table`; firmware fixes up its checksum.
    pub fn install(&self, table: &[u8]) -> Result<usize> {
        let mut key = 0;
        // Safety: firmware copies the table before returning.
        unsafe {
            (self.install_acpi_table)(self, table.as_ptr().cast(), table.len(), &raw mut key)
        }
        .to_result_with_val(|| key)
    }

    pub fn uninstall(&self, key: usize) -> Result {
        unsafe { (self.uninstall_acpi_table)(self, key) }.to_result()
    }
}
