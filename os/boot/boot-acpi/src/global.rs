use crate::{AcpiTables, IdentityMap, Sdt};
use boot_error::Result;
use boot_firmware::{AcpiTableKey, Firmware};
use boot_sync::BootState;
use log::debug;

static ACPI: BootState<AcpiTables> = BootState::new();

/// Whether firmware publishes ACPI tables.
pub fn acpi_is_present(firmware: &impl Firmware) -> bool {
    firmware.acpi_rsdp().is_ok()
}

/// Locate the root table and remember it for [`acpi_find_sdt`].
///
/// # Errors
/// [`boot_error::Error::NotFound`] without ACPI; RSDP or root table
/// validation errors otherwise.
///
/// # Safety
/// The RSDP, the root table and every table it references must be
/// identity mapped and stay readable until [`acpi_shutdown`].
pub unsafe fn acpi_init(firmware: &impl Firmware) -> Result<()> {
    let rsdp = firmware.acpi_rsdp().inspect_err(|_| debug!("No ACPI present"))?;
    let tables = unsafe { AcpiTables::from_rsdp(&IdentityMap, rsdp) }?;
    ACPI.init(tables);
    Ok(())
}

pub fn acpi_shutdown() {
    let _ = ACPI.shutdown();
}

/// The walker installed by [`acpi_init`].
pub fn acpi_tables() -> Option<AcpiTables> {
    ACPI.with(|tables| *tables).ok()
}

/// First table with `signature`, or `None` before [`acpi_init`].
pub fn acpi_find_sdt(signature: &[u8; 4]) -> Option<Sdt> {
    let tables = acpi_tables()?;
    unsafe { tables.find_sdt(&IdentityMap, signature) }
}

/// Publish `table` through firmware.
///
/// # Errors
/// Whatever the firmware reports.
pub fn acpi_install_table(firmware: &mut impl Firmware, table: &[u8]) -> Result<AcpiTableKey> {
    firmware.install_acpi_table(table)
}

/// # Errors
/// Whatever the firmware reports.
pub fn acpi_uninstall_table(firmware: &mut impl Firmware, key: AcpiTableKey) -> Result<()> {
    firmware.uninstall_acpi_table(key)
}
