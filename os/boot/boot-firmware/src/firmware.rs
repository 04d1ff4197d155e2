//! # The Firmware Trait

use crate::{AllocOption, Disk, SerialPortInfo};
use alloc::string::String;
use alloc::vec::Vec;
use boot_error::{Error, Result};
use core::time::Duration;

/// Handle returned by [`Firmware::install_acpi_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct AcpiTableKey(pub usize);

/// Platform services consumed by the boot libraries.
///
/// Addresses are physical; boot firmware runs identity mapped, so an
/// address returned by [`Firmware::allocate`] can be dereferenced directly.
pub trait Firmware {
    /// Allocate `size` bytes aligned to `align` (a power of two).
    ///
    /// # Errors
    /// [`Error::OutOfResources`] when no suitable range exists,
    /// [`Error::InvalidParameter`] for a zero size or bad alignment.
    fn allocate(&mut self, size: usize, align: usize, option: AllocOption) -> Result<u64>;

    /// Release an allocation made by [`Firmware::allocate`].
    ///
    /// # Errors
    /// [`Error::NotFound`] if `addr` is not a live allocation.
    fn free(&mut self, addr: u64, size: usize) -> Result<()>;

    /// Grow or shrink an allocation, preserving `min(old_size, new_size)`
    /// bytes of content.
    ///
    /// # Errors
    /// Whatever [`Firmware::allocate`] or [`Firmware::free`] report.
    ///
    /// # Safety
    /// `addr` must be a live allocation of `old_size` bytes from this
    /// firmware and must not be used afterwards.
    unsafe fn reallocate(&mut self, addr: u64, old_size: usize, new_size: usize) -> Result<u64> {
        let new = self.allocate(new_size, 8, AllocOption::Any)?;
        let len = old_size.min(new_size);
        unsafe {
            core::ptr::copy_nonoverlapping(addr as *const u8, new as *mut u8, len);
        }
        self.free(addr, old_size)?;
        Ok(new)
    }

    /// Read exactly `count` sectors starting at `lba` into `buf`.
    ///
    /// # Errors
    /// [`Error::BadBufferSize`] if `buf` is shorter than `count` sectors;
    /// device failures otherwise.
    fn disk_read(&mut self, disk: &Disk, buf: &mut [u8], lba: u64, count: usize) -> Result<()>;

    /// The disk the boot application was loaded from.
    ///
    /// # Errors
    /// [`Error::NotFound`] when the loader came from the network.
    fn boot_disk(&mut self) -> Result<Disk>;

    /// Physical address of the ACPI RSDP.
    ///
    /// # Errors
    /// [`Error::NotFound`] on platforms without ACPI.
    fn acpi_rsdp(&self) -> Result<u64>;

    /// Physical address of the SMBIOS 2.x entry point.
    ///
    /// # Errors
    /// [`Error::NotFound`] if firmware does not publish one.
    fn smbios_eps(&self) -> Result<u64>;

    /// Physical address of the SMBIOS 3.x entry point.
    ///
    /// # Errors
    /// [`Error::NotFound`] if firmware does not publish one.
    fn smbios_eps3(&self) -> Result<u64>;

    /// Publish an ACPI table. Replacement semantics are firmware defined.
    ///
    /// # Errors
    /// [`Error::Unsupported`] if firmware cannot install tables.
    fn install_acpi_table(&mut self, table: &[u8]) -> Result<AcpiTableKey> {
        let _ = table;
        Err(Error::Unsupported)
    }

    /// Withdraw a table published by [`Firmware::install_acpi_table`].
    ///
    /// # Errors
    /// [`Error::NotFound`] for an unknown key.
    fn uninstall_acpi_table(&mut self, key: AcpiTableKey) -> Result<()> {
        let _ = key;
        Err(Error::Unsupported)
    }

    /// Write one preformatted syslog record to the firmware console.
    ///
    /// # Errors
    /// Console failures; callers usually ignore them.
    fn print(&self, msg: &str) -> Result<()>;

    /// Locate the serial port for `com` (a COM index on x86, or an I/O base).
    ///
    /// # Errors
    /// [`Error::NotFound`] or [`Error::Unsupported`] if no usable UART exists.
    fn serial_port(&self, com: u32) -> Result<SerialPortInfo>;

    /// PXE style `BOOTIF` value of the boot NIC, e.g. `01-aa-bb-cc-dd-ee-ff`.
    ///
    /// # Errors
    /// [`Error::NotFound`] when not booted from the network.
    fn bootif_option(&self) -> Result<String> {
        Err(Error::NotFound)
    }

    /// Load a whole file from the boot volume.
    ///
    /// # Errors
    /// [`Error::NotFound`] for missing files; I/O errors otherwise.
    fn load_file(&mut self, path: &str) -> Result<Vec<u8>>;

    /// Whether boot services are still active.
    fn in_boot_services(&self) -> bool {
        crate::in_boot_services()
    }

    /// Hand the platform over. Firmware resources are unavailable
    /// afterwards.
    ///
    /// # Errors
    /// [`Error::AlreadyStarted`] when boot services are already gone.
    fn exit_boot_services(&mut self) -> Result<()>;

    /// Time since an arbitrary fixed point.
    ///
    /// # Errors
    /// [`Error::Unsupported`] if firmware has no time source.
    fn monotonic_time(&self) -> Result<Duration>;
}
