//! # Firmware Abstraction Layer
//!
//! The boot libraries never call firmware directly. Everything they need
//! from the platform is expressed by the [`Firmware`] trait, and a boot
//! application supplies one implementation of it (the UEFI application in
//! `os/uefi/uefi-survey` is one; [`HostedFirmware`] is an in-memory one).
//!
//! ## Capability Set
//!
//! ```text
//!            boot application
//!                   │
//!   ┌───────────────┼──────────────────────────────┐
//!   │  volume / partitions    ACPI / SMBIOS    logging / consoles
//!   └───────────────┼──────────────────────────────┘
//!                   ▼
//!             trait Firmware
//!   allocate · free · disk_read · boot_disk · acpi_rsdp
//!   smbios_eps · install_acpi_table · print · serial_port
//!   bootif_option · load_file · exit_boot_services · time
//!                   │
//!   ┌───────────────┴───────────────┐
//!   UEFI boot services         HostedFirmware (tests)
//! ```
//!
//! The contract is synchronous: every call runs to completion and returns a
//! [`boot_error::Result`].
//!
//! ## Shared Types
//!
//! * [`Disk`] and [`Partition`]: the sector-addressed view of a block device.
//! * [`AllocOption`]: placement policy for physical allocations.
//! * [`SerialPortInfo`]: where the console UART lives and how to reach it.
//!
//! ## Lifecycle
//!
//! [`in_boot_services`] reports whether firmware still owns the platform;
//! implementations flip it in [`Firmware::exit_boot_services`]. Teardown work
//! is queued with [`atexit`] and run, newest first, by [`do_atexit`].

#![cfg_attr(not(any(test, doctest, feature = "hosted")), no_std)]
#![allow(unsafe_code)]

extern crate alloc;

mod alloc_option;
mod atexit;
mod disk;
mod firmware;
#[cfg(feature = "hosted")]
mod hosted;
mod serial;
mod services;

pub use alloc_option::AllocOption;
pub use atexit::{AtExit, atexit, do_atexit};
pub use disk::{Disk, Partition, PartitionType};
pub use firmware::{AcpiTableKey, Firmware};
#[cfg(feature = "hosted")]
pub use hosted::{HostedFirmware, HostedFirmwareBuilder};
pub use serial::{IoChannel, IoSpace, SerialPortInfo, SerialType};
pub use services::{in_boot_services, set_in_boot_services};

/// Firmware page granularity.
pub const PAGE_SIZE: usize = 4096;
