//! # SMBIOS Walker
//!
//! Firmware describes the platform in a table of variable-length
//! structures reachable from one of two entry points:
//!
//! | Anchor  | Table address | Table length          | Structure count |
//! |---------|---------------|-----------------------|-----------------|
//! | `_SM_`  | 32-bit        | 16-bit, exact         | declared        |
//! | `_SM3_` | 64-bit        | 32-bit, maximum       | up to type 127  |
//!
//! Every structure is a 4-byte header (type, length, handle), a formatted
//! area of `length` bytes (header included) and a string set terminated by
//! two NUL bytes. Strings are referenced from the formatted area by 1-based
//! index; index 0 means "no string".
//!
//! ```rust
//! use boot_smbios::SmbiosTable;
//!
//! // Type 1 (system information): manufacturer is string 1, product string 2.
//! let raw = b"\x01\x08\x01\x00\x01\x02\x00\x00Acme\0Widget\0\0\x7f\x04\x02\x00\0\0";
//! let table = SmbiosTable::new(raw);
//!
//! let system = table.get_struct(1).unwrap();
//! assert_eq!(system.string_at(4), Some("Acme"));
//! assert_eq!(system.string_at(5), Some("Widget"));
//! assert_eq!(system.string_at(6), None);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod eps;
mod global;
mod platform;
mod scan;
mod table;

pub use eps::{EntryPoint, Eps, Eps3, SmbiosInfo};
pub use global::{smbios_get_info, smbios_get_platform_info, smbios_get_v3_info};
pub use platform::PlatformInfo;
pub use scan::{BIOS_ROM_END, BIOS_ROM_START, PARAGRAPH_SIZE, find_entry_point};
pub use table::{END_OF_TABLE, SmbiosTable, Structure, StructureHeader, Structures};
