//! # Legacy Anchor Scan
//!
//! Without a UEFI configuration table the entry point sits on a 16-byte
//! boundary somewhere in the BIOS ROM area.

use crate::{EntryPoint, Eps, Eps3};
use boot_acpi::PhysMapRo;
use boot_error::{Error, Result};
use log::debug;

pub const PARAGRAPH_SIZE: u64 = 16;
pub const BIOS_ROM_START: u64 = 0xf_0000;
pub const BIOS_ROM_END: u64 = 0x10_0000;

/// Find the first valid entry point carrying `anchor` in `[start, end)`.
///
/// Candidates with the right anchor but a bad checksum are skipped.
///
/// # Errors
/// [`Error::NotFound`] if no valid entry point exists,
/// [`Error::InvalidParameter`] for an anchor other than `_SM_` or `_SM3_`.
///
/// # Safety
/// The whole range must be readable through `map`.
pub unsafe fn find_entry_point(
    map: &impl PhysMapRo,
    start: u64,
    end: u64,
    anchor: &[u8],
) -> Result<u64> {
    let size = match anchor {
        a if a == Eps::ANCHOR => Eps::SIZE,
        a if a == Eps3::ANCHOR => Eps3::SIZE,
        _ => return Err(Error::InvalidParameter),
    } as u64;

    let mut p = start.next_multiple_of(PARAGRAPH_SIZE);
    while p.saturating_add(size) <= end {
        #[allow(clippy::cast_possible_truncation)]
        let window = unsafe { map.map_ro(p, (end - p).min(0x100) as usize) };
        if window.starts_with(anchor) {
            match EntryPoint::parse(window) {
                Ok(_) => return Ok(p),
                Err(e) => debug!("Ignoring SMBIOS anchor @ {p:#x}: {e}"),
            }
        }
        p += PARAGRAPH_SIZE;
    }

    Err(Error::NotFound)
}
