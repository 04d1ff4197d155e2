use crate::{EntryPoint, Eps, Eps3, PlatformInfo, SmbiosInfo, SmbiosTable};
use boot_acpi::{IdentityMap, PhysMapRo};
use boot_error::{Error, Result};
use boot_firmware::Firmware;
use log::debug;

/// Entry point bytes at `addr`, as long as its own length field says.
unsafe fn entry_point(addr: u64, min: usize) -> Result<EntryPoint> {
    let head = unsafe { IdentityMap.map_ro(addr, min) };
    let len_at = if head.starts_with(Eps3::ANCHOR) { 6 } else { 5 };
    let len = usize::from(head[len_at]).max(min);
    EntryPoint::parse(unsafe { IdentityMap.map_ro(addr, len) })
}

/// The SMBIOS 2.x entry point and its table.
///
/// # Errors
/// [`Error::NotFound`] without a valid `_SM_` entry point,
/// [`Error::CrcError`] for a corrupted one.
///
/// # Safety
/// The entry point published by firmware must be identity mapped.
pub unsafe fn smbios_get_info(firmware: &impl Firmware) -> Result<SmbiosInfo> {
    let addr = firmware.smbios_eps()?;
    let eps = unsafe { entry_point(addr, Eps::SIZE) }?;
    match eps {
        EntryPoint::V2(_) => Ok(eps.info(addr)),
        EntryPoint::V3(_) => Err(Error::NotFound),
    }
}

/// The SMBIOS 3.x entry point and its table. The table length is the
/// declared maximum.
///
/// # Errors
/// As for [`smbios_get_info`], for `_SM3_`.
///
/// # Safety
/// See [`smbios_get_info`].
pub unsafe fn smbios_get_v3_info(firmware: &impl Firmware) -> Result<SmbiosInfo> {
    let addr = firmware.smbios_eps3()?;
    let eps = unsafe { entry_point(addr, Eps3::SIZE) }?;
    match eps {
        EntryPoint::V3(_) => Ok(eps.info(addr)),
        EntryPoint::V2(_) => Err(Error::NotFound),
    }
}

/// Platform identification, from the v3 table if there is one, else from
/// the v2 table.
///
/// # Errors
/// [`Error::NotFound`] without SMBIOS or without type 0 and
/// type 1 structures.
///
/// # Safety
/// Entry points and tables published by firmware must be identity mapped
/// and stay readable for the returned lifetime.
pub unsafe fn smbios_get_platform_info<'a>(firmware: &impl Firmware) -> Result<PlatformInfo<'a>> {
    let info = unsafe { smbios_get_v3_info(firmware) }
        .or_else(|_| unsafe { smbios_get_info(firmware) })
        .inspect_err(|_| debug!("No SMBIOS tables"))?;
    let bytes: &'a [u8] = unsafe { IdentityMap.map_ro(info.table_addr, info.table_len) };
    PlatformInfo::from_table(&SmbiosTable::new(bytes))
}
