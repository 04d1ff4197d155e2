use crate::SmbiosTable;
use boot_error::{Error, Result};

/// Formatted-area offsets of the strings we care about.
mod offsets {
    pub const BIOS_VENDOR: usize = 0x04;
    pub const BIOS_VERSION: usize = 0x05;
    pub const BIOS_RELEASE_DATE: usize = 0x08;
    pub const SYSTEM_MANUFACTURER: usize = 0x04;
    pub const SYSTEM_PRODUCT: usize = 0x05;
    pub const SYSTEM_VERSION: usize = 0x06;
    pub const SYSTEM_SERIAL: usize = 0x07;
    pub const SYSTEM_SKU: usize = 0x19;
    pub const SYSTEM_FAMILY: usize = 0x1a;
}

const TYPE_BIOS: u8 = 0;
const TYPE_SYSTEM: u8 = 1;

/// Identification strings from the BIOS (type 0) and system (type 1)
/// structures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformInfo<'a> {
    pub manufacturer: Option<&'a str>,
    pub product: Option<&'a str>,
    pub version: Option<&'a str>,
    pub serial_number: Option<&'a str>,
    pub sku: Option<&'a str>,
    pub family: Option<&'a str>,
    pub bios_vendor: Option<&'a str>,
    pub bios_version: Option<&'a str>,
    pub bios_date: Option<&'a str>,
}

impl<'a> PlatformInfo<'a> {
    /// # Errors
    /// [`Error::NotFound`] if the table has neither a type 0 nor a type 1
    /// structure.
    pub fn from_table(table: &SmbiosTable<'a>) -> Result<Self> {
        let bios = table.get_struct(TYPE_BIOS);
        let system = table.get_struct(TYPE_SYSTEM);
        if bios.is_none() && system.is_none() {
            return Err(Error::NotFound);
        }

        let bios_str = |offset| bios.and_then(|s| s.string_at(offset));
        let system_str = |offset| system.and_then(|s| s.string_at(offset));
        Ok(Self {
            manufacturer: system_str(offsets::SYSTEM_MANUFACTURER),
            product: system_str(offsets::SYSTEM_PRODUCT),
            version: system_str(offsets::SYSTEM_VERSION),
            serial_number: system_str(offsets::SYSTEM_SERIAL),
            sku: system_str(offsets::SYSTEM_SKU),
            family: system_str(offsets::SYSTEM_FAMILY),
            bios_vendor: bios_str(offsets::BIOS_VENDOR),
            bios_version: bios_str(offsets::BIOS_VERSION),
            bios_date: bios_str(offsets::BIOS_RELEASE_DATE),
        })
    }
}
