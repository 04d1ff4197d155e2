//! # Entry Point Structures

use boot_acpi::is_valid_firmware_table;
use boot_error::{Error, Result};

/// Location of an entry point and the table it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmbiosInfo {
    pub eps_addr: u64,
    pub eps_len: usize,
    pub table_addr: u64,
    /// Exact for `_SM_`, an upper bound for `_SM3_`.
    pub table_len: usize,
}

/// SMBIOS 2.x entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eps {
    pub length: u8,
    pub major_version: u8,
    pub minor_version: u8,
    pub max_struct_size: u16,
    pub table_length: u16,
    pub table_address: u32,
    pub struct_count: u16,
}

impl Eps {
    pub const ANCHOR: &'static [u8; 4] = b"_SM_";
    /// Size of the structure as defined by SMBIOS 2.1.
    pub const SIZE: usize = 0x1f;

    /// Validate anchor and checksum, then decode.
    ///
    /// # Errors
    /// [`Error::NotFound`] without the anchor, [`Error::BadHeader`] if the
    /// declared length is below the structure size, [`Error::CrcError`] if
    /// the bytes do not sum to zero, [`Error::BadBufferSize`] if `bytes` is
    /// shorter than the declared length.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let b = checked(bytes, Self::ANCHOR, Self::SIZE)?;
        Ok(Self {
            length: b[5],
            major_version: b[6],
            minor_version: b[7],
            max_struct_size: u16::from_le_bytes([b[8], b[9]]),
            table_length: u16::from_le_bytes([b[0x16], b[0x17]]),
            table_address: u32::from_le_bytes([b[0x18], b[0x19], b[0x1a], b[0x1b]]),
            struct_count: u16::from_le_bytes([b[0x1c], b[0x1d]]),
        })
    }
}

/// SMBIOS 3.x entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eps3 {
    pub length: u8,
    pub major_version: u8,
    pub minor_version: u8,
    pub doc_rev: u8,
    pub table_max_length: u32,
    pub table_address: u64,
}

impl Eps3 {
    pub const ANCHOR: &'static [u8; 5] = b"_SM3_";
    pub const SIZE: usize = 0x18;

    /// # Errors
    /// As for [`Eps::parse`].
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let b = checked(bytes, Self::ANCHOR, Self::SIZE)?;
        let mut address = [0u8; 8];
        address.copy_from_slice(&b[0x10..0x18]);
        Ok(Self {
            length: b[6],
            major_version: b[7],
            minor_version: b[8],
            doc_rev: b[9],
            table_max_length: u32::from_le_bytes([b[0x0c], b[0x0d], b[0x0e], b[0x0f]]),
            table_address: u64::from_le_bytes(address),
        })
    }
}

/// Either entry point flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    V2(Eps),
    V3(Eps3),
}

impl EntryPoint {
    /// Decode whichever entry point `bytes` starts with.
    ///
    /// # Errors
    /// [`Error::NotFound`] if neither anchor is present; see [`Eps::parse`].
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(Eps3::ANCHOR) {
            Eps3::parse(bytes).map(Self::V3)
        } else {
            Eps::parse(bytes).map(Self::V2)
        }
    }

    #[must_use]
    pub const fn length(&self) -> usize {
        match self {
            Self::V2(eps) => eps.length as usize,
            Self::V3(eps) => eps.length as usize,
        }
    }

    /// Table address and length.
    #[must_use]
    pub const fn table(&self) -> (u64, usize) {
        match self {
            Self::V2(eps) => (eps.table_address as u64, eps.table_length as usize),
            Self::V3(eps) => (eps.table_address, eps.table_max_length as usize),
        }
    }

    #[must_use]
    pub const fn info(&self, eps_addr: u64) -> SmbiosInfo {
        let (table_addr, table_len) = self.table();
        SmbiosInfo {
            eps_addr,
            eps_len: self.length(),
            table_addr,
            table_len,
        }
    }
}

fn checked<'a>(bytes: &'a [u8], anchor: &[u8], min: usize) -> Result<&'a [u8]> {
    if !bytes.starts_with(anchor) {
        return Err(Error::NotFound);
    }
    let declared = bytes.get(anchor.len() + 1).copied().ok_or(Error::BadBufferSize)?;
    let len = usize::from(declared);
    if len < min {
        return Err(Error::BadHeader);
    }
    let b = bytes.get(..len).ok_or(Error::BadBufferSize)?;
    if !is_valid_firmware_table(b) {
        return Err(Error::CrcError);
    }
    Ok(b)
}
