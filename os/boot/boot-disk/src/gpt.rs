//! # GUID Partition Table
//!
//! The primary header sits at LBA 1 and is protected by a CRC32 computed
//! with its own CRC field zeroed. The entry array it points at carries a
//! second CRC32. A table failing either check is treated as absent
//! ([`Error::NotFound`]) so that callers fall back to the MBR.

use crate::sector;
use boot_error::{Error, Result};
use boot_firmware::{Disk, Firmware, Partition, PartitionType};
use log::debug;

pub const SIGNATURE: &[u8; 8] = b"EFI PART";
pub const HEADER_LBA: u64 = 1;
/// Size of the header fields defined by UEFI 2.x.
pub const HEADER_MIN_SIZE: usize = 92;
pub const ENTRY_MIN_SIZE: usize = 128;

const HEADER_CRC_OFFSET: usize = 16;

/// On-disk GUID byte order: the first three fields are little endian.
const fn guid(d1: u32, d2: u16, d3: u16, d4: [u8; 8]) -> [u8; 16] {
    let a = d1.to_le_bytes();
    let b = d2.to_le_bytes();
    let c = d3.to_le_bytes();
    [
        a[0], a[1], a[2], a[3], b[0], b[1], c[0], c[1], d4[0], d4[1], d4[2], d4[3], d4[4], d4[5],
        d4[6], d4[7],
    ]
}

pub const UNUSED_GUID: [u8; 16] = [0; 16];
pub const EFI_SYSTEM_GUID: [u8; 16] = guid(
    0xc12a_7328,
    0xf81f,
    0x11d2,
    [0xba, 0x4b, 0x00, 0xa0, 0xc9, 0x3e, 0xc9, 0x3b],
);
pub const BASIC_DATA_GUID: [u8; 16] = guid(
    0xebd0_a0a2,
    0xb9e5,
    0x4433,
    [0x87, 0xc0, 0x68, 0xb6, 0xb7, 0x26, 0x99, 0xc7],
);

/// Coarse classification of a partition type GUID.
#[must_use]
pub fn classify(type_guid: &[u8; 16]) -> PartitionType {
    match *type_guid {
        UNUSED_GUID => PartitionType::Empty,
        EFI_SYSTEM_GUID => PartitionType::Efi,
        // FAT sub-types are not told apart.
        BASIC_DATA_GUID => PartitionType::Fat16,
        _ => PartitionType::NonFs,
    }
}

/// The fields of a GPT header that the lookup needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GptHeader {
    pub header_size: u32,
    pub header_crc32: u32,
    pub my_lba: u64,
    pub entry_array_lba: u64,
    pub number_of_entries: u32,
    pub size_of_entry: u32,
    pub entry_array_crc32: u32,
}

impl GptHeader {
    /// Decode and verify the header sector.
    ///
    /// # Errors
    /// [`Error::NotFound`] for a bad signature, a header not at LBA 1, an
    /// implausible header size or a CRC mismatch.
    pub fn parse(sector: &[u8]) -> Result<Self> {
        if sector.len() < HEADER_MIN_SIZE || !sector.starts_with(SIGNATURE) {
            return Err(Error::NotFound);
        }
        let u32_at = |at: usize| {
            u32::from_le_bytes([sector[at], sector[at + 1], sector[at + 2], sector[at + 3]])
        };
        let u64_at = |at: usize| u64::from(u32_at(at)) | (u64::from(u32_at(at + 4)) << 32);

        let header = Self {
            header_size: u32_at(12),
            header_crc32: u32_at(HEADER_CRC_OFFSET),
            my_lba: u64_at(24),
            entry_array_lba: u64_at(72),
            number_of_entries: u32_at(80),
            size_of_entry: u32_at(84),
            entry_array_crc32: u32_at(88),
        };
        if header.my_lba != HEADER_LBA {
            return Err(Error::NotFound);
        }

        let size = header.header_size as usize;
        if !(HEADER_MIN_SIZE..=sector.len()).contains(&size) {
            debug!("GPT header size {size} out of range");
            return Err(Error::NotFound);
        }
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&sector[..HEADER_CRC_OFFSET]);
        hasher.update(&[0; 4]);
        hasher.update(&sector[HEADER_CRC_OFFSET + 4..size]);
        if hasher.finalize() != header.header_crc32 {
            debug!("GPT header CRC mismatch");
            return Err(Error::NotFound);
        }
        Ok(header)
    }

    /// Bytes covered by the entry array CRC.
    #[must_use]
    pub const fn entry_array_len(&self) -> Option<usize> {
        (self.number_of_entries as usize).checked_mul(self.size_of_entry as usize)
    }
}

/// A verified header together with its verified entry array.
struct Gpt {
    header: GptHeader,
    entries: alloc::vec::Vec<u8>,
}

impl Gpt {
    fn read(fw: &mut impl Firmware, disk: &Disk) -> Result<Self> {
        let sector = sector::read(fw, disk, HEADER_LBA, 1)?;
        let header = GptHeader::parse(&sector)?;

        if (header.size_of_entry as usize) < ENTRY_MIN_SIZE {
            return Err(Error::NotFound);
        }
        let len = header.entry_array_len().ok_or(Error::NotFound)?;
        let count = len.div_ceil(disk.sector_size());
        let entries = sector::read(fw, disk, header.entry_array_lba, count)?;
        if crc32fast::hash(&entries[..len]) != header.entry_array_crc32 {
            debug!("GPT entry array CRC mismatch");
            return Err(Error::NotFound);
        }

        Ok(Self { header, entries })
    }

    fn partition(&self, id: u32) -> Result<Partition> {
        if id == 0 || id > self.header.number_of_entries {
            return Err(Error::NotFound);
        }
        let size = self.header.size_of_entry as usize;
        let at = (id as usize - 1) * size;
        let e = &self.entries[at..at + size];

        let mut type_guid = [0u8; 16];
        type_guid.copy_from_slice(&e[..16]);
        let lba = |at: usize| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&e[at..at + 8]);
            u64::from_le_bytes(raw)
        };
        let (start, end) = (lba(32), lba(40));
        let kind = classify(&type_guid);
        let sectors_num = end.checked_sub(start).ok_or(Error::VolumeCorrupted)? + 1;

        Ok(Partition {
            id,
            start_lba: start,
            sectors_num,
            kind,
            type_code: kind.mbr_code(),
        })
    }
}

/// Entry `id` (1-based) of the partition entry array.
///
/// # Errors
/// [`Error::NotFound`] if the disk has no valid GPT or `id` is beyond
/// `number_of_entries`; disk errors otherwise.
pub fn gpt_get_part_info(fw: &mut impl Firmware, disk: &Disk, id: u32) -> Result<Partition> {
    Gpt::read(fw, disk)?.partition(id)
}

/// Number of entries of the partition entry array.
///
/// # Errors
/// As for [`gpt_get_part_info`].
pub fn gpt_get_max_part(fw: &mut impl Firmware, disk: &Disk) -> Result<u32> {
    Ok(Gpt::read(fw, disk)?.header.number_of_entries)
}
