//! # Master Boot Record
//!
//! | Offset | Size   | Field                 |
//! |--------|--------|-----------------------|
//! | 0x1be  | 4 x 16 | Partition entries     |
//! | 0x1fe  | 2      | Boot signature 0xAA55 |
//!
//! Logical partitions hang off the extended partition as a chain of EBRs.
//! Each EBR uses two entries: the logical partition (start relative to
//! the EBR) and the link to the next EBR (start relative to the extended
//! partition).

use crate::sector;
use boot_error::{Error, Result};
use boot_firmware::{Disk, Firmware, Partition, PartitionType};
use log::debug;

pub const PART_TABLE_OFFSET: usize = 0x1be;
pub const SIGNATURE_OFFSET: usize = 0x1fe;
pub const SIGNATURE: u16 = 0xaa55;
pub const ENTRY_SIZE: usize = 16;

/// Number of the first logical partition.
pub const FIRST_LOGICAL: u32 = 5;

/// Longest EBR chain followed before the chain is considered looped.
const MAX_LOGICAL: u32 = 128;

/// One 16-byte partition table entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MbrEntry {
    pub flags: u8,
    pub kind: u8,
    pub start_lba: u32,
    pub sectors_num: u32,
}

impl MbrEntry {
    /// Entry `n` (1 to 4) of the table in `record`.
    #[must_use]
    pub fn read(record: &[u8], n: usize) -> Option<Self> {
        if !(1..=4).contains(&n) {
            return None;
        }
        let at = PART_TABLE_OFFSET + (n - 1) * ENTRY_SIZE;
        let e = record.get(at..at + ENTRY_SIZE)?;
        Some(Self {
            flags: e[0],
            kind: e[4],
            start_lba: u32::from_le_bytes([e[8], e[9], e[10], e[11]]),
            sectors_num: u32::from_le_bytes([e[12], e[13], e[14], e[15]]),
        })
    }

    #[must_use]
    pub const fn partition_type(&self) -> PartitionType {
        PartitionType::from_mbr(self.kind)
    }

    #[must_use]
    pub const fn is_extended(&self) -> bool {
        self.partition_type().is_extended()
    }

    /// Type 0xEE starting at LBA 1 and not marked bootable.
    #[must_use]
    pub const fn is_protective(&self) -> bool {
        self.kind == PartitionType::GptProtective.mbr_code()
            && self.start_lba == 1
            && self.flags == 0
    }

    fn to_partition(self, id: u32, start_lba: u64) -> Partition {
        Partition {
            id,
            start_lba,
            sectors_num: u64::from(self.sectors_num),
            kind: self.partition_type(),
            type_code: self.kind,
        }
    }
}

/// Whether `record` ends with the 0xAA55 boot signature.
#[must_use]
pub fn is_boot_record(record: &[u8]) -> bool {
    record
        .get(SIGNATURE_OFFSET..SIGNATURE_OFFSET + 2)
        .is_some_and(|s| u16::from_le_bytes([s[0], s[1]]) == SIGNATURE)
}

fn extended_entry(mbr: &[u8]) -> Option<MbrEntry> {
    (1..=4)
        .filter_map(|n| MbrEntry::read(mbr, n))
        .find(MbrEntry::is_extended)
}

/// Walk the EBR chain of `extended`, calling `visit` with each logical
/// partition's number, entry and absolute EBR LBA until it returns
/// `Some`.
fn walk_logical<T>(
    fw: &mut impl Firmware,
    disk: &Disk,
    extended: &MbrEntry,
    mut visit: impl FnMut(u32, &MbrEntry, u64) -> Option<Result<T>>,
) -> Result<Option<T>> {
    let base = u64::from(extended.start_lba);
    let mut next = 0u64;
    let mut id = FIRST_LOGICAL;

    loop {
        if id >= FIRST_LOGICAL + MAX_LOGICAL {
            return Err(Error::VolumeCorrupted);
        }
        let ebr_lba = base + next;
        let ebr = sector::read(fw, disk, ebr_lba, 1)?;
        if !is_boot_record(&ebr) {
            return Err(Error::VolumeCorrupted);
        }

        let logical = MbrEntry::read(&ebr, 1).ok_or(Error::VolumeCorrupted)?;
        if logical.is_extended() {
            return Err(Error::Unsupported);
        }
        if let Some(done) = visit(id, &logical, ebr_lba) {
            return done.map(Some);
        }
        id += 1;

        let link = MbrEntry::read(&ebr, 2).ok_or(Error::VolumeCorrupted)?;
        if link.start_lba == 0 {
            return Ok(None);
        }
        next = u64::from(link.start_lba);
    }
}

/// Logical partition translated to absolute LBAs, checked against the
/// bounds of its extended partition.
fn logical_partition(
    id: u32,
    logical: &MbrEntry,
    ebr_lba: u64,
    extended: &MbrEntry,
) -> Result<Partition> {
    let start = u64::from(logical.start_lba) + ebr_lba;
    let end = start + u64::from(logical.sectors_num);
    let ext_start = u64::from(extended.start_lba);
    let ext_end = ext_start + u64::from(extended.sectors_num);

    if start < ext_start || start >= ext_end || end <= ext_start || end > ext_end {
        return Err(Error::VolumeCorrupted);
    }
    Ok(logical.to_partition(id, start))
}

/// Partition `id` of the disk whose sector 0 is `mbr`.
///
/// # Errors
/// [`Error::NotFound`] for an id beyond the last partition,
/// [`Error::VolumeCorrupted`] for a broken EBR chain,
/// [`Error::Unsupported`] for nested extended partitions, or disk errors.
pub fn mbr_get_part_info(
    fw: &mut impl Firmware,
    disk: &Disk,
    mbr: &[u8],
    id: u32,
) -> Result<Partition> {
    if id == 0 {
        return Err(Error::InvalidParameter);
    }
    if id < FIRST_LOGICAL {
        let entry = MbrEntry::read(mbr, id as usize).ok_or(Error::BadBufferSize)?;
        return Ok(entry.to_partition(id, u64::from(entry.start_lba)));
    }

    let extended = extended_entry(mbr).ok_or(Error::NotFound)?;
    walk_logical(fw, disk, &extended, |n, logical, ebr_lba| {
        (n == id).then(|| logical_partition(n, logical, ebr_lba, &extended))
    })?
    .ok_or(Error::NotFound)
}

/// Highest partition number: 4 plus the number of logical partitions.
///
/// Counting stops quietly at the first unreadable or malformed EBR.
pub fn mbr_get_max_part(fw: &mut impl Firmware, disk: &Disk, mbr: &[u8]) -> u32 {
    let Some(extended) = extended_entry(mbr) else {
        return FIRST_LOGICAL - 1;
    };

    let mut max = FIRST_LOGICAL - 1;
    let walk = walk_logical(fw, disk, &extended, |n, _, _| {
        max = n;
        None::<Result<()>>
    });
    if let Err(e) = walk {
        debug!("EBR chain ends early after partition {max}: {e}");
    }
    max
}
