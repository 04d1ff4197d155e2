//! # Disks and Partitions

/// A block device as enumerated by firmware. Read-only after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disk {
    /// Firmware handle or BIOS drive number.
    pub firmware_id: u64,
    pub bytes_per_sector: u32,
    pub cylinders: u32,
    pub heads_per_cylinder: u32,
    pub sectors_per_track: u32,
    /// Legacy BIOS only: use the EDD (LBA) interface.
    pub use_edd: bool,
}

impl Disk {
    /// A disk addressed by LBA only.
    #[must_use]
    pub const fn new(firmware_id: u64, bytes_per_sector: u32) -> Self {
        Self {
            firmware_id,
            bytes_per_sector,
            cylinders: 0,
            heads_per_cylinder: 0,
            sectors_per_track: 0,
            use_edd: true,
        }
    }

    #[must_use]
    pub const fn sector_size(&self) -> usize {
        self.bytes_per_sector as usize
    }
}

/// Unified partition classification.
///
/// MBR type bytes map onto this directly; GPT type GUIDs are folded into
/// the same set (EFI system partition, FAT for basic data, `NonFs` for
/// everything else).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionType {
    Empty,
    Fat12,
    Fat16,
    Fat16Lt32Mb,
    Fat32,
    Fat32Lba,
    Fat16Lba,
    Efi,
    Extended,
    LinuxExtended,
    WinExtended,
    GptProtective,
    NonFs,
}

impl PartitionType {
    /// Classify a legacy MBR partition type byte.
    #[must_use]
    pub const fn from_mbr(code: u8) -> Self {
        match code {
            0x00 => Self::Empty,
            0x01 => Self::Fat12,
            0x04 => Self::Fat16Lt32Mb,
            0x05 => Self::Extended,
            0x06 => Self::Fat16,
            0x0b => Self::Fat32,
            0x0c => Self::Fat32Lba,
            0x0e => Self::Fat16Lba,
            0x0f => Self::WinExtended,
            0x85 => Self::LinuxExtended,
            0xee => Self::GptProtective,
            0xef => Self::Efi,
            _ => Self::NonFs,
        }
    }

    /// The canonical MBR type byte.
    #[must_use]
    pub const fn mbr_code(self) -> u8 {
        match self {
            Self::Empty => 0x00,
            Self::Fat12 => 0x01,
            Self::Fat16Lt32Mb => 0x04,
            Self::Extended => 0x05,
            Self::Fat16 => 0x06,
            Self::Fat32 => 0x0b,
            Self::Fat32Lba => 0x0c,
            Self::Fat16Lba => 0x0e,
            Self::WinExtended => 0x0f,
            Self::LinuxExtended => 0x85,
            Self::GptProtective => 0xee,
            Self::Efi => 0xef,
            Self::NonFs => 0x7f,
        }
    }

    #[must_use]
    pub const fn is_extended(self) -> bool {
        matches!(self, Self::Extended | Self::WinExtended | Self::LinuxExtended)
    }

    #[must_use]
    pub const fn is_fat(self) -> bool {
        matches!(
            self,
            Self::Fat12 | Self::Fat16 | Self::Fat16Lt32Mb | Self::Fat32 | Self::Fat32Lba | Self::Fat16Lba
        )
    }
}

/// One partition of a disk. Derived fresh from the disk on every lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// 1-origin partition number (MBR logical partitions start at 5).
    pub id: u32,
    pub start_lba: u64,
    pub sectors_num: u64,
    pub kind: PartitionType,
    /// Raw MBR type byte, or the canonical byte for GPT entries.
    pub type_code: u8,
}

impl Partition {
    /// One past the last LBA, saturating for corrupt entries.
    #[must_use]
    pub const fn end_lba(&self) -> u64 {
        self.start_lba.saturating_add(self.sectors_num)
    }
}
