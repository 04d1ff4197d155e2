#![allow(dead_code)]

use boot_disk::gpt::{BASIC_DATA_GUID, EFI_SYSTEM_GUID};

pub const SECTOR: usize = 512;

/// Blank disk of `sectors` sectors.
pub fn blank(sectors: usize) -> Vec<u8> {
    vec![0u8; sectors * SECTOR]
}

pub fn sector_mut(image: &mut [u8], lba: usize) -> &mut [u8] {
    &mut image[lba * SECTOR..(lba + 1) * SECTOR]
}

/// Write MBR entry `n` (1 to 4) and the boot signature into `record`.
pub fn mbr_entry(record: &mut [u8], n: usize, flags: u8, kind: u8, start: u32, sectors: u32) {
    let at = 0x1be + (n - 1) * 16;
    record[at] = flags;
    record[at + 4] = kind;
    record[at + 8..at + 12].copy_from_slice(&start.to_le_bytes());
    record[at + 12..at + 16].copy_from_slice(&sectors.to_le_bytes());
    record[0x1fe] = 0x55;
    record[0x1ff] = 0xaa;
}

pub struct GptEntry {
    pub type_guid: [u8; 16],
    pub start: u64,
    pub end: u64,
}

/// Protective MBR, GPT header at LBA 1 and a 4-entry array at LBA 2.
pub fn gpt_disk(sectors: usize, entries: &[GptEntry]) -> Vec<u8> {
    const NUM_ENTRIES: u32 = 4;
    let mut image = blank(sectors);
    mbr_entry(sector_mut(&mut image, 0), 1, 0, 0xee, 1, u32::try_from(sectors - 1).unwrap());

    let mut array = vec![0u8; NUM_ENTRIES as usize * 128];
    for (i, e) in entries.iter().enumerate() {
        let a = &mut array[i * 128..(i + 1) * 128];
        a[..16].copy_from_slice(&e.type_guid);
        a[16] = u8::try_from(i + 1).unwrap();
        a[32..40].copy_from_slice(&e.start.to_le_bytes());
        a[40..48].copy_from_slice(&e.end.to_le_bytes());
    }
    sector_mut(&mut image, 2).copy_from_slice(&array);

    let header = sector_mut(&mut image, 1);
    header[..8].copy_from_slice(b"EFI PART");
    header[8..12].copy_from_slice(&0x0001_0000u32.to_le_bytes());
    header[12..16].copy_from_slice(&92u32.to_le_bytes());
    header[24..32].copy_from_slice(&1u64.to_le_bytes());
    header[72..80].copy_from_slice(&2u64.to_le_bytes());
    header[80..84].copy_from_slice(&NUM_ENTRIES.to_le_bytes());
    header[84..88].copy_from_slice(&128u32.to_le_bytes());
    header[88..92].copy_from_slice(&crc32fast::hash(&array).to_le_bytes());
    let crc = crc32fast::hash(&header[..92]);
    header[16..20].copy_from_slice(&crc.to_le_bytes());
    image
}

/// ESP at 2048..=1050623, a basic data partition, an unknown type and an
/// unused slot.
pub fn esp_disk() -> Vec<u8> {
    gpt_disk(
        8,
        &[
            GptEntry {
                type_guid: EFI_SYSTEM_GUID,
                start: 2048,
                end: 1_050_623,
            },
            GptEntry {
                type_guid: BASIC_DATA_GUID,
                start: 1_050_624,
                end: 2_099_199,
            },
            GptEntry {
                type_guid: [0x11; 16],
                start: 2_099_200,
                end: 2_099_263,
            },
        ],
    )
}

/// MBR disk: FAT16 primary at 8..24, extended at 100..200 holding two
/// logical partitions (110..130 and 145..175).
pub fn logical_disk() -> Vec<u8> {
    let mut image = blank(200);
    let mbr = sector_mut(&mut image, 0);
    mbr_entry(mbr, 1, 0x80, 0x06, 8, 16);
    mbr_entry(mbr, 2, 0, 0x05, 100, 100);

    let ebr1 = sector_mut(&mut image, 100);
    mbr_entry(ebr1, 1, 0, 0x0c, 10, 20);
    mbr_entry(ebr1, 2, 0, 0x05, 40, 60);

    let ebr2 = sector_mut(&mut image, 140);
    mbr_entry(ebr2, 1, 0, 0x83, 5, 30);
    image
}
