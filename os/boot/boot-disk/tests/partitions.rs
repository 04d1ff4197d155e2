mod common;

use boot_disk::{get_max_volume, get_volume_info, gpt_get_max_part, gpt_get_part_info};
use boot_error::Error;
use boot_firmware::{Firmware, HostedFirmware, PartitionType};
use common::{SECTOR, esp_disk, logical_disk, mbr_entry, sector_mut};

fn firmware(image: Vec<u8>) -> HostedFirmware {
    HostedFirmware::builder()
        .disk(image, u32::try_from(SECTOR).unwrap())
        .build()
}

#[test]
fn esp_is_volume_one() {
    let mut fw = firmware(esp_disk());
    let disk = fw.boot_disk().unwrap();

    let p = get_volume_info(&mut fw, &disk, 1).unwrap();
    assert_eq!(p.id, 1);
    assert_eq!(p.start_lba, 2048);
    assert_eq!(p.sectors_num, 1_048_576);
    assert_eq!(p.kind, PartitionType::Efi);
}

#[test]
fn gpt_type_classification() {
    let mut fw = firmware(esp_disk());
    let disk = fw.boot_disk().unwrap();

    assert_eq!(gpt_get_max_part(&mut fw, &disk), Ok(4));
    assert_eq!(get_max_volume(&mut fw, &disk), Ok(4));

    let kinds: Vec<PartitionType> = (1..=4)
        .map(|id| get_volume_info(&mut fw, &disk, id).unwrap().kind)
        .collect();
    assert_eq!(
        kinds,
        [
            PartitionType::Efi,
            PartitionType::Fat16,
            PartitionType::NonFs,
            PartitionType::Empty
        ]
    );
    assert_eq!(gpt_get_part_info(&mut fw, &disk, 5), Err(Error::NotFound));
    assert_eq!(get_volume_info(&mut fw, &disk, 0), Err(Error::InvalidParameter));
}

#[test]
fn single_bit_corruption_hides_the_gpt() {
    // Header byte, entry array byte.
    for (lba, byte) in [(1, 40), (2, 33)] {
        let mut image = esp_disk();
        sector_mut(&mut image, lba)[byte] ^= 0x04;
        let mut fw = firmware(image);
        let disk = fw.boot_disk().unwrap();

        assert_eq!(gpt_get_max_part(&mut fw, &disk), Err(Error::NotFound));
        assert_eq!(gpt_get_part_info(&mut fw, &disk, 1), Err(Error::NotFound));

        // The protective MBR is all that is left.
        assert_eq!(get_max_volume(&mut fw, &disk), Ok(4));
        let p = get_volume_info(&mut fw, &disk, 1).unwrap();
        assert_eq!(p.kind, PartitionType::GptProtective);
        assert_eq!(p.start_lba, 1);
    }
}

#[test]
fn header_must_describe_itself() {
    let mut image = esp_disk();
    sector_mut(&mut image, 1)[24] = 2;
    let mut fw = firmware(image);
    let disk = fw.boot_disk().unwrap();
    assert_eq!(gpt_get_max_part(&mut fw, &disk), Err(Error::NotFound));
}

#[test]
fn bootable_0xee_is_not_protective() {
    let mut image = esp_disk();
    sector_mut(&mut image, 0)[0x1be] = 0x80;
    let mut fw = firmware(image);
    let disk = fw.boot_disk().unwrap();
    let p = get_volume_info(&mut fw, &disk, 1).unwrap();
    assert_eq!(p.kind, PartitionType::GptProtective);
}

#[test]
fn logical_partitions_follow_the_ebr_chain() {
    let mut fw = firmware(logical_disk());
    let disk = fw.boot_disk().unwrap();

    assert_eq!(get_max_volume(&mut fw, &disk), Ok(6));

    let primary = get_volume_info(&mut fw, &disk, 1).unwrap();
    assert_eq!((primary.start_lba, primary.sectors_num), (8, 16));
    assert_eq!(primary.kind, PartitionType::Fat16);

    let extended = get_volume_info(&mut fw, &disk, 2).unwrap();
    assert!(extended.kind.is_extended());

    let first = get_volume_info(&mut fw, &disk, 5).unwrap();
    assert_eq!((first.id, first.start_lba, first.sectors_num), (5, 110, 20));
    assert_eq!(first.kind, PartitionType::Fat32Lba);

    let second = get_volume_info(&mut fw, &disk, 6).unwrap();
    assert_eq!((second.id, second.start_lba, second.sectors_num), (6, 145, 30));
    assert_eq!(second.kind, PartitionType::NonFs);
    assert_eq!(second.type_code, 0x83);

    assert_eq!(get_volume_info(&mut fw, &disk, 7), Err(Error::NotFound));

    for id in 1..=6 {
        let p = get_volume_info(&mut fw, &disk, id).unwrap();
        assert!(p.end_lba() <= 200);
    }
}

#[test]
fn broken_ebr_chains() {
    // Logical partition reaching past the extended partition.
    let mut image = logical_disk();
    mbr_entry(sector_mut(&mut image, 140), 1, 0, 0x83, 5, 60);
    let mut fw = firmware(image);
    let disk = fw.boot_disk().unwrap();
    assert_eq!(get_volume_info(&mut fw, &disk, 6), Err(Error::VolumeCorrupted));
    assert!(get_volume_info(&mut fw, &disk, 5).is_ok());

    // Nested extended partition.
    let mut image = logical_disk();
    mbr_entry(sector_mut(&mut image, 140), 1, 0, 0x0f, 5, 30);
    let mut fw = firmware(image);
    assert_eq!(get_volume_info(&mut fw, &disk, 6), Err(Error::Unsupported));
    assert_eq!(get_max_volume(&mut fw, &disk), Ok(5));

    // Missing boot signature.
    let mut image = logical_disk();
    sector_mut(&mut image, 140)[0x1fe] = 0;
    let mut fw = firmware(image);
    assert_eq!(get_volume_info(&mut fw, &disk, 6), Err(Error::VolumeCorrupted));
    assert_eq!(get_max_volume(&mut fw, &disk), Ok(5));
}

#[test]
fn no_extended_partition() {
    let mut image = common::blank(4);
    mbr_entry(sector_mut(&mut image, 0), 1, 0, 0xef, 1, 3);
    let mut fw = firmware(image);
    let disk = fw.boot_disk().unwrap();
    assert_eq!(get_max_volume(&mut fw, &disk), Ok(4));
    assert_eq!(get_volume_info(&mut fw, &disk, 1).unwrap().kind, PartitionType::Efi);
    assert_eq!(get_volume_info(&mut fw, &disk, 5), Err(Error::NotFound));
}
