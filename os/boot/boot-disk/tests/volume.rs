mod common;

use boot_disk::{boot_volume_read, get_volume_info, volume_read};
use boot_error::Error;
use boot_firmware::{Firmware, HostedFirmware};
use common::{SECTOR, logical_disk};

/// Byte `i` of the disk holds `i % 251`.
fn patterned_disk() -> Vec<u8> {
    let mut image = logical_disk();
    for (i, b) in image.iter_mut().enumerate().skip(8 * SECTOR).take(16 * SECTOR) {
        *b = u8::try_from(i % 251).unwrap();
    }
    image
}

fn expected(partition_offset: usize, len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| u8::try_from((8 * SECTOR + partition_offset + i) % 251).unwrap())
        .collect()
}

fn firmware() -> HostedFirmware {
    HostedFirmware::builder()
        .disk(patterned_disk(), u32::try_from(SECTOR).unwrap())
        .build()
}

#[test]
fn aligned_read_goes_straight_to_the_caller() {
    let mut fw = firmware();
    let disk = fw.boot_disk().unwrap();
    let p = get_volume_info(&mut fw, &disk, 1).unwrap();

    let before = fw.sector_reads();
    let mut buf = vec![0u8; 2 * SECTOR];
    volume_read(&mut fw, &disk, &p, &mut buf, SECTOR as u64).unwrap();
    assert_eq!(buf, expected(SECTOR, 2 * SECTOR));
    assert_eq!(fw.sector_reads() - before, 2);
}

#[test]
fn unaligned_reads_bounce() {
    let mut fw = firmware();
    let disk = fw.boot_disk().unwrap();
    let p = get_volume_info(&mut fw, &disk, 1).unwrap();

    for (offset, len) in [(1, 1), (511, 2), (100, 1000), (0, 513), (7 * 512 + 3, 4096)] {
        let mut buf = vec![0u8; len];
        volume_read(&mut fw, &disk, &p, &mut buf, offset as u64).unwrap();
        assert_eq!(buf, expected(offset, len), "offset {offset} len {len}");

        let mut again = vec![0u8; len];
        volume_read(&mut fw, &disk, &p, &mut again, offset as u64).unwrap();
        assert_eq!(buf, again);
    }

    // 1000 bytes at offset 100 span sectors 0 to 2 of the partition.
    let before = fw.sector_reads();
    let mut buf = vec![0u8; 1000];
    volume_read(&mut fw, &disk, &p, &mut buf, 100).unwrap();
    assert_eq!(fw.sector_reads() - before, 3);
}

#[test]
fn reads_stay_inside_the_partition() {
    let mut fw = firmware();
    let disk = fw.boot_disk().unwrap();
    let p = get_volume_info(&mut fw, &disk, 1).unwrap();
    let size = 16 * SECTOR as u64;

    let mut last = [0u8; 10];
    volume_read(&mut fw, &disk, &p, &mut last, size - 10).unwrap();
    let mut over = [0u8; 11];
    assert_eq!(
        volume_read(&mut fw, &disk, &p, &mut over, size - 10),
        Err(Error::InvalidParameter)
    );
    volume_read(&mut fw, &disk, &p, &mut [], size + 4096).unwrap();
}

#[test]
fn lba_overflow_is_rejected() {
    let mut fw = firmware();
    let disk = fw.boot_disk().unwrap();
    let mut p = get_volume_info(&mut fw, &disk, 1).unwrap();
    p.start_lba = u64::MAX - 1;
    p.sectors_num = 16;
    let before = fw.sector_reads();

    let mut buf = [0u8; 16];
    for offset in [4 * SECTOR as u64, u64::MAX - 8] {
        assert_eq!(
            volume_read(&mut fw, &disk, &p, &mut buf, offset),
            Err(Error::InvalidParameter),
            "offset {offset:#x}"
        );
    }
    assert_eq!(fw.sector_reads(), before);
    assert_eq!(p.end_lba(), u64::MAX);
}

#[test]
fn disk_errors_propagate() {
    let mut fw = firmware();
    let disk = fw.boot_disk().unwrap();
    let mut p = get_volume_info(&mut fw, &disk, 1).unwrap();
    p.start_lba = 1000;

    let mut buf = [0u8; 16];
    assert_eq!(
        volume_read(&mut fw, &disk, &p, &mut buf, 3),
        Err(Error::DeviceError)
    );
}

#[test]
fn boot_volume() {
    let mut fw = firmware();
    let mut buf = [0u8; 32];
    boot_volume_read(&mut fw, 1, &mut buf, 600).unwrap();
    assert_eq!(buf.to_vec(), expected(600, 32));

    let mut no_disk = HostedFirmware::builder().build();
    assert_eq!(
        boot_volume_read(&mut no_disk, 1, &mut buf, 0),
        Err(Error::NotFound)
    );
}
