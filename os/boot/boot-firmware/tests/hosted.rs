use boot_error::Error;
use boot_firmware::{
    AllocOption, Firmware, HostedFirmware, IoChannel, PartitionType, SerialPortInfo, SerialType,
};

fn image() -> Vec<u8> {
    (0..8u8).flat_map(|s| [s; 512]).collect()
}

#[test]
fn reads_whole_sectors() {
    let mut fw = HostedFirmware::builder().disk(image(), 512).build();
    let disk = fw.boot_disk().unwrap();
    assert_eq!(disk.bytes_per_sector, 512);

    let mut buf = vec![0u8; 1024];
    fw.disk_read(&disk, &mut buf, 2, 2).unwrap();
    assert!(buf[..512].iter().all(|&b| b == 2));
    assert!(buf[512..].iter().all(|&b| b == 3));
    assert_eq!(fw.sector_reads(), 2);
}

#[test]
fn short_buffer_and_out_of_range() {
    let mut fw = HostedFirmware::builder().disk(image(), 512).build();
    let disk = fw.boot_disk().unwrap();

    let mut buf = vec![0u8; 511];
    assert_eq!(fw.disk_read(&disk, &mut buf, 0, 1), Err(Error::BadBufferSize));

    let mut buf = vec![0u8; 1024];
    assert_eq!(fw.disk_read(&disk, &mut buf, 7, 2), Err(Error::DeviceError));
}

#[test]
fn no_disk_means_no_boot_disk() {
    let mut fw = HostedFirmware::builder().build();
    assert_eq!(fw.boot_disk(), Err(Error::NotFound));
}

#[test]
fn allocations_are_aligned_and_tracked() {
    let mut fw = HostedFirmware::builder().build();
    let a = fw.allocate(100, 4096, AllocOption::Any).unwrap();
    let b = fw.allocate(10, 8, AllocOption::Below4G).unwrap();
    assert_eq!(a % 4096, 0);
    assert_eq!(fw.live_allocations(), 2);

    // Memory is usable.
    unsafe { core::ptr::write_bytes(a as *mut u8, 0xaa, 100) };

    assert_eq!(fw.free(a, 99), Err(Error::InvalidParameter));
    fw.free(a, 100).unwrap();
    fw.free(b, 10).unwrap();
    assert_eq!(fw.free(b, 10), Err(Error::NotFound));
    assert_eq!(fw.allocate(0, 8, AllocOption::Any), Err(Error::InvalidParameter));
    assert_eq!(fw.allocate(8, 3, AllocOption::Any), Err(Error::InvalidParameter));
}

#[test]
fn fixed_reservations_reject_overlap() {
    let mut fw = HostedFirmware::builder().build();
    fw.allocate(0x2000, 0x1000, AllocOption::Force(0x10_0000)).unwrap();
    assert_eq!(
        fw.allocate(0x1000, 0x1000, AllocOption::Fixed(0x10_1000)),
        Err(Error::OutOfResources)
    );
    fw.allocate(0x1000, 0x1000, AllocOption::Fixed(0x10_2000)).unwrap();
}

#[test]
fn reallocate_preserves_prefix() {
    let mut fw = HostedFirmware::builder().build();
    let a = fw.allocate(4, 8, AllocOption::Any).unwrap();
    unsafe { core::ptr::copy_nonoverlapping(b"abcd".as_ptr(), a as *mut u8, 4) };

    let b = unsafe { fw.reallocate(a, 4, 64) }.unwrap();
    let grown = unsafe { core::slice::from_raw_parts(b as *const u8, 4) };
    assert_eq!(grown, b"abcd");
    assert_eq!(fw.live_allocations(), 1);
}

#[test]
fn files_are_matched_case_insensitively() {
    let mut fw = HostedFirmware::builder()
        .file("\\EFI\\BOOT\\survey.cfg", b"verbose=1".to_vec())
        .build();
    assert_eq!(fw.load_file("/efi/boot/SURVEY.CFG").unwrap(), b"verbose=1");
    assert_eq!(fw.load_file("/missing"), Err(Error::NotFound));
}

#[test]
fn console_is_captured() {
    let fw = HostedFirmware::builder().build();
    fw.print("<6>one\n").unwrap();
    fw.print("<7>two\n").unwrap();
    assert_eq!(fw.console(), "<6>one\n<7>two\n");
}

#[test]
fn acpi_tables_install_and_uninstall() {
    let mut fw = HostedFirmware::builder().build();
    let key = fw.install_acpi_table(b"SSDT....").unwrap();
    assert_eq!(fw.installed_table(key), Some(&b"SSDT...."[..]));
    fw.uninstall_acpi_table(key).unwrap();
    assert_eq!(fw.installed_table(key), None);
    assert_eq!(fw.uninstall_acpi_table(key), Err(Error::NotFound));
}

#[test]
fn platform_pointers_and_serial() {
    let serial = SerialPortInfo {
        serial_type: SerialType::Ns16550,
        io: IoChannel::port(0x3f8),
        baudrate: SerialPortInfo::BAUDRATE_UNKNOWN,
    };
    let fw = HostedFirmware::builder()
        .rsdp(0xe_0000)
        .smbios3(0xf_0000)
        .serial(serial)
        .bootif("01-aa-bb-cc-dd-ee-ff")
        .build();

    assert_eq!(fw.acpi_rsdp(), Ok(0xe_0000));
    assert_eq!(fw.smbios_eps(), Err(Error::NotFound));
    assert_eq!(fw.smbios_eps3(), Ok(0xf_0000));
    assert_eq!(fw.serial_port(1), Ok(serial));
    assert_eq!(fw.bootif_option().unwrap(), "01-aa-bb-cc-dd-ee-ff");
}

#[test]
fn clock_only_moves_when_advanced() {
    let fw = HostedFirmware::builder().build();
    let t0 = fw.monotonic_time().unwrap();
    fw.advance_time(core::time::Duration::from_millis(1500));
    assert_eq!(fw.monotonic_time().unwrap() - t0, core::time::Duration::from_millis(1500));
}

#[test]
fn mbr_type_codes() {
    assert_eq!(PartitionType::from_mbr(0xee), PartitionType::GptProtective);
    assert_eq!(PartitionType::from_mbr(0x0c), PartitionType::Fat32Lba);
    assert_eq!(PartitionType::from_mbr(0x83), PartitionType::NonFs);
    assert!(PartitionType::from_mbr(0x85).is_extended());
    assert!(PartitionType::Fat16Lt32Mb.is_fat());
    assert!(!PartitionType::Efi.is_fat());
    for code in [0x00, 0x01, 0x04, 0x05, 0x06, 0x0b, 0x0c, 0x0e, 0x0f, 0x85, 0xee, 0xef] {
        assert_eq!(PartitionType::from_mbr(code).mbr_code(), code);
    }
}

#[test]
fn serial_types() {
    assert_eq!(SerialType::try_from(1), Ok(SerialType::Pl011));
    assert_eq!(SerialType::try_from(0xff), Err(Error::Unsupported));
    assert_eq!(IoChannel::mmio(0x900_0000, 4).scaled(5), 20);
    assert_eq!(IoChannel::mmio(0x900_0000, 0).scaled(5), 5);
}

#[test]
fn legacy_com_ports() {
    assert_eq!(SerialPortInfo::legacy_com(1).io, IoChannel::port(0x3f8));
    assert_eq!(SerialPortInfo::legacy_com(4).io, IoChannel::port(0x2e8));
    assert_eq!(SerialPortInfo::legacy_com(0x3e8).io, IoChannel::port(0x3e8));
    assert_eq!(
        SerialPortInfo::legacy_com(2).baudrate,
        SerialPortInfo::BAUDRATE_UNKNOWN
    );
}
