//! The process-wide walker is shared, so everything runs in one test.

use boot_acpi::{
    SdtHeader, acpi_find_sdt, acpi_init, acpi_install_table, acpi_is_present, acpi_shutdown,
    acpi_tables, acpi_uninstall_table, checksum, spcr_serial_port,
};
use boot_error::Error;
use boot_firmware::{HostedFirmware, IoChannel, SerialType};

fn leak(bytes: Vec<u8>) -> u64 {
    Box::leak(bytes.into_boxed_slice()).as_ptr() as u64
}

fn table(signature: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut t = vec![0u8; SdtHeader::SIZE];
    t[..4].copy_from_slice(signature);
    t[4..8].copy_from_slice(&u32::try_from(SdtHeader::SIZE + body.len()).unwrap().to_le_bytes());
    t.extend_from_slice(body);
    t[9] = 0u8.wrapping_sub(checksum(&t));
    t
}

fn spcr_body() -> Vec<u8> {
    let mut body = vec![0u8; 44];
    body[0] = 0x03; // PL011
    body[5] = 32;
    body[8..16].copy_from_slice(&0x0900_0000u64.to_le_bytes());
    body[22] = 7;
    body
}

fn xsdp(xsdt: u64) -> u64 {
    let mut r = vec![0u8; 36];
    r[..8].copy_from_slice(b"RSD PTR ");
    r[15] = 2;
    r[20..24].copy_from_slice(&36u32.to_le_bytes());
    r[24..32].copy_from_slice(&xsdt.to_le_bytes());
    r[8] = 0u8.wrapping_sub(checksum(&r[..20]));
    r[32] = 0u8.wrapping_sub(checksum(&r));
    leak(r)
}

#[test]
fn acpi_lifecycle() {
    let no_acpi = HostedFirmware::builder().build();
    assert!(!acpi_is_present(&no_acpi));
    assert_eq!(unsafe { acpi_init(&no_acpi) }, Err(Error::NotFound));
    assert!(acpi_tables().is_none());
    assert!(acpi_find_sdt(b"SPCR").is_none());
    assert_eq!(spcr_serial_port(), Err(Error::NotFound));

    let spcr = leak(table(b"SPCR", &spcr_body()));
    let xsdt = leak(table(b"XSDT", &spcr.to_le_bytes()));
    let mut fw = HostedFirmware::builder().rsdp(xsdp(xsdt)).build();
    assert!(acpi_is_present(&fw));

    unsafe { acpi_init(&fw) }.unwrap();
    assert_eq!(acpi_tables().map(|t| t.entry_size()), Some(8));
    assert_eq!(acpi_find_sdt(b"SPCR").map(|sdt| sdt.addr), Some(spcr));

    let port = spcr_serial_port().unwrap();
    assert_eq!(port.serial_type, SerialType::Pl011);
    assert_eq!(port.io, IoChannel::mmio(0x0900_0000, 1));
    assert_eq!(port.baudrate, 115_200);

    let dmar = table(b"DMAR", &[0; 12]);
    let key = acpi_install_table(&mut fw, &dmar).unwrap();
    assert_eq!(fw.installed_table(key), Some(&dmar[..]));
    acpi_uninstall_table(&mut fw, key).unwrap();
    assert_eq!(fw.installed_table(key), None);
    assert_eq!(acpi_uninstall_table(&mut fw, key), Err(Error::NotFound));

    acpi_shutdown();
    assert!(acpi_find_sdt(b"SPCR").is_none());
}
