//! # Platform Survey
//!
//! Exercises every boot library against the running firmware and logs
//! what it finds. Failures are reported and the next step runs anyway.

use crate::config::SurveyConfig;
use boot_acpi::{IdentityMap, Spcr, acpi_find_sdt, acpi_init, acpi_shutdown, acpi_tables};
use boot_disk::{get_max_volume, get_volume_info};
use boot_error::{Error, Result};
use boot_firmware::{Firmware, atexit};
use boot_smbios::{smbios_get_info, smbios_get_platform_info, smbios_get_v3_info};
use log::{debug, info, warn};

pub fn run(fw: &mut impl Firmware, config: &SurveyConfig) {
    report("ACPI", survey_acpi());
    report("SMBIOS", survey_smbios(fw));
    report("boot disk", survey_disk(fw));
    if config.bootif {
        report("BOOTIF", survey_bootif(fw));
    }
    report("log buffer", survey_log_buffer());

    match fw.monotonic_time() {
        Ok(t) => info!("survey finished at {}.{:03}s", t.as_secs(), t.subsec_millis()),
        Err(e) => debug!("no monotonic time: {e}"),
    }
}

fn report(step: &str, result: Result<()>) {
    if let Err(e) = result {
        warn!("{step}: {e}");
    }
}

/// Install the ACPI walker; serial port discovery needs SPCR on ARM.
///
/// # Errors
/// [`boot_error::Error::NotFound`] without ACPI, table errors otherwise.
pub fn init_acpi(fw: &impl Firmware) -> Result<()> {
    // Safety: UEFI identity maps every ACPI table and keeps it in ACPI
    // reclaim memory; acpi_shutdown runs at exit.
    unsafe { acpi_init(fw) }?;
    atexit(acpi_shutdown)
}

fn survey_acpi() -> Result<()> {
    let tables = acpi_tables().ok_or(Error::NotFound)?;
    info!(
        "ACPI: {} entries in the {} at {:#x}",
        tables.len(),
        if tables.entry_size() == 8 { "XSDT" } else { "RSDT" },
        tables.root()
    );
    // Safety: the tables were validated by init_acpi and stay mapped.
    for sdt in unsafe { tables.tables(&IdentityMap) } {
        let h = &sdt.header;
        info!(
            "  {} @ {:#x} len {:#x} rev {} oem {} {}",
            h.signature.escape_ascii(),
            sdt.addr,
            h.length,
            h.revision,
            h.oem_id.escape_ascii(),
            h.oem_table_id.escape_ascii()
        );
    }

    if let Some(sdt) = acpi_find_sdt(b"SPCR") {
        // Safety: as above.
        let spcr = Spcr::parse(unsafe { sdt.bytes(&IdentityMap) })?;
        match spcr.serial_port() {
            Ok(port) => info!(
                "SPCR: {:?} at {:?}, {} baud",
                port.serial_type, port.io, port.baudrate
            ),
            Err(e) => info!("SPCR: unusable console ({e})"),
        }
    }
    Ok(())
}

fn survey_smbios(fw: &impl Firmware) -> Result<()> {
    // Safety: UEFI identity maps the SMBIOS entry points and tables.
    unsafe {
        for (name, info) in [("2.x", smbios_get_info(fw)), ("3.x", smbios_get_v3_info(fw))] {
            match info {
                Ok(info) => info!(
                    "SMBIOS {name}: EPS @ {:#x} ({} bytes), table @ {:#x} ({} bytes)",
                    info.eps_addr, info.eps_len, info.table_addr, info.table_len
                ),
                Err(e) => debug!("SMBIOS {name}: {e}"),
            }
        }

        let platform = smbios_get_platform_info(fw)?;
        info!(
            "Platform: {} {} ({}), BIOS {} {} {}",
            platform.manufacturer.unwrap_or("?"),
            platform.product.unwrap_or("?"),
            platform.version.unwrap_or("?"),
            platform.bios_vendor.unwrap_or("?"),
            platform.bios_version.unwrap_or("?"),
            platform.bios_date.unwrap_or("?"),
        );
    }
    Ok(())
}

fn survey_disk(fw: &mut impl Firmware) -> Result<()> {
    let disk = fw.boot_disk()?;
    let max = get_max_volume(fw, &disk)?;
    info!(
        "Boot disk {}: {} bytes per sector, {max} volumes",
        disk.firmware_id, disk.bytes_per_sector
    );

    for id in 1..=max {
        match get_volume_info(fw, &disk, id) {
            Ok(part) => info!(
                "  volume {id}: {:?} (type {:#04x}), LBA {}..{}",
                part.kind,
                part.type_code,
                part.start_lba,
                part.end_lba()
            ),
            Err(e) => debug!("  volume {id}: {e}"),
        }
    }
    Ok(())
}

fn survey_bootif(fw: &impl Firmware) -> Result<()> {
    let bootif = fw.bootif_option()?;
    info!("BOOTIF={bootif}");
    Ok(())
}

fn survey_log_buffer() -> Result<()> {
    let buffer = boot_log::log_buffer_info()?;
    info!(
        "Log buffer @ {:#x}: {} of {} bytes used",
        buffer.addr, buffer.used, buffer.capacity
    );
    Ok(())
}
