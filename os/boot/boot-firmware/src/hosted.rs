//! # In-Memory Firmware
//!
//! A [`Firmware`] that runs on a development host: the boot disk is a byte
//! image, files come from a map, allocations are heap buffers whose host
//! address is handed out as the "physical" address, and the console is
//! captured for inspection.
//!
//! ```rust
//! use boot_firmware::{AllocOption, Firmware, HostedFirmware};
//!
//! let mut fw = HostedFirmware::builder()
//!     .disk(vec![0u8; 4 * 512], 512)
//!     .file("/EFI/BOOT/survey.cfg", b"verbose=1\n".to_vec())
//!     .build();
//!
//! let disk = fw.boot_disk().unwrap();
//! let mut sector = [0u8; 512];
//! fw.disk_read(&disk, &mut sector, 3, 1).unwrap();
//!
//! let addr = fw.allocate(100, 16, AllocOption::Any).unwrap();
//! assert_eq!(addr % 16, 0);
//! fw.free(addr, 100).unwrap();
//! ```

use crate::{AcpiTableKey, AllocOption, Disk, Firmware, SerialPortInfo};
use boot_error::{Error, Result};
use std::collections::BTreeMap;
use std::string::String;
use std::sync::Mutex;
use std::time::Duration;
use std::vec::Vec;

/// Firmware id of the hosted boot disk.
const HOSTED_DISK_ID: u64 = 0x80;

struct Allocation {
    /// Backing storage; `None` for FIXED/FORCE reservations.
    _backing: Option<Vec<u8>>,
    size: usize,
}

/// Builder for [`HostedFirmware`].
#[derive(Default)]
pub struct HostedFirmwareBuilder {
    disk: Option<(Vec<u8>, u32)>,
    files: BTreeMap<String, Vec<u8>>,
    rsdp: Option<u64>,
    smbios: Option<u64>,
    smbios3: Option<u64>,
    serial: Option<SerialPortInfo>,
    bootif: Option<String>,
}

impl HostedFirmwareBuilder {
    /// Use `image` as the boot disk with `bytes_per_sector` sectors.
    #[must_use]
    pub fn disk(mut self, image: Vec<u8>, bytes_per_sector: u32) -> Self {
        self.disk = Some((image, bytes_per_sector));
        self
    }

    #[must_use]
    pub fn file(mut self, path: &str, data: Vec<u8>) -> Self {
        self.files.insert(normalize(path), data);
        self
    }

    #[must_use]
    pub const fn rsdp(mut self, addr: u64) -> Self {
        self.rsdp = Some(addr);
        self
    }

    #[must_use]
    pub const fn smbios(mut self, addr: u64) -> Self {
        self.smbios = Some(addr);
        self
    }

    #[must_use]
    pub const fn smbios3(mut self, addr: u64) -> Self {
        self.smbios3 = Some(addr);
        self
    }

    #[must_use]
    pub const fn serial(mut self, info: SerialPortInfo) -> Self {
        self.serial = Some(info);
        self
    }

    #[must_use]
    pub fn bootif(mut self, mac: &str) -> Self {
        self.bootif = Some(mac.into());
        self
    }

    #[must_use]
    pub fn build(self) -> HostedFirmware {
        let (image, bytes_per_sector) = self.disk.unzip();
        HostedFirmware {
            image,
            disk: bytes_per_sector.map(|bps| Disk::new(HOSTED_DISK_ID, bps)),
            files: self.files,
            allocations: BTreeMap::new(),
            tables: Vec::new(),
            rsdp: self.rsdp,
            smbios: self.smbios,
            smbios3: self.smbios3,
            serial: self.serial,
            bootif: self.bootif,
            console: Mutex::new(String::new()),
            now: Mutex::new(Duration::ZERO),
            sector_reads: 0,
        }
    }
}

/// In-memory [`Firmware`] for host-side tests and tools.
pub struct HostedFirmware {
    image: Option<Vec<u8>>,
    disk: Option<Disk>,
    files: BTreeMap<String, Vec<u8>>,
    allocations: BTreeMap<u64, Allocation>,
    tables: Vec<Option<Vec<u8>>>,
    rsdp: Option<u64>,
    smbios: Option<u64>,
    smbios3: Option<u64>,
    serial: Option<SerialPortInfo>,
    bootif: Option<String>,
    console: Mutex<String>,
    now: Mutex<Duration>,
    sector_reads: u64,
}

impl HostedFirmware {
    #[must_use]
    pub fn builder() -> HostedFirmwareBuilder {
        HostedFirmwareBuilder::default()
    }

    /// Everything written through [`Firmware::print`] so far.
    #[must_use]
    pub fn console(&self) -> String {
        self.console
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Mutable access to the disk image, e.g. to corrupt a sector.
    pub fn image_mut(&mut self) -> Option<&mut Vec<u8>> {
        self.image.as_mut()
    }

    /// Total number of sectors read since creation.
    #[must_use]
    pub const fn sector_reads(&self) -> u64 {
        self.sector_reads
    }

    /// Number of live allocations and reservations.
    #[must_use]
    pub fn live_allocations(&self) -> usize {
        self.allocations.len()
    }

    /// Contents of an installed ACPI table.
    #[must_use]
    pub fn installed_table(&self, key: AcpiTableKey) -> Option<&[u8]> {
        self.tables.get(key.0)?.as_deref()
    }

    /// Move the monotonic clock forward.
    pub fn advance_time(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }

    fn overlaps(&self, start: u64, size: usize) -> bool {
        let end = start.saturating_add(size as u64);
        self.allocations
            .iter()
            .any(|(&base, a)| base < end && start < base.saturating_add(a.size as u64))
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches('/').to_ascii_lowercase()
}

impl Firmware for HostedFirmware {
    fn allocate(&mut self, size: usize, align: usize, option: AllocOption) -> Result<u64> {
        if size == 0 || !align.is_power_of_two() {
            return Err(Error::InvalidParameter);
        }

        // FIXED and FORCE only reserve the range; nothing backs it on a host.
        if let Some(addr) = option.address() {
            if addr % align as u64 != 0 || self.overlaps(addr, size) {
                return Err(Error::OutOfResources);
            }
            self.allocations.insert(
                addr,
                Allocation {
                    _backing: None,
                    size,
                },
            );
            return Ok(addr);
        }

        let mut backing = Vec::new();
        backing
            .try_reserve_exact(size + align)
            .map_err(|_| Error::OutOfResources)?;
        backing.resize(size + align, 0);
        let base = backing.as_ptr() as u64;
        let addr = base.next_multiple_of(align as u64);
        self.allocations.insert(
            addr,
            Allocation {
                _backing: Some(backing),
                size,
            },
        );
        Ok(addr)
    }

    fn free(&mut self, addr: u64, size: usize) -> Result<()> {
        match self.allocations.get(&addr) {
            Some(a) if a.size == size => {
                self.allocations.remove(&addr);
                Ok(())
            }
            Some(_) => Err(Error::InvalidParameter),
            None => Err(Error::NotFound),
        }
    }

    fn disk_read(&mut self, disk: &Disk, buf: &mut [u8], lba: u64, count: usize) -> Result<()> {
        let (Some(image), Some(own)) = (self.image.as_ref(), self.disk.as_ref()) else {
            return Err(Error::NoMedia);
        };
        if disk.firmware_id != own.firmware_id {
            return Err(Error::NotFound);
        }

        let bps = own.sector_size();
        let len = count * bps;
        if buf.len() < len {
            return Err(Error::BadBufferSize);
        }
        let start = usize::try_from(lba)
            .ok()
            .and_then(|lba| lba.checked_mul(bps))
            .ok_or(Error::InvalidParameter)?;
        let src = image
            .get(start..start + len)
            .ok_or(Error::DeviceError)?;
        buf[..len].copy_from_slice(src);
        self.sector_reads += count as u64;
        Ok(())
    }

    fn boot_disk(&mut self) -> Result<Disk> {
        self.disk.ok_or(Error::NotFound)
    }

    fn acpi_rsdp(&self) -> Result<u64> {
        self.rsdp.ok_or(Error::NotFound)
    }

    fn smbios_eps(&self) -> Result<u64> {
        self.smbios.ok_or(Error::NotFound)
    }

    fn smbios_eps3(&self) -> Result<u64> {
        self.smbios3.ok_or(Error::NotFound)
    }

    fn install_acpi_table(&mut self, table: &[u8]) -> Result<AcpiTableKey> {
        if table.len() < 4 {
            return Err(Error::InvalidParameter);
        }
        self.tables.push(Some(table.to_vec()));
        Ok(AcpiTableKey(self.tables.len() - 1))
    }

    fn uninstall_acpi_table(&mut self, key: AcpiTableKey) -> Result<()> {
        self.tables
            .get_mut(key.0)
            .and_then(Option::take)
            .map(drop)
            .ok_or(Error::NotFound)
    }

    fn print(&self, msg: &str) -> Result<()> {
        let mut console = self.console.lock().map_err(|_| Error::DeviceError)?;
        console.push_str(msg);
        Ok(())
    }

    fn serial_port(&self, _com: u32) -> Result<SerialPortInfo> {
        self.serial.ok_or(Error::NotFound)
    }

    fn bootif_option(&self) -> Result<String> {
        self.bootif.clone().ok_or(Error::NotFound)
    }

    fn load_file(&mut self, path: &str) -> Result<Vec<u8>> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn exit_boot_services(&mut self) -> Result<()> {
        if !crate::in_boot_services() {
            return Err(Error::AlreadyStarted);
        }
        crate::set_in_boot_services(false);
        Ok(())
    }

    fn monotonic_time(&self) -> Result<Duration> {
        self.now.lock().map(|now| *now).map_err(|_| Error::DeviceError)
    }
}
