//! # UEFI Firmware Services
//!
//! [`UefiFirmware`] backs the [`Firmware`] trait with boot services:
//! page allocations, Block I/O, the configuration table and the text
//! console. It must not be used for anything but
//! [`Firmware::in_boot_services`] after [`Firmware::exit_boot_services`].

use crate::acpi_table::AcpiTableProtocol;
use crate::console::firmware_print;
use crate::file_system::load_file;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use boot_cpu::Clock;
use boot_error::{Error, Result};
use boot_firmware::{AcpiTableKey, AllocOption, Disk, Firmware, PAGE_SIZE, SerialPortInfo};
use core::ptr::NonNull;
use core::time::Duration;
use log::{debug, info, warn};
use uefi::boot::{self, AllocateType, MemoryType, OpenProtocolAttributes, OpenProtocolParams, ScopedProtocol};
use uefi::mem::memory_map::MemoryMapOwned;
use uefi::proto::ProtocolPointer;
use uefi::proto::device_path::{DevicePath, DeviceSubType, DeviceType};
use uefi::proto::loaded_image::LoadedImage;
use uefi::proto::media::block::BlockIO;
use uefi::table::cfg::{ACPI_GUID, ACPI2_GUID, SMBIOS_GUID, SMBIOS3_GUID};
use uefi::{Guid, Handle};

/// Pages handed out by [`UefiFirmware::allocate`], keyed by the address
/// returned to the caller.
#[derive(Debug, Clone, Copy)]
struct PageRun {
    base: u64,
    pages: usize,
}

pub struct UefiFirmware {
    clock: &'static (dyn Clock + Sync),
    allocations: BTreeMap<u64, PageRun>,
    /// Block I/O handles; a [`Disk::firmware_id`] indexes this list.
    disks: Vec<Handle>,
    /// The final memory map, kept alive after boot services end.
    memory_map: Option<MemoryMapOwned>,
}

impl UefiFirmware {
    #[must_use]
    pub fn new(clock: &'static (dyn Clock + Sync)) -> Self {
        Self {
            clock,
            allocations: BTreeMap::new(),
            disks: Vec::new(),
            memory_map: None,
        }
    }

    fn disk_handle(&self, disk: &Disk) -> Result<Handle> {
        usize::try_from(disk.firmware_id)
            .ok()
            .and_then(|index| self.disks.get(index).copied())
            .ok_or(Error::InvalidParameter)
    }

    fn register_disk(&mut self, handle: Handle) -> u64 {
        let index = self
            .disks
            .iter()
            .position(|&h| h == handle)
            .unwrap_or_else(|| {
                self.disks.push(handle);
                self.disks.len() - 1
            });
        index as u64
    }
}

/// Open `P` on `handle` without taking ownership of it.
fn get_protocol<P: ProtocolPointer + ?Sized>(handle: Handle) -> uefi::Result<ScopedProtocol<P>> {
    // Safety: GetProtocol does not disconnect drivers, and every caller
    // drops the protocol before it could be uninstalled.
    unsafe {
        boot::open_protocol::<P>(
            OpenProtocolParams {
                handle,
                agent: boot::image_handle(),
                controller: None,
            },
            OpenProtocolAttributes::GetProtocol,
        )
    }
}

/// The device the running image was loaded from.
fn boot_device() -> Result<Handle> {
    let image = get_protocol::<LoadedImage>(boot::image_handle())?;
    image.device().ok_or(Error::NotFound)
}

fn config_table(guid: Guid) -> Option<u64> {
    uefi::system::with_config_table(|tables| {
        tables
            .iter()
            .find(|entry| entry.guid == guid)
            .map(|entry| entry.address as u64)
    })
}

/// Whether `prefix`, without its end node, leads `path`.
fn is_path_prefix(prefix: &DevicePath, path: &DevicePath) -> bool {
    let mut nodes = path.node_iter();
    prefix.node_iter().all(|p| {
        nodes.next().is_some_and(|n| {
            n.device_type() == p.device_type() && n.sub_type() == p.sub_type() && n.data() == p.data()
        })
    })
}

/// `xx-aa-bb-cc-dd-ee-ff` from the first MAC node of `path`.
fn bootif_from_path(path: &DevicePath) -> Option<String> {
    const MAC_LEN: usize = 6;
    const IF_TYPE: usize = 32;

    let node = path.node_iter().find(|n| {
        n.device_type() == DeviceType::MESSAGING && n.sub_type() == DeviceSubType::MESSAGING_MAC_ADDRESS
    })?;
    let data = node.data();
    let if_type = *data.get(IF_TYPE)?;
    let mut bootif = format!("{if_type:02x}");
    for byte in data.get(..MAC_LEN)? {
        bootif.push_str(&format!("-{byte:02x}"));
    }
    Some(bootif)
}

impl Firmware for UefiFirmware {
    fn allocate(&mut self, size: usize, align: usize, option: AllocOption) -> Result<u64> {
        if size == 0 || !align.is_power_of_two() {
            return Err(Error::InvalidParameter);
        }

        let (kind, memory_type, slack) = match option {
            AllocOption::Any => (AllocateType::AnyPages, MemoryType::LOADER_DATA, align),
            AllocOption::Below4G => (
                AllocateType::MaxAddress(option.limit() - 1),
                MemoryType::LOADER_DATA,
                align,
            ),
            AllocOption::Fixed(addr) | AllocOption::Force(addr) => {
                if addr % (align.max(PAGE_SIZE) as u64) != 0 {
                    return Err(Error::InvalidParameter);
                }
                let memory_type = if matches!(option, AllocOption::Force(_)) {
                    MemoryType::RESERVED
                } else {
                    MemoryType::LOADER_DATA
                };
                (AllocateType::Address(addr), memory_type, PAGE_SIZE)
            }
        };

        // Page allocations are page aligned; larger alignments are carved
        // out of a longer run.
        let extra = slack.saturating_sub(PAGE_SIZE);
        let pages = size
            .checked_add(extra)
            .ok_or(Error::OutOfResources)?
            .div_ceil(PAGE_SIZE);
        let base = boot::allocate_pages(kind, memory_type, pages)
            .map_err(|e| match e.status() {
                uefi::Status::NOT_FOUND | uefi::Status::OUT_OF_RESOURCES => Error::OutOfResources,
                _ => Error::from(e),
            })?
            .as_ptr() as u64;
        let addr = base.next_multiple_of(align as u64);

        self.allocations.insert(addr, PageRun { base, pages });
        Ok(addr)
    }

    fn free(&mut self, addr: u64, _size: usize) -> Result<()> {
        let run = self.allocations.remove(&addr).ok_or(Error::NotFound)?;
        let Some(base) = NonNull::new(run.base as *mut u8) else {
            return Err(Error::InvalidParameter);
        };
        // Safety: the run came from allocate_pages and is released once.
        unsafe { boot::free_pages(base, run.pages) }?;
        Ok(())
    }

    fn disk_read(&mut self, disk: &Disk, buf: &mut [u8], lba: u64, count: usize) -> Result<()> {
        let len = count
            .checked_mul(disk.sector_size())
            .ok_or(Error::InvalidParameter)?;
        if buf.len() < len {
            return Err(Error::BadBufferSize);
        }
        if len == 0 {
            return Ok(());
        }

        let handle = self.disk_handle(disk)?;
        let block_io = get_protocol::<BlockIO>(handle)?;
        let media_id = block_io.media().media_id();
        block_io.read_blocks(media_id, lba, &mut buf[..len])?;
        Ok(())
    }

    fn boot_disk(&mut self) -> Result<Disk> {
        let device = boot_device()?;
        let device_path = get_protocol::<DevicePath>(device)?;

        // The whole disk whose device path leads the boot partition's.
        for handle in boot::find_handles::<BlockIO>()? {
            let Ok(block_io) = get_protocol::<BlockIO>(handle) else {
                continue;
            };
            let media = block_io.media();
            if media.is_logical_partition() || !media.is_media_present() {
                continue;
            }
            let Ok(path) = get_protocol::<DevicePath>(handle) else {
                continue;
            };
            if is_path_prefix(&path, &device_path) {
                let bytes_per_sector = media.block_size();
                let id = self.register_disk(handle);
                debug!("boot disk: id {id}, {bytes_per_sector} bytes per sector");
                return Ok(Disk::new(id, bytes_per_sector));
            }
        }

        // Loaded from a raw block device without a partition table.
        let block_io = get_protocol::<BlockIO>(device).map_err(|_| Error::NotFound)?;
        let bytes_per_sector = block_io.media().block_size();
        Ok(Disk::new(self.register_disk(device), bytes_per_sector))
    }

    fn acpi_rsdp(&self) -> Result<u64> {
        config_table(ACPI2_GUID)
            .or_else(|| config_table(ACPI_GUID))
            .ok_or(Error::NotFound)
    }

    fn smbios_eps(&self) -> Result<u64> {
        config_table(SMBIOS_GUID).ok_or(Error::NotFound)
    }

    fn smbios_eps3(&self) -> Result<u64> {
        config_table(SMBIOS3_GUID).ok_or(Error::NotFound)
    }

    fn install_acpi_table(&mut self, table: &[u8]) -> Result<AcpiTableKey> {
        let handle = boot::get_handle_for_protocol::<AcpiTableProtocol>().map_err(|_| Error::Unsupported)?;
        let protocol = get_protocol::<AcpiTableProtocol>(handle)?;
        let key = protocol.install(table)?;
        debug!("installed ACPI table {}, key {key}", table.get(..4).unwrap_or_default().escape_ascii());
        Ok(AcpiTableKey(key))
    }

    fn uninstall_acpi_table(&mut self, key: AcpiTableKey) -> Result<()> {
        let handle = boot::get_handle_for_protocol::<AcpiTableProtocol>().map_err(|_| Error::Unsupported)?;
        let protocol = get_protocol::<AcpiTableProtocol>(handle)?;
        protocol.uninstall(key.0)?;
        Ok(())
    }

    fn print(&self, msg: &str) -> Result<()> {
        firmware_print(msg)
    }

    #[cfg(target_arch = "x86_64")]
    fn serial_port(&self, com: u32) -> Result<SerialPortInfo> {
        Ok(SerialPortInfo::legacy_com(com))
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn serial_port(&self, _com: u32) -> Result<SerialPortInfo> {
        boot_acpi::spcr_serial_port()
    }

    fn bootif_option(&self) -> Result<String> {
        let device = boot_device()?;
        let path = get_protocol::<DevicePath>(device)?;
        bootif_from_path(&path).ok_or(Error::NotFound)
    }

    fn load_file(&mut self, path: &str) -> Result<Vec<u8>> {
        load_file(path)
    }

    fn exit_boot_services(&mut self) -> Result<()> {
        if !boot_firmware::in_boot_services() {
            return Err(Error::AlreadyStarted);
        }

        info!("Exiting boot services ...");
        boot_log::log_unsubscribe_firmware();
        boot_firmware::set_in_boot_services(false);

        // Safety: nothing opened through boot services outlives this call;
        // the allocator stops using the pool once the flag is cleared.
        self.memory_map = Some(unsafe { boot::exit_boot_services(None) });
        self.allocations.clear();
        self.disks.clear();
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn monotonic_time(&self) -> Result<Duration> {
        let hz = self.clock.frequency();
        if hz == 0 {
            warn!("no calibrated clock");
            return Err(Error::Unsupported);
        }
        let ticks = self.clock.ticks();
        let secs = ticks / hz;
        let nanos = (u128::from(ticks % hz) * 1_000_000_000 / u128::from(hz)) as u32;
        Ok(Duration::new(secs, nanos))
    }
}

