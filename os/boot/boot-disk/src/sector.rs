use alloc::vec::Vec;
use boot_error::{Error, Result};
use boot_firmware::{Disk, Firmware};

/// Zeroed buffer of `len` bytes, or [`Error::OutOfResources`].
pub fn buffer(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::OutOfResources)?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Read `count` sectors starting at `lba` into a fresh buffer.
pub fn read(fw: &mut impl Firmware, disk: &Disk, lba: u64, count: usize) -> Result<Vec<u8>> {
    let len = count
        .checked_mul(disk.sector_size())
        .ok_or(Error::OutOfResources)?;
    let mut buf = buffer(len)?;
    fw.disk_read(disk, &mut buf, lba, count)?;
    Ok(buf)
}
