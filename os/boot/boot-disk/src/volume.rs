use crate::{gpt, mbr, sector};
use boot_error::{Error, Result};
use boot_firmware::{Disk, Firmware, Partition};
use log::debug;

/// Sector 0 and whether its first entry marks a GPT disk.
fn read_mbr(fw: &mut impl Firmware, disk: &Disk) -> Result<(alloc::vec::Vec<u8>, bool)> {
    let mbr = sector::read(fw, disk, 0, 1)?;
    let protective = mbr::MbrEntry::read(&mbr, 1).is_some_and(|e| e.is_protective());
    Ok((mbr, protective))
}

/// Volume `id` of `disk`: from the GPT when sector 0 is a protective MBR
/// and the GPT is valid, else from the MBR.
///
/// # Errors
/// [`Error::InvalidParameter`] for id 0; otherwise see
/// [`gpt::gpt_get_part_info`] and [`mbr::mbr_get_part_info`].
pub fn get_volume_info(fw: &mut impl Firmware, disk: &Disk, id: u32) -> Result<Partition> {
    if id == 0 {
        return Err(Error::InvalidParameter);
    }

    let (mbr, protective) = read_mbr(fw, disk)?;
    if protective {
        match gpt::gpt_get_part_info(fw, disk, id) {
            Err(Error::NotFound) => debug!("No usable GPT for volume {id}, trying MBR"),
            other => return other,
        }
    }
    mbr::mbr_get_part_info(fw, disk, &mbr, id)
}

/// Highest volume number of `disk`.
///
/// # Errors
/// Disk errors reading sector 0, or GPT errors other than
/// [`Error::NotFound`].
pub fn get_max_volume(fw: &mut impl Firmware, disk: &Disk) -> Result<u32> {
    let (mbr, protective) = read_mbr(fw, disk)?;
    if protective {
        match gpt::gpt_get_max_part(fw, disk) {
            Err(Error::NotFound) => {}
            other => return other,
        }
    }
    Ok(mbr::mbr_get_max_part(fw, disk, &mbr))
}

/// Fill `dest` from byte `offset` of `partition`.
///
/// The disk is read in whole sectors; an unaligned range goes through a
/// bounce buffer covering the aligned span.
///
/// # Errors
/// [`Error::InvalidParameter`] if the range leaves the partition,
/// [`Error::OutOfResources`] if the bounce buffer cannot be allocated,
/// disk errors verbatim.
pub fn volume_read(
    fw: &mut impl Firmware,
    disk: &Disk,
    partition: &Partition,
    dest: &mut [u8],
    offset: u64,
) -> Result<()> {
    if dest.is_empty() {
        return Ok(());
    }

    let sector_size = u64::from(disk.bytes_per_sector);
    if sector_size == 0 {
        return Err(Error::InvalidParameter);
    }
    let size = dest.len() as u64;
    let end = offset.checked_add(size).ok_or(Error::InvalidParameter)?;

    let start = offset - offset % sector_size;
    let bytes = end
        .checked_next_multiple_of(sector_size)
        .ok_or(Error::InvalidParameter)?
        - start;
    let first_sector = partition
        .start_lba
        .checked_add(start / sector_size)
        .ok_or(Error::InvalidParameter)?;
    let count = bytes / sector_size;
    let last = first_sector.checked_add(count).ok_or(Error::InvalidParameter)?;
    if last > partition.end_lba() {
        return Err(Error::InvalidParameter);
    }
    let count = usize::try_from(count).map_err(|_| Error::InvalidParameter)?;

    if bytes == size {
        return fw.disk_read(disk, dest, first_sector, count);
    }

    let bounce = sector::read(fw, disk, first_sector, count)?;
    let skip = usize::try_from(offset - start).map_err(|_| Error::InvalidParameter)?;
    dest.copy_from_slice(&bounce[skip..skip + dest.len()]);
    Ok(())
}

/// [`volume_read`] on volume `id` of the boot disk.
///
/// # Errors
/// See [`Firmware::boot_disk`], [`get_volume_info`] and [`volume_read`].
pub fn boot_volume_read(fw: &mut impl Firmware, id: u32, dest: &mut [u8], offset: u64) -> Result<()> {
    let disk = fw.boot_disk()?;
    let partition = get_volume_info(fw, &disk, id)?;
    volume_read(fw, &disk, &partition, dest, offset)
}
