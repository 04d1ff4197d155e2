//! # Boot Volume Files

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use boot_error::{Error, Result};
use log::{debug, warn};
use uefi::proto::media::file::{File, FileAttribute, FileMode, RegularFile};
use uefi::{CString16, boot};

/// Load `path` from the file system the application was loaded from.
///
/// Both `/` and `\` separate components.
///
/// # Errors
/// [`Error::NotFound`] for a missing file, [`Error::InvalidParameter`] for
/// a directory or a path UEFI cannot represent, I/O errors otherwise.
pub fn load_file(path: &str) -> Result<Vec<u8>> {
    let native: String = path.chars().map(|c| if c == '/' { '\\' } else { c }).collect();
    let native = CString16::try_from(native.as_str()).map_err(|_| Error::InvalidParameter)?;

    let mut sfs = boot::get_image_file_system(boot::image_handle()).map_err(|e| {
        warn!("Failed to get file system: {e:?}");
        Error::Unsupported
    })?;
    let mut volume = sfs.open_volume()?;

    let handle = volume.open(&native, FileMode::Read, FileAttribute::empty())?;
    let Some(mut file) = handle.into_regular_file() else {
        warn!("{path}: not a file");
        return Err(Error::InvalidParameter);
    };

    file.set_position(RegularFile::END_OF_FILE)?;
    let size = usize::try_from(file.get_position()?).map_err(|_| Error::OutOfResources)?;
    file.set_position(0)?;

    let mut buf = vec![0u8; size];
    let read = file.read(&mut buf)?;
    if read != size {
        warn!("{path}: read {read} bytes, expected {size} bytes");
        return Err(Error::EndOfFile);
    }

    debug!("{path}: {size} bytes");
    Ok(buf)
}
