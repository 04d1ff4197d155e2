//! # GOP Framebuffer

use boot_error::{Error, Result};
use boot_fb::{FbMode, Framebuffer, PixelLayout};
use log::{debug, warn};
use uefi::boot;
use uefi::proto::console::gop::{GraphicsOutput, PixelFormat};

/// The linear framebuffer of the current GOP mode.
///
/// The protocol is opened exclusively, which detaches the firmware's
/// graphical text console; the framebuffer itself stays valid.
///
/// # Errors
/// [`Error::NotFound`] without a GOP, [`Error::Unsupported`] for modes
/// without a linear framebuffer.
pub fn gop_framebuffer() -> Result<Framebuffer<&'static mut [u8]>> {
    let handle = boot::get_handle_for_protocol::<GraphicsOutput>().map_err(|_| Error::NotFound)?;
    let mut gop = boot::open_protocol_exclusive::<GraphicsOutput>(handle)?;

    let info = gop.current_mode_info();
    let (width, height) = info.resolution();
    let layout = match info.pixel_format() {
        PixelFormat::Rgb => PixelLayout::RGBX8888,
        PixelFormat::Bgr => PixelLayout::BGRX8888,
        PixelFormat::Bitmask => {
            let Some(mask) = info.pixel_bitmask() else {
                return Err(Error::Unsupported);
            };
            PixelLayout::from_masks(mask.red, mask.green, mask.blue, mask.reserved)
        }
        PixelFormat::BltOnly => {
            warn!("GOP mode has no framebuffer");
            return Err(Error::Unsupported);
        }
    };

    let mode = FbMode {
        width: u32::try_from(width).map_err(|_| Error::Unsupported)?,
        height: u32::try_from(height).map_err(|_| Error::Unsupported)?,
        depth: 32,
        bytes_per_scanline: u32::try_from(info.stride() * 4).map_err(|_| Error::Unsupported)?,
        layout,
    };
    let base = gop.frame_buffer().as_mut_ptr() as u64;
    debug!("GOP: {width}x{height} at {base:#x}, stride {}", info.stride());

    // Safety: GOP framebuffers are identity mapped and cover
    // `stride * height` pixels for the current mode.
    unsafe { Framebuffer::from_raw(base, mode) }
}
