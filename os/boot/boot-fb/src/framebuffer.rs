//! # Linear Framebuffer

use crate::{Font, PixelLayout, Rgba};
use boot_error::{Error, Result};

/// Video mode of a linear framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FbMode {
    /// Horizontal resolution in pixels.
    pub width: u32,
    /// Vertical resolution in pixels.
    pub height: u32,
    /// Bits per pixel.
    pub depth: u32,
    pub bytes_per_scanline: u32,
    pub layout: PixelLayout,
}

impl FbMode {
    #[must_use]
    pub const fn bytes_per_pixel(&self) -> usize {
        (self.depth / 8) as usize
    }

    /// Total size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.height as usize * self.bytes_per_scanline as usize
    }
}

/// Horizontal placement for [`Framebuffer::print`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Drawing surface over the pixel memory `B`.
pub struct Framebuffer<B> {
    pixels: B,
    mode: FbMode,
}

impl Framebuffer<&'static mut [u8]> {
    /// Framebuffer over firmware-provided video memory.
    ///
    /// # Errors
    /// See [`Framebuffer::new`].
    ///
    /// # Safety
    /// `base` must point to `mode.size()` bytes of video memory that stay
    /// mapped and are not accessed through any other path.
    pub unsafe fn from_raw(base: u64, mode: FbMode) -> Result<Self> {
        let pixels = unsafe { core::slice::from_raw_parts_mut(base as *mut u8, mode.size()) };
        Self::new(pixels, mode)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Framebuffer<B> {
    /// Validate the mode and clear the screen.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] for a depth that is not a whole number
    /// of bytes up to 32 bits, or scanlines shorter than a row;
    /// [`Error::BadBufferSize`] if `pixels` cannot hold the mode.
    pub fn new(pixels: B, mode: FbMode) -> Result<Self> {
        if mode.depth == 0 || mode.depth % 8 != 0 || mode.depth > 32 {
            return Err(Error::InvalidParameter);
        }
        if mode.width as usize * mode.bytes_per_pixel() > mode.bytes_per_scanline as usize {
            return Err(Error::InvalidParameter);
        }
        if pixels.as_ref().len() < mode.size() {
            return Err(Error::BadBufferSize);
        }

        let mut fb = Self { pixels, mode };
        fb.clear();
        Ok(fb)
    }

    pub const fn mode(&self) -> &FbMode {
        &self.mode
    }

    pub fn bytes(&self) -> &[u8] {
        &self.pixels.as_ref()[..self.mode.size()]
    }

    pub fn into_inner(self) -> B {
        self.pixels
    }

    /// Native value of pixel (`x`, `y`).
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.mode.width || y >= self.mode.height {
            return None;
        }
        let at = self.offset(x as usize, y as usize);
        let mut bytes = [0u8; 4];
        let bpp = self.mode.bytes_per_pixel();
        bytes[..bpp].copy_from_slice(&self.bytes()[at..at + bpp]);
        Some(u32::from_le_bytes(bytes))
    }

    /// Zero the whole framebuffer.
    pub fn clear(&mut self) {
        let size = self.mode.size();
        self.pixels.as_mut()[..size].fill(0);
    }

    const fn offset(&self, x: usize, y: usize) -> usize {
        y * self.mode.bytes_per_scanline as usize + x * self.mode.bytes_per_pixel()
    }

    fn set_pixel(&mut self, x: usize, y: usize, native: u32) {
        let at = self.offset(x, y);
        let bpp = self.mode.bytes_per_pixel();
        self.pixels.as_mut()[at..at + bpp].copy_from_slice(&native.to_le_bytes()[..bpp]);
    }

    /// Visible part of a rectangle as `(x, y, width, height)`.
    fn crop(&self, x: i32, y: i32, width: u32, height: u32) -> Option<(usize, usize, usize, usize)> {
        let x0 = i64::from(x).max(0);
        let y0 = i64::from(y).max(0);
        let x1 = (i64::from(x) + i64::from(width)).min(i64::from(self.mode.width));
        let y1 = (i64::from(y) + i64::from(height)).min(i64::from(self.mode.height));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((
            usize::try_from(x0).ok()?,
            usize::try_from(y0).ok()?,
            usize::try_from(x1 - x0).ok()?,
            usize::try_from(y1 - y0).ok()?,
        ))
    }

    /// Fill a rectangle; only the visible part is drawn.
    pub fn draw_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba) {
        let Some((x, y, width, height)) = self.crop(x, y, width, height) else {
            return;
        };
        let native = self.mode.layout.pack(color);
        for row in y..y + height {
            for col in x..x + width {
                self.set_pixel(col, row, native);
            }
        }
    }

    /// Draw the set pixels of glyph `c` with its top-left corner at
    /// (`x`, `y`).
    pub fn draw_char(&mut self, font: &Font, c: u8, x: i32, y: i32, color: Rgba) {
        let native = self.mode.layout.pack(color);
        for row in 0..font.height() {
            for col in 0..font.width() {
                if !font.is_set(c, col, row) {
                    continue;
                }
                let px = usize::try_from(i64::from(x) + i64::from(col));
                let py = usize::try_from(i64::from(y) + i64::from(row));
                match (px, py) {
                    (Ok(px), Ok(py))
                        if px < self.mode.width as usize && py < self.mode.height as usize =>
                    {
                        self.set_pixel(px, py, native);
                    }
                    _ => {}
                }
            }
        }
    }

    /// Print one line of text into a `width` pixel wide window.
    ///
    /// Non-printable characters are skipped and the text is truncated to
    /// the window. The background is left alone when `bg` is
    /// [`Rgba::TRANSPARENT`].
    #[allow(clippy::too_many_arguments)]
    pub fn print(
        &mut self,
        font: &Font,
        text: &str,
        x: i32,
        y: i32,
        width: u32,
        bg: Rgba,
        fg: Rgba,
        align: HAlign,
    ) {
        if bg != Rgba::TRANSPARENT {
            self.draw_rect(x, y, width, font.height(), bg);
        }
        if width < font.width() {
            return;
        }

        let fits = width / font.width();
        let visible = || text.bytes().filter(|c| is_print(*c));
        let len = u32::try_from(visible().count()).unwrap_or(u32::MAX).min(fits);
        let slack = width - font.text_width(len);
        let offset = match align {
            HAlign::Left => 0,
            HAlign::Center => slack / 2,
            HAlign::Right => slack,
        };

        let mut cx = i64::from(x) + i64::from(offset);
        for c in visible().take(len as usize) {
            if let Ok(px) = i32::try_from(cx) {
                self.draw_char(font, c, px, y, fg);
            }
            cx += i64::from(font.width());
        }
    }

    /// Move the contents up by `lines` scanlines and clear the bottom.
    pub fn scroll_up(&mut self, lines: u32) {
        let total = self.mode.size();
        let shift = (lines as usize)
            .saturating_mul(self.mode.bytes_per_scanline as usize)
            .min(total);
        let pixels = &mut self.pixels.as_mut()[..total];
        pixels.copy_within(shift.., 0);
        pixels[total - shift..].fill(0);
    }
}

/// Printable ASCII, space included.
pub(crate) const fn is_print(c: u8) -> bool {
    matches!(c, b' '..=b'~')
}
