//! # Colors and Pixel Packing

/// Canonical 32-bit color: red in the top byte, then green, blue and alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Rgba(pub u32);

impl Rgba {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const DARK_GRAY: Self = Self::rgb(0x40, 0x40, 0x40);
    pub const GRAY: Self = Self::rgb(0x80, 0x80, 0x80);
    pub const LIGHT_GRAY: Self = Self::rgb(0xb0, 0xb0, 0xb0);
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);
    pub const RED: Self = Self::rgb(0xff, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 0xff, 0);
    pub const BLUE: Self = Self::rgb(0x80, 0xb0, 0xff);
    pub const DARK_BLUE: Self = Self::rgb(0, 0, 0xff);
    pub const YELLOW: Self = Self::rgb(0xff, 0xff, 0);
    pub const MAGENTA: Self = Self::rgb(0xff, 0, 0xff);
    pub const CYAN: Self = Self::rgb(0, 0xff, 0xff);
    pub const ORANGE: Self = Self::rgb(0xff, 0x80, 0);
    pub const PINK: Self = Self::rgb(0xff, 0, 0x80);
    pub const GOLD: Self = Self::rgb(0xff, 0xcc, 0);

    /// Background value that leaves pixels untouched in
    /// [`crate::Framebuffer::print`].
    pub const TRANSPARENT: Self = Self(0xff);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self((r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8)
    }

    #[must_use]
    pub const fn red(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[must_use]
    pub const fn green(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[must_use]
    pub const fn blue(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[must_use]
    pub const fn alpha(self) -> u8 {
        self.0 as u8
    }
}

/// Position and width of each channel inside a native pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelLayout {
    pub red_size: u8,
    pub red_offset: u8,
    pub green_size: u8,
    pub green_offset: u8,
    pub blue_size: u8,
    pub blue_offset: u8,
    pub reserved_size: u8,
    pub reserved_offset: u8,
}

impl PixelLayout {
    /// Bytes R, G, B, X in memory order.
    pub const RGBX8888: Self = Self::from_masks(0x0000_00ff, 0x0000_ff00, 0x00ff_0000, 0);
    /// Bytes B, G, R, X in memory order.
    pub const BGRX8888: Self = Self::from_masks(0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0);

    /// Layout from contiguous channel bit masks.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_masks(red: u32, green: u32, blue: u32, reserved: u32) -> Self {
        const fn offset(mask: u32) -> u8 {
            if mask == 0 { 0 } else { mask.trailing_zeros() as u8 }
        }
        Self {
            red_size: red.count_ones() as u8,
            red_offset: offset(red),
            green_size: green.count_ones() as u8,
            green_offset: offset(green),
            blue_size: blue.count_ones() as u8,
            blue_offset: offset(blue),
            reserved_size: reserved.count_ones() as u8,
            reserved_offset: offset(reserved),
        }
    }

    /// Native pixel for `color`; each channel keeps its `size` most
    /// significant bits.
    #[must_use]
    pub const fn pack(&self, color: Rgba) -> u32 {
        component(color.red(), self.red_size, self.red_offset)
            | component(color.green(), self.green_size, self.green_offset)
            | component(color.blue(), self.blue_size, self.blue_offset)
            | component(color.alpha(), self.reserved_size, self.reserved_offset)
    }
}

const fn component(value: u8, size: u8, offset: u8) -> u32 {
    if size == 0 || offset >= 32 {
        return 0;
    }
    let size = if size > 8 { 8 } else { size };
    ((value as u32) >> (8 - size)) << offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_into_native_order() {
        assert_eq!(PixelLayout::BGRX8888.pack(Rgba::ORANGE), 0x00ff_8000);
        assert_eq!(PixelLayout::RGBX8888.pack(Rgba::ORANGE), 0x0000_80ff);
    }

    #[test]
    fn truncates_to_channel_size() {
        // RGB565
        let layout = PixelLayout::from_masks(0xf800, 0x07e0, 0x001f, 0);
        assert_eq!(layout.red_size, 5);
        assert_eq!(layout.green_offset, 5);
        assert_eq!(layout.pack(Rgba::WHITE), 0xffff);
        assert_eq!(layout.pack(Rgba::rgb(0x80, 0, 0)), 0x8000);
    }
}
