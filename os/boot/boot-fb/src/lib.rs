//! # Boot Framebuffer
//!
//! Drawing primitives for a linear framebuffer and a text console that
//! renders the boot log.
//!
//! Colors are given as canonical [`Rgba`] values and packed into the
//! native pixel format described by a [`PixelLayout`]: each channel keeps
//! its `size` most significant bits and moves to its `offset`.
//!
//! ```rust
//! use boot_fb::{FONT_8X16, FbMode, Framebuffer, HAlign, PixelLayout, Rgba};
//!
//! let mode = FbMode {
//!     width: 64,
//!     height: 16,
//!     depth: 32,
//!     bytes_per_scanline: 64 * 4,
//!     layout: PixelLayout::BGRX8888,
//! };
//! let mut fb = Framebuffer::new(vec![0u8; mode.size()], mode).unwrap();
//! fb.print(&FONT_8X16, "ok", 0, 0, 64, Rgba::TRANSPARENT, Rgba::WHITE, HAlign::Center);
//! assert!(fb.bytes().iter().any(|&b| b != 0));
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod color;
mod console;
mod font;
mod framebuffer;

pub use color::{PixelLayout, Rgba};
pub use console::FbConsole;
pub use font::{FONT_8X16, Font, GLYPH_COUNT};
pub use framebuffer::{FbMode, Framebuffer, HAlign};
