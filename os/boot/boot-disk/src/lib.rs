//! # Partitions and Volumes
//!
//! Volumes are numbered the way the boot loaders have always numbered
//! them: 1 to 4 are the MBR primary entries, 5 and up the logical
//! partitions of the (single) extended partition. On a GPT disk, volume
//! `n` is entry `n` of the partition entry array.
//!
//! ```text
//! sector 0 (MBR)
//!   entry 1 protective (0xEE, start 1, not bootable)?
//!     yes -> GPT at LBA 1 (header CRC32, entry array CRC32)
//!              valid   -> answer from GPT
//!              invalid -> answer from MBR
//!     no  -> answer from MBR (primary entries, EBR chain)
//! ```
//!
//! All reads go through [`Firmware::disk_read`](boot_firmware::Firmware::disk_read)
//! in whole sectors; [`volume_read`] is the only byte-granular entry point.

#![cfg_attr(not(any(test, doctest)), no_std)]

extern crate alloc;

pub mod gpt;
pub mod mbr;
mod sector;
mod volume;

pub use gpt::{GptHeader, gpt_get_max_part, gpt_get_part_info};
pub use mbr::{MbrEntry, mbr_get_max_part, mbr_get_part_info};
pub use volume::{boot_volume_read, get_max_volume, get_volume_info, volume_read};
