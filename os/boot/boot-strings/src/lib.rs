//! # Boot Strings
//!
//! Path, command line and configuration helpers for boot applications.
//! Whitespace means the C locale set: space, `\t`, `\n`, `\v`, `\f`, `\r`.
//!
//! ```rust
//! use boot_strings::{argv_to_str, make_path, str_to_argv};
//!
//! assert_eq!(make_path("/EFI/BOOT/", "..\\\\survey.cfg").unwrap(), "/EFI/BOOT/../survey.cfg");
//! assert_eq!(make_path("/ignored", "http://host//a").unwrap(), "http://host/a");
//!
//! let argv = str_to_argv("kernel.gz  'quiet  splash' -- x", false).unwrap();
//! assert_eq!(argv, ["kernel.gz", "quiet  splash", "--", "x"]);
//! assert_eq!(argv_to_str(&argv), "kernel.gz quiet  splash -- x");
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

extern crate alloc;

mod argv;
pub mod config;
mod path;
mod text;

pub use argv::{argv_to_str, str_to_argv};
pub use config::{ConfigOption, ConfigValue, parse_config, parse_config_file};
pub use path::{is_absolute, make_path, sanitize_path};
pub use text::{delete_char, insert_char, is_number, is_space, mem_strcasestr, str_merge_spaces};
