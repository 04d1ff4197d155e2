//! # Boot Logging
//!
//! A syslog-style logger for firmware context. Each record is formatted as
//! `<N>body\n` (N is the [`SyslogLevel`] digit), appended to an expandable
//! [`LogBuffer`], and offered to at most two subscribed consoles.
//!
//! ```text
//!  log::info!(..) ──► SyslogLogger ─┐
//!  syslog!(level, ..) ──────────────┼──► Syslog ──► LogBuffer
//!                                   │       │
//!                                   │       └──► consoles (slot 0, slot 1)
//!                                   │             firmware · serial · fbcon
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use boot_log::{NullSink, SyslogLevel, SyslogLogger, log_init, syslog};
//! use log::LevelFilter;
//!
//! static FIRMWARE: NullSink = NullSink;
//!
//! log_init(true, &FIRMWARE).unwrap();
//! SyslogLogger::init(LevelFilter::Debug).unwrap();
//!
//! log::info!("booting");
//! syslog!(SyslogLevel::Warning, "no SPCR table");
//! ```
//!
//! Consoles implement [`LogSink`]. They are identified by address, so a
//! console must be a non-zero-sized `static` to be unsubscribed reliably.

#![cfg_attr(not(any(test, doctest)), no_std)]

extern crate alloc;

mod buffer;
mod format;
mod global;
mod level;
mod logger;
mod sink;
mod syslog;

pub use buffer::{LOG_BUFFER_MAX, LogBuffer, LogBufferInfo, OVERFLOW_MARKER, PAGE_SIZE};
pub use format::LOG_MAX_LEN;
pub use global::{
    log, log_buffer_copy, log_buffer_info, log_init, log_shutdown, log_subscribe,
    log_unsubscribe, log_unsubscribe_firmware, syslogbuf_expand_disable,
};
pub use level::{SyslogLevel, is_syslog_message, syslog_get_message_level};
pub use logger::SyslogLogger;
pub use sink::{CONSOLES_MAX, LogSink, NullSink, Subscribers};
pub use syslog::Syslog;
