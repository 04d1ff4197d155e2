//! Process-wide logging entry points.
//!
//! Until [`log_init`] runs, every [`log()`](crate::log) call is a no-op. A
//! record logged from inside a console (re-entrant logging) is dropped.

use crate::{LogBufferInfo, LogSink, Syslog, SyslogLevel};
use boot_error::{Error, Result};
use boot_sync::BootState;
use core::fmt;

static SYSLOG: BootState<Syslog> = BootState::new();

/// Set up logging with the firmware console subscribed at DEBUG if
/// `verbose`, INFO otherwise.
///
/// Repeated calls keep the buffer and the other consoles and only update the
/// firmware console's level.
///
/// # Errors
/// [`Error::OutOfResources`] if the buffer cannot be allocated or no console
/// slot is free.
pub fn log_init(verbose: bool, firmware_sink: &'static dyn LogSink) -> Result<()> {
    if SYSLOG.is_initialized() {
        return SYSLOG.with(|s| s.set_firmware_sink(verbose, firmware_sink))?;
    }
    SYSLOG.init(Syslog::new(verbose, firmware_sink)?);
    Ok(())
}

/// Tear logging down; subsequent records are discarded.
pub fn log_shutdown() {
    let _ = SYSLOG.shutdown();
}

/// # Errors
/// [`Error::NotStarted`] before [`log_init`], [`Error::OutOfResources`] when
/// both console slots are taken.
pub fn log_subscribe(sink: &'static dyn LogSink, max_level: SyslogLevel) -> Result<()> {
    SYSLOG.with(|s| s.subscribe(sink, max_level))?
}

pub fn log_unsubscribe(sink: &'static dyn LogSink) {
    let _ = SYSLOG.with(|s| s.unsubscribe(sink));
}

/// Remove the firmware console, e.g. when another console takes over the
/// screen.
pub fn log_unsubscribe_firmware() {
    let _ = SYSLOG.with(|s| {
        if let Some(sink) = s.firmware_sink() {
            s.unsubscribe(sink);
        }
    });
}

/// Log one record. Never fails.
pub fn log(level: SyslogLevel, args: fmt::Arguments<'_>) {
    let _ = SYSLOG.with(|s| s.log(level, args));
}

/// # Errors
/// [`Error::NotStarted`] before [`log_init`].
pub fn log_buffer_info() -> Result<LogBufferInfo> {
    SYSLOG.with(|s| s.buffer().info())
}

/// Grow the buffer one last time by `final_extra` bytes and freeze it.
///
/// # Errors
/// [`Error::NotStarted`] before [`log_init`].
pub fn syslogbuf_expand_disable(final_extra: usize) -> Result<()> {
    SYSLOG.with(|s| s.expand_disable(final_extra))
}

/// Copy the current buffer contents into `out`, returning the number of
/// bytes copied.
///
/// # Errors
/// [`Error::NotStarted`] before [`log_init`], [`Error::BufferTooSmall`] if
/// `out` cannot hold everything.
pub fn log_buffer_copy(out: &mut [u8]) -> Result<usize> {
    SYSLOG.with(|s| {
        let contents = s.buffer().contents();
        let dst = out
            .get_mut(..contents.len())
            .ok_or(Error::BufferTooSmall)?;
        dst.copy_from_slice(contents);
        Ok(contents.len())
    })?
}

/// Log through the syslog subsystem with an explicit level.
///
/// ```rust
/// use boot_log::{SyslogLevel, syslog};
///
/// syslog!(SyslogLevel::Notice, "disk {} has {} partitions", 0, 4);
/// ```
#[macro_export]
macro_rules! syslog {
    ($level:expr, $($arg:tt)*) => {
        $crate::log($level, ::core::format_args!($($arg)*))
    };
}
