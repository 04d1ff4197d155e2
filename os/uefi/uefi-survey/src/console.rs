//! # Firmware Console
//!
//! The log subscriber that is active from `log_init` until a framebuffer
//! console takes over or boot services end.

use boot_error::{Error, Result};
use boot_log::{LogSink, is_syslog_message};
use core::fmt::Write;

/// Writes log records to the UEFI text console.
pub struct FirmwareConsole;

pub static FIRMWARE_CONSOLE: FirmwareConsole = FirmwareConsole;

impl LogSink for FirmwareConsole {
    fn write(&self, msg: &str) -> Result<()> {
        firmware_print(msg)
    }
}

/// Print `msg` on `ConOut`, dropping the `<N>` level prefix of each line.
///
/// # Errors
/// [`Error::NotReady`] after boot services have ended;
/// [`Error::DeviceError`] if the console rejects the text.
pub fn firmware_print(msg: &str) -> Result<()> {
    if !boot_firmware::in_boot_services() {
        return Err(Error::NotReady);
    }

    uefi::system::with_stdout(|out| {
        for line in msg.split_inclusive('\n') {
            let text = if is_syslog_message(line.as_bytes()) {
                &line[3..]
            } else {
                line
            };
            // Output turns '\n' into "\r\n".
            out.write_str(text).map_err(|_| Error::DeviceError)?;
        }
        Ok(())
    })
}
