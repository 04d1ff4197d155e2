//! ARM PL011 (and SBSA generic UART). Firmware has already enabled it.

use crate::RegisterIo;
use crate::ns16550::POLL_LIMIT;
use boot_error::{Error, Result};
use boot_firmware::SerialType;

const DR: u16 = 0x00;
const FR: u16 = 0x18;
const FR_TXFF: u32 = 1 << 5;

/// Binds the driver; there is nothing to program.
pub(crate) fn init(serial_type: SerialType) -> Result<()> {
    if serial_type == SerialType::Pl011 {
        Ok(())
    } else {
        Err(Error::Unsupported)
    }
}

pub(crate) fn putc(io: &impl RegisterIo, c: u8) {
    for _ in 0..POLL_LIMIT {
        if io.read32(FR) & FR_TXFF == 0 {
            io.write32(DR, u32::from(c));
            return;
        }
    }
}
