//! Apple Silicon (Samsung S5L derived) UART.

use crate::RegisterIo;
use crate::ns16550::POLL_LIMIT;

const UTRSTAT: u16 = 0x10;
const UTRSTAT_TX_FIFO_EMPTY: u32 = 1 << 1;
const UTXH: u16 = 0x20;

pub(crate) fn putc(io: &impl RegisterIo, c: u8) {
    for _ in 0..POLL_LIMIT {
        if io.read32(UTRSTAT) & UTRSTAT_TX_FIFO_EMPTY != 0 {
            io.write32(UTXH, u32::from(c));
            return;
        }
    }
}
