//! 8250/16550 compatible UART.

use crate::{RegisterIo, UartPlatform};
use bitfield_struct::bitfield;
use boot_error::{Error, Result};

const TX: u16 = 0;
const DLL: u16 = 0;
const DLM: u16 = 1;
const IER: u16 = 1;
const FCR: u16 = 2;
const LCR: u16 = 3;
const MCR: u16 = 4;
const LSR: u16 = 5;

const FCR_ENABLE_FIFO: u8 = 1 << 0;
const FCR_CLEAR_RCVR: u8 = 1 << 1;
const FCR_CLEAR_XMIT: u8 = 1 << 2;
const FCR_TRIGGER_1: u8 = 0;

const MCR_DTR: u8 = 1 << 0;
const MCR_RTS: u8 = 1 << 1;
const MCR_OUT2: u8 = 1 << 3;

const LSR_THRE: u8 = 1 << 5;

/// Divisor for the standard 1.8432 MHz reference clock.
const BASE_BAUD: u32 = 115_200;

pub(crate) const POLL_LIMIT: u32 = 0xffff;

/// Line Control Register.
#[bitfield(u8)]
pub struct Lcr {
    /// Bits 0..=1: word length minus five.
    #[bits(2)]
    pub word_length: u8,
    /// Bit 2: two stop bits.
    pub two_stop_bits: bool,
    pub parity_enable: bool,
    pub even_parity: bool,
    pub stick_parity: bool,
    pub set_break: bool,
    /// Bit 7: divisor latch access.
    pub dlab: bool,
}

impl Lcr {
    /// 8 data bits, no parity, one stop bit.
    pub const WLEN8: Self = Self::new().with_word_length(3);
}

/// Divisor latch value for `baud`.
#[must_use]
pub fn divisor(baud: u32) -> u32 {
    (BASE_BAUD / baud).max(1)
}

pub(crate) fn init(io: &impl RegisterIo, baud: u32, platform: UartPlatform) -> Result<()> {
    let lcr = Lcr::WLEN8;
    io.write8(LCR, lcr.into_bits());
    if io.read8(LCR) != lcr.into_bits() {
        return Err(Error::DeviceError);
    }

    io.write8(IER, 0);
    // Null modem cables loop DTR back to DCD and RTS to CTS.
    io.write8(MCR, MCR_OUT2 | MCR_RTS | MCR_DTR);

    if platform == UartPlatform::Pc {
        if baud == 0 {
            return Err(Error::InvalidParameter);
        }
        let latch = divisor(baud);
        io.write8(LCR, lcr.with_dlab(true).into_bits());
        io.write8(DLL, (latch & 0xff) as u8);
        io.write8(DLM, ((latch >> 8) & 0xff) as u8);
        io.write8(LCR, lcr.into_bits());
    }

    io.write8(FCR, FCR_ENABLE_FIFO);
    let fcr = if io.read8(FCR) == FCR_ENABLE_FIFO {
        FCR_ENABLE_FIFO | FCR_CLEAR_RCVR | FCR_CLEAR_XMIT | FCR_TRIGGER_1
    } else {
        0
    };
    io.write8(FCR, fcr);

    // Reading LSR clears stale error flags.
    let _ = io.read8(LSR);
    Ok(())
}

pub(crate) fn putc(io: &impl RegisterIo, c: u8) {
    for _ in 0..POLL_LIMIT {
        if io.read8(LSR) & LSR_THRE != 0 {
            io.write8(TX, c);
            return;
        }
    }
}
