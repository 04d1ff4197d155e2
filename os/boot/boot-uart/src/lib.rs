//! # Boot UART Drivers
//!
//! Polled transmit-only drivers for the UART families boot firmware hands
//! over, plus a [`SerialConsole`] that turns them into a log sink.
//!
//! | Family   | Access      | Ready condition                  |
//! |----------|-------------|----------------------------------|
//! | NS16550  | 8-bit       | `LSR.THRE`                       |
//! | PL011    | 32-bit      | `FR.TXFF` clear                  |
//! | S5L      | 32-bit      | `UTRSTAT` transmit FIFO empty    |
//! | TMFIFO   | 64-bit      | host alive and FIFO not full     |
//!
//! Register addresses come from an [`boot_firmware::IoChannel`]: port I/O
//! or MMIO with a per-device register stride. Everything above
//! [`RegisterIo`] is hardware independent and runs on the host against
//! a simulated register file.
//!
//! ```rust
//! use boot_uart::{RegisterIo, Uart, UartDescriptor, UartPlatform};
//! use boot_cpu::Clock;
//! use std::sync::Mutex;
//!
//! struct Pl011Regs(Mutex<Vec<u32>>);
//!
//! impl RegisterIo for Pl011Regs {
//!     fn read8(&self, _: u16) -> u8 { 0 }
//!     fn write8(&self, _: u16, _: u8) {}
//!     fn read32(&self, _: u16) -> u32 { 0 }
//!     fn write32(&self, reg: u16, v: u32) {
//!         if reg == 0 { self.0.lock().unwrap().push(v) }
//!     }
//!     fn read64(&self, _: u16) -> u64 { 0 }
//!     fn write64(&self, _: u16, _: u64) {}
//! }
//!
//! struct Frozen;
//! impl Clock for Frozen {
//!     fn ticks(&self) -> u64 { 0 }
//!     fn frequency(&self) -> u64 { 1 }
//! }
//! static CLOCK: Frozen = Frozen;
//!
//! let desc = UartDescriptor { id: 1, serial_type: 1, baudrate: 115_200 };
//! let mut uart = Uart::init_on(desc, Pl011Regs(Mutex::default()), &CLOCK, UartPlatform::Arm).unwrap();
//! uart.putc(b'A');
//! assert_eq!(*uart.io().0.lock().unwrap(), [u32::from(b'A')]);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod aapl_s5l;
mod console;
mod io;
pub mod ns16550;
mod pl011;
pub mod tmfifo;
mod uart;

pub use console::{SerialConsole, serial_log_init, serial_log_init_on, serial_log_shutdown};
pub use io::{ChannelIo, RegisterIo};
pub use tmfifo::LinkState;
pub use uart::{Uart, UartDescriptor, UartFlags, UartPlatform};
