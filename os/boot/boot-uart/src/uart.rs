//! # UART Driver

use crate::tmfifo::{LinkState, TmfifoLink};
use crate::{RegisterIo, aapl_s5l, ns16550, pl011};
use bitfield_struct::bitfield;
use boot_cpu::Clock;
use boot_error::{Error, Result};
use boot_firmware::SerialType;

/// Driver behavior flags.
#[bitfield(u8)]
pub struct UartFlags {
    /// The device is only driven once firmware has exited boot services;
    /// until then firmware owns it.
    pub use_after_exit_boot_services: bool,
    #[bits(7)]
    __reserved: u8,
}

/// Requested UART configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartDescriptor {
    /// COM index or I/O base the port was looked up by.
    pub id: u32,
    /// Raw [`SerialType`] code.
    pub serial_type: u8,
    pub baudrate: u32,
}

/// What the platform lets [`Uart::init`] do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartPlatform {
    /// Legacy PC: NS16550 only, with a known reference clock, so the
    /// divisor latch is programmed.
    Pc,
    /// ARM: every family, firmware's baud rate is kept. A PL011 or NS16550
    /// console is tried as PL011 first.
    Arm,
}

impl UartPlatform {
    pub const NATIVE: Self = if cfg!(target_arch = "x86_64") {
        Self::Pc
    } else {
        Self::Arm
    };
}

enum Family {
    Ns16550,
    Pl011,
    Tmfifo(TmfifoLink),
    AaplS5l,
}

/// An initialized UART.
pub struct Uart<IO> {
    id: u32,
    baudrate: u32,
    serial_type: SerialType,
    flags: UartFlags,
    family: Family,
    io: IO,
    clock: &'static (dyn Clock + Sync),
}

/// PL011 first, then NS16550.
fn arm_console(serial_type: SerialType, io: &impl RegisterIo, baud: u32) -> Result<Family> {
    pl011::init(serial_type).map(|()| Family::Pl011).or_else(|_| {
        if serial_type != SerialType::Ns16550 {
            return Err(Error::Unsupported);
        }
        ns16550::init(io, baud, UartPlatform::Arm).map(|()| Family::Ns16550)
    })
}

impl<IO: RegisterIo> Uart<IO> {
    /// Bring up the UART described by `desc` with the platform's
    /// [`UartPlatform::NATIVE`].
    ///
    /// # Errors
    /// [`boot_error::Error::Unsupported`] for an unknown serial type or one
    /// the platform has no driver for,
    /// [`boot_error::Error::DeviceError`] if no NS16550 responds.
    pub fn init(desc: UartDescriptor, io: IO, clock: &'static (dyn Clock + Sync)) -> Result<Self> {
        Self::init_on(desc, io, clock, UartPlatform::NATIVE)
    }

    /// # Errors
    /// See [`Uart::init`]; [`boot_error::Error::InvalidParameter`] for a
    /// zero baud rate under [`UartPlatform::Pc`].
    pub fn init_on(
        desc: UartDescriptor,
        io: IO,
        clock: &'static (dyn Clock + Sync),
        platform: UartPlatform,
    ) -> Result<Self> {
        let serial_type = SerialType::try_from(desc.serial_type)?;
        let mut flags = UartFlags::new();
        let family = match (platform, serial_type) {
            (UartPlatform::Pc, SerialType::Ns16550) => {
                ns16550::init(&io, desc.baudrate, platform)?;
                Family::Ns16550
            }
            (UartPlatform::Pc, _) => return Err(Error::Unsupported),
            (UartPlatform::Arm, SerialType::Pl011 | SerialType::Ns16550) => {
                arm_console(serial_type, &io, desc.baudrate)?
            }
            (UartPlatform::Arm, SerialType::Tmfifo) => {
                // The RSHIM is not a firmware console device.
                flags.set_use_after_exit_boot_services(true);
                Family::Tmfifo(TmfifoLink::new())
            }
            (UartPlatform::Arm, SerialType::AaplS5l) => Family::AaplS5l,
        };

        Ok(Self {
            id: desc.id,
            baudrate: desc.baudrate,
            serial_type,
            flags,
            family,
            io,
            clock,
        })
    }

    /// Transmit one byte, dropping it if the device does not become ready.
    pub fn putc(&mut self, c: u8) {
        match &mut self.family {
            Family::Ns16550 => ns16550::putc(&self.io, c),
            Family::Pl011 => pl011::putc(&self.io, c),
            Family::Tmfifo(link) => link.putc(&self.io, self.clock, c),
            Family::AaplS5l => aapl_s5l::putc(&self.io, c),
        }
    }

    pub const fn id(&self) -> u32 {
        self.id
    }

    pub const fn baudrate(&self) -> u32 {
        self.baudrate
    }

    pub const fn serial_type(&self) -> SerialType {
        self.serial_type
    }

    pub const fn flags(&self) -> UartFlags {
        self.flags
    }

    pub const fn io(&self) -> &IO {
        &self.io
    }

    /// TMFIFO link state; `None` for other families.
    pub const fn link_state(&self) -> Option<LinkState> {
        match &self.family {
            Family::Tmfifo(link) => Some(link.state()),
            _ => None,
        }
    }
}
