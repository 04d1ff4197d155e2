//! # Serial Port Description

use boot_error::Error;

/// UART hardware family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SerialType {
    Ns16550 = 0,
    Pl011 = 1,
    /// BlueField RSHIM mailbox console.
    Tmfifo = 2,
    /// Apple Silicon UART.
    AaplS5l = 3,
}

impl TryFrom<u8> for SerialType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Ns16550),
            1 => Ok(Self::Pl011),
            2 => Ok(Self::Tmfifo),
            3 => Ok(Self::AaplS5l),
            _ => Err(Error::Unsupported),
        }
    }
}

/// Address space of a device's registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoSpace {
    /// x86 I/O port base.
    Port(u16),
    /// MMIO base address.
    Memory(u64),
}

/// Register window of a device: register `n` lives at
/// `base + n * offset_scaling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoChannel {
    pub space: IoSpace,
    pub offset_scaling: u8,
}

impl IoChannel {
    #[must_use]
    pub const fn port(base: u16) -> Self {
        Self {
            space: IoSpace::Port(base),
            offset_scaling: 1,
        }
    }

    #[must_use]
    pub const fn mmio(base: u64, offset_scaling: u8) -> Self {
        Self {
            space: IoSpace::Memory(base),
            offset_scaling,
        }
    }

    /// Byte offset of register `reg` from the channel base.
    #[must_use]
    pub const fn scaled(&self, reg: u16) -> u64 {
        let scale = if self.offset_scaling == 0 {
            1
        } else {
            self.offset_scaling as u64
        };
        reg as u64 * scale
    }
}

/// Console serial port as reported by firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialPortInfo {
    pub serial_type: SerialType,
    pub io: IoChannel,
    /// Baud rate programmed by firmware, or [`Self::BAUDRATE_UNKNOWN`].
    pub baudrate: u32,
}

impl SerialPortInfo {
    pub const BAUDRATE_UNKNOWN: u32 = 0;
}

/// I/O bases of the legacy PC COM ports.
const LEGACY_COM_BASES: [u16; 4] = [0x3f8, 0x2f8, 0x3e8, 0x2e8];

impl SerialPortInfo {
    /// 16550 at COM `com` (1 to 4), or at I/O base `com` for larger values.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn legacy_com(com: u32) -> Self {
        let base = match com {
            1..=4 => LEGACY_COM_BASES[(com - 1) as usize],
            _ => com as u16,
        };
        Self {
            serial_type: SerialType::Ns16550,
            io: IoChannel::port(base),
            baudrate: Self::BAUDRATE_UNKNOWN,
        }
    }
}
