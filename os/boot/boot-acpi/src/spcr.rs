//! # Serial Port Console Redirection Table
//!
//! Non-x86 platforms describe their console UART through SPCR. Only the
//! fields needed to drive the port are decoded:
//!
//! | Offset | Size | Field                        |
//! |--------|------|------------------------------|
//! | 36     | 1    | Interface type               |
//! | 40     | 12   | Base address (GAS)           |
//! | 58     | 1    | Configured baud rate code    |

use crate::{IdentityMap, SdtHeader, acpi_find_sdt};
use boot_error::{Error, Result};
use boot_firmware::{IoChannel, SerialPortInfo, SerialType};

pub const SPCR_SIGNATURE: &[u8; 4] = b"SPCR";

/// Interface types understood by the console driver.
pub mod interface {
    pub const NS16550: u8 = 0x00;
    pub const NS16450: u8 = 0x01;
    pub const PL011: u8 = 0x03;
    pub const SBSA_32BIT: u8 = 0x0d;
    pub const SBSA: u8 = 0x0e;
    pub const BCM2835: u8 = 0x10;
}

/// GAS address space of system memory.
pub const ADDRESS_SPACE_MEMORY: u8 = 0;

/// Offset of the 16550 registers inside the BCM2835 auxiliary block.
const BCM2835_UART_OFFSET: u64 = 0x40;

/// ACPI generic address structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericAddress {
    pub space_id: u8,
    pub bit_width: u8,
    pub bit_offset: u8,
    pub access_size: u8,
    pub address: u64,
}

/// Decoded SPCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spcr {
    pub header: SdtHeader,
    pub interface_type: u8,
    pub base: GenericAddress,
    pub baud_code: u8,
}

impl Spcr {
    /// Bytes up to and including the baud rate field.
    pub const MIN_LEN: usize = 59;

    /// # Errors
    /// [`Error::BadBufferSize`] if `bytes` is too short, [`Error::BadHeader`]
    /// if it is not an SPCR.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::MIN_LEN {
            return Err(Error::BadBufferSize);
        }
        let header = SdtHeader::parse(bytes).ok_or(Error::BadBufferSize)?;
        if !header.matches(SPCR_SIGNATURE) {
            return Err(Error::BadHeader);
        }

        let mut address = [0u8; 8];
        address.copy_from_slice(&bytes[44..52]);
        Ok(Self {
            header,
            interface_type: bytes[36],
            base: GenericAddress {
                space_id: bytes[40],
                bit_width: bytes[41],
                bit_offset: bytes[42],
                access_size: bytes[43],
                address: u64::from_le_bytes(address),
            },
            baud_code: bytes[58],
        })
    }

    /// Baud rate for the configured code.
    ///
    /// # Errors
    /// [`Error::Unsupported`] for "as is" (0) and reserved codes.
    pub const fn baudrate(&self) -> Result<u32> {
        match self.baud_code {
            3 => Ok(9600),
            4 => Ok(19200),
            6 => Ok(57600),
            7 => Ok(115_200),
            _ => Err(Error::Unsupported),
        }
    }

    /// The console port described by this table.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] for registers outside system memory,
    /// [`Error::Unsupported`] for unknown interface types or baud codes.
    pub fn serial_port(&self) -> Result<SerialPortInfo> {
        if self.base.space_id != ADDRESS_SPACE_MEMORY {
            return Err(Error::InvalidParameter);
        }

        let (serial_type, base, offset_scaling) = match self.interface_type {
            interface::NS16550 | interface::NS16450 => {
                (SerialType::Ns16550, self.base.address, self.base.bit_width / 8)
            }
            interface::BCM2835 => (
                SerialType::Ns16550,
                self.base.address + BCM2835_UART_OFFSET,
                self.base.bit_width / 8,
            ),
            interface::PL011 | interface::SBSA_32BIT | interface::SBSA => {
                (SerialType::Pl011, self.base.address, (self.base.bit_width / 32).max(1))
            }
            _ => return Err(Error::Unsupported),
        };

        Ok(SerialPortInfo {
            serial_type,
            io: IoChannel::mmio(base, offset_scaling),
            baudrate: self.baudrate()?,
        })
    }
}

/// Console port from the SPCR of the tables installed by
/// [`crate::acpi_init`].
///
/// # Errors
/// [`Error::NotFound`] without an SPCR; see [`Spcr::serial_port`].
pub fn spcr_serial_port() -> Result<SerialPortInfo> {
    let sdt = acpi_find_sdt(SPCR_SIGNATURE).ok_or(Error::NotFound)?;
    let bytes = unsafe { sdt.bytes(&IdentityMap) };
    Spcr::parse(bytes)?.serial_port()
}
