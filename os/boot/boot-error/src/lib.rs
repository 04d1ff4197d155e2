//! # Boot Error Taxonomy
//!
//! A closed set of failure kinds shared by every boot-services crate, with
//! a stable textual description per kind and a translation to and from the
//! UEFI status code space.
//!
//! ## Overview
//!
//! Every operation in the boot libraries returns [`Result<T>`]. Success is
//! `Ok(..)`; every failure is one [`Error`] variant. When a numeric status is
//! needed (handing a status back to firmware, storing it in a packed record,
//! reporting it through a log line) the packed [`Status`] form is used:
//!
//! ```text
//!  31 30                                   0
//! ┌──┬─────────────────────────────────────┐
//! │W │ kind (0 = success, 1.. = Error)     │
//! └──┴─────────────────────────────────────┘
//! ```
//!
//! The `W` bit marks a warning: the operation completed but something
//! worth reporting happened.
//!
//! ## Firmware Mapping
//!
//! Kinds that UEFI defines map to the matching
//! `EFI_*` code. Kinds that have no UEFI equivalent (syntax errors, bad
//! ELF headers, secure-boot failures, ...) map into the OEM error range
//! so that the mapping stays injective:
//!
//! ```text
//! Error::NotFound  ──► EFI_NOT_FOUND            (ERROR_BIT | 14)
//! Error::Syntax    ──► OEM error                (ERROR_BIT | OEM_BIT | 32)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use boot_error::{Error, Status};
//!
//! let status = Status::from(Err::<(), _>(Error::NotFound));
//! assert_eq!(status.describe(), "Not found");
//! assert_eq!(Error::from_efi(status.to_efi()), Error::NotFound);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

mod efi;

pub use efi::efi_result;

/// Result alias used throughout the boot libraries.
pub type Result<T, E = Error> = core::result::Result<T, E>;

macro_rules! error_table {
    ($($(#[$meta:meta])* $name:ident = $code:literal, $text:literal, $efi:expr;)*) => {
        /// A boot-services failure kind.
        ///
        /// The discriminant is the packed status value of the kind.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
        #[repr(u32)]
        pub enum Error {
            $(
                $(#[$meta])*
                #[error($text)]
                $name = $code,
            )*
        }

        impl Error {
            /// Every kind, in table order.
            pub const ALL: &'static [Self] = &[$(Self::$name),*];

            /// Stable human-readable description.
            #[must_use]
            pub const fn description(self) -> &'static str {
                match self {
                    $(Self::$name => $text,)*
                }
            }

            /// The native EFI error number (without the error bit), if any.
            #[must_use]
            pub(crate) const fn efi_code(self) -> Option<usize> {
                match self {
                    $(Self::$name => $efi,)*
                }
            }
        }
    };
}

error_table! {
    Unknown = 1, "Unknown", None;
    LoadError = 2, "Load error", Some(1);
    InvalidParameter = 3, "Invalid parameter", Some(2);
    Unsupported = 4, "Unsupported", Some(3);
    BadBufferSize = 5, "Bad buffer size", Some(4);
    BufferTooSmall = 6, "Buffer too small", Some(5);
    NotReady = 7, "Not ready", Some(6);
    DeviceError = 8, "Device error", Some(7);
    WriteProtected = 9, "Write protected", Some(8);
    OutOfResources = 10, "Out of resources", Some(9);
    VolumeCorrupted = 11, "Volume corrupted", Some(10);
    VolumeFull = 12, "Volume full", Some(11);
    NoMedia = 13, "No media", Some(12);
    MediaChanged = 14, "Media changed", Some(13);
    NotFound = 15, "Not found", Some(14);
    AccessDenied = 16, "Access denied", Some(15);
    NoResponse = 17, "No response", Some(16);
    NoMapping = 18, "No mapping", Some(17);
    Timeout = 19, "Timeout", Some(18);
    NotStarted = 20, "Not started", Some(19);
    AlreadyStarted = 21, "Already started", Some(20);
    Aborted = 22, "Aborted", Some(21);
    IcmpError = 23, "ICMP error", Some(22);
    TftpError = 24, "TFTP error", Some(23);
    ProtocolError = 25, "Protocol error", Some(24);
    IncompatibleVersion = 26, "Incompatible version", Some(25);
    SecurityViolation = 27, "Security violation", Some(26);
    CrcError = 28, "CRC error", Some(27);
    EndOfMedia = 29, "End of media", Some(28);
    EndOfFile = 30, "End of file", Some(31);
    InvalidLanguage = 31, "Invalid language", Some(32);
    Syntax = 32, "Syntax", None;
    InconsistentData = 33, "Inconsistent data", None;
    UnexpectedEof = 34, "Unexpected EOF", None;
    BadArch = 35, "Bad arch", None;
    BadType = 36, "Bad type", None;
    BadHeader = 37, "Bad header", None;
    NotExecutable = 38, "Not executable", None;
    /// Secure boot verification failed.
    Insecure = 39, "Secure boot failed", None;
    CompromisedData = 40, "Compromised data", Some(33);
    HttpError = 41, "HTTP error", Some(35);
    NetworkUnreachable = 42, "Network unreachable", Some(100);
    HostUnreachable = 43, "Host unreachable", Some(101);
    ProtocolUnreachable = 44, "Protocol unreachable", Some(102);
    PortUnreachable = 45, "Port unreachable", Some(103);
    ConnectionFin = 46, "Connection finished", Some(104);
    ConnectionReset = 47, "Connection reset", Some(105);
    ConnectionRefused = 48, "Connection refused", Some(106);
}

impl Error {
    /// Packed status value of this kind.
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Look up a kind by its packed value (warning bit ignored).
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        let code = code & !Status::WARNING;
        Self::ALL.iter().copied().find(|e| e.code() == code)
    }
}

/// Packed status: `0` for success, otherwise an [`Error`] code, optionally
/// OR'd with [`Status::WARNING`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Status(u32);

impl Status {
    pub const SUCCESS: Self = Self(0);

    /// Warning flag.
    pub const WARNING: u32 = 0x8000_0000;

    #[must_use]
    pub const fn from_error(error: Error) -> Self {
        Self(error.code())
    }

    /// The kind, flagged as a warning.
    #[must_use]
    pub const fn warning(error: Error) -> Self {
        Self(error.code() | Self::WARNING)
    }

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_warning(self) -> bool {
        self.0 & Self::WARNING != 0
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 & !Self::WARNING == 0
    }

    /// The failure kind, if this is not success. Unknown codes read as
    /// [`Error::Unknown`].
    #[must_use]
    pub fn error(self) -> Option<Error> {
        if self.is_success() {
            None
        } else {
            Some(Error::from_code(self.0).unwrap_or(Error::Unknown))
        }
    }

    /// Convert into a `Result`; warnings are treated as failures of their kind.
    ///
    /// # Errors
    /// Returns the carried [`Error`] for any non-success status.
    pub fn into_result(self) -> Result<()> {
        self.error().map_or(Ok(()), Err)
    }

    /// Human-readable description of the status.
    #[must_use]
    pub fn describe(self) -> &'static str {
        self.error().map_or("Success", Error::description)
    }
}

impl From<Error> for Status {
    fn from(error: Error) -> Self {
        Self::from_error(error)
    }
}

impl<T> From<Result<T>> for Status {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(_) => Self::SUCCESS,
            Err(error) => Self::from_error(error),
        }
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_warning() {
            write!(f, "Warning: {}", self.describe())
        } else {
            f.write_str(self.describe())
        }
    }
}
