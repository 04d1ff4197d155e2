//! # EFI Status Translation

use crate::{Error, Result, Status};

/// High bit of an `EFI_STATUS`: set for errors.
const ERROR_BIT: usize = 1 << (usize::BITS - 1);

/// Second-highest bit: error codes in the OEM-defined range.
const OEM_BIT: usize = ERROR_BIT >> 1;

const WARN_DELETE_FAILURE: usize = 2;
const WARN_WRITE_FAILURE: usize = 3;
const WARN_BUFFER_TOO_SMALL: usize = 4;

impl Error {
    /// Native firmware status for this kind.
    ///
    /// Kinds without a UEFI-defined code are placed in the OEM error range,
    /// tagged with their own code.
    #[must_use]
    pub const fn to_efi(self) -> uefi::Status {
        match self.efi_code() {
            Some(code) => uefi::Status(ERROR_BIT | code),
            None => uefi::Status(ERROR_BIT | OEM_BIT | self.code() as usize),
        }
    }

    /// Translate a firmware status into a failure kind.
    ///
    /// Success has no failure kind and reads as [`Error::Unknown`]; use
    /// [`Status::from_efi`] when success is a possible input.
    #[must_use]
    pub fn from_efi(status: uefi::Status) -> Self {
        Status::from_efi(status).error().unwrap_or(Self::Unknown)
    }
}

impl Status {
    /// Translate a firmware status.
    ///
    /// EFI warnings are folded into the closest failure kind: delete and
    /// write failures become [`Error::DeviceError`], a short buffer becomes
    /// [`Error::BufferTooSmall`], anything else [`Error::Unknown`].
    #[must_use]
    pub fn from_efi(status: uefi::Status) -> Self {
        let raw = status.0;
        if raw == 0 {
            return Self::SUCCESS;
        }

        if raw & ERROR_BIT == 0 {
            return match raw {
                WARN_DELETE_FAILURE | WARN_WRITE_FAILURE => Error::DeviceError.into(),
                WARN_BUFFER_TOO_SMALL => Error::BufferTooSmall.into(),
                _ => Error::Unknown.into(),
            };
        }

        let code = raw & !ERROR_BIT;
        if code & OEM_BIT != 0 {
            let kind = u32::try_from(code & !OEM_BIT).ok().and_then(Error::from_code);
            return match kind {
                Some(error) if error.efi_code().is_none() => error.into(),
                _ => Error::Unknown.into(),
            };
        }

        Error::ALL
            .iter()
            .copied()
            .find(|e| e.efi_code() == Some(code))
            .unwrap_or(Error::Unknown)
            .into()
    }

    /// Native firmware status.
    ///
    /// A value that is not in the error table (including anything carrying
    /// the warning flag) maps to `EFI_ABORTED`.
    #[must_use]
    pub fn to_efi(self) -> uefi::Status {
        if self.0 == 0 {
            return uefi::Status::SUCCESS;
        }

        if self.is_warning() {
            return Error::Aborted.to_efi();
        }

        Error::from_code(self.0).map_or_else(|| Error::Aborted.to_efi(), Error::to_efi)
    }
}

/// Turn a firmware status into a `Result`.
///
/// # Errors
/// Any status other than `EFI_SUCCESS` is returned as its failure kind.
pub fn efi_result(status: uefi::Status) -> Result<()> {
    Status::from_efi(status).into_result()
}

impl From<Error> for uefi::Status {
    fn from(error: Error) -> Self {
        error.to_efi()
    }
}

impl<D: core::fmt::Debug> From<uefi::Error<D>> for Error {
    fn from(error: uefi::Error<D>) -> Self {
        Self::from_efi(error.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oem_range_sits_below_error_bit() {
        assert_eq!(OEM_BIT << 1, ERROR_BIT);
        assert_eq!(Error::Syntax.to_efi().0, ERROR_BIT | OEM_BIT | 32);
    }

    #[test]
    fn native_codes_carry_error_bit() {
        assert_eq!(Error::NotFound.to_efi(), uefi::Status::NOT_FOUND);
        assert_eq!(Error::EndOfFile.to_efi(), uefi::Status::END_OF_FILE);
        assert_eq!(Error::InvalidParameter.to_efi(), uefi::Status::INVALID_PARAMETER);
    }
}
