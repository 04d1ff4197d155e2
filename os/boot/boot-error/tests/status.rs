use boot_error::{Error, Status, efi_result};
use std::collections::HashSet;

#[test]
fn descriptions_follow_the_table() {
    assert_eq!(Error::Unknown.to_string(), "Unknown");
    assert_eq!(Error::InvalidParameter.to_string(), "Invalid parameter");
    assert_eq!(Error::UnexpectedEof.description(), "Unexpected EOF");
    assert_eq!(Error::Insecure.description(), "Secure boot failed");
    assert_eq!(Status::SUCCESS.describe(), "Success");
}

#[test]
fn codes_are_dense_and_ordered() {
    for (i, error) in Error::ALL.iter().enumerate() {
        assert_eq!(error.code() as usize, i + 1);
        assert_eq!(Error::from_code(error.code()), Some(*error));
    }
    assert_eq!(Error::from_code(0), None);
    assert_eq!(Error::from_code(999), None);
}

#[test]
fn efi_mapping_is_injective_and_round_trips() {
    let mut seen = HashSet::new();
    for &error in Error::ALL {
        let efi = error.to_efi();
        assert!(efi.is_error(), "{error:?} must map to an EFI error");
        assert!(seen.insert(efi.0), "{error:?} collides");
        assert_eq!(Error::from_efi(efi), error);
    }
}

#[test]
fn efi_warnings_fold_into_errors() {
    assert_eq!(Status::from_efi(uefi::Status::WARN_DELETE_FAILURE).error(), Some(Error::DeviceError));
    assert_eq!(Status::from_efi(uefi::Status::WARN_WRITE_FAILURE).error(), Some(Error::DeviceError));
    assert_eq!(
        Status::from_efi(uefi::Status::WARN_BUFFER_TOO_SMALL).error(),
        Some(Error::BufferTooSmall)
    );
    assert_eq!(Status::from_efi(uefi::Status::WARN_UNKNOWN_GLYPH).error(), Some(Error::Unknown));
    assert_eq!(Status::from_efi(uefi::Status::SUCCESS), Status::SUCCESS);
}

#[test]
fn unknown_efi_errors_read_as_unknown() {
    // EFI_IP_ADDRESS_CONFLICT has no boot-library counterpart.
    let conflict = uefi::Status((1 << (usize::BITS - 1)) | 34);
    assert_eq!(Error::from_efi(conflict), Error::Unknown);
    assert!(efi_result(uefi::Status::SUCCESS).is_ok());
    assert_eq!(efi_result(uefi::Status::TIMEOUT), Err(Error::Timeout));
}

#[test]
fn network_kinds_use_native_efi_codes() {
    let error_bit = 1 << (usize::BITS - 1);
    let network = [
        (Error::NetworkUnreachable, 100),
        (Error::HostUnreachable, 101),
        (Error::ProtocolUnreachable, 102),
        (Error::PortUnreachable, 103),
        (Error::ConnectionFin, 104),
        (Error::ConnectionReset, 105),
        (Error::ConnectionRefused, 106),
    ];
    for (error, code) in network {
        assert_eq!(error.to_efi().0, error_bit | code, "{error:?}");
        assert_eq!(Error::from_efi(uefi::Status(error_bit | code)), error);
    }
}

#[test]
fn warning_flag_is_kept_and_reported() {
    let status = Status::warning(Error::VolumeCorrupted);
    assert!(status.is_warning());
    assert!(!status.is_success());
    assert_eq!(status.bits(), 0x8000_000b);
    assert_eq!(status.error(), Some(Error::VolumeCorrupted));
    assert_eq!(status.to_string(), "Warning: Volume corrupted");
    assert_eq!(status.to_efi(), uefi::Status::ABORTED);
}

#[test]
fn out_of_table_status_maps_to_aborted() {
    assert_eq!(Status::from_bits(4711).to_efi(), uefi::Status::ABORTED);
    assert_eq!(Status::SUCCESS.to_efi(), uefi::Status::SUCCESS);
    assert_eq!(Status::from(Err::<(), _>(Error::NotFound)).to_efi(), uefi::Status::NOT_FOUND);
}
