// SPDX-License-Identifier: MIT OR Apache-2.0

mod common;

use core::{ptr, slice};
use efi_compat::proto::rng::{Rng, RngAlgorithmType};
use efi_compat::registry::{ProtocolDatabase, ProtocolRegistry};
use efi_compat::Status;
use efi_compat_raw::protocol::rng::RngProtocol;

#[repr(C)]
struct MockRng {
    proto: RngProtocol,
    algorithms: [RngAlgorithmType; 2],
    calls: usize,
}

impl MockRng {
    fn new() -> Self {
        Self {
            proto: RngProtocol { get_info, get_rng },
            algorithms: [
                RngAlgorithmType::ALGORITHM_RAW,
                RngAlgorithmType::ALGORITHM_SP800_90_CTR_256,
            ],
            calls: 0,
        }
    }
}

unsafe fn mock<'a>(this: *mut RngProtocol) -> &'a mut MockRng {
    unsafe { &mut *this.cast::<MockRng>() }
}

unsafe extern "efiapi" fn get_info(
    this: *mut RngProtocol,
    algorithm_list_size: *mut usize,
    algorithm_list: *mut RngAlgorithmType,
) -> Status {
    let rng = unsafe { mock(this) };
    rng.calls += 1;
    let required = size_of_val(&rng.algorithms);
    let available = unsafe { algorithm_list_size.replace(required) };
    if available < required {
        return Status::BUFFER_TOO_SMALL;
    }
    unsafe {
        ptr::copy_nonoverlapping(rng.algorithms.as_ptr(), algorithm_list, rng.algorithms.len());
    }
    Status::SUCCESS
}

unsafe extern "efiapi" fn get_rng(
    this: *mut RngProtocol,
    algorithm: *const RngAlgorithmType,
    value_length: usize,
    value: *mut u8,
) -> Status {
    let rng = unsafe { mock(this) };
    rng.calls += 1;
    if let Some(algorithm) = unsafe { algorithm.as_ref() } {
        if !rng.algorithms.contains(algorithm) {
            return Status::UNSUPPORTED;
        }
    }
    let value = unsafe { slice::from_raw_parts_mut(value, value_length) };
    for (i, byte) in value.iter_mut().enumerate() {
        *byte = (i as u8) ^ 0x5a;
    }
    Status::SUCCESS
}

#[test]
fn get_info_reports_required_count() {
    let mut mock = MockRng::new();
    let mut db = ProtocolDatabase::new();
    let handle = common::publish(&mut db, RngProtocol::GUID, &mut mock);

    {
        let mut rng = unsafe { db.resolve::<Rng>(handle) }.unwrap();

        let mut short = [RngAlgorithmType::EMPTY_ALGORITHM; 1];
        let err = rng.get_info(&mut short).unwrap_err();
        assert_eq!(err.status(), Status::BUFFER_TOO_SMALL);
        assert_eq!(*err.data(), Some(2));
        assert_eq!(short, [RngAlgorithmType::EMPTY_ALGORITHM]);

        let mut list = [RngAlgorithmType::EMPTY_ALGORITHM; 4];
        let algorithms = rng.get_info(&mut list).unwrap();
        assert_eq!(
            algorithms,
            [
                RngAlgorithmType::ALGORITHM_RAW,
                RngAlgorithmType::ALGORITHM_SP800_90_CTR_256,
            ]
        );
    }

    assert_eq!(mock.calls, 2);
}

#[test]
fn get_rng_honours_algorithm() {
    let mut mock = MockRng::new();
    let mut db = ProtocolDatabase::new();
    let handle = common::publish(&mut db, RngProtocol::GUID, &mut mock);

    {
        let mut rng = unsafe { db.resolve::<Rng>(handle) }.unwrap();

        let mut buf = [0u8; 4];
        rng.get_rng(None, &mut buf).unwrap();
        assert_eq!(buf, [0x5a, 0x5b, 0x58, 0x59]);

        let mut buf = [0u8; 2];
        rng.get_rng(Some(RngAlgorithmType::ALGORITHM_RAW), &mut buf)
            .unwrap();
        assert_eq!(buf, [0x5a, 0x5b]);

        // An unsupported algorithm is an error, not a fallback.
        let mut buf = [0u8; 2];
        assert_eq!(
            rng.get_rng(Some(RngAlgorithmType::ALGORITHM_X9_31_AES), &mut buf)
                .unwrap_err()
                .status(),
            Status::UNSUPPORTED
        );
        assert_eq!(buf, [0, 0]);

        assert_eq!(
            rng.get_rng(None, &mut []).unwrap_err().status(),
            Status::INVALID_PARAMETER
        );
    }

    // The empty request never reached the firmware.
    assert_eq!(mock.calls, 3);
}

#[test]
fn rng_absent_from_handle() {
    let mut db = ProtocolDatabase::<4>::new();
    let handle = common::new_handle();
    assert!(unsafe { db.resolve_optional::<Rng>(handle) }
        .unwrap()
        .is_none());
    assert!(!db.is_installed(handle, &RngProtocol::GUID).unwrap());

    let mut mock = MockRng::new();
    db.install(handle, RngProtocol::GUID, ptr::from_mut(&mut mock).cast())
        .unwrap();
    assert!(db.is_installed(handle, &RngProtocol::GUID).unwrap());
}

#[cfg(feature = "alloc")]
#[test]
fn supported_algorithms_grows_list() {
    let mut mock = MockRng::new();
    let mut db = ProtocolDatabase::new();
    let handle = common::publish(&mut db, RngProtocol::GUID, &mut mock);

    {
        let mut rng = unsafe { db.resolve::<Rng>(handle) }.unwrap();
        assert_eq!(
            rng.supported_algorithms().unwrap(),
            [
                RngAlgorithmType::ALGORITHM_RAW,
                RngAlgorithmType::ALGORITHM_SP800_90_CTR_256,
            ]
        );
    }

    // One sizing call on the empty list, then the real one.
    assert_eq!(mock.calls, 2);
}
