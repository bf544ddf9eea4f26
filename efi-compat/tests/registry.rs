// SPDX-License-Identifier: MIT OR Apache-2.0

mod common;

use core::ffi::c_void;
use core::ptr;
use efi_compat::proto::console::text::InputEx;
use efi_compat::proto::dt_fixup::DtFixup;
use efi_compat::proto::rng::Rng;
use efi_compat::proto::tcg::v2;
use efi_compat::registry::{FirmwareRegistry, ProtocolRegistry};
use efi_compat::{Guid, Identify, Status};
use efi_compat_raw::protocol::console::SimpleTextInputExProtocol;
use efi_compat_raw::protocol::dt_fixup::DtFixupProtocol;
use efi_compat_raw::protocol::tcg::v2::Tcg2Protocol;

/// Reports the handle itself as the device-tree fixup interface. Other
/// protocols exercise the firmware's failure modes.
unsafe extern "efiapi" fn handle_protocol(
    handle: efi_compat_raw::Handle,
    protocol: *const Guid,
    interface: *mut *mut c_void,
) -> Status {
    let guid = unsafe { *protocol };
    let (status, found) = if guid == DtFixupProtocol::GUID {
        (Status::SUCCESS, handle)
    } else if guid == Tcg2Protocol::GUID {
        (Status::SUCCESS, ptr::null_mut())
    } else if guid == SimpleTextInputExProtocol::GUID {
        (Status::DEVICE_ERROR, ptr::null_mut())
    } else {
        (Status::UNSUPPORTED, ptr::null_mut())
    };
    unsafe { interface.write(found) };
    status
}

fn firmware() -> FirmwareRegistry {
    unsafe { FirmwareRegistry::new(handle_protocol) }
}

#[test]
fn firmware_lookup() {
    let registry = firmware();
    let handle = common::new_handle();

    let interface = registry.resolve_raw(handle, &DtFixup::GUID).unwrap();
    assert_eq!(interface.as_ptr(), handle.as_ptr());
    // Lookups are repeatable.
    assert_eq!(
        registry.resolve_raw(handle, &DtFixup::GUID).unwrap(),
        interface
    );
    assert!(registry.is_installed(handle, &DtFixup::GUID).unwrap());

    let fixup = unsafe { registry.resolve_optional::<DtFixup>(handle) }
        .unwrap()
        .unwrap();
    assert_eq!(fixup.as_ptr().cast::<c_void>(), handle.as_ptr());
}

#[test]
fn firmware_unsupported_is_not_found() {
    let registry = firmware();
    let handle = common::new_handle();

    assert_eq!(
        registry.resolve_raw(handle, &Rng::GUID).unwrap_err().status(),
        Status::NOT_FOUND
    );
    assert!(!registry.is_installed(handle, &Rng::GUID).unwrap());
    assert!(unsafe { registry.resolve_optional::<Rng>(handle) }
        .unwrap()
        .is_none());
}

#[test]
fn firmware_null_interface_is_not_found() {
    let registry = firmware();
    let handle = common::new_handle();

    assert_eq!(
        unsafe { registry.resolve::<v2::Tcg>(handle) }
            .unwrap_err()
            .status(),
        Status::NOT_FOUND
    );
    assert!(unsafe { registry.resolve_optional::<v2::Tcg>(handle) }
        .unwrap()
        .is_none());
}

#[test]
fn firmware_errors_propagate() {
    let registry = firmware();
    let handle = common::new_handle();

    assert_eq!(
        unsafe { registry.resolve_optional::<InputEx>(handle) }
            .unwrap_err()
            .status(),
        Status::DEVICE_ERROR
    );
    assert_eq!(
        registry
            .is_installed(handle, &InputEx::GUID)
            .unwrap_err()
            .status(),
        Status::DEVICE_ERROR
    );
}
