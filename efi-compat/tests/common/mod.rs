// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpers for publishing mock interfaces.

#![allow(dead_code)]

use core::ffi::c_void;
use core::ptr;
use efi_compat::registry::ProtocolDatabase;
use efi_compat::{Guid, Handle};

/// A handle no other call returns.
pub fn new_handle() -> Handle {
    let slot = Box::leak(Box::new(0u8));
    unsafe { Handle::from_ptr(ptr::from_mut(slot).cast()) }.unwrap()
}

/// Install `mock` on a fresh handle under `guid`.
///
/// The mock must begin with the raw protocol table and be `#[repr(C)]`.
pub fn publish<T>(db: &mut ProtocolDatabase, guid: Guid, mock: &mut T) -> Handle {
    let handle = new_handle();
    db.install(handle, guid, ptr::from_mut(mock).cast::<c_void>())
        .unwrap();
    handle
}
