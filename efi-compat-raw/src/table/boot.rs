// SPDX-License-Identifier: MIT OR Apache-2.0

//! Boot services used to look up protocol interfaces.
//!
//! Only the signatures are defined here. The boot services table itself
//! comes from whichever toolkit the caller builds against; the caller copies
//! the function pointer out of it.

use crate::{Guid, Handle, Status};
use core::ffi::c_void;

/// Signature of `EFI_BOOT_SERVICES.HandleProtocol`.
///
/// Queries `handle` for the interface installed under `protocol`. On success
/// the interface pointer is written to `interface`. Firmware returns
/// [`Status::UNSUPPORTED`] when the handle does not carry the protocol.
pub type HandleProtocolFn = unsafe extern "efiapi" fn(
    handle: Handle,
    protocol: *const Guid,
    interface: *mut *mut c_void,
) -> Status;
