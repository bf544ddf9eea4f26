// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic data types shared by the protocol wrappers.

use core::ffi::c_void;
use core::ptr::NonNull;

/// Opaque handle to a firmware entity that protocols are installed on,
/// guaranteed to be non-null.
///
/// Use `Option<Handle>` where firmware allows a null handle.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(transparent)]
pub struct Handle(NonNull<c_void>);

impl Handle {
    /// Creates a [`Handle`] from a raw pointer received from firmware.
    ///
    /// Returns `None` if `ptr` is null.
    ///
    /// # Safety
    ///
    /// The pointer must be a handle issued by the firmware (or by the
    /// [`ProtocolDatabase`] the handle will be used with). Operations on an
    /// invalid handle may cause undefined behavior in firmware.
    ///
    /// [`ProtocolDatabase`]: crate::registry::ProtocolDatabase
    pub unsafe fn from_ptr(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    /// Get the underlying raw pointer.
    #[must_use]
    pub const fn as_ptr(&self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// Handle to a firmware event, guaranteed to be non-null.
///
/// The event is owned by whoever created it. For the extended input
/// protocol that is the firmware, and the event stays valid for as long as
/// the protocol is installed.
#[repr(transparent)]
#[derive(Debug, Eq, PartialEq)]
pub struct Event(NonNull<c_void>);

impl Event {
    /// Create an `Event` from a raw pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the pointer is a valid event.
    pub unsafe fn from_ptr(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    /// Clone this `Event`.
    ///
    /// # Safety
    ///
    /// Closing an event invalidates every copy of it. The caller must not
    /// use a clone after the event has been closed.
    #[must_use]
    pub const unsafe fn unsafe_clone(&self) -> Self {
        Self(self.0)
    }

    /// Get the underlying raw pointer.
    #[must_use]
    pub const fn as_ptr(&self) -> *mut c_void {
        self.0.as_ptr()
    }
}

mod guid;
pub use self::guid::{Guid, Identify};

pub use efi_compat_raw::{Char16, PhysicalAddress};
