// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw interface for optional UEFI protocols.
//!
//! Baseline firmware toolkits ship without several protocols that boot
//! software still wants to call when the firmware happens to provide them.
//! This crate supplies their descriptor tables, GUIDs and data structures
//! with the exact memory layout the firmware expects.
//!
//! Nothing here is safe to call directly. The [`efi-compat`] crate wraps
//! these tables in safe types.
//!
//! [`efi-compat`]: https://crates.io/crates/efi-compat

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![deny(
    clippy::all,
    clippy::missing_const_for_fn,
    clippy::must_use_candidate,
    clippy::ptr_as_ptr,
    clippy::use_self,
    missing_debug_implementations,
    unused
)]

#[macro_use]
mod enums;

pub mod protocol;
pub mod table;

mod status;

pub use status::Status;
pub use uguid::{guid, Guid};

use core::ffi::c_void;

/// Handle to an event structure.
pub type Event = *mut c_void;

/// Handle to a UEFI entity (protocol, image, etc).
pub type Handle = *mut c_void;

/// Two-byte character.
///
/// Unless otherwise noted, the encoding is UCS-2.
pub type Char16 = u16;

/// Physical memory address. This is always a 64-bit value, regardless
/// of target platform.
pub type PhysicalAddress = u64;

/// ABI-compatible UEFI boolean.
///
/// This is similar to a `bool`, but allows values other than 0 or 1 to be
/// stored without it being undefined behavior.
///
/// Any non-zero value is treated as logically `true`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Ord, PartialOrd, Eq, Hash)]
#[repr(transparent)]
pub struct Boolean(pub u8);

impl Boolean {
    /// [`Boolean`] representing `true`.
    pub const TRUE: Self = Self(1);

    /// [`Boolean`] representing `false`.
    pub const FALSE: Self = Self(0);
}

impl From<bool> for Boolean {
    fn from(value: bool) -> Self {
        if value {
            Self::TRUE
        } else {
            Self::FALSE
        }
    }
}

impl From<Boolean> for bool {
    fn from(value: Boolean) -> Self {
        value.0 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_abi() {
        assert_eq!(size_of::<Boolean>(), 1);
        assert_eq!(Boolean::from(true), Boolean::TRUE);
        assert_eq!(Boolean::from(false), Boolean::FALSE);
        assert!(!bool::from(Boolean(0)));
        assert!(bool::from(Boolean(1)));
        // Any bit pattern other than zero is true, as in C.
        assert!(bool::from(Boolean(0b1111_1110)));
    }
}
