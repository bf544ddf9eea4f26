// SPDX-License-Identifier: MIT OR Apache-2.0

//! `EFI_DT_FIXUP_PROTOCOL`.
//!
//! Lets firmware apply board-specific fixups to a flattened device tree
//! supplied by the loader before it is installed as a configuration table.

use crate::{guid, Guid, Status};
use bitflags::bitflags;
use core::ffi::c_void;

bitflags! {
    /// Actions requested from [`DtFixupProtocol::fixup`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[repr(transparent)]
    pub struct DtFixupFlags: u32 {
        /// Apply the firmware's fixups to the tree.
        const APPLY_FIXUPS = 0x0000_0001;
        /// Add memory reservations for regions the firmware owns.
        const RESERVE_MEMORY = 0x0000_0002;
    }
}

#[derive(Debug)]
#[repr(C)]
pub struct DtFixupProtocol {
    pub revision: u64,

    /// On [`Status::BUFFER_TOO_SMALL`], `buffer_size` holds the size the
    /// tree needs to grow to.
    pub fixup: unsafe extern "efiapi" fn(
        this: *mut Self,
        fdt: *mut c_void,
        buffer_size: *mut usize,
        flags: DtFixupFlags,
    ) -> Status,
}

impl DtFixupProtocol {
    pub const GUID: Guid = guid!("e617d64c-fe08-46da-f4dc-bbd5870c7300");

    /// Revision implemented by this definition.
    pub const REVISION: u64 = 0x0001_0000;
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::offset_of;

    #[test]
    fn test_layout() {
        assert_eq!(offset_of!(DtFixupProtocol, revision), 0);
        assert_eq!(offset_of!(DtFixupProtocol, fixup), 8);
        assert_eq!(size_of::<DtFixupFlags>(), 4);
    }

    #[test]
    fn test_flags() {
        assert_eq!(DtFixupFlags::APPLY_FIXUPS.bits(), 1);
        assert_eq!(DtFixupFlags::RESERVE_MEMORY.bits(), 2);
        assert_eq!(
            (DtFixupFlags::APPLY_FIXUPS | DtFixupFlags::RESERVE_MEMORY).bits(),
            3
        );
    }
}
