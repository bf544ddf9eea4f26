// SPDX-License-Identifier: MIT OR Apache-2.0

//! Device-tree fixup protocol.
//!
//! Firmware uses this to patch a flattened device tree (FDT) supplied by
//! the loader with board-specific information before the tree is handed to
//! the operating system. The blob's contents are opaque to this crate.

use crate::proto::unsafe_protocol;
use crate::{Error, Result, Status, StatusExt};
use efi_compat_raw::protocol::dt_fixup::DtFixupProtocol;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

pub use efi_compat_raw::protocol::dt_fixup::DtFixupFlags;

/// Device-tree fixup protocol.
#[derive(Debug)]
#[repr(transparent)]
#[unsafe_protocol(DtFixupProtocol::GUID)]
pub struct DtFixup(DtFixupProtocol);

impl DtFixup {
    /// Revision reported by the firmware, for comparison with
    /// [`DtFixupProtocol::REVISION`].
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.0.revision
    }

    /// Applies the requested fixups to the tree in `fdt`, in place.
    ///
    /// The flags are independent: [`DtFixupFlags::APPLY_FIXUPS`] patches
    /// the tree and [`DtFixupFlags::RESERVE_MEMORY`] adds memory
    /// reservations. Applying the same fixups twice leaves the tree as it
    /// was after the first time.
    ///
    /// The slice may extend past the end of the tree; the spare room is
    /// what the tree can grow into.
    ///
    /// # Errors
    ///
    /// - [`Status::BUFFER_TOO_SMALL`] if the fixed-up tree does not fit in
    ///   `fdt`. The error data is the buffer size required; grow the buffer
    ///   and try again.
    /// - [`Status::INVALID_PARAMETER`] if `fdt` is empty or does not hold a
    ///   valid device tree.
    /// - [`Status::UNSUPPORTED`] if the firmware cannot perform the request.
    pub fn fixup(&mut self, fdt: &mut [u8], flags: DtFixupFlags) -> Result<(), Option<usize>> {
        if fdt.is_empty() {
            return Err(Error::new(Status::INVALID_PARAMETER, None));
        }

        let mut buffer_size = fdt.len();
        unsafe { (self.0.fixup)(&mut self.0, fdt.as_mut_ptr().cast(), &mut buffer_size, flags) }
            .to_sized_result(buffer_size)
    }

    /// Like [`fixup`], but grows `fdt` with zeroes until the tree fits.
    ///
    /// # Errors
    ///
    /// See [`fixup`]. [`Status::BUFFER_TOO_SMALL`] is only returned if the
    /// firmware asks for a size no larger than the buffer it was given.
    ///
    /// [`fixup`]: Self::fixup
    #[cfg(feature = "alloc")]
    pub fn fixup_vec(&mut self, fdt: &mut Vec<u8>, flags: DtFixupFlags) -> Result {
        loop {
            match self.fixup(fdt, flags) {
                Ok(()) => return Ok(()),
                Err(err) => match *err.data() {
                    Some(required) if required > fdt.len() => {
                        log::debug!(
                            "growing device tree buffer from {} to {required} bytes",
                            fdt.len()
                        );
                        fdt.resize(required, 0);
                    }
                    _ => return Err(Error::from(err.status())),
                },
            }
        }
    }
}
