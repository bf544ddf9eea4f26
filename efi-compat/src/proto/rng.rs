// SPDX-License-Identifier: MIT OR Apache-2.0

//! `Rng` protocol.

use crate::proto::unsafe_protocol;
use crate::{Result, Status, StatusExt};
use core::ptr;
use efi_compat_raw::protocol::rng::RngProtocol;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

pub use efi_compat_raw::protocol::rng::RngAlgorithmType;

/// Random number generator protocol.
///
/// The algorithm is entirely up to the firmware; this type only moves bytes.
#[derive(Debug)]
#[repr(transparent)]
#[unsafe_protocol(RngProtocol::GUID)]
pub struct Rng(RngProtocol);

impl Rng {
    /// Returns information about the random number generation implementation.
    ///
    /// On success the filled prefix of `algorithm_list` is returned.
    ///
    /// # Errors
    ///
    /// - [`Status::BUFFER_TOO_SMALL`] if `algorithm_list` cannot hold every
    ///   algorithm. The error data is the number of entries required.
    /// - [`Status::UNSUPPORTED`] if the firmware does not report its
    ///   algorithms.
    /// - [`Status::DEVICE_ERROR`] on a hardware or firmware failure.
    pub fn get_info<'buf>(
        &mut self,
        algorithm_list: &'buf mut [RngAlgorithmType],
    ) -> Result<&'buf [RngAlgorithmType], Option<usize>> {
        let entry_size = size_of::<RngAlgorithmType>();
        let mut algorithm_list_size = algorithm_list.len() * entry_size;

        unsafe {
            (self.0.get_info)(
                &mut self.0,
                &mut algorithm_list_size,
                algorithm_list.as_mut_ptr(),
            )
        }
        .to_sized_result(algorithm_list_size.div_ceil(entry_size))?;

        let len = (algorithm_list_size / entry_size).min(algorithm_list.len());
        Ok(&algorithm_list[..len])
    }

    /// Returns the list of supported algorithms, sized to fit.
    ///
    /// # Errors
    ///
    /// See [`get_info`]; a too-small buffer is handled here.
    ///
    /// [`get_info`]: Self::get_info
    #[cfg(feature = "alloc")]
    pub fn supported_algorithms(&mut self) -> Result<Vec<RngAlgorithmType>> {
        let mut list = Vec::new();
        loop {
            match self.get_info(&mut list).map(<[_]>::len) {
                Ok(len) => {
                    list.truncate(len);
                    return Ok(list);
                }
                Err(err) => match *err.data() {
                    Some(required) if required > list.len() => {
                        list.resize(required, RngAlgorithmType::EMPTY_ALGORITHM);
                    }
                    _ => return Err(Error::from(err.status())),
                },
            }
        }
    }

    /// Fills `buffer` with random bytes.
    ///
    /// With `algorithm` set to `None` the firmware picks its default
    /// algorithm. A named algorithm the firmware does not implement is an
    /// error, never a silent substitution.
    ///
    /// # Errors
    ///
    /// - [`Status::INVALID_PARAMETER`] if `buffer` is empty.
    /// - [`Status::UNSUPPORTED`] if `algorithm` is not supported.
    /// - [`Status::NOT_READY`] if not enough entropy is available yet.
    /// - [`Status::DEVICE_ERROR`] on a hardware or firmware failure.
    pub fn get_rng(&mut self, algorithm: Option<RngAlgorithmType>, buffer: &mut [u8]) -> Result {
        if buffer.is_empty() {
            return Err(Status::INVALID_PARAMETER.into());
        }

        let algo = algorithm.as_ref().map_or(ptr::null(), ptr::from_ref);

        unsafe { (self.0.get_rng)(&mut self.0, algo, buffer.len(), buffer.as_mut_ptr()) }
            .to_result()
    }
}
