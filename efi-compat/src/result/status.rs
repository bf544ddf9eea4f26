// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{Error, Result};
use core::fmt::Debug;

pub use efi_compat_raw::Status;

/// Conversions from a firmware [`Status`] to a [`Result`].
///
/// Only [`Status::SUCCESS`] becomes `Ok`. Warnings and errors both become
/// `Err` with the status embedded.
pub trait StatusExt {
    /// Converts this status into a `Result<()>`.
    fn to_result(self) -> Result;

    /// Like [`to_result`], with `val` producing the `Ok` value.
    ///
    /// [`to_result`]: Self::to_result
    fn to_result_with_val<T>(self, val: impl FnOnce() -> T) -> Result<T, ()>;

    /// Like [`to_result`], with `err` producing the error data.
    ///
    /// [`to_result`]: Self::to_result
    fn to_result_with_err<ErrData: Debug>(
        self,
        err: impl FnOnce(Status) -> ErrData,
    ) -> Result<(), ErrData>;

    /// Combination of [`to_result_with_val`] and [`to_result_with_err`].
    ///
    /// [`to_result_with_val`]: Self::to_result_with_val
    /// [`to_result_with_err`]: Self::to_result_with_err
    fn to_result_with<T, ErrData: Debug>(
        self,
        val: impl FnOnce() -> T,
        err: impl FnOnce(Status) -> ErrData,
    ) -> Result<T, ErrData>;

    /// Result of the first phase of a two-phase call.
    ///
    /// On [`Status::BUFFER_TOO_SMALL`] the error data is `Some(required)`,
    /// for any other failure it is `None`.
    fn to_sized_result(self, required: usize) -> Result<(), Option<usize>>;
}

impl StatusExt for Status {
    #[inline]
    fn to_result(self) -> Result {
        self.to_result_with_val(|| ())
    }

    #[inline]
    fn to_result_with_val<T>(self, val: impl FnOnce() -> T) -> Result<T, ()> {
        self.to_result_with(val, |_| ())
    }

    #[inline]
    fn to_result_with_err<ErrData: Debug>(
        self,
        err: impl FnOnce(Status) -> ErrData,
    ) -> Result<(), ErrData> {
        self.to_result_with(|| (), err)
    }

    #[inline]
    fn to_result_with<T, ErrData: Debug>(
        self,
        val: impl FnOnce() -> T,
        err: impl FnOnce(Status) -> ErrData,
    ) -> Result<T, ErrData> {
        if self.is_success() {
            Ok(val())
        } else {
            Err(Error::new(self, err(self)))
        }
    }

    #[inline]
    fn to_sized_result(self, required: usize) -> Result<(), Option<usize>> {
        self.to_result_with_err(|status| (status == Self::BUFFER_TOO_SMALL).then_some(required))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_to_result() {
        assert!(Status::SUCCESS.to_result().is_ok());
        assert!(Status::WARN_STALE_DATA.to_result().is_err());
        assert_eq!(
            Status::NOT_FOUND.to_result().unwrap_err().status(),
            Status::NOT_FOUND
        );

        assert_eq!(Status::SUCCESS.to_result_with_val(|| 7).unwrap(), 7);
        assert!(Status::NOT_READY.to_result_with_val(|| 7).is_err());

        assert_eq!(
            *Status::DEVICE_ERROR
                .to_result_with(|| 1, |_| 2)
                .unwrap_err()
                .data(),
            2
        );
        assert_eq!(
            Status::UNSUPPORTED
                .to_result_with_err(|status| status)
                .unwrap_err()
                .split(),
            (Status::UNSUPPORTED, Status::UNSUPPORTED)
        );
    }

    #[test]
    fn test_sized_result() {
        assert_eq!(Status::SUCCESS.to_sized_result(10), Ok(()));
        assert_eq!(
            *Status::BUFFER_TOO_SMALL
                .to_sized_result(10)
                .unwrap_err()
                .data(),
            Some(10)
        );
        assert_eq!(
            *Status::INVALID_PARAMETER
                .to_sized_result(10)
                .unwrap_err()
                .data(),
            None
        );
    }
}
