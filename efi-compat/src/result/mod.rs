// SPDX-License-Identifier: MIT OR Apache-2.0

//! Facilities for dealing with firmware operation results.

use core::fmt::Debug;

/// The error type: a status code plus optional additional data.
mod error;
pub use self::error::Error;

/// Conversion from firmware status codes.
mod status;
pub use self::status::{Status, StatusExt};

/// Return type of the protocol wrappers.
///
/// [`Status::SUCCESS`] maps to `Ok`. Both warnings and errors map to
/// `Err`, carrying `ErrData` when the call has something to report beyond
/// the status. Two-phase calls use this to return the required buffer size
/// alongside [`Status::BUFFER_TOO_SMALL`].
pub type Result<Output = (), ErrData = ()> = core::result::Result<Output, Error<ErrData>>;

/// Extension trait which provides some convenience methods for [`Result`].
pub trait ResultExt<Output, ErrData: Debug> {
    /// Extract the status from this result.
    fn status(&self) -> Status;

    /// Drop the error data, keeping only the status.
    fn discard_errdata(self) -> Result<Output>;

    /// Calls `op` if the result contains a warning, otherwise returns
    /// the result unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use efi_compat::{Result, ResultExt, Status};
    ///
    /// # fn x() -> efi_compat::Result {
    /// # let some_result: Result = Err(Status::WARN_STALE_DATA.into());
    /// // Accept stale data, propagate everything else.
    /// some_result.handle_warning(|err| {
    ///     if err.status() == Status::WARN_STALE_DATA {
    ///         Ok(())
    ///     } else {
    ///         Err(err)
    ///     }
    /// })?;
    /// # Ok(())
    /// # }
    /// # x().unwrap();
    /// ```
    fn handle_warning<O>(self, op: O) -> Result<Output, ErrData>
    where
        O: FnOnce(Error<ErrData>) -> Result<Output, ErrData>;
}

impl<Output, ErrData: Debug> ResultExt<Output, ErrData> for Result<Output, ErrData> {
    fn status(&self) -> Status {
        match self {
            Ok(_) => Status::SUCCESS,
            Err(e) => e.status(),
        }
    }

    fn discard_errdata(self) -> Result<Output> {
        self.map_err(|e| e.status().into())
    }

    fn handle_warning<O>(self, op: O) -> Result<Output, ErrData>
    where
        O: FnOnce(Error<ErrData>) -> Result<Output, ErrData>,
    {
        match self {
            Err(err) if err.status().is_warning() => op(err),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_ext() {
        let ok: Result<u8, usize> = Ok(1);
        assert_eq!(ok.status(), Status::SUCCESS);

        let err: Result<u8, usize> = Err(Error::new(Status::BUFFER_TOO_SMALL, 64));
        assert_eq!(err.status(), Status::BUFFER_TOO_SMALL);
        assert_eq!(
            err.discard_errdata().unwrap_err(),
            Error::from(Status::BUFFER_TOO_SMALL)
        );

        let warn: Result<u8> = Err(Status::WARN_STALE_DATA.into());
        assert_eq!(warn.handle_warning(|_| Ok(2)), Ok(2));

        let hard: Result<u8> = Err(Status::DEVICE_ERROR.into());
        assert_eq!(
            hard.handle_warning(|_| Ok(2)).status(),
            Status::DEVICE_ERROR
        );
    }
}
