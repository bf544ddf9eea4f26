// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Status;
use core::fmt::{self, Debug, Display};

/// An error: a non-success [`Status`] and optional extra data.
///
/// `Data` is `()` for most calls. Calls that size a buffer use it to report
/// how large the buffer needs to be.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Error<Data: Debug = ()> {
    status: Status,
    data: Data,
}

impl<Data: Debug> Error<Data> {
    /// Create an `Error`.
    ///
    /// `status` should not be [`Status::SUCCESS`]; that is a logic error in
    /// the caller.
    pub const fn new(status: Status, data: Data) -> Self {
        Self { status, data }
    }

    /// Get error `Status`.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Get error data.
    #[must_use]
    pub const fn data(&self) -> &Data {
        &self.data
    }

    /// Split this error into its inner status and error data.
    pub fn split(self) -> (Status, Data) {
        (self.status, self.data)
    }
}

impl From<Status> for Error<()> {
    fn from(status: Status) -> Self {
        Self { status, data: () }
    }
}

impl<Data: Debug> Display for Error<Data> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "firmware error {}", self.status)
    }
}

impl<Data: Debug> Error<Data> {
    /// Transforms the error data, keeping the status.
    pub fn map_data<U: Debug>(self, f: impl FnOnce(Data) -> U) -> Error<U> {
        Error {
            status: self.status,
            data: f(self.data),
        }
    }
}

impl<Data: Debug> core::error::Error for Error<Data> {}
