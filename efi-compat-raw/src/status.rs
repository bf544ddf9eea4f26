// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt::Debug;

newtype_enum! {
/// Status code returned by every protocol function.
///
/// Firmware may return implementation-specific codes, so the constants
/// below are not an exhaustive list. Only the codes the protocols in this
/// crate are documented to produce are named.
#[must_use]
pub enum Status: usize => {
    /// The operation completed successfully.
    SUCCESS                 =  0,

    /// The resulting buffer was too small, and the data was truncated.
    WARN_BUFFER_TOO_SMALL   =  4,
    /// The data has not been updated within the timeframe set by local policy.
    WARN_STALE_DATA         =  5,

    /// A parameter was incorrect.
    INVALID_PARAMETER       = Self::ERROR_BIT |  2,
    /// The operation is not supported.
    UNSUPPORTED             = Self::ERROR_BIT |  3,
    /// The buffer was not the proper size for the request.
    BAD_BUFFER_SIZE         = Self::ERROR_BIT |  4,
    /// The buffer is not large enough to hold the requested data.
    /// The required buffer size is returned in the appropriate parameter.
    BUFFER_TOO_SMALL        = Self::ERROR_BIT |  5,
    /// There is no data pending upon return.
    NOT_READY               = Self::ERROR_BIT |  6,
    /// The physical device reported an error while attempting the operation.
    DEVICE_ERROR            = Self::ERROR_BIT |  7,
    /// A resource has run out.
    OUT_OF_RESOURCES        = Self::ERROR_BIT |  9,
    /// The item was not found.
    NOT_FOUND               = Self::ERROR_BIT | 14,
    /// Access was denied.
    ACCESS_DENIED           = Self::ERROR_BIT | 15,
    /// The timeout time expired.
    TIMEOUT                 = Self::ERROR_BIT | 18,
    /// The protocol has already been started.
    ALREADY_STARTED         = Self::ERROR_BIT | 20,
    /// The operation was aborted.
    ABORTED                 = Self::ERROR_BIT | 21,
    /// A protocol error occurred during the operation.
    PROTOCOL_ERROR          = Self::ERROR_BIT | 24,
    /// The function encountered an internal version that was
    /// incompatible with a version requested by the caller.
    INCOMPATIBLE_VERSION    = Self::ERROR_BIT | 25,
    /// The function was not performed due to a security violation.
    SECURITY_VIOLATION      = Self::ERROR_BIT | 26,
}}

impl Status {
    /// Bit indicating that a status code is an error.
    pub const ERROR_BIT: usize = 1 << (usize::BITS - 1);

    /// Returns true if status code indicates success.
    #[inline]
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// Returns true if status code indicates a warning.
    #[inline]
    #[must_use]
    pub fn is_warning(self) -> bool {
        (self != Self::SUCCESS) && (self.0 & Self::ERROR_BIT == 0)
    }

    /// Returns true if the status code indicates an error.
    #[inline]
    #[must_use]
    pub const fn is_error(self) -> bool {
        self.0 & Self::ERROR_BIT != 0
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::format;

    #[test]
    fn test_status_classes() {
        assert!(Status::SUCCESS.is_success());
        assert!(!Status::SUCCESS.is_warning());
        assert!(!Status::SUCCESS.is_error());

        assert!(Status::WARN_BUFFER_TOO_SMALL.is_warning());
        assert!(!Status::WARN_BUFFER_TOO_SMALL.is_error());

        for status in [
            Status::NOT_FOUND,
            Status::BUFFER_TOO_SMALL,
            Status::UNSUPPORTED,
            Status::NOT_READY,
            Status::DEVICE_ERROR,
            Status::INVALID_PARAMETER,
        ] {
            assert!(status.is_error(), "{status}");
            assert!(!status.is_warning(), "{status}");
        }
    }

    #[test]
    fn test_status_debug() {
        assert_eq!(format!("{:?}", Status::BUFFER_TOO_SMALL), "BUFFER_TOO_SMALL");
        assert_eq!(format!("{}", Status::NOT_READY), "NOT_READY");
        assert_eq!(format!("{:?}", Status(3)), "Status(3)");
    }
}
