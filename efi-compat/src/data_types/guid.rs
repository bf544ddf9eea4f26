// SPDX-License-Identifier: MIT OR Apache-2.0

pub use uguid::Guid;

/// Associates a type with the GUID firmware knows it by.
///
/// Implemented for every protocol wrapper via the [`unsafe_protocol`]
/// macro; there is rarely a reason to implement it by hand.
///
/// # Safety
///
/// The GUID is used to reinterpret firmware memory as `Self`. Attaching
/// the GUID of a different interface to a type is undefined behavior as
/// soon as that type is resolved.
///
/// [`unsafe_protocol`]: crate::proto::unsafe_protocol
pub unsafe trait Identify {
    /// Unique identifier of the interface.
    const GUID: Guid;
}
