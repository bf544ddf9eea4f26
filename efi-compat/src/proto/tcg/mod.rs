// SPDX-License-Identifier: MIT OR Apache-2.0

//! [TCG] (Trusted Computing Group) protocols.
//!
//! These protocols provide access to the [TPM] (Trusted Platform Module).
//!
//! There are two generations of the protocol. The legacy protocol in the
//! [`v1`] module is used with TPM 1.1 and 1.2 devices. The current protocol
//! in the [`v2`] module is generally provided for TPM 2.0 devices. The two
//! have disjoint types; code that only needs to record measurements can use
//! [`Measurement`] and the [`MeasurementProtocol`] trait to stay agnostic
//! of the generation.
//!
//! [TCG]: https://trustedcomputinggroup.org/
//! [TPM]: https://en.wikipedia.org/wiki/Trusted_Platform_Module

pub mod v1;
pub mod v2;

mod measure;
pub use measure::{Measurement, MeasurementProtocol, TcgGeneration};

pub use efi_compat_raw::protocol::tcg::v2::Tcg2HashAlgorithmBitmap as HashAlgorithm;
pub use efi_compat_raw::protocol::tcg::{AlgorithmId, EventType};

/// Platform Configuration Register (PCR) index.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct PcrIndex(pub u32);

impl From<u32> for PcrIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}
