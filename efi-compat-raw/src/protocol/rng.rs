// SPDX-License-Identifier: MIT OR Apache-2.0

//! `EFI_RNG_PROTOCOL`.

use crate::{guid, Guid, Status};

newtype_enum! {
    /// Identifier of a random number generation algorithm.
    ///
    /// The algorithms listed are optional and not exhaustive; vendors may
    /// report others.
    pub enum RngAlgorithmType: Guid => {
        /// Placeholder value, used to initialize a buffer for `get_info`.
        EMPTY_ALGORITHM = guid!("00000000-0000-0000-0000-000000000000"),

        /// Entropy directly from the source, without going through a
        /// deterministic random bit generator.
        ALGORITHM_RAW = guid!("e43176d7-b6e8-4827-b784-7ffdc4b68561"),

        /// NIST SP 800-90 Hash_DRBG using SHA-256.
        ALGORITHM_SP800_90_HASH_256 = guid!("a7af67cb-603b-4d42-ba21-70bfb6293f96"),

        /// NIST SP 800-90 HMAC_DRBG using SHA-256.
        ALGORITHM_SP800_90_HMAC_256 = guid!("c5149b43-ae85-4f53-9982-b94335d3a9e7"),

        /// NIST SP 800-90 CTR_DRBG using AES-256.
        ALGORITHM_SP800_90_CTR_256 = guid!("44f0de6e-4d8c-4045-a8c7-4dd168856b9e"),

        /// ANSI X9.31 using 3DES.
        ALGORITHM_X9_31_3DES = guid!("63c4785a-ca34-4012-a3c8-0b6a324f5546"),

        /// ANSI X9.31 using AES.
        ALGORITHM_X9_31_AES = guid!("acd03321-777e-4d3d-b1c8-20cfd88820c9"),
    }
}

/// Random number generator protocol.
///
/// The corresponding C type is `EFI_RNG_PROTOCOL`.
#[derive(Debug)]
#[repr(C)]
pub struct RngProtocol {
    /// Writes the supported algorithms to `algorithm_list`. On input
    /// `algorithm_list_size` is the buffer size in bytes; on output it is
    /// the size of the full list, also when [`Status::BUFFER_TOO_SMALL`] is
    /// returned.
    pub get_info: unsafe extern "efiapi" fn(
        this: *mut Self,
        algorithm_list_size: *mut usize,
        algorithm_list: *mut RngAlgorithmType,
    ) -> Status,

    /// Fills `value` with `value_length` random bytes. `algorithm` may be
    /// null to let the firmware pick.
    pub get_rng: unsafe extern "efiapi" fn(
        this: *mut Self,
        algorithm: *const RngAlgorithmType,
        value_length: usize,
        value: *mut u8,
    ) -> Status,
}

impl RngProtocol {
    pub const GUID: Guid = guid!("3152bca5-eade-433d-862e-c01cdc291f44");
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::offset_of;

    #[test]
    fn test_layout() {
        assert_eq!(size_of::<RngAlgorithmType>(), 16);
        assert_eq!(offset_of!(RngProtocol, get_info), 0);
        assert_eq!(offset_of!(RngProtocol, get_rng), size_of::<usize>());
    }

    #[test]
    fn test_algorithm_guid_bytes() {
        // C notation: {0xe43176d7, 0xb6e8, 0x4827, {0xb7, 0x84, 0x7f, 0xfd, 0xc4, 0xb6, 0x85, 0x61}}
        assert_eq!(
            RngAlgorithmType::ALGORITHM_RAW.0.to_bytes(),
            [
                0xd7, 0x76, 0x31, 0xe4, 0xe8, 0xb6, 0x27, 0x48, 0xb7, 0x84, 0x7f, 0xfd, 0xc4, 0xb6,
                0x85, 0x61,
            ]
        );
    }
}
