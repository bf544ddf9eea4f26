// SPDX-License-Identifier: MIT OR Apache-2.0

//! [TCG] (Trusted Computing Group) measurement protocols.
//!
//! Two generations exist. The legacy protocol in [`v1`] targets TPM 1.1
//! and 1.2 devices. The current protocol in [`v2`] is what firmware ships
//! for TPM 2.0. The two share no structures apart from the enums in this
//! module.
//!
//! [TCG]: https://trustedcomputinggroup.org/

pub mod v1;
pub mod v2;

mod enums;
pub use enums::*;

#[cfg(test)]
mod tests {
    use crate::protocol::console::SimpleTextInputExProtocol;
    use crate::protocol::dt_fixup::DtFixupProtocol;
    use crate::protocol::rng::RngProtocol;
    use crate::table::configuration::ConfigTableEntry;
    use crate::Guid;

    #[test]
    fn test_guids_pairwise_distinct() {
        let guids: [Guid; 6] = [
            RngProtocol::GUID,
            SimpleTextInputExProtocol::GUID,
            DtFixupProtocol::GUID,
            super::v1::TcgProtocol::GUID,
            super::v2::Tcg2Protocol::GUID,
            ConfigTableEntry::DEVICE_TREE_GUID,
        ];
        for (i, a) in guids.iter().enumerate() {
            for b in &guids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_guid_wire_bytes() {
        // First three groups are stored little-endian.
        assert_eq!(
            super::v2::Tcg2Protocol::GUID.to_bytes(),
            [
                0x6c, 0x76, 0x7f, 0x60, 0x55, 0x74, 0xbe, 0x42, 0x93, 0x0b, 0xe4, 0xd7, 0x6d, 0xb2,
                0x72, 0x0f
            ]
        );
        assert_eq!(
            DtFixupProtocol::GUID.to_bytes(),
            [
                0x4c, 0xd6, 0x17, 0xe6, 0x08, 0xfe, 0xda, 0x46, 0xf4, 0xdc, 0xbb, 0xd5, 0x87, 0x0c,
                0x73, 0x00
            ]
        );
    }
}
