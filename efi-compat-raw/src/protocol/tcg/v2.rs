// SPDX-License-Identifier: MIT OR Apache-2.0

//! [TCG] protocol for [TPM] 2.0.
//!
//! Defined in the [TCG EFI Protocol Specification _TPM Family 2.0_][spec].
//! Firmware also publishes this protocol for older TPMs in some cases.
//!
//! [spec]: https://trustedcomputinggroup.org/resource/tcg-efi-protocol-specification/
//! [TCG]: https://trustedcomputinggroup.org/
//! [TPM]: https://en.wikipedia.org/wiki/Trusted_Platform_Module

use super::EventType;
use crate::{guid, Guid, PhysicalAddress, Status};
use bitflags::bitflags;
use core::ffi::c_void;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct Tcg2Version {
    pub major: u8,
    pub minor: u8,
}

bitflags! {
    /// Event log formats supported by the firmware.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
    #[repr(transparent)]
    pub struct Tcg2EventLogBitmap: u32 {
        /// SHA-1 only log, same entries as the legacy protocol.
        const TCG_1_2 = 0x0000_0001;

        /// Crypto-agile log.
        const TCG_2 = 0x0000_0002;
    }
}

/// A single event log format, passed to `get_event_log`.
pub type Tcg2EventLogFormat = Tcg2EventLogBitmap;

bitflags! {
    /// Hash algorithms, as used for both supported and active PCR banks.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
    #[repr(transparent)]
    pub struct Tcg2HashAlgorithmBitmap: u32 {
        const SHA1 = 0x0000_0001;
        const SHA256 = 0x0000_0002;
        const SHA384 = 0x0000_0004;
        const SHA512 = 0x0000_0008;
        const SM3_256 = 0x0000_0010;
    }
}

/// Information about the protocol and the TPM device.
///
/// Firmware implementing structure version 1.0 fills in only the leading
/// [`TreeBootServiceCapability`] part; `size` tells the two apart.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct Tcg2BootServiceCapability {
    /// Size of this structure.
    pub size: u8,
    pub structure_version: Tcg2Version,
    pub protocol_version: Tcg2Version,
    pub hash_algorithm_bitmap: Tcg2HashAlgorithmBitmap,
    pub supported_event_logs: Tcg2EventLogBitmap,
    pub tpm_present_flag: u8,

    /// Maximum size (in bytes) of a command that can be sent to the TPM.
    pub max_command_size: u16,

    /// Maximum size (in bytes) of a response the TPM can produce.
    pub max_response_size: u16,

    /// See the [TCG Vendor ID registry].
    ///
    /// [TCG Vendor ID registry]: https://trustedcomputinggroup.org/resource/vendor-id-registry/
    pub manufacturer_id: u32,

    /// Maximum number of PCR banks (hashing algorithms).
    pub number_of_pcr_banks: u32,

    /// Subset of [`hash_algorithm_bitmap`] currently active.
    ///
    /// [`hash_algorithm_bitmap`]: Self::hash_algorithm_bitmap
    pub active_pcr_banks: Tcg2HashAlgorithmBitmap,
}

/// Capability structure of protocol structure version 1.0 (`TREE_BOOT_SERVICE_CAPABILITY`).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct TreeBootServiceCapability {
    pub size: u8,
    pub structure_version: Tcg2Version,
    pub protocol_version: Tcg2Version,
    pub hash_algorithm_bitmap: Tcg2HashAlgorithmBitmap,
    pub supported_event_logs: Tcg2EventLogBitmap,
    pub tpm_present_flag: u8,
    pub max_command_size: u16,
    pub max_response_size: u16,
    pub manufacturer_id: u32,
}

bitflags! {
    /// Flags for [`Tcg2Protocol::hash_log_extend_event`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
    #[repr(transparent)]
    pub struct Tcg2HashLogExtendEventFlags: u64 {
        /// Extend a PCR but don't log the event.
        const EFI_TCG2_EXTEND_ONLY = 0x0000_0000_0000_0001;

        /// The data is a PE/COFF image; firmware hashes it per Authenticode.
        const PE_COFF_IMAGE = 0x0000_0000_0000_0010;
    }
}

/// Current value of [`Tcg2EventHeader::header_version`].
pub const TCG2_EVENT_HEADER_VERSION: u16 = 1;

/// `EFI_TCG2_EVENT_HEADER`. Byte packed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(C, packed)]
pub struct Tcg2EventHeader {
    pub header_size: u32,
    pub header_version: u16,
    pub pcr_index: u32,
    pub event_type: EventType,
}

/// Fixed part of `EFI_TCG2_EVENT`. Byte packed; event data follows.
///
/// `size` covers this prefix and the event data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(C, packed)]
pub struct Tcg2Event {
    pub size: u32,
    pub header: Tcg2EventHeader,
}

/// The corresponding C type is `EFI_TCG2_PROTOCOL`.
#[derive(Debug)]
#[repr(C)]
pub struct Tcg2Protocol {
    pub get_capability: unsafe extern "efiapi" fn(
        this: *mut Self,
        protocol_capability: *mut Tcg2BootServiceCapability,
    ) -> Status,

    pub get_event_log: unsafe extern "efiapi" fn(
        this: *mut Self,
        event_log_format: Tcg2EventLogFormat,
        event_log_location: *mut PhysicalAddress,
        event_log_last_entry: *mut PhysicalAddress,
        event_log_truncated: *mut u8,
    ) -> Status,

    pub hash_log_extend_event: unsafe extern "efiapi" fn(
        this: *mut Self,
        flags: Tcg2HashLogExtendEventFlags,
        data_to_hash: PhysicalAddress,
        data_to_hash_len: u64,
        event: *const c_void,
    ) -> Status,

    pub submit_command: unsafe extern "efiapi" fn(
        this: *mut Self,
        input_parameter_block_size: u32,
        input_parameter_block: *const u8,
        output_parameter_block_size: u32,
        output_parameter_block: *mut u8,
    ) -> Status,

    pub get_active_pcr_banks: unsafe extern "efiapi" fn(
        this: *mut Self,
        active_pcr_banks: *mut Tcg2HashAlgorithmBitmap,
    ) -> Status,

    pub set_active_pcr_banks: unsafe extern "efiapi" fn(
        this: *mut Self,
        active_pcr_banks: Tcg2HashAlgorithmBitmap,
    ) -> Status,

    pub get_result_of_set_active_pcr_banks: unsafe extern "efiapi" fn(
        this: *mut Self,
        operation_present: *mut u32,
        response: *mut u32,
    ) -> Status,
}

impl Tcg2Protocol {
    pub const GUID: Guid = guid!("607f766c-7455-42be-930b-e4d76db2720f");
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::offset_of;

    #[test]
    fn test_packed_event_layout() {
        assert_eq!(size_of::<Tcg2EventHeader>(), 14);
        assert_eq!(offset_of!(Tcg2EventHeader, header_version), 4);
        assert_eq!(offset_of!(Tcg2EventHeader, pcr_index), 6);
        assert_eq!(offset_of!(Tcg2EventHeader, event_type), 10);

        assert_eq!(size_of::<Tcg2Event>(), 18);
        assert_eq!(offset_of!(Tcg2Event, header), 4);
    }

    #[test]
    fn test_capability_layout() {
        assert_eq!(size_of::<Tcg2BootServiceCapability>(), 36);
        assert_eq!(offset_of!(Tcg2BootServiceCapability, hash_algorithm_bitmap), 8);
        assert_eq!(offset_of!(Tcg2BootServiceCapability, tpm_present_flag), 16);
        assert_eq!(offset_of!(Tcg2BootServiceCapability, max_command_size), 18);
        assert_eq!(offset_of!(Tcg2BootServiceCapability, manufacturer_id), 24);
        assert_eq!(offset_of!(Tcg2BootServiceCapability, active_pcr_banks), 32);

        // The 1.0 shape is a strict prefix.
        assert_eq!(size_of::<TreeBootServiceCapability>(), 28);
        assert_eq!(
            offset_of!(TreeBootServiceCapability, manufacturer_id),
            offset_of!(Tcg2BootServiceCapability, manufacturer_id)
        );
    }

    #[test]
    fn test_protocol_layout() {
        let ptr = size_of::<usize>();
        assert_eq!(offset_of!(Tcg2Protocol, get_event_log), ptr);
        assert_eq!(offset_of!(Tcg2Protocol, hash_log_extend_event), 2 * ptr);
        assert_eq!(offset_of!(Tcg2Protocol, submit_command), 3 * ptr);
        assert_eq!(offset_of!(Tcg2Protocol, get_active_pcr_banks), 4 * ptr);
        assert_eq!(offset_of!(Tcg2Protocol, set_active_pcr_banks), 5 * ptr);
        assert_eq!(offset_of!(Tcg2Protocol, get_result_of_set_active_pcr_banks), 6 * ptr);
        assert_eq!(size_of::<Tcg2Protocol>(), 7 * ptr);
    }
}
