// SPDX-License-Identifier: MIT OR Apache-2.0

//! [TCG] protocol for [TPM] 1.1 and 1.2.
//!
//! Defined in the [TCG EFI Protocol Specification _for TPM Family 1.1 or
//! 1.2_][spec].
//!
//! [spec]: https://trustedcomputinggroup.org/resource/tcg-efi-protocol-specification/
//! [TCG]: https://trustedcomputinggroup.org/
//! [TPM]: https://en.wikipedia.org/wiki/Trusted_Platform_Module

use super::EventType;
use crate::{guid, Guid, PhysicalAddress, Status};
use core::ffi::c_void;

/// Size of a SHA-1 digest, the only digest the legacy log carries.
pub const SHA1_DIGEST_SIZE: usize = 20;

/// Information about the protocol and the TPM device.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct TcgBootServiceCapability {
    pub size: u8,
    pub structure_version: TcgVersion,
    pub protocol_spec_version: TcgVersion,
    pub hash_algorithm_bitmap: u8,
    pub tpm_present_flag: u8,
    pub tpm_deactivated_flag: u8,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct TcgVersion {
    pub major: u8,
    pub minor: u8,
    pub rev_major: u8,
    pub rev_minor: u8,
}

/// Fixed part of a `TCG_PCR_EVENT`. The event data follows immediately.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TcgPcrEventHeader {
    pub pcr_index: u32,
    pub event_type: EventType,
    pub digest: [u8; SHA1_DIGEST_SIZE],
    pub event_size: u32,
}

/// Protocol for interacting with TPM 1.1 and 1.2 devices.
///
/// The corresponding C type is `EFI_TCG_PROTOCOL`.
#[derive(Debug)]
#[repr(C)]
pub struct TcgProtocol {
    pub status_check: unsafe extern "efiapi" fn(
        this: *mut Self,
        protocol_capability: *mut TcgBootServiceCapability,
        feature_flags: *mut u32,
        event_log_location: *mut PhysicalAddress,
        event_log_last_entry: *mut PhysicalAddress,
    ) -> Status,

    pub hash_all: unsafe extern "efiapi" fn(
        this: *mut Self,
        hash_data: *const u8,
        hash_data_len: u64,
        algorithm_id: u32,
        hashed_data_len: *mut u64,
        hashed_data_result: *mut *mut u8,
    ) -> Status,

    pub log_event: unsafe extern "efiapi" fn(
        this: *mut Self,
        event: *const c_void,
        event_number: *mut u32,
        flags: u32,
    ) -> Status,

    pub pass_through_to_tpm: unsafe extern "efiapi" fn(
        this: *mut Self,
        tpm_input_parameter_block_size: u32,
        tpm_input_parameter_block: *const u8,
        tpm_output_parameter_block_size: u32,
        tpm_output_parameter_block: *mut u8,
    ) -> Status,

    pub hash_log_extend_event: unsafe extern "efiapi" fn(
        this: *mut Self,
        hash_data: PhysicalAddress,
        hash_data_len: u64,
        algorithm_id: u32,
        event: *mut c_void,
        event_number: *mut u32,
        event_log_last_entry: *mut PhysicalAddress,
    ) -> Status,
}

impl TcgProtocol {
    pub const GUID: Guid = guid!("f541796d-a62e-4954-a775-9584f61b9cdd");

    /// `log_event` flag: record the event without extending a PCR.
    pub const LOG_EVENT_NO_EXTEND: u32 = 0x1;
}
