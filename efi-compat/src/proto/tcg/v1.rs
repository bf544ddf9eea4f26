// SPDX-License-Identifier: MIT OR Apache-2.0

//! [TCG] (Trusted Computing Group) protocol for [TPM] (Trusted Platform
//! Module) 1.1 and 1.2.
//!
//! This protocol is defined in the [TCG EFI Protocol Specification _for
//! TPM Family 1.1 or 1.2_][spec].
//!
//! [spec]: https://trustedcomputinggroup.org/resource/tcg-efi-protocol-specification/
//! [TCG]: https://trustedcomputinggroup.org/
//! [TPM]: https://en.wikipedia.org/wiki/Trusted_Platform_Module

use super::{AlgorithmId, EventType, HashAlgorithm, PcrIndex};
use crate::data_types::PhysicalAddress;
use crate::layout::{Decoder, Encoder, Layout, WireFormat};
use crate::proto::unsafe_protocol;
use crate::util::{u32_len, usize_from_u32};
use crate::{Error, Result, Status, StatusExt};
use core::slice;
use efi_compat_raw::protocol::tcg::v1::{
    TcgBootServiceCapability, TcgProtocol, SHA1_DIGEST_SIZE,
};

pub use efi_compat_raw::protocol::tcg::v1::TcgVersion as Version;

/// 20-byte SHA-1 digest.
pub type Sha1Digest = [u8; SHA1_DIGEST_SIZE];

/// Information about the protocol and the TPM device.
///
/// Layout compatible with the C type `TCG_EFI_BOOT_SERVICE_CAPABILITY`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
#[repr(transparent)]
pub struct BootServiceCapability(TcgBootServiceCapability);

impl BootServiceCapability {
    /// Version of the `BootServiceCapability` structure.
    #[must_use]
    pub const fn structure_version(&self) -> Version {
        self.0.structure_version
    }

    /// Version of the `Tcg` protocol.
    #[must_use]
    pub const fn protocol_spec_version(&self) -> Version {
        self.0.protocol_spec_version
    }

    /// Supported hash algorithms. Expected to be just SHA-1, but any other
    /// bits firmware sets are kept.
    #[must_use]
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::from_bits_retain(u32::from(self.0.hash_algorithm_bitmap))
    }

    /// Whether the TPM device is present.
    #[must_use]
    pub const fn tpm_present(&self) -> bool {
        self.0.tpm_present_flag != 0
    }

    /// Whether the TPM device is deactivated.
    #[must_use]
    pub const fn tpm_deactivated(&self) -> bool {
        self.0.tpm_deactivated_flag != 0
    }
}

impl From<TcgBootServiceCapability> for BootServiceCapability {
    fn from(raw: TcgBootServiceCapability) -> Self {
        Self(raw)
    }
}

fn encode_version(enc: &mut Encoder<'_>, version: Version) {
    enc.bytes(&[
        version.major,
        version.minor,
        version.rev_major,
        version.rev_minor,
    ]);
}

fn decode_version(dec: &mut Decoder<'_>) -> Option<Version> {
    let [major, minor, rev_major, rev_minor] = dec.array()?;
    Some(Version {
        major,
        minor,
        rev_major,
        rev_minor,
    })
}

impl WireFormat for BootServiceCapability {
    const LAYOUT: Layout = Layout::Natural;
    const SIZE: usize = 12;

    fn encode(&self, enc: &mut Encoder<'_>) {
        enc.u8(self.0.size);
        encode_version(enc, self.0.structure_version);
        encode_version(enc, self.0.protocol_spec_version);
        enc.u8(self.0.hash_algorithm_bitmap);
        enc.u8(self.0.tpm_present_flag);
        enc.u8(self.0.tpm_deactivated_flag);
    }

    fn decode(dec: &mut Decoder<'_>) -> Option<Self> {
        Some(Self(TcgBootServiceCapability {
            size: dec.u8()?,
            structure_version: decode_version(dec)?,
            protocol_spec_version: decode_version(dec)?,
            hash_algorithm_bitmap: dec.u8()?,
            tpm_present_flag: dec.u8()?,
            tpm_deactivated_flag: dec.u8()?,
        }))
    }
}

/// Fixed part of a [`PcrEvent`].
///
/// Layout compatible with the C type `TCG_PCR_EVENT` minus its trailing
/// event data.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PcrEventHeader {
    pcr_index: PcrIndex,
    event_type: EventType,
    digest: Sha1Digest,
    event_size: u32,
}

impl PcrEventHeader {
    /// PCR index for the event.
    #[must_use]
    pub const fn pcr_index(&self) -> PcrIndex {
        self.pcr_index
    }

    /// Type of event.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.event_type
    }

    /// SHA-1 digest of the data hashed for this event.
    #[must_use]
    pub const fn digest(&self) -> Sha1Digest {
        self.digest
    }

    /// Size of the event data following the header.
    #[must_use]
    pub const fn event_size(&self) -> u32 {
        self.event_size
    }
}

impl WireFormat for PcrEventHeader {
    const LAYOUT: Layout = Layout::Natural;
    const SIZE: usize = 32;

    fn encode(&self, enc: &mut Encoder<'_>) {
        enc.u32(self.pcr_index.0);
        enc.u32(self.event_type.0);
        enc.bytes(&self.digest);
        enc.u32(self.event_size);
    }

    fn decode(dec: &mut Decoder<'_>) -> Option<Self> {
        Some(Self {
            pcr_index: PcrIndex(dec.u32()?),
            event_type: EventType(dec.u32()?),
            digest: dec.array()?,
            event_size: dec.u32()?,
        })
    }
}

/// Entry in the [`EventLog`], or an event to be logged.
///
/// Naming note: "event data" is used in two conflicting ways: the
/// `event_data` field and the data hashed in the digest field. These two
/// are independent; although the event data _can_ be what is hashed in the
/// digest field, it doesn't have to be.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PcrEvent<'a> {
    header: PcrEventHeader,
    event_data: &'a [u8],
}

impl<'a> PcrEvent<'a> {
    /// Create an event from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`Status::INVALID_PARAMETER`] if `event_data` is larger than
    /// the log format can express.
    pub fn new(
        pcr_index: PcrIndex,
        event_type: EventType,
        digest: Sha1Digest,
        event_data: &'a [u8],
    ) -> Result<Self> {
        let event_size = u32_len(event_data).map_err(|_| Error::from(Status::INVALID_PARAMETER))?;
        Ok(Self {
            header: PcrEventHeader {
                pcr_index,
                event_type,
                digest,
                event_size,
            },
            event_data,
        })
    }

    /// Parse the event at the start of `bytes`, returning it and its size
    /// in bytes.
    pub(super) fn parse(bytes: &'a [u8]) -> Option<(Self, usize)> {
        let header = PcrEventHeader::read_from(bytes).ok()?;
        let size = PcrEventHeader::SIZE.checked_add(usize_from_u32(header.event_size))?;
        let event_data = bytes.get(PcrEventHeader::SIZE..size)?;
        Some((Self { header, event_data }, size))
    }

    /// Fixed part of the event.
    #[must_use]
    pub const fn header(&self) -> PcrEventHeader {
        self.header
    }

    /// PCR index for the event.
    #[must_use]
    pub const fn pcr_index(&self) -> PcrIndex {
        self.header.pcr_index
    }

    /// Type of event, indicating what type of data is stored in [`event_data`].
    ///
    /// [`event_data`]: Self::event_data
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.header.event_type
    }

    /// SHA-1 digest of the data hashed for this event.
    #[must_use]
    pub const fn digest(&self) -> Sha1Digest {
        self.header.digest
    }

    /// Raw event data. The meaning of this data can be determined from
    /// the [`event_type`].
    ///
    /// [`event_type`]: Self::event_type
    #[must_use]
    pub const fn event_data(&self) -> &'a [u8] {
        self.event_data
    }

    /// Serialized size: the header plus the event data.
    #[must_use]
    pub const fn size(&self) -> usize {
        PcrEventHeader::SIZE + self.event_data.len()
    }

    /// Serialize the event into the start of `buf`, ready to be passed to
    /// the protocol.
    ///
    /// # Errors
    ///
    /// Returns [`Status::BUFFER_TOO_SMALL`] with the required size if `buf`
    /// is too short. `buf` is not modified in that case.
    pub fn write_into<'b>(&self, buf: &'b mut [u8]) -> Result<PcrEventBuf<'b>, usize> {
        let size = self.size();
        let Some(bytes) = buf.get_mut(..size) else {
            return Err(Error::new(Status::BUFFER_TOO_SMALL, size));
        };

        let (head, data) = bytes.split_at_mut(PcrEventHeader::SIZE);
        self.header.write_to(head)?;
        data.copy_from_slice(self.event_data);

        Ok(PcrEventBuf {
            header: self.header,
            bytes,
        })
    }
}

/// A serialized [`PcrEvent`] in caller-provided storage.
///
/// The firmware writes the digest back into this buffer when the event is
/// passed to [`Tcg::hash_log_extend_event`].
#[derive(Debug)]
pub struct PcrEventBuf<'b> {
    header: PcrEventHeader,
    bytes: &'b mut [u8],
}

impl PcrEventBuf<'_> {
    const DIGEST_OFFSET: usize = 8;

    /// The serialized event.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes
    }

    /// PCR index for the event.
    #[must_use]
    pub const fn pcr_index(&self) -> PcrIndex {
        self.header.pcr_index
    }

    /// Type of event.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.header.event_type
    }

    /// Digest currently stored in the buffer.
    #[must_use]
    pub fn digest(&self) -> Sha1Digest {
        let mut digest = [0; SHA1_DIGEST_SIZE];
        digest.copy_from_slice(
            &self.bytes[Self::DIGEST_OFFSET..Self::DIGEST_OFFSET + SHA1_DIGEST_SIZE],
        );
        digest
    }

    /// Event data stored in the buffer.
    #[must_use]
    pub fn event_data(&self) -> &[u8] {
        &self.bytes[PcrEventHeader::SIZE..]
    }
}

/// TPM event log.
///
/// This type of event log always uses SHA-1 hashes. The [`v1::Tcg`]
/// protocol always uses this type of event log, but it can also be
/// provided by the [`v2::Tcg`] protocol via [`get_event_log_v1`].
///
/// [`v1::Tcg`]: Tcg
/// [`v2::Tcg`]: super::v2::Tcg
/// [`get_event_log_v1`]: super::v2::Tcg::get_event_log_v1
#[derive(Clone, Copy, Debug)]
pub struct EventLog<'a> {
    bytes: &'a [u8],
    is_truncated: bool,
}

impl<'a> EventLog<'a> {
    /// Event log stored in `bytes`, which must start at the first event
    /// and end after the last one.
    #[must_use]
    pub const fn from_bytes(bytes: &'a [u8], is_truncated: bool) -> Self {
        Self {
            bytes,
            is_truncated,
        }
    }

    /// Event log spanning firmware memory from `location` to the end of the
    /// event at `last_entry`.
    ///
    /// If either address is zero, or `last_entry` precedes `location`, the
    /// log is empty.
    ///
    /// # Safety
    ///
    /// Both addresses must come from the firmware, and the memory they
    /// describe must remain valid and unmodified for `'a`.
    pub(super) unsafe fn from_raw(
        location: PhysicalAddress,
        last_entry: PhysicalAddress,
        is_truncated: bool,
    ) -> Self {
        let entry_len = |last: *const u8| {
            let header = unsafe { slice::from_raw_parts(last, PcrEventHeader::SIZE) };
            let header = PcrEventHeader::read_from(header).ok()?;
            PcrEventHeader::SIZE.checked_add(usize_from_u32(header.event_size))
        };
        let bytes = unsafe { raw_log_bytes(location, last_entry, entry_len) };
        Self::from_bytes(bytes, is_truncated)
    }

    /// Iterator of events in the log.
    #[must_use]
    pub const fn iter(&self) -> EventLogIter<'a> {
        EventLogIter { rest: self.bytes }
    }

    /// The raw log.
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// If true, the event log is missing one or more entries because
    /// additional events would have exceeded the space allocated for
    /// the log.
    ///
    /// This value is not reported for the [`v1::Tcg`] protocol, so it
    /// is always `false` in that case.
    ///
    /// [`v1::Tcg`]: Tcg
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        self.is_truncated
    }
}

impl<'a> IntoIterator for &EventLog<'a> {
    type Item = PcrEvent<'a>;
    type IntoIter = EventLogIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrow the log between `location` and the end of the entry at
/// `last_entry`, whose size `entry_len` computes.
///
/// # Safety
///
/// See [`EventLog::from_raw`].
pub(super) unsafe fn raw_log_bytes<'a>(
    location: PhysicalAddress,
    last_entry: PhysicalAddress,
    entry_len: impl FnOnce(*const u8) -> Option<usize>,
) -> &'a [u8] {
    if location == 0 || last_entry < location {
        return &[];
    }
    let (Ok(start), Ok(last)) = (usize::try_from(location), usize::try_from(last_entry)) else {
        return &[];
    };

    let Some(len) = entry_len(last as *const u8).and_then(|len| (last - start).checked_add(len))
    else {
        return &[];
    };
    unsafe { slice::from_raw_parts(start as *const u8, len) }
}

/// Iterator for events in [`EventLog`].
///
/// Iteration stops at the first malformed entry.
#[derive(Clone, Debug)]
pub struct EventLogIter<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for EventLogIter<'a> {
    type Item = PcrEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let Some((event, size)) = PcrEvent::parse(self.rest) else {
            self.rest = &[];
            return None;
        };
        self.rest = self.rest.get(size..).unwrap_or(&[]);
        Some(event)
    }
}

/// Return type of [`Tcg::status_check`].
#[derive(Debug)]
pub struct StatusCheck<'a> {
    /// Information about the protocol and the TPM device.
    pub protocol_capability: BootServiceCapability,

    /// Feature flags. None are defined, so this is expected to be zero.
    pub feature_flags: u32,

    /// TPM event log.
    pub event_log: EventLog<'a>,
}

/// Return type of [`Tcg::hash_log_extend_event`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EventLogged {
    /// Sequence number firmware assigned to the new log entry.
    pub event_number: u32,

    /// Address of the last entry in the log, which is the new entry.
    pub last_entry: PhysicalAddress,
}

/// Protocol for interacting with TPM 1.1 and 1.2 devices.
#[derive(Debug)]
#[repr(transparent)]
#[unsafe_protocol(TcgProtocol::GUID)]
pub struct Tcg(TcgProtocol);

impl Tcg {
    /// Get information about the protocol and TPM device, as well as
    /// the TPM event log.
    ///
    /// This is the legacy generation's capability query.
    pub fn status_check(&mut self) -> Result<StatusCheck<'_>> {
        let mut protocol_capability = TcgBootServiceCapability::default();
        let mut feature_flags = 0;
        let mut event_log_location = 0;
        let mut event_log_last_entry = 0;

        unsafe {
            (self.0.status_check)(
                &mut self.0,
                &mut protocol_capability,
                &mut feature_flags,
                &mut event_log_location,
                &mut event_log_last_entry,
            )
        }
        .to_result()?;

        // The legacy protocol has no notion of a truncated log.
        let event_log =
            unsafe { EventLog::from_raw(event_log_location, event_log_last_entry, false) };

        Ok(StatusCheck {
            protocol_capability: BootServiceCapability(protocol_capability),
            feature_flags,
            event_log,
        })
    }

    /// Add an entry to the event log without extending a PCR, returning
    /// the event number.
    ///
    /// Usually [`hash_log_extend_event`] should be used instead. An
    /// entry added via `log_event` cannot be verified, so it is mainly
    /// intended for adding an informational entry.
    ///
    /// [`hash_log_extend_event`]: Self::hash_log_extend_event
    pub fn log_event(&mut self, event: &PcrEventBuf<'_>) -> Result<u32> {
        let mut event_number = 0;
        unsafe {
            (self.0.log_event)(
                &mut self.0,
                event.as_bytes().as_ptr().cast(),
                &mut event_number,
                TcgProtocol::LOG_EVENT_NO_EXTEND,
            )
        }
        .to_result_with_val(|| event_number)
    }

    /// Hash `data` with SHA-1, store the digest in `event`, extend the
    /// event's PCR with it and add the event to the log.
    ///
    /// The firmware performs all of this as one operation.
    ///
    /// # Errors
    ///
    /// - [`Status::BAD_BUFFER_SIZE`] if `data` is too large to describe.
    /// - [`Status::DEVICE_ERROR`] if the TPM or the firmware failed.
    /// - [`Status::OUT_OF_RESOURCES`] if the log is full.
    pub fn hash_log_extend_event(
        &mut self,
        event: &mut PcrEventBuf<'_>,
        data: &[u8],
    ) -> Result<EventLogged> {
        let hash_data_len =
            u64::try_from(data.len()).map_err(|_| Error::from(Status::BAD_BUFFER_SIZE))?;

        let mut event_number = 0;
        let mut last_entry = 0;
        unsafe {
            (self.0.hash_log_extend_event)(
                &mut self.0,
                data.as_ptr() as PhysicalAddress,
                hash_data_len,
                u32::from(AlgorithmId::SHA1.0),
                event.bytes.as_mut_ptr().cast(),
                &mut event_number,
                &mut last_entry,
            )
        }
        .to_result_with_val(|| EventLogged {
            event_number,
            last_entry,
        })
    }

    /// Send a command directly to the TPM.
    ///
    /// Constructing the input block and parsing the output block are outside
    /// the scope of this crate. See the [TPM 1.2 Main Specification][spec]
    /// documents for details of these blocks, in particular Part 3, Commands.
    ///
    /// Note that TPM structures are big endian.
    ///
    /// [spec]: https://trustedcomputinggroup.org/resource/tpm-main-specification/
    pub fn pass_through_to_tpm(
        &mut self,
        input_parameter_block: &[u8],
        output_parameter_block: &mut [u8],
    ) -> Result {
        let input_parameter_block_len = u32_len(input_parameter_block)?;
        let output_parameter_block_len = u32_len(output_parameter_block)?;

        unsafe {
            (self.0.pass_through_to_tpm)(
                &mut self.0,
                input_parameter_block_len,
                input_parameter_block.as_ptr(),
                output_parameter_block_len,
                output_parameter_block.as_mut_ptr(),
            )
        }
        .to_result()
    }
}
