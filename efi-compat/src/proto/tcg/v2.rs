// SPDX-License-Identifier: MIT OR Apache-2.0

//! [TCG] (Trusted Computing Group) protocol for [TPM] (Trusted Platform
//! Module) 2.0.
//!
//! This protocol is defined in the [TCG EFI Protocol Specification _TPM
//! Family 2.0_][spec]. It is generally implemented only for TPM 2.0
//! devices, but it can also be used for older TPM devices.
//!
//! Events are submitted as [`PcrEventInputs`] (`EFI_TCG2_EVENT`) and read
//! back from the [`EventLog`] as [`PcrEvent`]s (`TCG_PCR_EVENT2`). The
//! submitted form is byte packed.
//!
//! [spec]: https://trustedcomputinggroup.org/resource/tcg-efi-protocol-specification/
//! [TCG]: https://trustedcomputinggroup.org/
//! [TPM]: https://en.wikipedia.org/wiki/Trusted_Platform_Module

use super::{v1, AlgorithmId, EventType, HashAlgorithm, PcrIndex};
use crate::data_types::PhysicalAddress;
use crate::layout::{Decoder, Encoder, Layout, WireFormat};
use crate::proto::unsafe_protocol;
use crate::util::{u32_len, usize_from_u32};
use crate::{Error, Result, Status, StatusExt};
use core::fmt::{self, Debug, Formatter};
use efi_compat_raw::protocol::tcg::v2::{
    Tcg2BootServiceCapability, Tcg2EventHeader, Tcg2Protocol, TCG2_EVENT_HEADER_VERSION,
};

pub use efi_compat_raw::protocol::tcg::v2::{
    Tcg2EventLogBitmap as EventLogFormat,
    Tcg2HashLogExtendEventFlags as HashLogExtendEventFlags, Tcg2Version as Version,
};

/// Information about the protocol and the TPM device.
///
/// Layout compatible with the C type `EFI_TCG2_BOOT_SERVICE_CAPABILITY`.
/// Firmware implementing structure version 1.0 fills in a shorter record
/// without the PCR bank fields; their accessors return `None` then.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub struct BootServiceCapability(Tcg2BootServiceCapability);

impl Default for BootServiceCapability {
    fn default() -> Self {
        Self(Tcg2BootServiceCapability {
            size: Self::FULL_SIZE,
            ..Tcg2BootServiceCapability::default()
        })
    }
}

impl BootServiceCapability {
    const FULL_SIZE: u8 = 36;
    const TREE_SIZE: usize = 28;

    /// Size of the record as reported by firmware.
    #[must_use]
    pub const fn size(&self) -> u8 {
        self.0.size
    }

    /// Version of the capability structure.
    #[must_use]
    pub const fn structure_version(&self) -> Version {
        self.0.structure_version
    }

    /// Version of the protocol.
    #[must_use]
    pub const fn protocol_version(&self) -> Version {
        self.0.protocol_version
    }

    /// Bitmap of supported hash algorithms.
    #[must_use]
    pub const fn hash_algorithm(&self) -> HashAlgorithm {
        self.0.hash_algorithm_bitmap
    }

    /// Event log formats supported by the firmware.
    #[must_use]
    pub const fn supported_event_logs(&self) -> EventLogFormat {
        self.0.supported_event_logs
    }

    /// Whether the TPM device is present.
    #[must_use]
    pub const fn tpm_present(&self) -> bool {
        self.0.tpm_present_flag != 0
    }

    /// Maximum size (in bytes) of a command that can be sent to the TPM.
    #[must_use]
    pub const fn max_command_size(&self) -> u16 {
        self.0.max_command_size
    }

    /// Maximum size (in bytes) of a response that can be provided by the TPM.
    #[must_use]
    pub const fn max_response_size(&self) -> u16 {
        self.0.max_response_size
    }

    /// Manufacturer ID.
    ///
    /// See the [TCG Vendor ID registry].
    ///
    /// [TCG Vendor ID registry]: https://trustedcomputinggroup.org/resource/vendor-id-registry/
    #[must_use]
    pub const fn manufacturer_id(&self) -> u32 {
        self.0.manufacturer_id
    }

    /// Whether the record carries the PCR bank fields. Records of structure
    /// version 1.0, or shorter than the full record, do not.
    #[must_use]
    pub const fn has_pcr_bank_info(&self) -> bool {
        let version = self.0.structure_version;
        !(version.major == 1 && version.minor == 0) && self.0.size >= Self::FULL_SIZE
    }

    /// Maximum number of PCR banks (hashing algorithms) supported.
    #[must_use]
    pub const fn number_of_pcr_banks(&self) -> Option<u32> {
        if self.has_pcr_bank_info() {
            Some(self.0.number_of_pcr_banks)
        } else {
            None
        }
    }

    /// Bitmap of currently-active PCR banks (hashing algorithms). This is a
    /// subset of the supported algorithms in [`hash_algorithm`].
    ///
    /// [`hash_algorithm`]: Self::hash_algorithm
    #[must_use]
    pub const fn active_pcr_banks(&self) -> Option<HashAlgorithm> {
        if self.has_pcr_bank_info() {
            Some(self.0.active_pcr_banks)
        } else {
            None
        }
    }
}

impl From<Tcg2BootServiceCapability> for BootServiceCapability {
    fn from(raw: Tcg2BootServiceCapability) -> Self {
        Self(raw)
    }
}

impl WireFormat for BootServiceCapability {
    const LAYOUT: Layout = Layout::Natural;
    const SIZE: usize = Self::FULL_SIZE as usize;

    fn encode(&self, enc: &mut Encoder<'_>) {
        let cap = &self.0;
        enc.u8(cap.size);
        enc.u8(cap.structure_version.major);
        enc.u8(cap.structure_version.minor);
        enc.u8(cap.protocol_version.major);
        enc.u8(cap.protocol_version.minor);
        enc.u32(cap.hash_algorithm_bitmap.bits());
        enc.u32(cap.supported_event_logs.bits());
        enc.u8(cap.tpm_present_flag);
        enc.u16(cap.max_command_size);
        enc.u16(cap.max_response_size);
        enc.u32(cap.manufacturer_id);
        enc.u32(cap.number_of_pcr_banks);
        enc.u32(cap.active_pcr_banks.bits());
    }

    /// Reads the 1.0 record (28 bytes) or the full one, depending on the
    /// version and size it declares.
    fn decode(dec: &mut Decoder<'_>) -> Option<Self> {
        let mut cap = Self(Tcg2BootServiceCapability {
            size: dec.u8()?,
            structure_version: Version {
                major: dec.u8()?,
                minor: dec.u8()?,
            },
            protocol_version: Version {
                major: dec.u8()?,
                minor: dec.u8()?,
            },
            hash_algorithm_bitmap: HashAlgorithm::from_bits_retain(dec.u32()?),
            supported_event_logs: EventLogFormat::from_bits_retain(dec.u32()?),
            tpm_present_flag: dec.u8()?,
            max_command_size: dec.u16()?,
            max_response_size: dec.u16()?,
            manufacturer_id: dec.u32()?,
            number_of_pcr_banks: 0,
            active_pcr_banks: HashAlgorithm::empty(),
        });
        debug_assert_eq!(dec.offset(), Self::TREE_SIZE);
        if cap.has_pcr_bank_info() {
            cap.0.number_of_pcr_banks = dec.u32()?;
            cap.0.active_pcr_banks = HashAlgorithm::from_bits_retain(dec.u32()?);
        }
        Some(cap)
    }
}

/// Header of an event submitted with [`Tcg::hash_log_extend_event`].
///
/// Layout compatible with the C type `EFI_TCG2_EVENT_HEADER`: byte packed,
/// 14 bytes, no padding.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub struct EventHeader(Tcg2EventHeader);

impl EventHeader {
    const HEADER_SIZE: u32 = 14;

    /// Header for an event of `event_type` to be measured into `pcr_index`.
    #[must_use]
    pub const fn new(pcr_index: PcrIndex, event_type: EventType) -> Self {
        Self(Tcg2EventHeader {
            header_size: Self::HEADER_SIZE,
            header_version: TCG2_EVENT_HEADER_VERSION,
            pcr_index: pcr_index.0,
            event_type,
        })
    }

    /// Wrap a raw header as-is.
    #[must_use]
    pub const fn from_raw(raw: Tcg2EventHeader) -> Self {
        Self(raw)
    }

    /// The raw header.
    #[must_use]
    pub const fn to_raw(self) -> Tcg2EventHeader {
        self.0
    }

    /// Size of the header as declared in it.
    #[must_use]
    pub const fn header_size(&self) -> u32 {
        self.0.header_size
    }

    /// Header version, currently always 1.
    #[must_use]
    pub const fn header_version(&self) -> u16 {
        self.0.header_version
    }

    /// PCR index for the event.
    #[must_use]
    pub const fn pcr_index(&self) -> PcrIndex {
        PcrIndex(self.0.pcr_index)
    }

    /// Type of event.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.0.event_type
    }
}

impl WireFormat for EventHeader {
    const LAYOUT: Layout = Layout::Packed;
    const SIZE: usize = 14;

    fn encode(&self, enc: &mut Encoder<'_>) {
        enc.u32(self.header_size());
        enc.u16(self.header_version());
        enc.u32(self.pcr_index().0);
        enc.u32(self.event_type().0);
    }

    fn decode(dec: &mut Decoder<'_>) -> Option<Self> {
        Some(Self(Tcg2EventHeader {
            header_size: dec.u32()?,
            header_version: dec.u16()?,
            pcr_index: dec.u32()?,
            event_type: EventType(dec.u32()?),
        }))
    }
}

/// Fixed part of an `EFI_TCG2_EVENT`: the total size followed by the
/// header. Byte packed, 18 bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EventPrefix {
    size: u32,
    header: EventHeader,
}

impl EventPrefix {
    /// Total size of the event, including this prefix.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Event header.
    #[must_use]
    pub const fn header(&self) -> EventHeader {
        self.header
    }
}

impl WireFormat for EventPrefix {
    const LAYOUT: Layout = Layout::Packed;
    const SIZE: usize = 4 + EventHeader::SIZE;

    fn encode(&self, enc: &mut Encoder<'_>) {
        enc.u32(self.size);
        self.header.encode(enc);
    }

    fn decode(dec: &mut Decoder<'_>) -> Option<Self> {
        Some(Self {
            size: dec.u32()?,
            header: EventHeader::decode(dec)?,
        })
    }
}

/// Event to be measured with [`Tcg::hash_log_extend_event`].
///
/// This is the header plus a separate event data slice; the two are only
/// joined when the event is serialized with [`write_into`].
///
/// [`write_into`]: Self::write_into
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PcrEventInputs<'a> {
    prefix: EventPrefix,
    event_data: &'a [u8],
}

impl<'a> PcrEventInputs<'a> {
    /// Create an event for `pcr_index` of `event_type`.
    ///
    /// # Errors
    ///
    /// Returns [`Status::INVALID_PARAMETER`] if the event is too large for
    /// its size field.
    pub fn new(pcr_index: PcrIndex, event_type: EventType, event_data: &'a [u8]) -> Result<Self> {
        let size = event_data
            .len()
            .checked_add(EventPrefix::SIZE)
            .and_then(|size| u32::try_from(size).ok())
            .ok_or(Error::from(Status::INVALID_PARAMETER))?;
        Ok(Self {
            prefix: EventPrefix {
                size,
                header: EventHeader::new(pcr_index, event_type),
            },
            event_data,
        })
    }

    /// Event header.
    #[must_use]
    pub const fn header(&self) -> EventHeader {
        self.prefix.header
    }

    /// Event data.
    #[must_use]
    pub const fn event_data(&self) -> &'a [u8] {
        self.event_data
    }

    /// Serialized size: prefix plus event data.
    #[must_use]
    pub const fn size(&self) -> usize {
        EventPrefix::SIZE + self.event_data.len()
    }

    /// Serialize the event into the start of `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`Status::BUFFER_TOO_SMALL`] with the required size if `buf`
    /// is too short. `buf` is not modified in that case.
    pub fn write_into<'b>(&self, buf: &'b mut [u8]) -> Result<PcrEventInputsBuf<'b>, usize> {
        let size = self.size();
        let Some(bytes) = buf.get_mut(..size) else {
            return Err(Error::new(Status::BUFFER_TOO_SMALL, size));
        };

        let (head, data) = bytes.split_at_mut(EventPrefix::SIZE);
        self.prefix.write_to(head)?;
        data.copy_from_slice(self.event_data);

        Ok(PcrEventInputsBuf {
            header: self.prefix.header,
            bytes,
        })
    }
}

/// A serialized [`PcrEventInputs`] in caller-provided storage.
#[derive(Debug)]
pub struct PcrEventInputsBuf<'b> {
    header: EventHeader,
    bytes: &'b [u8],
}

impl PcrEventInputsBuf<'_> {
    /// The serialized event.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8] {
        self.bytes
    }

    /// Event header.
    #[must_use]
    pub const fn header(&self) -> EventHeader {
        self.header
    }

    /// Event data.
    #[must_use]
    pub fn event_data(&self) -> &[u8] {
        &self.bytes[EventPrefix::SIZE..]
    }
}

fn le_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    let bytes = bytes.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Algorithm/digest size table from the log header: packed
/// `(algorithm_id: u16, digest_size: u16)` pairs.
#[derive(Clone, Copy, Debug)]
struct DigestSizes<'a>(&'a [u8]);

impl<'a> DigestSizes<'a> {
    const ENTRY_SIZE: usize = 4;

    fn entries(&self) -> impl Iterator<Item = (AlgorithmId, usize)> + 'a {
        let table: &'a [u8] = self.0;
        table.chunks_exact(Self::ENTRY_SIZE).map(|entry| {
            let alg = AlgorithmId(u16::from_le_bytes([entry[0], entry[1]]));
            (alg, usize::from(u16::from_le_bytes([entry[2], entry[3]])))
        })
    }

    fn get(&self, alg: AlgorithmId) -> Option<usize> {
        self.entries().find_map(|(id, size)| (id == alg).then_some(size))
    }
}

/// Header stored at the beginning of the crypto-agile log: a legacy-format
/// event whose data is a `TCG_EfiSpecIDEventStruct`.
#[derive(Clone, Copy, Debug)]
struct SpecIdHeader<'a> {
    platform_class: u32,
    // major, minor, errata
    spec_version: (u8, u8, u8),
    digest_sizes: DigestSizes<'a>,
    // Size of the whole header event, in bytes.
    size_in_bytes: usize,
}

impl<'a> SpecIdHeader<'a> {
    const SIGNATURE: &'static [u8; 16] = b"Spec ID Event03\0";
    const ALGORITHMS_OFFSET: usize = 28;

    fn parse(log: &'a [u8]) -> Option<Self> {
        let (event, size_in_bytes) = v1::PcrEvent::parse(log)?;
        if event.pcr_index() != PcrIndex(0)
            || event.event_type() != EventType::NO_ACTION
            || event.digest() != [0; 20]
        {
            return None;
        }

        let data = event.event_data();
        let mut dec = Decoder::new(data, Layout::Packed);
        if dec.array::<16>()? != *Self::SIGNATURE {
            return None;
        }
        let platform_class = dec.u32()?;
        let [minor, major, errata, _uintn_size] = dec.array()?;
        let number_of_algorithms = usize_from_u32(dec.u32()?);
        debug_assert_eq!(dec.offset(), Self::ALGORITHMS_OFFSET);
        let table = dec.bytes(number_of_algorithms.checked_mul(DigestSizes::ENTRY_SIZE)?)?;
        let vendor_info_size = usize::from(dec.u8()?);
        dec.bytes(vendor_info_size)?;

        Some(Self {
            platform_class,
            spec_version: (major, minor, errata),
            digest_sizes: DigestSizes(table),
            size_in_bytes,
        })
    }
}

/// TPM event log as returned by [`Tcg::get_event_log_v2`].
///
/// This type of event log can contain multiple hash types (e.g. SHA-1, SHA-256,
/// SHA-512, etc). The sizes of the digests are taken from the header event
/// at the start of the log; a log without a valid header has no events.
#[derive(Clone, Copy, Debug)]
pub struct EventLog<'a> {
    bytes: &'a [u8],
    is_truncated: bool,
}

impl<'a> EventLog<'a> {
    /// Event log stored in `bytes`, which must start at the header event
    /// and end after the last event.
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
    /// # Safety
    ///
    /// Both addresses must come from the firmware, and the memory they
    /// describe must remain valid and unmodified for `'a`.
    unsafe fn from_raw(
        location: PhysicalAddress,
        last_entry: PhysicalAddress,
        is_truncated: bool,
    ) -> Self {
        // The header is a legacy-format event; borrow exactly that first.
        let header_bytes = unsafe { v1::EventLog::from_raw(location, location, false) }.as_bytes();
        let Some(header) = SpecIdHeader::parse(header_bytes) else {
            return Self::from_bytes(&[], is_truncated);
        };
        if last_entry == location {
            return Self::from_bytes(header_bytes, is_truncated);
        }

        let entry_len = |last: *const u8| unsafe { raw_event_len(last, header.digest_sizes) };
        let bytes = unsafe { v1::raw_log_bytes(location, last_entry, entry_len) };
        Self::from_bytes(bytes, is_truncated)
    }

    fn header(&self) -> Option<SpecIdHeader<'a>> {
        SpecIdHeader::parse(self.bytes)
    }

    /// Iterator of events in the log, not including the header event.
    #[must_use]
    pub fn iter(&self) -> EventLogIter<'a> {
        match self.header() {
            Some(header) => EventLogIter {
                rest: self.bytes.get(header.size_in_bytes..).unwrap_or(&[]),
                digest_sizes: header.digest_sizes,
            },
            None => EventLogIter {
                rest: &[],
                digest_sizes: DigestSizes(&[]),
            },
        }
    }

    /// Hash algorithms the log carries digests for, in header order.
    pub fn algorithms(&self) -> impl Iterator<Item = AlgorithmId> + 'a {
        self.header()
            .into_iter()
            .flat_map(|header| header.digest_sizes.entries().map(|(alg, _)| alg))
    }

    /// Platform class declared in the log header.
    #[must_use]
    pub fn platform_class(&self) -> Option<u32> {
        self.header().map(|header| header.platform_class)
    }

    /// Log format version (major, minor, errata) declared in the header.
    #[must_use]
    pub fn spec_version(&self) -> Option<(u8, u8, u8)> {
        self.header().map(|header| header.spec_version)
    }

    /// The raw log, including the header event.
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Whether the event log is truncated due to not enough space in the log to
    /// contain some events.
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

/// Size of the `TCG_PCR_EVENT2` at `ptr`.
///
/// # Safety
///
/// `ptr` must point to a complete event in firmware memory.
unsafe fn raw_event_len(ptr: *const u8, digest_sizes: DigestSizes<'_>) -> Option<usize> {
    let read_u32 = |offset: usize| unsafe { ptr.add(offset).cast::<u32>().read_unaligned() };
    let read_u16 = |offset: usize| unsafe { ptr.add(offset).cast::<u16>().read_unaligned() };

    let mut len = 12;
    for _ in 0..u32::from_le(read_u32(8)) {
        let alg = AlgorithmId(u16::from_le(read_u16(len)));
        len += 2 + digest_sizes.get(alg)?;
    }
    let event_size = usize_from_u32(u32::from_le(read_u32(len)));
    (len + 4).checked_add(event_size)
}

/// Digests in a PCR event.
#[derive(Clone)]
pub struct PcrEventDigests<'a> {
    data: &'a [u8],
    digest_sizes: DigestSizes<'a>,
}

impl Debug for PcrEventDigests<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a> IntoIterator for PcrEventDigests<'a> {
    type Item = (AlgorithmId, &'a [u8]);
    type IntoIter = PcrEventDigestIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        PcrEventDigestIter {
            digests: self,
            offset: 0,
        }
    }
}

/// Iterator over a list of digests.
#[derive(Debug)]
pub struct PcrEventDigestIter<'a> {
    digests: PcrEventDigests<'a>,
    offset: usize,
}

impl<'a> Iterator for PcrEventDigestIter<'a> {
    type Item = (AlgorithmId, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let data = self.digests.data.get(self.offset..)?;
        let alg = AlgorithmId(le_u16(data, 0)?);
        let digest_size = self.digests.digest_sizes.get(alg)?;
        let digest = data.get(2..2 + digest_size)?;
        self.offset += 2 + digest_size;
        Some((alg, digest))
    }
}

/// PCR event from an [`EventLog`].
///
/// This corresponds to the C type `TCG_PCR_EVENT2`, but is a parsed view
/// rather than a layout-compatible struct.
#[derive(Debug)]
pub struct PcrEvent<'a> {
    pcr_index: PcrIndex,
    event_type: EventType,
    digests: PcrEventDigests<'a>,
    event_data: &'a [u8],
}

impl<'a> PcrEvent<'a> {
    /// Parse the event at the start of `bytes`, returning it and its size.
    fn parse(bytes: &'a [u8], digest_sizes: DigestSizes<'a>) -> Option<(Self, usize)> {
        let mut dec = Decoder::new(bytes, Layout::Packed);
        let pcr_index = PcrIndex(dec.u32()?);
        let event_type = EventType(dec.u32()?);
        let count = dec.u32()?;

        let digests_start = dec.offset();
        for _ in 0..count {
            let alg = AlgorithmId(dec.u16()?);
            dec.bytes(digest_sizes.get(alg)?)?;
        }
        let digests = bytes.get(digests_start..dec.offset())?;

        let event_size = usize_from_u32(dec.u32()?);
        let event_data = dec.bytes(event_size)?;

        let event = Self {
            pcr_index,
            event_type,
            digests: PcrEventDigests {
                data: digests,
                digest_sizes,
            },
            event_data,
        };
        Some((event, dec.offset()))
    }

    /// PCR index for the event.
    #[must_use]
    pub const fn pcr_index(&self) -> PcrIndex {
        self.pcr_index
    }

    /// Type of event, indicating what type of data is stored in [`event_data`].
    ///
    /// [`event_data`]: Self::event_data
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Raw event data. The meaning of this data can be determined from
    /// the [`event_type`].
    ///
    /// Note that this data is independent of what is hashed in [`digests`].
    ///
    /// [`digests`]: Self::digests
    /// [`event_type`]: Self::event_type
    #[must_use]
    pub const fn event_data(&self) -> &'a [u8] {
        self.event_data
    }

    /// Digests of the data hashed for this event.
    #[must_use]
    pub fn digests(&self) -> PcrEventDigests<'a> {
        self.digests.clone()
    }

    /// Digest for `alg`, if the event carries one.
    #[must_use]
    pub fn digest(&self, alg: AlgorithmId) -> Option<&'a [u8]> {
        self.digests()
            .into_iter()
            .find_map(|(id, digest)| (id == alg).then_some(digest))
    }
}

/// Iterator for events in [`EventLog`].
///
/// Iteration stops at the first malformed entry, including one that uses
/// an algorithm missing from the log header.
#[derive(Debug)]
pub struct EventLogIter<'a> {
    rest: &'a [u8],
    digest_sizes: DigestSizes<'a>,
}

impl<'a> Iterator for EventLogIter<'a> {
    type Item = PcrEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let Some((event, size)) = PcrEvent::parse(self.rest, self.digest_sizes) else {
            self.rest = &[];
            return None;
        };
        self.rest = self.rest.get(size..).unwrap_or(&[]);
        Some(event)
    }
}

/// Location of an event log as reported by firmware.
struct RawEventLog {
    location: PhysicalAddress,
    last_entry: PhysicalAddress,
    is_truncated: bool,
}

/// Protocol for interacting with TPM devices.
///
/// This protocol can be used for interacting with older TPM 1.1/1.2
/// devices, but most firmware only uses it for TPM 2.0.
#[derive(Debug)]
#[repr(transparent)]
#[unsafe_protocol(Tcg2Protocol::GUID)]
pub struct Tcg(Tcg2Protocol);

impl Tcg {
    /// Get information about the protocol and TPM device.
    pub fn get_capability(&mut self) -> Result<BootServiceCapability> {
        let mut capability = BootServiceCapability::default();
        unsafe { (self.0.get_capability)(&mut self.0, &mut capability.0) }.to_result()?;

        if !capability.has_pcr_bank_info() {
            log::debug!(
                "TCG2 capability is the {}-byte version {}.{} record, no PCR bank info",
                capability.size(),
                capability.structure_version().major,
                capability.structure_version().minor,
            );
        }
        Ok(capability)
    }

    fn get_event_log(&mut self, format: EventLogFormat) -> Result<RawEventLog> {
        let mut location = 0;
        let mut last_entry = 0;
        let mut truncated = 0;

        unsafe {
            (self.0.get_event_log)(
                &mut self.0,
                format,
                &mut location,
                &mut last_entry,
                &mut truncated,
            )
        }
        .to_result()?;

        let is_truncated = truncated != 0;
        if is_truncated {
            log::warn!("TPM event log ({format:?}) is truncated");
        }
        Ok(RawEventLog {
            location,
            last_entry,
            is_truncated,
        })
    }

    /// Get the V1 event log. This provides events in the same format as a V1
    /// TPM, so all events use SHA-1 hashes.
    pub fn get_event_log_v1(&mut self) -> Result<v1::EventLog<'_>> {
        let log = self.get_event_log(EventLogFormat::TCG_1_2)?;
        Ok(unsafe { v1::EventLog::from_raw(log.location, log.last_entry, log.is_truncated) })
    }

    /// Get the V2 event log. This format allows for a flexible list of hash types.
    pub fn get_event_log_v2(&mut self) -> Result<EventLog<'_>> {
        let log = self.get_event_log(EventLogFormat::TCG_2)?;
        Ok(unsafe { EventLog::from_raw(log.location, log.last_entry, log.is_truncated) })
    }

    /// Extend a PCR and add an entry to the event log.
    ///
    /// Firmware hashes `data_to_hash` with every active PCR bank's
    /// algorithm. With [`HashLogExtendEventFlags::EFI_TCG2_EXTEND_ONLY`] the
    /// PCR is extended but nothing is logged.
    ///
    /// # Errors
    ///
    /// - [`Status::BAD_BUFFER_SIZE`] if `data_to_hash` is too large to describe.
    /// - [`Status::DEVICE_ERROR`] if the TPM or the firmware failed.
    /// - [`Status::OUT_OF_RESOURCES`] if the log is full.
    pub fn hash_log_extend_event(
        &mut self,
        flags: HashLogExtendEventFlags,
        data_to_hash: &[u8],
        event: &PcrEventInputsBuf<'_>,
    ) -> Result {
        let data_len =
            u64::try_from(data_to_hash.len()).map_err(|_| Error::from(Status::BAD_BUFFER_SIZE))?;
        unsafe {
            (self.0.hash_log_extend_event)(
                &mut self.0,
                flags,
                data_to_hash.as_ptr() as PhysicalAddress,
                data_len,
                event.as_bytes().as_ptr().cast(),
            )
        }
        .to_result()
    }

    /// Send a command directly to the TPM.
    ///
    /// Constructing the input block and parsing the output block are outside
    /// the scope of this crate. See the [TPM 2.0 Specification][spec], in
    /// particular Part 2 (Structures) and Part 3 (Commands).
    ///
    /// Note that TPM structures are big endian.
    ///
    /// [spec]: https://trustedcomputinggroup.org/resource/tpm-library-specification/
    pub fn submit_command(
        &mut self,
        input_parameter_block: &[u8],
        output_parameter_block: &mut [u8],
    ) -> Result {
        let input_parameter_block_len = u32_len(input_parameter_block)?;
        let output_parameter_block_len = u32_len(output_parameter_block)?;

        unsafe {
            (self.0.submit_command)(
                &mut self.0,
                input_parameter_block_len,
                input_parameter_block.as_ptr(),
                output_parameter_block_len,
                output_parameter_block.as_mut_ptr(),
            )
        }
        .to_result()
    }

    /// Get a bitmap of the active PCR banks. Each bank corresponds to a hash
    /// algorithm.
    pub fn get_active_pcr_banks(&mut self) -> Result<HashAlgorithm> {
        let mut active_pcr_banks = HashAlgorithm::empty();
        unsafe { (self.0.get_active_pcr_banks)(&mut self.0, &mut active_pcr_banks) }
            .to_result_with_val(|| active_pcr_banks)
    }

    /// Set the active PCR banks. Each bank corresponds to a hash
    /// algorithm. This change will not take effect until the system is
    /// rebooted twice.
    pub fn set_active_pcr_banks(&mut self, active_pcr_banks: HashAlgorithm) -> Result {
        unsafe { (self.0.set_active_pcr_banks)(&mut self.0, active_pcr_banks) }.to_result()
    }

    /// Get the stored result of calling [`Tcg::set_active_pcr_banks`] in a
    /// previous boot.
    ///
    /// If there was no attempt to set the active PCR banks in a previous boot,
    /// this returns `None`. Otherwise, it returns a numeric response code:
    /// * `0x00000000`: Success
    /// * `0x00000001..=0x00000FFF`: TPM error code
    /// * `0xfffffff0`: The operation was canceled by the user or timed out
    /// * `0xfffffff1`: Firmware error
    pub fn get_result_of_set_active_pcr_banks(&mut self) -> Result<Option<u32>> {
        let mut operation_present = 0;
        let mut response = 0;

        unsafe {
            (self.0.get_result_of_set_active_pcr_banks)(
                &mut self.0,
                &mut operation_present,
                &mut response,
            )
        }
        .to_result_with_val(|| (operation_present != 0).then_some(response))
    }
}
