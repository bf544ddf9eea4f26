// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire layouts for the fixed-size records exchanged with firmware.
//!
//! Most protocol structures use the natural C layout: every field sits at
//! an offset that is a multiple of its size, and the record is padded at
//! the end to a multiple of its largest field. A few TCG2 structures are
//! declared byte packed instead and must never contain padding. Getting
//! this wrong silently desynchronizes with firmware, so every record type
//! states its [`Layout`] through [`WireFormat`] and is encoded field by
//! field through an [`Encoder`] applying that layout.
//!
//! All integers are little endian.
//!
//! Nested records are encoded flat, with the layout of the outermost
//! record. This is exact as long as no nested record carries tail padding
//! of its own, which holds for every record in this crate.

use crate::{Error, Result, Status};

/// Field placement strategy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Layout {
    /// No padding anywhere; each field starts where the previous ended.
    Packed,
    /// C layout: fields aligned to their size, tail padded to the largest
    /// alignment in the record.
    Natural,
}

impl Layout {
    /// Offset of a field with alignment `align` following a field that
    /// ended at `offset`.
    #[must_use]
    pub const fn place(self, offset: usize, align: usize) -> usize {
        match self {
            Self::Packed => offset,
            Self::Natural => offset.next_multiple_of(align),
        }
    }
}

/// Writes fields into a byte buffer according to a [`Layout`].
///
/// Writes past the end of the buffer are dropped but still advance the
/// offset, so encoding into an empty buffer measures the record.
/// [`Encoder::finish`] reports whether everything fit.
#[derive(Debug)]
pub struct Encoder<'a> {
    buf: &'a mut [u8],
    layout: Layout,
    offset: usize,
    max_align: usize,
}

impl<'a> Encoder<'a> {
    /// Start encoding at the beginning of `buf`.
    pub fn new(buf: &'a mut [u8], layout: Layout) -> Self {
        Self {
            buf,
            layout,
            offset: 0,
            max_align: 1,
        }
    }

    /// Layout applied by this encoder.
    #[must_use]
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// Offset just past the last field written.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    fn zero(&mut self, from: usize, to: usize) {
        if let Some(pad) = self.buf.get_mut(from..to) {
            pad.fill(0);
        }
    }

    fn put(&mut self, bytes: &[u8], align: usize) {
        let start = self.layout.place(self.offset, align);
        self.zero(self.offset, start);
        if let Some(dst) = self.buf.get_mut(start..start + bytes.len()) {
            dst.copy_from_slice(bytes);
        }
        self.offset = start + bytes.len();
        self.max_align = self.max_align.max(align);
    }

    /// Write a `u8`.
    pub fn u8(&mut self, val: u8) {
        self.put(&[val], 1);
    }

    /// Write a `u16`.
    pub fn u16(&mut self, val: u16) {
        self.put(&val.to_le_bytes(), 2);
    }

    /// Write a `u32`.
    pub fn u32(&mut self, val: u32) {
        self.put(&val.to_le_bytes(), 4);
    }

    /// Write a `u64`.
    pub fn u64(&mut self, val: u64) {
        self.put(&val.to_le_bytes(), 8);
    }

    /// Write raw bytes. Byte arrays have an alignment of one.
    pub fn bytes(&mut self, bytes: &[u8]) {
        self.put(bytes, 1);
    }

    /// Apply tail padding and return the encoded size.
    ///
    /// # Errors
    ///
    /// [`Status::BUFFER_TOO_SMALL`] with the required size as error data
    /// if the buffer could not hold the record.
    pub fn finish(mut self) -> Result<usize, usize> {
        let end = self.layout.place(self.offset, self.max_align);
        self.zero(self.offset, end);
        if end <= self.buf.len() {
            Ok(end)
        } else {
            Err(Error::new(Status::BUFFER_TOO_SMALL, end))
        }
    }
}

/// Reads fields from a byte slice according to a [`Layout`].
///
/// Every read returns `None` once the input is exhausted.
#[derive(Clone, Debug)]
pub struct Decoder<'a> {
    bytes: &'a [u8],
    layout: Layout,
    offset: usize,
    max_align: usize,
}

impl<'a> Decoder<'a> {
    /// Start decoding at the beginning of `bytes`.
    #[must_use]
    pub const fn new(bytes: &'a [u8], layout: Layout) -> Self {
        Self {
            bytes,
            layout,
            offset: 0,
            max_align: 1,
        }
    }

    /// Offset just past the last field read.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Input following the last field read.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        self.bytes.get(self.offset..).unwrap_or(&[])
    }

    fn take(&mut self, len: usize, align: usize) -> Option<&'a [u8]> {
        let start = self.layout.place(self.offset, align);
        let out = self.bytes.get(start..start.checked_add(len)?)?;
        self.offset = start + len;
        self.max_align = self.max_align.max(align);
        Some(out)
    }

    /// Read a `u8`.
    pub fn u8(&mut self) -> Option<u8> {
        self.take(1, 1)?.first().copied()
    }

    /// Read a `u16`.
    pub fn u16(&mut self) -> Option<u16> {
        self.take(2, 2)?.try_into().ok().map(u16::from_le_bytes)
    }

    /// Read a `u32`.
    pub fn u32(&mut self) -> Option<u32> {
        self.take(4, 4)?.try_into().ok().map(u32::from_le_bytes)
    }

    /// Read a `u64`.
    pub fn u64(&mut self) -> Option<u64> {
        self.take(8, 8)?.try_into().ok().map(u64::from_le_bytes)
    }

    /// Read a fixed-size byte array.
    pub fn array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.take(N, 1)?.try_into().ok()
    }

    /// Borrow `len` bytes of the input.
    pub fn bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        self.take(len, 1)
    }

    /// Apply tail padding and return the size of the decoded record, or
    /// `None` if the input ends inside the padding.
    #[must_use]
    pub fn finish(self) -> Option<usize> {
        let end = self.layout.place(self.offset, self.max_align);
        (end <= self.bytes.len()).then_some(end)
    }
}

/// A fixed-size record with a defined wire layout.
pub trait WireFormat: Sized {
    /// Placement strategy for this record's fields.
    const LAYOUT: Layout;

    /// Encoded size in bytes, including any padding.
    const SIZE: usize;

    /// Write the fields in declaration order.
    fn encode(&self, enc: &mut Encoder<'_>);

    /// Read the fields in declaration order.
    fn decode(dec: &mut Decoder<'_>) -> Option<Self>;

    /// Encode into the start of `buf`, returning the number of bytes
    /// written.
    ///
    /// # Errors
    ///
    /// [`Status::BUFFER_TOO_SMALL`] with the required size if `buf` is too
    /// short. Nothing past the end of `buf` is touched.
    fn write_to(&self, buf: &mut [u8]) -> Result<usize, usize> {
        let mut enc = Encoder::new(buf, Self::LAYOUT);
        self.encode(&mut enc);
        enc.finish()
    }

    /// Decode from the start of `bytes`. Trailing input is ignored.
    ///
    /// # Errors
    ///
    /// [`Status::BAD_BUFFER_SIZE`] if `bytes` is too short.
    fn read_from(bytes: &[u8]) -> Result<Self> {
        let mut dec = Decoder::new(bytes, Self::LAYOUT);
        let value = Self::decode(&mut dec).ok_or(Error::from(Status::BAD_BUFFER_SIZE))?;
        dec.finish().ok_or(Error::from(Status::BAD_BUFFER_SIZE))?;
        Ok(value)
    }
}
