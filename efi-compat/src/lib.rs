// SPDX-License-Identifier: MIT OR Apache-2.0

//! Safe wrappers for optional UEFI protocols.
//!
//! Baseline firmware toolkits leave out a handful of protocols that boot
//! software still wants to use when the firmware provides them: the RNG
//! protocol, the extended simple text input protocol, the device-tree fixup
//! protocol and both generations of the TCG measurement protocol. This
//! crate wraps the raw tables from [`efi-compat-raw`] in types with safe
//! methods, and provides a small discovery layer for finding them.
//!
//! # Crate organisation
//!
//! - [`registry`]: looking up a protocol on a handle by GUID. Works against
//!   the firmware's `HandleProtocol` boot service or an in-memory
//!   [`ProtocolDatabase`].
//! - [`proto`]: one safe type per protocol, plus the
//!   [`MeasurementProtocol`] trait unifying the two TCG generations.
//! - [`layout`]: packed and natural wire layouts for the fixed-size records
//!   these protocols exchange.
//!
//! Every protocol is optional. Resolving one that the firmware does not
//! provide yields [`Status::NOT_FOUND`]; use
//! [`ProtocolRegistry::resolve_optional`] to treat that as `None`.
//!
//! ## Optional crate features
//!
//! - `alloc`: Enable helpers that need the [`alloc`] crate, such as
//!   methods that grow a `Vec` and retry instead of reporting the required
//!   buffer size. This requires a global allocator.
//!
//! [`efi-compat-raw`]: https://crates.io/crates/efi-compat-raw
//! [`MeasurementProtocol`]: proto::tcg::MeasurementProtocol
//! [`ProtocolDatabase`]: registry::ProtocolDatabase
//! [`ProtocolRegistry::resolve_optional`]: registry::ProtocolRegistry::resolve_optional

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![no_std]
#![warn(clippy::ptr_as_ptr, missing_docs, unused)]
#![deny(clippy::all)]
#![deny(clippy::must_use_candidate)]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

// Lets the `unsafe_protocol` macro refer to `::efi_compat` from inside
// this crate too.
extern crate self as efi_compat;

pub mod data_types;
pub use self::data_types::{Event, Guid, Handle, Identify};
pub use uguid::guid;

mod result;
pub use self::result::{Error, Result, ResultExt, Status, StatusExt};

pub mod layout;
pub mod proto;
pub mod registry;

mod util;
