// SPDX-License-Identifier: MIT OR Apache-2.0

//! Protocol definitions.
//!
//! Protocols are sets of related functionality identified by a unique ID.
//! Firmware publishes them on handles; a consumer looks one up by GUID and
//! calls through the returned function table.

pub mod console;
pub mod dt_fixup;
pub mod rng;
pub mod tcg;
