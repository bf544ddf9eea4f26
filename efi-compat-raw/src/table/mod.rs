// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pieces of the standard UEFI tables used for protocol discovery.

pub mod boot;
pub mod configuration;
