// SPDX-License-Identifier: MIT OR Apache-2.0

//! Console support protocols.

pub mod text;
