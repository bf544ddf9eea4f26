// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{guid, Guid};
use core::ffi::c_void;

/// UEFI configuration table.
///
/// Each table is uniquely identified by a GUID. The type of data pointed to by
/// `vendor_table` depends on the GUID.
#[derive(Debug, Eq, PartialEq)]
#[repr(C)]
pub struct ConfigurationTable {
    pub vendor_guid: Guid,
    pub vendor_table: *mut c_void,
}

/// GUIDs of configuration tables that are not part of the baseline
/// toolkit.
#[derive(Debug)]
pub struct ConfigTableEntry;

impl ConfigTableEntry {
    /// Flattened device tree blob installed by the firmware. The table
    /// points at the blob's header.
    pub const DEVICE_TREE_GUID: Guid = guid!("b1b621d5-f19c-41a5-830b-d9152c69aae0");
}
