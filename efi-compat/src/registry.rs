// SPDX-License-Identifier: MIT OR Apache-2.0

//! Finding protocols.
//!
//! Protocols are not linked statically. Firmware installs an interface
//! table on a [`Handle`] under the protocol's GUID, and consumers look it up
//! at run time. A [`ProtocolRegistry`] performs that lookup:
//!
//! - [`FirmwareRegistry`] asks the firmware through its `HandleProtocol`
//!   boot service.
//! - [`ProtocolDatabase`] is an in-memory table, for code that publishes
//!   interfaces itself.
//!
//! Every protocol in this crate is optional. A lookup that finds nothing
//! fails with [`Status::NOT_FOUND`]; [`ProtocolRegistry::resolve_optional`]
//! turns that into `Ok(None)`.
//!
//! Lookups have no side effects. Resolving the same protocol twice yields
//! the same interface.

use crate::proto::ProtocolPointer;
use crate::{Guid, Handle, Result, Status, StatusExt};
use core::ffi::c_void;
use core::fmt::{self, Debug, Formatter};
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};
use efi_compat_raw::table::boot::HandleProtocolFn;
use efi_compat_raw::table::configuration::ConfigurationTable;

/// Non-owning reference to a protocol interface found by a
/// [`ProtocolRegistry`].
///
/// The interface belongs to whoever installed it. The reference cannot
/// outlive the registry borrow it was obtained through.
pub struct ProtocolRef<'r, P: ?Sized> {
    interface: NonNull<P>,
    _registry: PhantomData<&'r ()>,
}

impl<P: ?Sized> ProtocolRef<'_, P> {
    /// Wrap an interface pointer.
    ///
    /// # Safety
    ///
    /// `interface` must point to a valid `P` that nothing else accesses for
    /// the lifetime of the reference.
    #[must_use]
    pub const unsafe fn new(interface: NonNull<P>) -> Self {
        Self {
            interface,
            _registry: PhantomData,
        }
    }

    /// Get the interface pointer.
    #[must_use]
    pub const fn as_ptr(&self) -> *mut P {
        self.interface.as_ptr()
    }
}

impl<P: ?Sized> Deref for ProtocolRef<'_, P> {
    type Target = P;

    fn deref(&self) -> &Self::Target {
        unsafe { self.interface.as_ref() }
    }
}

impl<P: ?Sized> DerefMut for ProtocolRef<'_, P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { self.interface.as_mut() }
    }
}

impl<P: ?Sized> Debug for ProtocolRef<'_, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolRef")
            .field("interface", &self.interface.as_ptr().cast::<c_void>())
            .finish()
    }
}

/// Lookup of protocol interfaces by handle and GUID.
pub trait ProtocolRegistry {
    /// Find the interface installed on `handle` under `guid`.
    ///
    /// # Errors
    ///
    /// - [`Status::NOT_FOUND`] if `handle` does not carry the protocol.
    /// - [`Status::INVALID_PARAMETER`] if `handle` is not a valid handle.
    fn resolve_raw(&self, handle: Handle, guid: &Guid) -> Result<NonNull<c_void>>;

    /// Whether `handle` carries the protocol identified by `guid`.
    fn is_installed(&self, handle: Handle, guid: &Guid) -> Result<bool> {
        match self.resolve_raw(handle, guid) {
            Ok(_) => Ok(true),
            Err(err) if err.status() == Status::NOT_FOUND => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Find protocol `P` on `handle`.
    ///
    /// # Safety
    ///
    /// Firmware does not enforce exclusive access to an interface. The
    /// caller must not hold two references to the same interface at once,
    /// and the protocol must stay installed while the reference is alive.
    ///
    /// # Errors
    ///
    /// See [`resolve_raw`].
    ///
    /// [`resolve_raw`]: Self::resolve_raw
    unsafe fn resolve<P: ProtocolPointer>(&self, handle: Handle) -> Result<ProtocolRef<'_, P>> {
        let interface = self.resolve_raw(handle, &P::GUID)?;
        let interface = unsafe { P::mut_ptr_from_ffi(interface.as_ptr()) };
        NonNull::new(interface)
            .map(|interface| unsafe { ProtocolRef::new(interface) })
            .ok_or_else(|| Status::NOT_FOUND.into())
    }

    /// Find protocol `P` on `handle`, returning `None` if it is not
    /// installed.
    ///
    /// # Safety
    ///
    /// See [`resolve`].
    ///
    /// # Errors
    ///
    /// See [`resolve_raw`]. [`Status::NOT_FOUND`] is never returned.
    ///
    /// [`resolve`]: Self::resolve
    /// [`resolve_raw`]: Self::resolve_raw
    unsafe fn resolve_optional<P: ProtocolPointer>(
        &self,
        handle: Handle,
    ) -> Result<Option<ProtocolRef<'_, P>>> {
        match unsafe { self.resolve::<P>(handle) } {
            Ok(protocol) => Ok(Some(protocol)),
            Err(err) if err.status() == Status::NOT_FOUND => {
                log::debug!("protocol {} is not installed on {:?}", P::GUID, handle);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// Registry backed by the firmware's `HandleProtocol` boot service.
#[derive(Clone, Copy, Debug)]
pub struct FirmwareRegistry {
    handle_protocol: HandleProtocolFn,
}

impl FirmwareRegistry {
    /// Create a registry calling `handle_protocol`.
    ///
    /// # Safety
    ///
    /// `handle_protocol` must be the firmware's `HandleProtocol` boot
    /// service, and boot services must remain active while the registry
    /// and any reference it returns are in use.
    #[must_use]
    pub const unsafe fn new(handle_protocol: HandleProtocolFn) -> Self {
        Self { handle_protocol }
    }
}

impl ProtocolRegistry for FirmwareRegistry {
    fn resolve_raw(&self, handle: Handle, guid: &Guid) -> Result<NonNull<c_void>> {
        let mut interface = ptr::null_mut();
        let status = unsafe { (self.handle_protocol)(handle.as_ptr(), guid, &mut interface) };

        // Firmware reports a missing protocol as UNSUPPORTED.
        if status == Status::UNSUPPORTED {
            return Err(Status::NOT_FOUND.into());
        }
        status.to_result()?;
        NonNull::new(interface).ok_or_else(|| Status::NOT_FOUND.into())
    }
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    handle: Handle,
    guid: Guid,
    interface: NonNull<c_void>,
}

/// In-memory handle/GUID/interface table holding up to `N` interfaces.
///
/// Used by code that publishes interfaces without the firmware, such as a
/// driver emulating a protocol or a test.
#[derive(Debug)]
pub struct ProtocolDatabase<const N: usize = 32> {
    entries: [Option<Entry>; N],
}

impl<const N: usize> Default for ProtocolDatabase<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ProtocolDatabase<N> {
    /// Create an empty database.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: [None; N] }
    }

    fn position(&self, handle: Handle, guid: &Guid) -> Option<usize> {
        self.entries.iter().position(|entry| {
            entry.is_some_and(|entry| entry.handle == handle && entry.guid == *guid)
        })
    }

    /// Install `interface` on `handle` under `guid`.
    ///
    /// # Errors
    ///
    /// - [`Status::INVALID_PARAMETER`] if `interface` is null, or `handle`
    ///   already carries `guid`.
    /// - [`Status::OUT_OF_RESOURCES`] if the database is full.
    pub fn install(&mut self, handle: Handle, guid: Guid, interface: *mut c_void) -> Result {
        let interface = NonNull::new(interface).ok_or(Status::INVALID_PARAMETER)?;
        if self.position(handle, &guid).is_some() {
            return Err(Status::INVALID_PARAMETER.into());
        }

        let slot = self
            .entries
            .iter_mut()
            .find(|entry| entry.is_none())
            .ok_or(Status::OUT_OF_RESOURCES)?;
        *slot = Some(Entry {
            handle,
            guid,
            interface,
        });
        log::trace!("installed {guid} on {handle:?}");
        Ok(())
    }

    /// Remove the interface installed on `handle` under `guid`.
    ///
    /// # Errors
    ///
    /// - [`Status::NOT_FOUND`] if `handle` does not carry `guid`.
    pub fn uninstall(&mut self, handle: Handle, guid: &Guid) -> Result {
        let index = self.position(handle, guid).ok_or(Status::NOT_FOUND)?;
        self.entries[index] = None;
        Ok(())
    }

    /// Handles carrying the protocol identified by `guid`.
    pub fn find_handles<'a>(&'a self, guid: &'a Guid) -> impl Iterator<Item = Handle> + 'a {
        self.entries
            .iter()
            .flatten()
            .filter(move |entry| entry.guid == *guid)
            .map(|entry| entry.handle)
    }

    /// Number of installed interfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    /// Whether no interface is installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const N: usize> ProtocolRegistry for ProtocolDatabase<N> {
    fn resolve_raw(&self, handle: Handle, guid: &Guid) -> Result<NonNull<c_void>> {
        self.position(handle, guid)
            .and_then(|index| self.entries[index])
            .map(|entry| entry.interface)
            .ok_or_else(|| Status::NOT_FOUND.into())
    }
}

/// Find the configuration table identified by `guid`, such as the device
/// tree ([`ConfigTableEntry::DEVICE_TREE_GUID`]).
///
/// [`ConfigTableEntry::DEVICE_TREE_GUID`]: efi_compat_raw::table::configuration::ConfigTableEntry::DEVICE_TREE_GUID
#[must_use]
pub fn find_configuration_table(
    tables: &[ConfigurationTable],
    guid: &Guid,
) -> Option<NonNull<c_void>> {
    tables
        .iter()
        .find(|table| table.vendor_guid == *guid)
        .and_then(|table| NonNull::new(table.vendor_table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guid;
    use alloc::vec::Vec;
    use efi_compat_raw::table::configuration::ConfigTableEntry;

    const GUID_A: Guid = guid!("a0000000-0000-0000-0000-000000000000");
    const GUID_B: Guid = guid!("b0000000-0000-0000-0000-000000000000");

    fn handle(slot: &mut u8) -> Handle {
        unsafe { Handle::from_ptr(ptr::from_mut(slot).cast()) }.unwrap()
    }

    #[test]
    fn test_database_install_uninstall() {
        let (mut h1, mut h2) = (0u8, 0u8);
        let (h1, h2) = (handle(&mut h1), handle(&mut h2));
        let mut iface = 0u64;
        let iface_ptr = ptr::from_mut(&mut iface).cast::<c_void>();

        let mut db = ProtocolDatabase::<4>::new();
        assert!(db.is_empty());
        db.install(h1, GUID_A, iface_ptr).unwrap();
        db.install(h2, GUID_A, iface_ptr).unwrap();
        db.install(h2, GUID_B, iface_ptr).unwrap();
        assert_eq!(db.len(), 3);

        assert_eq!(
            db.install(h1, GUID_A, iface_ptr).unwrap_err().status(),
            Status::INVALID_PARAMETER
        );
        assert_eq!(
            db.install(h1, GUID_B, ptr::null_mut()).unwrap_err().status(),
            Status::INVALID_PARAMETER
        );

        let handles: Vec<_> = db.find_handles(&GUID_A).collect();
        assert_eq!(handles, [h1, h2]);

        assert_eq!(db.resolve_raw(h2, &GUID_B).unwrap().as_ptr(), iface_ptr);
        // Lookups do not change anything.
        assert_eq!(db.resolve_raw(h2, &GUID_B).unwrap().as_ptr(), iface_ptr);
        assert_eq!(
            db.resolve_raw(h1, &GUID_B).unwrap_err().status(),
            Status::NOT_FOUND
        );
        assert_eq!(db.is_installed(h1, &GUID_B), Ok(false));

        db.uninstall(h1, &GUID_A).unwrap();
        assert_eq!(
            db.uninstall(h1, &GUID_A).unwrap_err().status(),
            Status::NOT_FOUND
        );
        assert!(db.find_handles(&GUID_A).eq([h2]));
    }

    #[test]
    fn test_database_full() {
        let mut h = 0u8;
        let h = handle(&mut h);
        let mut iface = 0u64;
        let iface_ptr = ptr::from_mut(&mut iface).cast::<c_void>();

        let mut db = ProtocolDatabase::<1>::new();
        db.install(h, GUID_A, iface_ptr).unwrap();
        assert_eq!(
            db.install(h, GUID_B, iface_ptr).unwrap_err().status(),
            Status::OUT_OF_RESOURCES
        );
    }

    #[test]
    fn test_find_configuration_table() {
        let mut dtb = [0xd0u8, 0x0d, 0xfe, 0xed];
        let tables = [
            ConfigurationTable {
                vendor_guid: GUID_A,
                vendor_table: ptr::null_mut(),
            },
            ConfigurationTable {
                vendor_guid: ConfigTableEntry::DEVICE_TREE_GUID,
                vendor_table: dtb.as_mut_ptr().cast(),
            },
        ];
        assert_eq!(
            find_configuration_table(&tables, &ConfigTableEntry::DEVICE_TREE_GUID)
                .map(NonNull::as_ptr),
            Some(dtb.as_mut_ptr().cast())
        );
        assert_eq!(find_configuration_table(&tables, &GUID_A), None);
        assert_eq!(find_configuration_table(&tables, &GUID_B), None);
    }
}
