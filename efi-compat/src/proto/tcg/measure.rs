// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{v1, v2, EventType, PcrIndex};
use crate::proto::Protocol;
use crate::registry::{ProtocolRef, ProtocolRegistry};
use crate::{Error, Handle, Result};

/// Generation of the TCG protocol.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TcgGeneration {
    /// `EFI_TCG_PROTOCOL`, for TPM 1.1 and 1.2 ([`v1::Tcg`]).
    Legacy,
    /// `EFI_TCG2_PROTOCOL`, mainly for TPM 2.0 ([`v2::Tcg`]).
    Current,
}

/// Operations both TCG protocol generations provide.
pub trait MeasurementProtocol: Protocol {
    /// Generation of this protocol.
    const GENERATION: TcgGeneration;

    /// Whether a usable TPM is behind the protocol: present and, for the
    /// legacy generation, not deactivated.
    fn tpm_present(&mut self) -> Result<bool>;

    /// Measure `data` into `pcr` and log it as an event of `event_type`
    /// with `description` as event data.
    ///
    /// The generation-specific event is built in `scratch`. Returns
    /// `Ok(false)` without touching `scratch` if there is no usable TPM.
    ///
    /// # Errors
    ///
    /// - [`Status::BUFFER_TOO_SMALL`] if `scratch` cannot hold the event.
    ///   The error data is the size required.
    /// - [`Status::INVALID_PARAMETER`] if `description` is too large.
    /// - Any error from the capability query or the measurement itself.
    ///
    /// [`Status::BUFFER_TOO_SMALL`]: crate::Status::BUFFER_TOO_SMALL
    /// [`Status::INVALID_PARAMETER`]: crate::Status::INVALID_PARAMETER
    fn measure(
        &mut self,
        pcr: PcrIndex,
        event_type: EventType,
        data: &[u8],
        description: &[u8],
        scratch: &mut [u8],
    ) -> Result<bool, Option<usize>>;

    /// Send a raw command to the TPM. Only the transport is provided.
    fn submit_raw(&mut self, input: &[u8], output: &mut [u8]) -> Result;
}

fn unsized_err(err: Error) -> Error<Option<usize>> {
    err.map_data(|()| None)
}

impl MeasurementProtocol for v1::Tcg {
    const GENERATION: TcgGeneration = TcgGeneration::Legacy;

    fn tpm_present(&mut self) -> Result<bool> {
        let capability = self.status_check()?.protocol_capability;
        Ok(capability.tpm_present() && !capability.tpm_deactivated())
    }

    fn measure(
        &mut self,
        pcr: PcrIndex,
        event_type: EventType,
        data: &[u8],
        description: &[u8],
        scratch: &mut [u8],
    ) -> Result<bool, Option<usize>> {
        if !self.tpm_present().map_err(unsized_err)? {
            log::debug!("legacy TPM absent or deactivated, not measuring");
            return Ok(false);
        }

        // Firmware overwrites the digest.
        let event =
            v1::PcrEvent::new(pcr, event_type, [0; 20], description).map_err(unsized_err)?;
        let mut event = event.write_into(scratch).map_err(|err| err.map_data(Some))?;
        self.hash_log_extend_event(&mut event, data).map_err(unsized_err)?;
        Ok(true)
    }

    fn submit_raw(&mut self, input: &[u8], output: &mut [u8]) -> Result {
        self.pass_through_to_tpm(input, output)
    }
}

impl MeasurementProtocol for v2::Tcg {
    const GENERATION: TcgGeneration = TcgGeneration::Current;

    fn tpm_present(&mut self) -> Result<bool> {
        Ok(self.get_capability()?.tpm_present())
    }

    fn measure(
        &mut self,
        pcr: PcrIndex,
        event_type: EventType,
        data: &[u8],
        description: &[u8],
        scratch: &mut [u8],
    ) -> Result<bool, Option<usize>> {
        if !self.tpm_present().map_err(unsized_err)? {
            log::debug!("TPM absent, not measuring");
            return Ok(false);
        }

        let event = v2::PcrEventInputs::new(pcr, event_type, description).map_err(unsized_err)?;
        let event = event.write_into(scratch).map_err(|err| err.map_data(Some))?;
        self.hash_log_extend_event(v2::HashLogExtendEventFlags::empty(), data, &event)
            .map_err(unsized_err)?;
        Ok(true)
    }

    fn submit_raw(&mut self, input: &[u8], output: &mut [u8]) -> Result {
        self.submit_command(input, output)
    }
}

/// Whichever TCG protocol a handle provides.
#[derive(Debug)]
pub enum Measurement<'r> {
    /// The legacy protocol.
    Legacy(ProtocolRef<'r, v1::Tcg>),
    /// The current protocol.
    Current(ProtocolRef<'r, v2::Tcg>),
}

impl<'r> Measurement<'r> {
    /// Find a TCG protocol on `handle`, preferring the current generation.
    ///
    /// Returns `Ok(None)` if neither generation is installed.
    ///
    /// # Safety
    ///
    /// See [`ProtocolRegistry::resolve`].
    ///
    /// # Errors
    ///
    /// Any error from the registry other than [`Status::NOT_FOUND`].
    ///
    /// [`Status::NOT_FOUND`]: crate::Status::NOT_FOUND
    pub unsafe fn open<R>(registry: &'r R, handle: Handle) -> Result<Option<Self>>
    where
        R: ProtocolRegistry + ?Sized,
    {
        if let Some(tcg) = unsafe { registry.resolve_optional::<v2::Tcg>(handle) }? {
            log::debug!("measuring with the TCG2 protocol");
            return Ok(Some(Self::Current(tcg)));
        }
        if let Some(tcg) = unsafe { registry.resolve_optional::<v1::Tcg>(handle) }? {
            log::debug!("measuring with the legacy TCG protocol");
            return Ok(Some(Self::Legacy(tcg)));
        }
        Ok(None)
    }

    /// Generation of the protocol found.
    #[must_use]
    pub const fn generation(&self) -> TcgGeneration {
        match self {
            Self::Legacy(_) => TcgGeneration::Legacy,
            Self::Current(_) => TcgGeneration::Current,
        }
    }

    /// See [`MeasurementProtocol::tpm_present`].
    pub fn tpm_present(&mut self) -> Result<bool> {
        match self {
            Self::Legacy(tcg) => tcg.tpm_present(),
            Self::Current(tcg) => tcg.tpm_present(),
        }
    }

    /// See [`MeasurementProtocol::measure`].
    pub fn measure(
        &mut self,
        pcr: PcrIndex,
        event_type: EventType,
        data: &[u8],
        description: &[u8],
        scratch: &mut [u8],
    ) -> Result<bool, Option<usize>> {
        match self {
            Self::Legacy(tcg) => tcg.measure(pcr, event_type, data, description, scratch),
            Self::Current(tcg) => tcg.measure(pcr, event_type, data, description, scratch),
        }
    }

    /// See [`MeasurementProtocol::submit_raw`].
    pub fn submit_raw(&mut self, input: &[u8], output: &mut [u8]) -> Result {
        match self {
            Self::Legacy(tcg) => tcg.submit_raw(input, output),
            Self::Current(tcg) => tcg.submit_raw(input, output),
        }
    }
}
