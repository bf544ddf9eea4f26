// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extended text input protocol.
//!
//! Unlike the basic text input protocol this reports shift and toggle
//! state with each keystroke and lets callers register key notifications.

use crate::data_types::Char16;
use crate::layout::{Decoder, Encoder, Layout, WireFormat};
use crate::proto::unsafe_protocol;
use crate::{Event, Result, Status, StatusExt};
use core::ffi::c_void;
use core::ptr::{self, NonNull};
use efi_compat_raw::protocol::console::{self as raw, InputKey, KeyState, SimpleTextInputExProtocol};

pub use efi_compat_raw::protocol::console::{
    KeyNotifyFunction, KeyShiftState, KeyToggleState, ScanCode,
};

/// Extended interface for text-based input devices.
///
/// Unlike the basic text input protocol this reports the state of the
/// modifier and toggle keys with every keystroke, and lets the caller
/// register functions that firmware calls when a given key is pressed.
#[derive(Debug)]
#[repr(transparent)]
#[unsafe_protocol(SimpleTextInputExProtocol::GUID)]
pub struct InputEx(SimpleTextInputExProtocol);

impl InputEx {
    /// Resets the input device hardware.
    ///
    /// With `extended_verification` the firmware may perform a more
    /// thorough check of the device.
    ///
    /// # Errors
    ///
    /// - [`Status::DEVICE_ERROR`] if the device is malfunctioning and could
    ///   not be reset.
    pub fn reset(&mut self, extended_verification: bool) -> Result {
        unsafe { (self.0.reset)(&mut self.0, extended_verification.into()) }.to_result()
    }

    /// Reads the next keystroke and key state without waiting.
    ///
    /// `key_data` is only written on success.
    ///
    /// # Errors
    ///
    /// - [`Status::NOT_READY`] if no keystroke is pending. Wait on
    ///   [`wait_for_key_event`] before retrying.
    /// - [`Status::DEVICE_ERROR`] if the device reported an error.
    /// - [`Status::UNSUPPORTED`] if the device cannot report keystrokes.
    ///
    /// [`wait_for_key_event`]: Self::wait_for_key_event
    pub fn read_key_stroke(&mut self, key_data: &mut KeyData) -> Result {
        let mut raw = raw::KeyData::default();
        unsafe { (self.0.read_key_stroke_ex)(&mut self.0, &mut raw) }
            .to_result_with_val(|| *key_data = KeyData(raw))
    }

    /// Reads the next keystroke if there is one.
    ///
    /// Same as [`read_key_stroke`], but an empty input queue is reported as
    /// `Ok(None)`.
    ///
    /// [`read_key_stroke`]: Self::read_key_stroke
    pub fn read_key(&mut self) -> Result<Option<KeyData>> {
        let mut key_data = KeyData::default();
        match self.read_key_stroke(&mut key_data) {
            Ok(()) => Ok(Some(key_data)),
            Err(err) if err.status() == Status::NOT_READY => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Event that is signalled when a keystroke is available.
    ///
    /// Returns `None` if firmware did not provide an event.
    #[must_use]
    pub fn wait_for_key_event(&self) -> Option<Event> {
        unsafe { Event::from_ptr(self.0.wait_for_key_ex) }
    }

    /// Sets the toggle-key state (lock indicators) of the device.
    ///
    /// [`KeyToggleState::TOGGLE_STATE_VALID`] is added to `state`; firmware
    /// ignores a state without it.
    ///
    /// # Errors
    ///
    /// - [`Status::DEVICE_ERROR`] if the device is not functioning.
    /// - [`Status::UNSUPPORTED`] if the device does not support the
    ///   requested state change.
    pub fn set_state(&mut self, state: KeyToggleState) -> Result {
        let state = state | KeyToggleState::TOGGLE_STATE_VALID;
        unsafe { (self.0.set_state)(&mut self.0, &state) }.to_result()
    }

    /// Registers `notify` to be called when a keystroke matching `pattern`
    /// arrives.
    ///
    /// Several registrations may coexist, including ones for the same key.
    /// Firmware calls `notify` from its own context, potentially while the
    /// caller is in the middle of something else; anything it touches must
    /// be synchronized.
    ///
    /// # Errors
    ///
    /// - [`Status::OUT_OF_RESOURCES`] if firmware could not allocate the
    ///   registration.
    pub fn register_key_notify(
        &mut self,
        pattern: &KeyPattern,
        notify: KeyNotifyFunction,
    ) -> Result<NotifyHandle> {
        let key_data = pattern.registration_data();
        let mut handle = ptr::null_mut();
        unsafe { (self.0.register_key_notify)(&mut self.0, &key_data, notify, &mut handle) }
            .to_result()?;
        NonNull::new(handle)
            .map(NotifyHandle)
            .ok_or_else(|| Status::PROTOCOL_ERROR.into())
    }

    /// Removes a notification previously added with
    /// [`register_key_notify`].
    ///
    /// # Errors
    ///
    /// - [`Status::INVALID_PARAMETER`] if `handle` is not a current
    ///   registration, for example because it was already removed.
    ///
    /// [`register_key_notify`]: Self::register_key_notify
    pub fn unregister_key_notify(&mut self, handle: NotifyHandle) -> Result {
        unsafe { (self.0.unregister_key_notify)(&mut self.0, handle.as_ptr()) }.to_result()
    }
}

/// Token identifying a registered key notification.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(transparent)]
pub struct NotifyHandle(NonNull<c_void>);

impl NotifyHandle {
    /// Get the underlying raw pointer.
    #[must_use]
    pub const fn as_ptr(&self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// A key read from the console, as either a character or a special key.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Key {
    /// The key is associated with a printable UCS-2 character.
    Printable(Char16),

    /// The key is special (arrow, function, multimedia...).
    Special(ScanCode),
}

impl Key {
    /// Key for a character in the Basic Multilingual Plane, or `None` if
    /// `c` cannot be represented in UCS-2.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        u16::try_from(u32::from(c)).ok().map(Self::Printable)
    }

    const fn to_input_key(self) -> InputKey {
        match self {
            Self::Printable(c) => InputKey {
                scan_code: ScanCode::NULL.0,
                unicode_char: c,
            },
            Self::Special(scan_code) => InputKey {
                scan_code: scan_code.0,
                unicode_char: 0,
            },
        }
    }
}

/// One input sample: a keystroke plus the modifier and toggle state at the
/// time it was read.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(transparent)]
pub struct KeyData(raw::KeyData);

impl KeyData {
    /// Key data for `key` with no state information.
    #[must_use]
    pub const fn new(key: Key) -> Self {
        Self(raw::KeyData {
            key: key.to_input_key(),
            key_state: KeyState {
                key_shift_state: KeyShiftState::empty(),
                key_toggle_state: KeyToggleState::empty(),
            },
        })
    }

    /// Sets the shift state, marking it valid.
    #[must_use]
    pub const fn with_shift_state(mut self, shift: KeyShiftState) -> Self {
        self.0.key_state.key_shift_state = shift.union(KeyShiftState::SHIFT_STATE_VALID);
        self
    }

    /// Sets the toggle state, marking it valid.
    #[must_use]
    pub const fn with_toggle_state(mut self, toggle: KeyToggleState) -> Self {
        self.0.key_state.key_toggle_state = toggle.union(KeyToggleState::TOGGLE_STATE_VALID);
        self
    }

    /// Wrap a raw `EFI_KEY_DATA`.
    #[must_use]
    pub const fn from_raw(raw: raw::KeyData) -> Self {
        Self(raw)
    }

    /// The raw `EFI_KEY_DATA`.
    #[must_use]
    pub const fn to_raw(self) -> raw::KeyData {
        self.0
    }

    /// The keystroke. A zero scan code means the character is meaningful.
    #[must_use]
    pub const fn key(&self) -> Key {
        if self.0.key.scan_code == ScanCode::NULL.0 {
            Key::Printable(self.0.key.unicode_char)
        } else {
            Key::Special(ScanCode(self.0.key.scan_code))
        }
    }

    /// Modifier keys held, or `None` if the device did not report them.
    #[must_use]
    pub fn shift_state(&self) -> Option<KeyShiftState> {
        let state = self.0.key_state.key_shift_state;
        state
            .contains(KeyShiftState::SHIFT_STATE_VALID)
            .then(|| state.difference(KeyShiftState::SHIFT_STATE_VALID))
    }

    /// Active toggle keys, or `None` if the device did not report them.
    #[must_use]
    pub fn toggle_state(&self) -> Option<KeyToggleState> {
        let state = self.0.key_state.key_toggle_state;
        state
            .contains(KeyToggleState::TOGGLE_STATE_VALID)
            .then(|| state.difference(KeyToggleState::TOGGLE_STATE_VALID))
    }
}

impl From<Key> for KeyData {
    fn from(key: Key) -> Self {
        Self::new(key)
    }
}

impl WireFormat for KeyData {
    const LAYOUT: Layout = Layout::Natural;
    const SIZE: usize = 12;

    fn encode(&self, enc: &mut Encoder<'_>) {
        enc.u16(self.0.key.scan_code);
        enc.u16(self.0.key.unicode_char);
        enc.u32(self.0.key_state.key_shift_state.bits());
        enc.u8(self.0.key_state.key_toggle_state.bits());
    }

    fn decode(dec: &mut Decoder<'_>) -> Option<Self> {
        Some(Self(raw::KeyData {
            key: InputKey {
                scan_code: dec.u16()?,
                unicode_char: dec.u16()?,
            },
            key_state: KeyState {
                key_shift_state: KeyShiftState::from_bits_retain(dec.u32()?),
                key_toggle_state: KeyToggleState::from_bits_retain(dec.u8()?),
            },
        }))
    }
}

/// How a registered [`KeyPattern`] is compared against a keystroke.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum KeyMatchRule {
    /// Every field must be equal, including the modifier and toggle state.
    /// The pattern is registered with both states marked valid so that
    /// firmware compares them too.
    Exact,

    /// Scan code and character must be equal. The shift state is compared
    /// only if the pattern marks it valid, and likewise the toggle state.
    /// This is how firmware compares registrations.
    #[default]
    ValidFlags,
}

/// Keystroke pattern for [`InputEx::register_key_notify`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyPattern {
    key: KeyData,
    rule: KeyMatchRule,
}

impl KeyPattern {
    /// Pattern matching `key` under [`KeyMatchRule::ValidFlags`].
    #[must_use]
    pub const fn new(key: KeyData) -> Self {
        Self {
            key,
            rule: KeyMatchRule::ValidFlags,
        }
    }

    /// Use `rule` to compare keystrokes.
    #[must_use]
    pub const fn with_rule(mut self, rule: KeyMatchRule) -> Self {
        self.rule = rule;
        self
    }

    /// Key data the pattern was built from.
    #[must_use]
    pub const fn key(&self) -> KeyData {
        self.key
    }

    /// Comparison rule.
    #[must_use]
    pub const fn rule(&self) -> KeyMatchRule {
        self.rule
    }

    /// Key data handed to firmware on registration.
    fn registration_data(&self) -> raw::KeyData {
        let mut data = self.key.0;
        if self.rule == KeyMatchRule::Exact {
            data.key_state.key_shift_state |= KeyShiftState::SHIFT_STATE_VALID;
            data.key_state.key_toggle_state |= KeyToggleState::TOGGLE_STATE_VALID;
        }
        data
    }

    /// Whether `input` matches this pattern.
    ///
    /// Notification functions can use this to re-check the keystroke they
    /// are called with.
    #[must_use]
    pub fn matches(&self, input: &KeyData) -> bool {
        let pattern = self.registration_data();
        let input = input.0;
        if pattern.key != input.key {
            return false;
        }

        match self.rule {
            KeyMatchRule::Exact => pattern.key_state == input.key_state,
            KeyMatchRule::ValidFlags => {
                let shift = pattern.key_state.key_shift_state;
                let toggle = pattern.key_state.key_toggle_state;
                (!shift.contains(KeyShiftState::SHIFT_STATE_VALID)
                    || shift == input.key_state.key_shift_state)
                    && (!toggle.contains(KeyToggleState::TOGGLE_STATE_VALID)
                        || toggle == input.key_state.key_toggle_state)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl_c() -> KeyData {
        KeyData::new(Key::Printable(u16::from(b'c')))
            .with_shift_state(KeyShiftState::LEFT_CONTROL_PRESSED)
    }

    #[test]
    fn test_key_view() {
        let key = KeyData::new(Key::Special(ScanCode::ESCAPE));
        assert_eq!(key.key(), Key::Special(ScanCode::ESCAPE));
        assert_eq!(key.to_raw().key.unicode_char, 0);
        assert_eq!(key.shift_state(), None);
        assert_eq!(key.toggle_state(), None);

        let key = ctrl_c().with_toggle_state(KeyToggleState::CAPS_LOCK_ACTIVE);
        assert_eq!(key.key(), Key::from_char('c').unwrap());
        assert_eq!(
            key.shift_state(),
            Some(KeyShiftState::LEFT_CONTROL_PRESSED)
        );
        assert_eq!(
            key.toggle_state(),
            Some(KeyToggleState::CAPS_LOCK_ACTIVE)
        );
        assert_eq!(Key::from_char('\u{1f600}'), None);
    }

    #[test]
    fn test_valid_flags_rule() {
        // Without valid flags only the key itself is compared.
        let any_c = KeyPattern::new(KeyData::new(Key::from_char('c').unwrap()));
        assert!(any_c.matches(&ctrl_c()));
        assert!(any_c.matches(&KeyData::new(Key::from_char('c').unwrap())));
        assert!(!any_c.matches(&KeyData::new(Key::from_char('d').unwrap())));

        let pattern = KeyPattern::new(ctrl_c());
        assert!(pattern.matches(&ctrl_c()));
        // Toggle state is not marked valid in the pattern, so it is ignored.
        assert!(pattern.matches(&ctrl_c().with_toggle_state(KeyToggleState::NUM_LOCK_ACTIVE)));
        assert!(!pattern.matches(
            &KeyData::new(Key::from_char('c').unwrap())
                .with_shift_state(KeyShiftState::RIGHT_ALT_PRESSED)
        ));
    }

    #[test]
    fn test_exact_rule() {
        let pattern = KeyPattern::new(ctrl_c()).with_rule(KeyMatchRule::Exact);
        assert_eq!(pattern.rule(), KeyMatchRule::Exact);

        let registered = pattern.registration_data();
        assert!(registered
            .key_state
            .key_toggle_state
            .contains(KeyToggleState::TOGGLE_STATE_VALID));

        // Exact requires the toggle state to be reported, and empty.
        assert!(!pattern.matches(&ctrl_c()));
        assert!(pattern.matches(&ctrl_c().with_toggle_state(KeyToggleState::empty())));
        assert!(!pattern.matches(&ctrl_c().with_toggle_state(KeyToggleState::NUM_LOCK_ACTIVE)));
    }

    #[test]
    fn test_key_data_wire_layout() {
        let key = ctrl_c().with_toggle_state(KeyToggleState::SCROLL_LOCK_ACTIVE);
        let mut buf = [0xff; KeyData::SIZE];
        assert_eq!(key.write_to(&mut buf), Ok(12));
        #[rustfmt::skip]
        assert_eq!(buf, [
            // Scan code, character
            0x00, 0x00, 0x63, 0x00,
            // Shift state
            0x08, 0x00, 0x00, 0x80,
            // Toggle state, padding
            0x81, 0x00, 0x00, 0x00,
        ]);

        // The encoding matches the compiler's layout of the raw type.
        let raw = unsafe { ptr::read_unaligned(buf.as_ptr().cast::<raw::KeyData>()) };
        assert_eq!(raw, key.to_raw());
        assert_eq!(KeyData::read_from(&buf), Ok(key));
    }
}
