// SPDX-License-Identifier: MIT OR Apache-2.0

//! `EFI_SIMPLE_TEXT_INPUT_EX_PROTOCOL`.

use crate::{guid, Boolean, Char16, Event, Guid, Status};
use bitflags::bitflags;
use core::ffi::c_void;

/// Keystroke as reported by the text input protocols.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(C)]
pub struct InputKey {
    /// Scan code of a special key, or zero for a printable character.
    pub scan_code: u16,
    /// UCS-2 character, or zero for a special key.
    pub unicode_char: Char16,
}

newtype_enum! {
    /// Keyboard scan code.
    ///
    /// Codes 0x8000 to 0xFFFF are reserved for OEM extensions, so this is not
    /// safe to model as a Rust enum.
    pub enum ScanCode: u16 => {
        /// No special key; the character field is meaningful instead.
        NULL            = 0x00,
        UP              = 0x01,
        DOWN            = 0x02,
        RIGHT           = 0x03,
        LEFT            = 0x04,
        HOME            = 0x05,
        END             = 0x06,
        INSERT          = 0x07,
        DELETE          = 0x08,
        PAGE_UP         = 0x09,
        PAGE_DOWN       = 0x0a,
        FUNCTION_1      = 0x0b,
        FUNCTION_2      = 0x0c,
        FUNCTION_3      = 0x0d,
        FUNCTION_4      = 0x0e,
        FUNCTION_5      = 0x0f,
        FUNCTION_6      = 0x10,
        FUNCTION_7      = 0x11,
        FUNCTION_8      = 0x12,
        FUNCTION_9      = 0x13,
        FUNCTION_10     = 0x14,
        FUNCTION_11     = 0x15,
        FUNCTION_12     = 0x16,
        ESCAPE          = 0x17,
        PAUSE           = 0x48,
        MUTE            = 0x7f,
        VOLUME_UP       = 0x80,
        VOLUME_DOWN     = 0x81,
        BRIGHTNESS_UP   = 0x100,
        BRIGHTNESS_DOWN = 0x101,
        SUSPEND         = 0x102,
        HIBERNATE       = 0x103,
        TOGGLE_DISPLAY  = 0x104,
        RECOVERY        = 0x105,
        EJECT           = 0x106,
    }
}

bitflags! {
    /// State of the modifier keys.
    ///
    /// Only meaningful when [`KeyShiftState::SHIFT_STATE_VALID`] is set.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[repr(transparent)]
    pub struct KeyShiftState: u32 {
        const RIGHT_SHIFT_PRESSED = 0x0000_0001;
        const LEFT_SHIFT_PRESSED = 0x0000_0002;
        const RIGHT_CONTROL_PRESSED = 0x0000_0004;
        const LEFT_CONTROL_PRESSED = 0x0000_0008;
        const RIGHT_ALT_PRESSED = 0x0000_0010;
        const LEFT_ALT_PRESSED = 0x0000_0020;
        const RIGHT_LOGO_PRESSED = 0x0000_0040;
        const LEFT_LOGO_PRESSED = 0x0000_0080;
        const MENU_KEY_PRESSED = 0x0000_0100;
        const SYS_REQ_PRESSED = 0x0000_0200;
        /// The other bits of the shift state are valid.
        const SHIFT_STATE_VALID = 0x8000_0000;
    }
}

bitflags! {
    /// State of the toggle keys.
    ///
    /// Only meaningful when [`KeyToggleState::TOGGLE_STATE_VALID`] is set.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[repr(transparent)]
    pub struct KeyToggleState: u8 {
        const SCROLL_LOCK_ACTIVE = 0x01;
        const NUM_LOCK_ACTIVE = 0x02;
        const CAPS_LOCK_ACTIVE = 0x04;
        /// Partial keystrokes (e.g. a lone modifier press) are reported.
        const KEY_STATE_EXPOSED = 0x40;
        /// The other bits of the toggle state are valid.
        const TOGGLE_STATE_VALID = 0x80;
    }
}

/// Modifier and toggle state accompanying a keystroke.
///
/// The corresponding C type is `EFI_KEY_STATE`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(C)]
pub struct KeyState {
    pub key_shift_state: KeyShiftState,
    pub key_toggle_state: KeyToggleState,
}

/// One input sample: a keystroke plus the key state at the time.
///
/// The corresponding C type is `EFI_KEY_DATA`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(C)]
pub struct KeyData {
    pub key: InputKey,
    pub key_state: KeyState,
}

/// Function invoked by the firmware when a registered keystroke arrives.
pub type KeyNotifyFunction = unsafe extern "efiapi" fn(key_data: *mut KeyData) -> Status;

/// Extended text input protocol.
///
/// The corresponding C type is `EFI_SIMPLE_TEXT_INPUT_EX_PROTOCOL`.
#[derive(Debug)]
#[repr(C)]
pub struct SimpleTextInputExProtocol {
    pub reset: unsafe extern "efiapi" fn(this: *mut Self, extended_verification: Boolean) -> Status,

    /// Returns [`Status::NOT_READY`] if no keystroke is pending.
    pub read_key_stroke_ex:
        unsafe extern "efiapi" fn(this: *mut Self, key_data: *mut KeyData) -> Status,

    /// Signalled when a keystroke is available.
    pub wait_for_key_ex: Event,

    pub set_state: unsafe extern "efiapi" fn(
        this: *mut Self,
        key_toggle_state: *const KeyToggleState,
    ) -> Status,

    pub register_key_notify: unsafe extern "efiapi" fn(
        this: *mut Self,
        key_data: *const KeyData,
        key_notification_function: KeyNotifyFunction,
        notify_handle: *mut *mut c_void,
    ) -> Status,

    pub unregister_key_notify:
        unsafe extern "efiapi" fn(this: *mut Self, notification_handle: *mut c_void) -> Status,
}

impl SimpleTextInputExProtocol {
    pub const GUID: Guid = guid!("dd9e7534-7762-4698-8c14-f58517a625aa");
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::offset_of;

    #[test]
    fn test_key_data_layout() {
        assert_eq!(size_of::<InputKey>(), 4);
        assert_eq!(size_of::<KeyState>(), 8);
        assert_eq!(offset_of!(KeyState, key_toggle_state), 4);
        assert_eq!(size_of::<KeyData>(), 12);
        assert_eq!(offset_of!(KeyData, key_state), 4);
    }

    #[test]
    fn test_protocol_layout() {
        let ptr = size_of::<usize>();
        assert_eq!(offset_of!(SimpleTextInputExProtocol, reset), 0);
        assert_eq!(offset_of!(SimpleTextInputExProtocol, read_key_stroke_ex), ptr);
        assert_eq!(offset_of!(SimpleTextInputExProtocol, wait_for_key_ex), 2 * ptr);
        assert_eq!(offset_of!(SimpleTextInputExProtocol, set_state), 3 * ptr);
        assert_eq!(offset_of!(SimpleTextInputExProtocol, register_key_notify), 4 * ptr);
        assert_eq!(offset_of!(SimpleTextInputExProtocol, unregister_key_notify), 5 * ptr);
        assert_eq!(size_of::<SimpleTextInputExProtocol>(), 6 * ptr);
    }
}
