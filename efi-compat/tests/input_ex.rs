// SPDX-License-Identifier: MIT OR Apache-2.0

mod common;

use core::ffi::c_void;
use core::ptr;
use efi_compat::proto::console::text::{
    InputEx, Key, KeyData, KeyMatchRule, KeyPattern, KeyShiftState, KeyToggleState, ScanCode,
};
use efi_compat::registry::{ProtocolDatabase, ProtocolRegistry};
use efi_compat::{Identify, Status};
use efi_compat_raw::protocol::console::{self as raw, KeyNotifyFunction, SimpleTextInputExProtocol};
use efi_compat_raw::Boolean;
use std::collections::VecDeque;

#[repr(C)]
struct MockKeyboard {
    proto: SimpleTextInputExProtocol,
    queue: VecDeque<raw::KeyData>,
    registrations: Vec<(usize, raw::KeyData)>,
    next_id: usize,
    toggle_state: KeyToggleState,
    resets: usize,
}

impl MockKeyboard {
    fn new() -> Self {
        Self {
            proto: SimpleTextInputExProtocol {
                reset,
                read_key_stroke_ex,
                wait_for_key_ex: ptr::null_mut(),
                set_state,
                register_key_notify,
                unregister_key_notify,
            },
            queue: VecDeque::new(),
            registrations: Vec::new(),
            next_id: 0,
            toggle_state: KeyToggleState::empty(),
            resets: 0,
        }
    }
}

unsafe fn mock<'a>(this: *mut SimpleTextInputExProtocol) -> &'a mut MockKeyboard {
    unsafe { &mut *this.cast::<MockKeyboard>() }
}

unsafe extern "efiapi" fn reset(this: *mut SimpleTextInputExProtocol, _: Boolean) -> Status {
    let keyboard = unsafe { mock(this) };
    keyboard.queue.clear();
    keyboard.resets += 1;
    Status::SUCCESS
}

unsafe extern "efiapi" fn read_key_stroke_ex(
    this: *mut SimpleTextInputExProtocol,
    key_data: *mut raw::KeyData,
) -> Status {
    let keyboard = unsafe { mock(this) };
    match keyboard.queue.pop_front() {
        Some(key) => {
            unsafe { key_data.write(key) };
            Status::SUCCESS
        }
        None => {
            // Scribble over the output like some firmware does.
            unsafe { key_data.write(raw::KeyData::default()) };
            Status::NOT_READY
        }
    }
}

unsafe extern "efiapi" fn set_state(
    this: *mut SimpleTextInputExProtocol,
    state: *const KeyToggleState,
) -> Status {
    let keyboard = unsafe { mock(this) };
    let state = unsafe { *state };
    if !state.contains(KeyToggleState::TOGGLE_STATE_VALID) {
        return Status::UNSUPPORTED;
    }
    keyboard.toggle_state = state;
    Status::SUCCESS
}

unsafe extern "efiapi" fn register_key_notify(
    this: *mut SimpleTextInputExProtocol,
    key_data: *const raw::KeyData,
    _: KeyNotifyFunction,
    notify_handle: *mut *mut c_void,
) -> Status {
    let keyboard = unsafe { mock(this) };
    keyboard.next_id += 1;
    keyboard
        .registrations
        .push((keyboard.next_id, unsafe { *key_data }));
    unsafe { notify_handle.write(ptr::without_provenance_mut(keyboard.next_id)) };
    Status::SUCCESS
}

unsafe extern "efiapi" fn unregister_key_notify(
    this: *mut SimpleTextInputExProtocol,
    notify_handle: *mut c_void,
) -> Status {
    let keyboard = unsafe { mock(this) };
    let id = notify_handle.addr();
    match keyboard.registrations.iter().position(|(i, _)| *i == id) {
        Some(index) => {
            keyboard.registrations.remove(index);
            Status::SUCCESS
        }
        None => Status::INVALID_PARAMETER,
    }
}

unsafe extern "efiapi" fn on_key(_: *mut raw::KeyData) -> Status {
    Status::SUCCESS
}

fn ctrl(c: char) -> KeyData {
    KeyData::new(Key::from_char(c).unwrap()).with_shift_state(KeyShiftState::LEFT_CONTROL_PRESSED)
}

#[test]
fn read_keys_in_order() {
    let mut keyboard = MockKeyboard::new();
    keyboard.queue.push_back(ctrl('x').to_raw());
    keyboard
        .queue
        .push_back(KeyData::new(Key::Special(ScanCode::FUNCTION_10)).to_raw());
    let mut db = ProtocolDatabase::new();
    let handle = common::publish(&mut db, InputEx::GUID, &mut keyboard);

    let mut input = unsafe { db.resolve::<InputEx>(handle) }.unwrap();
    assert!(input.wait_for_key_event().is_none());

    let first = input.read_key().unwrap().unwrap();
    assert_eq!(first.key(), Key::from_char('x').unwrap());
    assert_eq!(first.shift_state(), Some(KeyShiftState::LEFT_CONTROL_PRESSED));
    assert_eq!(first.toggle_state(), None);

    let mut second = KeyData::default();
    input.read_key_stroke(&mut second).unwrap();
    assert_eq!(second.key(), Key::Special(ScanCode::FUNCTION_10));
    assert_eq!(second.shift_state(), None);

    assert_eq!(input.read_key().unwrap(), None);
}

#[test]
fn empty_read_leaves_output_alone() {
    let mut keyboard = MockKeyboard::new();
    let mut db = ProtocolDatabase::new();
    let handle = common::publish(&mut db, InputEx::GUID, &mut keyboard);
    let mut input = unsafe { db.resolve::<InputEx>(handle) }.unwrap();

    let previous = ctrl('q');
    let mut key_data = previous;
    assert_eq!(
        input.read_key_stroke(&mut key_data).unwrap_err().status(),
        Status::NOT_READY
    );
    assert_eq!(key_data, previous);
}

#[test]
fn reset_and_set_state() {
    let mut keyboard = MockKeyboard::new();
    keyboard.queue.push_back(ctrl('a').to_raw());
    let mut db = ProtocolDatabase::new();
    let handle = common::publish(&mut db, InputEx::GUID, &mut keyboard);

    {
        let mut input = unsafe { db.resolve::<InputEx>(handle) }.unwrap();
        input.reset(false).unwrap();
        assert_eq!(input.read_key().unwrap(), None);
        input
            .set_state(KeyToggleState::NUM_LOCK_ACTIVE | KeyToggleState::CAPS_LOCK_ACTIVE)
            .unwrap();
    }

    assert_eq!(keyboard.resets, 1);
    assert_eq!(
        keyboard.toggle_state,
        KeyToggleState::TOGGLE_STATE_VALID
            | KeyToggleState::NUM_LOCK_ACTIVE
            | KeyToggleState::CAPS_LOCK_ACTIVE
    );
}

#[test]
fn register_and_unregister() {
    let mut keyboard = MockKeyboard::new();
    let mut db = ProtocolDatabase::new();
    let handle = common::publish(&mut db, InputEx::GUID, &mut keyboard);

    {
        let mut input = unsafe { db.resolve::<InputEx>(handle) }.unwrap();
        let loose = KeyPattern::new(ctrl('c'));
        let exact = KeyPattern::new(ctrl('c')).with_rule(KeyMatchRule::Exact);

        let first = input.register_key_notify(&loose, on_key).unwrap();
        // The same key may be registered more than once.
        let second = input.register_key_notify(&exact, on_key).unwrap();
        assert_ne!(first, second);

        input.unregister_key_notify(first).unwrap();
        assert_eq!(
            input.unregister_key_notify(first).unwrap_err().status(),
            Status::INVALID_PARAMETER
        );
        input.unregister_key_notify(second).unwrap();
    }

    assert!(keyboard.registrations.is_empty());
    assert_eq!(keyboard.next_id, 2);
}

#[test]
fn exact_registration_marks_states_valid() {
    let mut keyboard = MockKeyboard::new();
    let mut db = ProtocolDatabase::new();
    let handle = common::publish(&mut db, InputEx::GUID, &mut keyboard);

    {
        let mut input = unsafe { db.resolve::<InputEx>(handle) }.unwrap();
        let exact = KeyPattern::new(ctrl('c')).with_rule(KeyMatchRule::Exact);
        input.register_key_notify(&exact, on_key).unwrap();
    }

    let (_, registered) = keyboard.registrations[0];
    assert_eq!(
        registered.key_state.key_toggle_state,
        KeyToggleState::TOGGLE_STATE_VALID
    );
    assert!(registered
        .key_state
        .key_shift_state
        .contains(KeyShiftState::SHIFT_STATE_VALID | KeyShiftState::LEFT_CONTROL_PRESSED));
}
