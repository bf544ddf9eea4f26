// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text input.

mod input_ex;
pub use input_ex::{
    InputEx, Key, KeyData, KeyMatchRule, KeyNotifyFunction, KeyPattern, KeyShiftState,
    KeyToggleState, NotifyHandle, ScanCode,
};
