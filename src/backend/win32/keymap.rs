//! Win32 virtual-key table.

use crate::input::{Key, MouseButton};
use crate::keytable::KeyTable;

pub const VK_LBUTTON: u16 = 0x01;
pub const VK_RBUTTON: u16 = 0x02;
pub const VK_MBUTTON: u16 = 0x04;
pub const VK_XBUTTON1: u16 = 0x05;
pub const VK_XBUTTON2: u16 = 0x06;
pub const VK_BACK: u16 = 0x08;
pub const VK_TAB: u16 = 0x09;
pub const VK_CLEAR: u16 = 0x0C;
pub const VK_RETURN: u16 = 0x0D;
pub const VK_SHIFT: u16 = 0x10;
pub const VK_CONTROL: u16 = 0x11;
pub const VK_MENU: u16 = 0x12;
pub const VK_PAUSE: u16 = 0x13;
pub const VK_CAPITAL: u16 = 0x14;
pub const VK_ESCAPE: u16 = 0x1B;
pub const VK_SPACE: u16 = 0x20;
pub const VK_PRIOR: u16 = 0x21;
pub const VK_NEXT: u16 = 0x22;
pub const VK_END: u16 = 0x23;
pub const VK_HOME: u16 = 0x24;
pub const VK_LEFT: u16 = 0x25;
pub const VK_UP: u16 = 0x26;
pub const VK_RIGHT: u16 = 0x27;
pub const VK_DOWN: u16 = 0x28;
pub const VK_SELECT: u16 = 0x29;
pub const VK_SNAPSHOT: u16 = 0x2C;
pub const VK_INSERT: u16 = 0x2D;
pub const VK_DELETE: u16 = 0x2E;
pub const VK_LWIN: u16 = 0x5B;
pub const VK_RWIN: u16 = 0x5C;
pub const VK_APPS: u16 = 0x5D;
pub const VK_NUMPAD0: u16 = 0x60;
pub const VK_MULTIPLY: u16 = 0x6A;
pub const VK_ADD: u16 = 0x6B;
pub const VK_SUBTRACT: u16 = 0x6D;
pub const VK_DECIMAL: u16 = 0x6E;
pub const VK_DIVIDE: u16 = 0x6F;
pub const VK_F1: u16 = 0x70;
pub const VK_NUMLOCK: u16 = 0x90;
pub const VK_SCROLL: u16 = 0x91;
pub const VK_LSHIFT: u16 = 0xA0;
pub const VK_RSHIFT: u16 = 0xA1;
pub const VK_LCONTROL: u16 = 0xA2;
pub const VK_RCONTROL: u16 = 0xA3;
pub const VK_LMENU: u16 = 0xA4;
pub const VK_RMENU: u16 = 0xA5;
pub const VK_OEM_1: u16 = 0xBA;
pub const VK_OEM_PLUS: u16 = 0xBB;
pub const VK_OEM_COMMA: u16 = 0xBC;
pub const VK_OEM_MINUS: u16 = 0xBD;
pub const VK_OEM_PERIOD: u16 = 0xBE;
pub const VK_OEM_2: u16 = 0xBF;
pub const VK_OEM_3: u16 = 0xC0;
pub const VK_OEM_4: u16 = 0xDB;
pub const VK_OEM_5: u16 = 0xDC;
pub const VK_OEM_6: u16 = 0xDD;
pub const VK_OEM_7: u16 = 0xDE;

/// Set on the key-message `lParam` for right-hand modifiers and the
/// navigation cluster.
pub const KF_EXTENDED_LPARAM: isize = 0x0100_0000;

/// Scan code of the right Shift key.
pub const SCAN_RIGHT_SHIFT: u32 = 0x36;
/// Scan code of the left Shift key.
pub const SCAN_LEFT_SHIFT: u32 = 0x2A;

/// Virtual keys with a fixed portable meaning. Generic Shift, Control and
/// Alt are absent: [`resolve_virtual_key`] turns them into their sided form
/// first.
const NAMED_VIRTUAL_KEYS: &[(u16, Key)] = &[
    (VK_BACK, Key::Backspace),
    (VK_TAB, Key::Tab),
    (VK_CLEAR, Key::Clear),
    (VK_RETURN, Key::Return),
    (VK_LSHIFT, Key::LShift),
    (VK_RSHIFT, Key::RShift),
    (VK_LCONTROL, Key::LControl),
    (VK_RCONTROL, Key::RControl),
    (VK_LMENU, Key::LAlt),
    (VK_RMENU, Key::RAlt),
    (VK_PAUSE, Key::Pause),
    (VK_CAPITAL, Key::CapsLock),
    (VK_ESCAPE, Key::Escape),
    (VK_SPACE, Key::Space),
    (VK_PRIOR, Key::PageUp),
    (VK_NEXT, Key::PageDown),
    (VK_END, Key::End),
    (VK_HOME, Key::Home),
    (VK_LEFT, Key::Left),
    (VK_UP, Key::Up),
    (VK_RIGHT, Key::Right),
    (VK_DOWN, Key::Down),
    (VK_SELECT, Key::Select),
    (VK_SNAPSHOT, Key::PrintScreen),
    (VK_INSERT, Key::Insert),
    (VK_DELETE, Key::Delete),
    (VK_APPS, Key::Menu),
    (VK_LWIN, Key::LMeta),
    (VK_RWIN, Key::RMeta),
    (VK_MULTIPLY, Key::Multiply),
    (VK_ADD, Key::Add),
    (VK_SUBTRACT, Key::Subtract),
    (VK_DECIMAL, Key::Decimal),
    (VK_DIVIDE, Key::Divide),
    (VK_NUMLOCK, Key::NumLock),
    (VK_SCROLL, Key::ScrollLock),
    (VK_OEM_1, Key::Semicolon),
    (VK_OEM_PLUS, Key::Equal),
    (VK_OEM_COMMA, Key::Comma),
    (VK_OEM_MINUS, Key::Dash),
    (VK_OEM_PERIOD, Key::Period),
    (VK_OEM_2, Key::Slash),
    (VK_OEM_3, Key::Backtick),
    (VK_OEM_4, Key::LBracket),
    (VK_OEM_5, Key::Backslash),
    (VK_OEM_6, Key::RBracket),
    (VK_OEM_7, Key::Apostrophe),
];

const DIGITS: [Key; 10] = [
    Key::Num0,
    Key::Num1,
    Key::Num2,
    Key::Num3,
    Key::Num4,
    Key::Num5,
    Key::Num6,
    Key::Num7,
    Key::Num8,
    Key::Num9,
];

const NUMPAD: [Key; 10] = [
    Key::Numpad0,
    Key::Numpad1,
    Key::Numpad2,
    Key::Numpad3,
    Key::Numpad4,
    Key::Numpad5,
    Key::Numpad6,
    Key::Numpad7,
    Key::Numpad8,
    Key::Numpad9,
];

const LETTERS: [Key; 26] = [
    Key::A,
    Key::B,
    Key::C,
    Key::D,
    Key::E,
    Key::F,
    Key::G,
    Key::H,
    Key::I,
    Key::J,
    Key::K,
    Key::L,
    Key::M,
    Key::N,
    Key::O,
    Key::P,
    Key::Q,
    Key::R,
    Key::S,
    Key::T,
    Key::U,
    Key::V,
    Key::W,
    Key::X,
    Key::Y,
    Key::Z,
];

const FUNCTION_KEYS: [Key; 24] = [
    Key::F1,
    Key::F2,
    Key::F3,
    Key::F4,
    Key::F5,
    Key::F6,
    Key::F7,
    Key::F8,
    Key::F9,
    Key::F10,
    Key::F11,
    Key::F12,
    Key::F13,
    Key::F14,
    Key::F15,
    Key::F16,
    Key::F17,
    Key::F18,
    Key::F19,
    Key::F20,
    Key::F21,
    Key::F22,
    Key::F23,
    Key::F24,
];

/// Every `(virtual key, Key)` pair the backend understands.
pub fn virtual_keys() -> impl Iterator<Item = (u16, Key)> {
    let digits = (0u16..).map(|i| i + u16::from(b'0')).zip(DIGITS);
    let letters = (0u16..).map(|i| i + u16::from(b'A')).zip(LETTERS);
    let numpad = (0u16..).map(|i| i + VK_NUMPAD0).zip(NUMPAD);
    let function = (0u16..).map(|i| i + VK_F1).zip(FUNCTION_KEYS);

    digits
        .chain(letters)
        .chain(numpad)
        .chain(function)
        .chain(NAMED_VIRTUAL_KEYS.iter().copied())
}

/// Builds the virtual-key table for a window session.
pub fn build_key_table() -> KeyTable {
    let mut pairs: Vec<(u32, Key)> = virtual_keys()
        .map(|(vk, key)| (u32::from(vk), key))
        .collect();
    pairs.sort_by_key(|(vk, _)| *vk);
    KeyTable::from_pairs(pairs)
}

/// Scan code to sided virtual key for the Shift keys of a standard set-1
/// keyboard. Used where `MapVirtualKeyW` is unavailable.
pub fn shift_scan_code_to_virtual_key(scan_code: u32) -> u16 {
    match scan_code {
        SCAN_LEFT_SHIFT => VK_LSHIFT,
        SCAN_RIGHT_SHIFT => VK_RSHIFT,
        _ => 0,
    }
}

/// Replaces generic Shift/Control/Alt virtual keys with their sided form.
///
/// Shift is resolved by mapping the scan code in `lparam` through
/// `scan_to_virtual_key` (`MAPVK_VSC_TO_VK_EX` on Windows); Control and Alt
/// by the extended flag.
pub fn resolve_virtual_key(vk: u16, lparam: isize, scan_to_virtual_key: fn(u32) -> u16) -> u16 {
    let extended = lparam & KF_EXTENDED_LPARAM != 0;
    match vk {
        VK_SHIFT => {
            let scan_code = ((lparam >> 16) & 0xFF) as u32;
            match scan_to_virtual_key(scan_code) {
                VK_RSHIFT => VK_RSHIFT,
                _ => VK_LSHIFT,
            }
        }
        VK_CONTROL if extended => VK_RCONTROL,
        VK_CONTROL => VK_LCONTROL,
        VK_MENU if extended => VK_RMENU,
        VK_MENU => VK_LMENU,
        other => other,
    }
}

/// Virtual key to poll for a mouse button's state.
pub fn button_virtual_key(button: MouseButton) -> u16 {
    match button {
        MouseButton::Left => VK_LBUTTON,
        MouseButton::Right => VK_RBUTTON,
        MouseButton::Middle => VK_MBUTTON,
        MouseButton::X1 => VK_XBUTTON1,
        MouseButton::X2 => VK_XBUTTON2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_ranges() {
        let table = build_key_table();
        assert_eq!(table.from_native_key_code(0x41), Key::A);
        assert_eq!(table.from_native_key_code(0x5A), Key::Z);
        assert_eq!(table.from_native_key_code(0x30), Key::Num0);
        assert_eq!(table.from_native_key_code(0x69), Key::Numpad9);
        assert_eq!(table.from_native_key_code(0x87), Key::F24);
        assert_eq!(table.to_native_key_code(Key::F11), Some(0x7A));
        assert_eq!(table.to_native_key_code(Key::Esc), Some(u32::from(VK_ESCAPE)));
    }

    #[test]
    fn every_entry_round_trips() {
        let table = build_key_table();
        for (vk, key) in virtual_keys() {
            assert_eq!(table.from_native_key_code(u32::from(vk)), key);
            assert_eq!(table.to_native_key_code(key), Some(u32::from(vk)));
        }
    }

    #[test]
    fn generic_modifiers_are_unmapped() {
        let table = build_key_table();
        for vk in [VK_SHIFT, VK_CONTROL, VK_MENU, 0xFF, 0xE2] {
            assert_eq!(table.from_native_key_code(u32::from(vk)), Key::Unknown);
        }
    }

    #[test]
    fn shift_sides_follow_scan_code() {
        let left = (SCAN_LEFT_SHIFT as isize) << 16;
        let right = (SCAN_RIGHT_SHIFT as isize) << 16;
        let map = shift_scan_code_to_virtual_key;
        assert_eq!(resolve_virtual_key(VK_SHIFT, left, map), VK_LSHIFT);
        assert_eq!(resolve_virtual_key(VK_SHIFT, right, map), VK_RSHIFT);
    }

    #[test]
    fn shift_side_comes_from_the_scan_code_lookup() {
        // A layout whose right Shift sits on 0x2A.
        fn swapped(scan_code: u32) -> u16 {
            if scan_code == SCAN_LEFT_SHIFT { VK_RSHIFT } else { VK_LSHIFT }
        }
        let lparam = (SCAN_LEFT_SHIFT as isize) << 16;
        assert_eq!(resolve_virtual_key(VK_SHIFT, lparam, swapped), VK_RSHIFT);
        // Unknown scan codes fall back to the left key.
        assert_eq!(
            resolve_virtual_key(VK_SHIFT, 0x7F << 16, shift_scan_code_to_virtual_key),
            VK_LSHIFT
        );
    }

    #[test]
    fn control_and_alt_sides_follow_extended_flag() {
        let map = shift_scan_code_to_virtual_key;
        assert_eq!(resolve_virtual_key(VK_CONTROL, 0x1D << 16, map), VK_LCONTROL);
        assert_eq!(
            resolve_virtual_key(VK_CONTROL, (0x1D << 16) | KF_EXTENDED_LPARAM, map),
            VK_RCONTROL
        );
        assert_eq!(resolve_virtual_key(VK_MENU, 0x38 << 16, map), VK_LMENU);
        assert_eq!(
            resolve_virtual_key(VK_MENU, (0x38 << 16) | KF_EXTENDED_LPARAM, map),
            VK_RMENU
        );
        assert_eq!(resolve_virtual_key(VK_RETURN, KF_EXTENDED_LPARAM, map), VK_RETURN);
    }
}
