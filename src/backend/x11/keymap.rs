//! XKB key-name table for the X11 backend.
//!
//! XKB names physical key positions (`AE01` is the first key of the number
//! row, `AC01` the first letter of the home row) independently of the active
//! layout, so matching on names gives stable physical keys.

use crate::input::Key;
use crate::keytable::KeyTable;

/// Length of an XKB key name; shorter names are NUL padded.
pub const XKB_KEY_NAME_LENGTH: usize = 4;

/// XKB key names and the key each one denotes.
pub const XKB_KEY_NAMES: &[(&str, Key)] = &[
    ("AE01", Key::Num1),
    ("AE02", Key::Num2),
    ("AE03", Key::Num3),
    ("AE04", Key::Num4),
    ("AE05", Key::Num5),
    ("AE06", Key::Num6),
    ("AE07", Key::Num7),
    ("AE08", Key::Num8),
    ("AE09", Key::Num9),
    ("AE10", Key::Num0),
    ("AE11", Key::Dash),
    ("AE12", Key::Equal),
    ("AD01", Key::Q),
    ("AD02", Key::W),
    ("AD03", Key::E),
    ("AD04", Key::R),
    ("AD05", Key::T),
    ("AD06", Key::Y),
    ("AD07", Key::U),
    ("AD08", Key::I),
    ("AD09", Key::O),
    ("AD10", Key::P),
    ("AD11", Key::LBracket),
    ("AD12", Key::RBracket),
    ("AC01", Key::A),
    ("AC02", Key::S),
    ("AC03", Key::D),
    ("AC04", Key::F),
    ("AC05", Key::G),
    ("AC06", Key::H),
    ("AC07", Key::J),
    ("AC08", Key::K),
    ("AC09", Key::L),
    ("AC10", Key::Semicolon),
    ("AC11", Key::Apostrophe),
    ("AB01", Key::Z),
    ("AB02", Key::X),
    ("AB03", Key::C),
    ("AB04", Key::V),
    ("AB05", Key::B),
    ("AB06", Key::N),
    ("AB07", Key::M),
    ("AB08", Key::Comma),
    ("AB09", Key::Period),
    ("AB10", Key::Slash),
    ("ESC", Key::Escape),
    ("FK01", Key::F1),
    ("FK02", Key::F2),
    ("FK03", Key::F3),
    ("FK04", Key::F4),
    ("FK05", Key::F5),
    ("FK06", Key::F6),
    ("FK07", Key::F7),
    ("FK08", Key::F8),
    ("FK09", Key::F9),
    ("FK10", Key::F10),
    ("FK11", Key::F11),
    ("FK12", Key::F12),
    ("FK13", Key::F13),
    ("FK14", Key::F14),
    ("FK15", Key::F15),
    ("FK16", Key::F16),
    ("FK17", Key::F17),
    ("FK18", Key::F18),
    ("FK19", Key::F19),
    ("FK20", Key::F20),
    ("FK21", Key::F21),
    ("FK22", Key::F22),
    ("FK23", Key::F23),
    ("FK24", Key::F24),
    ("PRSC", Key::PrintScreen),
    ("SCLK", Key::ScrollLock),
    ("PAUS", Key::Pause),
    ("TLDE", Key::Backtick),
    ("BKSP", Key::Backspace),
    ("TAB", Key::Tab),
    ("BKSL", Key::Backslash),
    ("CAPS", Key::CapsLock),
    ("RTRN", Key::Return),
    ("LFSH", Key::LShift),
    ("RTSH", Key::RShift),
    ("LCTL", Key::LControl),
    ("LWIN", Key::LMeta),
    ("LALT", Key::LAlt),
    ("SPCE", Key::Space),
    ("RALT", Key::RAlt),
    ("RWIN", Key::RMeta),
    ("COMP", Key::Menu),
    ("MENU", Key::Menu),
    ("RCTL", Key::RControl),
    ("INS", Key::Insert),
    ("HOME", Key::Home),
    ("PGUP", Key::PageUp),
    ("DELE", Key::Delete),
    ("END", Key::End),
    ("PGDN", Key::PageDown),
    ("UP", Key::Up),
    ("LEFT", Key::Left),
    ("DOWN", Key::Down),
    ("RGHT", Key::Right),
    ("NMLK", Key::NumLock),
    ("KPDV", Key::Divide),
    ("KPMU", Key::Multiply),
    ("KPSU", Key::Subtract),
    ("KPAD", Key::Add),
    ("KPEN", Key::Enter),
    ("KPDL", Key::Decimal),
    ("KP0", Key::Numpad0),
    ("KP1", Key::Numpad1),
    ("KP2", Key::Numpad2),
    ("KP3", Key::Numpad3),
    ("KP4", Key::Numpad4),
    ("KP5", Key::Numpad5),
    ("KP6", Key::Numpad6),
    ("KP7", Key::Numpad7),
    ("KP8", Key::Numpad8),
    ("KP9", Key::Numpad9),
];

/// Keycode → name assignments of the stock `evdev` XKB keycodes file, the
/// keymap virtually every modern X server runs with.
pub const EVDEV_KEYCODES: &[(u32, &str)] = &[
    (9, "ESC"),
    (10, "AE01"),
    (11, "AE02"),
    (12, "AE03"),
    (13, "AE04"),
    (14, "AE05"),
    (15, "AE06"),
    (16, "AE07"),
    (17, "AE08"),
    (18, "AE09"),
    (19, "AE10"),
    (20, "AE11"),
    (21, "AE12"),
    (22, "BKSP"),
    (23, "TAB"),
    (24, "AD01"),
    (25, "AD02"),
    (26, "AD03"),
    (27, "AD04"),
    (28, "AD05"),
    (29, "AD06"),
    (30, "AD07"),
    (31, "AD08"),
    (32, "AD09"),
    (33, "AD10"),
    (34, "AD11"),
    (35, "AD12"),
    (36, "RTRN"),
    (37, "LCTL"),
    (38, "AC01"),
    (39, "AC02"),
    (40, "AC03"),
    (41, "AC04"),
    (42, "AC05"),
    (43, "AC06"),
    (44, "AC07"),
    (45, "AC08"),
    (46, "AC09"),
    (47, "AC10"),
    (48, "AC11"),
    (49, "TLDE"),
    (50, "LFSH"),
    (51, "BKSL"),
    (52, "AB01"),
    (53, "AB02"),
    (54, "AB03"),
    (55, "AB04"),
    (56, "AB05"),
    (57, "AB06"),
    (58, "AB07"),
    (59, "AB08"),
    (60, "AB09"),
    (61, "AB10"),
    (62, "RTSH"),
    (63, "KPMU"),
    (64, "LALT"),
    (65, "SPCE"),
    (66, "CAPS"),
    (67, "FK01"),
    (68, "FK02"),
    (69, "FK03"),
    (70, "FK04"),
    (71, "FK05"),
    (72, "FK06"),
    (73, "FK07"),
    (74, "FK08"),
    (75, "FK09"),
    (76, "FK10"),
    (77, "NMLK"),
    (78, "SCLK"),
    (79, "KP7"),
    (80, "KP8"),
    (81, "KP9"),
    (82, "KPSU"),
    (83, "KP4"),
    (84, "KP5"),
    (85, "KP6"),
    (86, "KPAD"),
    (87, "KP1"),
    (88, "KP2"),
    (89, "KP3"),
    (90, "KP0"),
    (91, "KPDL"),
    (92, "LVL3"),
    (94, "LSGT"),
    (95, "FK11"),
    (96, "FK12"),
    (104, "KPEN"),
    (105, "RCTL"),
    (106, "KPDV"),
    (107, "PRSC"),
    (108, "RALT"),
    (110, "HOME"),
    (111, "UP"),
    (112, "PGUP"),
    (113, "LEFT"),
    (114, "RGHT"),
    (115, "END"),
    (116, "DOWN"),
    (117, "PGDN"),
    (118, "INS"),
    (119, "DELE"),
    (127, "PAUS"),
    (133, "LWIN"),
    (134, "RWIN"),
    (135, "COMP"),
    (191, "FK13"),
    (192, "FK14"),
    (193, "FK15"),
    (194, "FK16"),
    (195, "FK17"),
    (196, "FK18"),
    (197, "FK19"),
    (198, "FK20"),
    (199, "FK21"),
    (200, "FK22"),
    (201, "FK23"),
    (202, "FK24"),
];

/// Resolves a raw XKB key name (NUL padded, at most four bytes).
pub fn key_for_xkb_name(raw: &[u8]) -> Key {
    let len = raw
        .iter()
        .take(XKB_KEY_NAME_LENGTH)
        .position(|b| *b == 0)
        .unwrap_or_else(|| raw.len().min(XKB_KEY_NAME_LENGTH));
    let name = &raw[..len];

    XKB_KEY_NAMES
        .iter()
        .find(|(candidate, _)| candidate.as_bytes() == name)
        .map(|(_, key)| *key)
        .unwrap_or(Key::Unknown)
}

/// Builds the session table from `(keycode, XKB name)` pairs as reported by
/// the server. Codes should arrive in ascending order so that shared keys
/// resolve back to their lowest keycode.
pub fn build_key_table<'a, I>(names: I) -> KeyTable
where
    I: IntoIterator<Item = (u32, &'a [u8])>,
{
    KeyTable::from_pairs(
        names
            .into_iter()
            .map(|(code, name)| (code, key_for_xkb_name(name))),
    )
}

/// Table for a server using the stock evdev keycodes.
pub fn evdev_key_table() -> KeyTable {
    build_key_table(
        EVDEV_KEYCODES
            .iter()
            .map(|(code, name)| (*code, name.as_bytes())),
    )
}
