//! Translation of window messages into portable events.
//!
//! The window procedure records every message it sees as a
//! [`NativeMessage`]; the polling thread later feeds them through a
//! [`Translator`]. Message identifiers are spelled out here so the logic
//! builds and tests on every platform.

use std::collections::VecDeque;

use log::{debug, trace};

use super::keymap::resolve_virtual_key;
use crate::backend::WindowState;
use crate::input::{
    CursorExitEvent, CursorMoveEvent, CursorPos, Event, KeyCharEvent, KeyEvent, MouseButton,
    MouseButtonEvent, MoveEvent, Position, ResizeEvent, ScrollEvent, Size,
};
use crate::keytable::KeyTable;

pub const WM_MOVE: u32 = 0x0003;
pub const WM_SIZE: u32 = 0x0005;
pub const WM_PAINT: u32 = 0x000F;
pub const WM_CLOSE: u32 = 0x0010;
pub const WM_KEYDOWN: u32 = 0x0100;
pub const WM_KEYUP: u32 = 0x0101;
pub const WM_CHAR: u32 = 0x0102;
pub const WM_SYSKEYDOWN: u32 = 0x0104;
pub const WM_SYSKEYUP: u32 = 0x0105;
pub const WM_MOUSEMOVE: u32 = 0x0200;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_RBUTTONDOWN: u32 = 0x0204;
pub const WM_RBUTTONUP: u32 = 0x0205;
pub const WM_MBUTTONDOWN: u32 = 0x0207;
pub const WM_MBUTTONUP: u32 = 0x0208;
pub const WM_MOUSEWHEEL: u32 = 0x020A;
pub const WM_XBUTTONDOWN: u32 = 0x020B;
pub const WM_XBUTTONUP: u32 = 0x020C;
pub const WM_MOUSEHWHEEL: u32 = 0x020E;
pub const WM_MOUSELEAVE: u32 = 0x02A3;

/// `HIWORD(lParam)` flag on key messages for a released key.
pub const KF_UP: u16 = 0x8000;
pub const SIZE_MINIMIZED: usize = 1;
pub const WHEEL_DELTA: f64 = 120.0;
pub const XBUTTON1: u16 = 0x0001;
pub const XBUTTON2: u16 = 0x0002;

/// A window message as captured by the window procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeMessage {
    pub msg: u32,
    pub wparam: usize,
    pub lparam: isize,
}

impl NativeMessage {
    pub const fn new(msg: u32, wparam: usize, lparam: isize) -> Self {
        Self {
            msg,
            wparam,
            lparam,
        }
    }
}

pub fn loword(value: usize) -> u16 {
    (value & 0xFFFF) as u16
}

pub fn hiword(value: usize) -> u16 {
    ((value >> 16) & 0xFFFF) as u16
}

/// Signed low/high words of an `lParam`, as `GET_X_LPARAM` and
/// `GET_Y_LPARAM` read them.
pub fn signed_words(lparam: isize) -> (i32, i32) {
    let bits = lparam as usize;
    (
        i32::from(loword(bits) as i16),
        i32::from(hiword(bits) as i16),
    )
}

/// Combines a `WM_CHAR` UTF-16 unit with a pending high surrogate.
///
/// Returns the completed scalar, or `None` while waiting for the low half
/// of a pair or when a lone surrogate has to be discarded.
pub fn combine_utf16(pending: &mut Option<u16>, unit: u16) -> Option<u32> {
    match unit {
        0xD800..=0xDBFF => {
            *pending = Some(unit);
            None
        }
        0xDC00..=0xDFFF => {
            let high = pending.take()?;
            Some(0x1_0000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(unit) - 0xDC00))
        }
        _ => {
            pending.take();
            Some(u32::from(unit))
        }
    }
}

/// Per-poll translation context.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    pub keys: &'a KeyTable,
    /// Screen position of the client area origin, used to derive screen
    /// coordinates for pointer motion.
    pub client_origin: Position,
    /// Scan code to sided virtual key, used to tell the Shift keys apart.
    pub scan_to_virtual_key: fn(u32) -> u16,
}

impl Translator<'_> {
    pub fn translate(&self, message: &NativeMessage, state: &mut WindowState, out: &mut VecDeque<Event>) {
        let NativeMessage {
            msg,
            wparam,
            lparam,
        } = *message;
        trace!("win32 message {msg:#06x} wparam={wparam:#x} lparam={lparam:#x}");

        match msg {
            WM_CLOSE => {
                debug!("close requested");
                state.close_requested = true;
            }
            WM_KEYDOWN | WM_KEYUP | WM_SYSKEYDOWN | WM_SYSKEYUP => {
                let down = hiword(lparam as usize) & KF_UP == 0;
                let vk = resolve_virtual_key(loword(wparam), lparam, self.scan_to_virtual_key);
                let key = self.keys.from_native_key_code(u32::from(vk));
                debug!("key {key:?} {} (vk {vk:#04x})", if down { "down" } else { "up" });
                out.push_back(Event::Key(KeyEvent { key, down }));
            }
            WM_CHAR => {
                let unit = loword(wparam);
                match combine_utf16(&mut state.pending_high_surrogate, unit) {
                    Some(0) | None => {}
                    Some(code_point) => {
                        out.push_back(Event::KeyChar(KeyCharEvent { code_point }));
                    }
                }
            }
            WM_MOUSEMOVE => {
                let (x, y) = signed_words(lparam);
                let entered = state.cursor_moved();
                out.push_back(Event::CursorMove(CursorMoveEvent {
                    pos: CursorPos::new(f64::from(x), f64::from(y)),
                    screen_pos: CursorPos::new(
                        f64::from(x + self.client_origin.x),
                        f64::from(y + self.client_origin.y),
                    ),
                    entered,
                }));
            }
            WM_MOUSELEAVE => {
                state.cursor_left();
                out.push_back(Event::CursorExit(CursorExitEvent));
            }
            WM_LBUTTONDOWN => push_button(MouseButton::Left, true, out),
            WM_LBUTTONUP => push_button(MouseButton::Left, false, out),
            WM_RBUTTONDOWN => push_button(MouseButton::Right, true, out),
            WM_RBUTTONUP => push_button(MouseButton::Right, false, out),
            WM_MBUTTONDOWN => push_button(MouseButton::Middle, true, out),
            WM_MBUTTONUP => push_button(MouseButton::Middle, false, out),
            WM_XBUTTONDOWN | WM_XBUTTONUP => {
                let down = msg == WM_XBUTTONDOWN;
                match hiword(wparam) {
                    XBUTTON1 => push_button(MouseButton::X1, down, out),
                    XBUTTON2 => push_button(MouseButton::X2, down, out),
                    other => trace!("dropping unmapped extra button {other}"),
                }
            }
            WM_MOUSEWHEEL => {
                let delta = f64::from(hiword(wparam) as i16) / WHEEL_DELTA;
                out.push_back(Event::Scroll(ScrollEvent {
                    v_scroll: delta,
                    h_scroll: 0.0,
                }));
            }
            WM_MOUSEHWHEEL => {
                let delta = f64::from(hiword(wparam) as i16) / WHEEL_DELTA;
                out.push_back(Event::Scroll(ScrollEvent {
                    v_scroll: 0.0,
                    h_scroll: delta,
                }));
            }
            WM_SIZE => {
                if wparam == SIZE_MINIMIZED {
                    return;
                }
                let bits = lparam as usize;
                let size = Size::new(u32::from(loword(bits)), u32::from(hiword(bits)));
                if state.note_size(size) {
                    debug!("resized to {}x{}", size.width, size.height);
                    out.push_back(Event::Resize(ResizeEvent { size }));
                }
            }
            WM_MOVE => {
                let (x, y) = signed_words(lparam);
                let pos = Position::new(x, y);
                if state.note_position(pos) {
                    debug!("moved to {x},{y}");
                    out.push_back(Event::Move(MoveEvent { pos }));
                }
            }
            _ => {}
        }
    }
}

fn push_button(button: MouseButton, down: bool, out: &mut VecDeque<Event>) {
    debug!("mouse {button:?} {}", if down { "down" } else { "up" });
    out.push_back(Event::MouseButton(MouseButtonEvent { button, down }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::win32::keymap::{self, VK_CONTROL, VK_SHIFT};
    use crate::input::Key;

    fn run(messages: &[NativeMessage], state: &mut WindowState) -> Vec<Event> {
        let keys = keymap::build_key_table();
        let translator = Translator {
            keys: &keys,
            client_origin: Position::new(100, 200),
            scan_to_virtual_key: keymap::shift_scan_code_to_virtual_key,
        };
        let mut out = VecDeque::new();
        for message in messages {
            translator.translate(message, state, &mut out);
        }
        out.into_iter().collect()
    }

    fn key_lparam(scan_code: isize, extended: bool, up: bool) -> isize {
        let mut lparam = 1 | (scan_code << 16);
        if extended {
            lparam |= keymap::KF_EXTENDED_LPARAM;
        }
        if up {
            lparam |= 0xC000_0000u32 as i32 as isize;
        }
        lparam
    }

    fn keys_of(events: &[Event]) -> Vec<(Key, bool)> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::Key(e) => Some((e.key, e.down)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn key_transitions_use_the_up_flag() {
        let mut state = WindowState::default();
        let events = run(
            &[
                NativeMessage::new(WM_KEYDOWN, 0x41, key_lparam(0x1E, false, false)),
                NativeMessage::new(WM_KEYUP, 0x41, key_lparam(0x1E, false, true)),
            ],
            &mut state,
        );
        assert_eq!(keys_of(&events), vec![(Key::A, true), (Key::A, false)]);
    }

    #[test]
    fn modifiers_are_sided() {
        let mut state = WindowState::default();
        let events = run(
            &[
                NativeMessage::new(WM_KEYDOWN, VK_SHIFT.into(), key_lparam(0x2A, false, false)),
                NativeMessage::new(WM_KEYDOWN, VK_SHIFT.into(), key_lparam(0x36, false, false)),
                NativeMessage::new(WM_KEYDOWN, VK_CONTROL.into(), key_lparam(0x1D, false, false)),
                NativeMessage::new(WM_KEYDOWN, VK_CONTROL.into(), key_lparam(0x1D, true, false)),
                NativeMessage::new(WM_SYSKEYDOWN, 0x12, key_lparam(0x38, false, false)),
                NativeMessage::new(WM_SYSKEYUP, 0x12, key_lparam(0x38, true, true)),
            ],
            &mut state,
        );
        assert_eq!(
            keys_of(&events),
            vec![
                (Key::LShift, true),
                (Key::RShift, true),
                (Key::LControl, true),
                (Key::RControl, true),
                (Key::LAlt, true),
                (Key::RAlt, false),
            ]
        );
    }

    #[test]
    fn unmapped_virtual_key_is_unknown() {
        let mut state = WindowState::default();
        let events = run(&[NativeMessage::new(WM_KEYDOWN, 0xE2, 0)], &mut state);
        assert_eq!(keys_of(&events), vec![(Key::Unknown, true)]);
    }

    #[test]
    fn characters_combine_surrogate_pairs() {
        let mut state = WindowState::default();
        let events = run(
            &[
                NativeMessage::new(WM_CHAR, 'x' as usize, 0),
                NativeMessage::new(WM_CHAR, 0xD83D, 0),
                NativeMessage::new(WM_CHAR, 0xDE00, 0),
                // Lone low surrogate is discarded
                NativeMessage::new(WM_CHAR, 0xDC00, 0),
            ],
            &mut state,
        );
        assert_eq!(
            events,
            vec![
                Event::KeyChar(KeyCharEvent { code_point: 0x78 }),
                Event::KeyChar(KeyCharEvent { code_point: 0x1F600 }),
            ]
        );
        assert_eq!(state.pending_high_surrogate, None);
    }

    #[test]
    fn combine_utf16_resets_on_plain_unit() {
        let mut pending = None;
        assert_eq!(combine_utf16(&mut pending, 0xD801), None);
        assert_eq!(combine_utf16(&mut pending, 0x41), Some(0x41));
        assert_eq!(combine_utf16(&mut pending, 0xDC37), None);
    }

    #[test]
    fn mouse_motion_reports_screen_coordinates_and_entry() {
        let mut state = WindowState::default();
        let lparam = (20 << 16) | 10;
        let events = run(
            &[
                NativeMessage::new(WM_MOUSEMOVE, 0, lparam),
                NativeMessage::new(WM_MOUSEMOVE, 0, lparam),
                NativeMessage::new(WM_MOUSELEAVE, 0, 0),
                NativeMessage::new(WM_MOUSEMOVE, 0, lparam),
            ],
            &mut state,
        );
        let moves: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                Event::CursorMove(e) => Some(*e),
                _ => None,
            })
            .collect();
        assert_eq!(moves.len(), 3);
        assert!(moves[0].entered);
        assert!(!moves[1].entered);
        assert!(moves[2].entered);
        assert_eq!(moves[0].pos, CursorPos::new(10.0, 20.0));
        assert_eq!(moves[0].screen_pos, CursorPos::new(110.0, 220.0));
        assert_eq!(events[2], Event::CursorExit(CursorExitEvent));
    }

    #[test]
    fn negative_client_coordinates_stay_signed() {
        let mut state = WindowState::default();
        let lparam = (0xFFFF_FFFBu32 as usize) as isize;
        let events = run(&[NativeMessage::new(WM_MOUSEMOVE, 0, lparam)], &mut state);
        let Event::CursorMove(event) = events[0] else {
            panic!("expected cursor move");
        };
        assert_eq!(event.pos, CursorPos::new(-5.0, -1.0));
    }

    #[test]
    fn buttons_and_extra_buttons() {
        let mut state = WindowState::default();
        let events = run(
            &[
                NativeMessage::new(WM_LBUTTONDOWN, 0, 0),
                NativeMessage::new(WM_RBUTTONUP, 0, 0),
                NativeMessage::new(WM_MBUTTONDOWN, 0, 0),
                NativeMessage::new(WM_XBUTTONDOWN, (XBUTTON1 as usize) << 16, 0),
                NativeMessage::new(WM_XBUTTONUP, (XBUTTON2 as usize) << 16, 0),
                NativeMessage::new(WM_XBUTTONUP, 7 << 16, 0),
            ],
            &mut state,
        );
        let buttons: Vec<_> = events
            .iter()
            .map(|event| match event {
                Event::MouseButton(e) => (e.button, e.down),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            buttons,
            vec![
                (MouseButton::Left, true),
                (MouseButton::Right, false),
                (MouseButton::Middle, true),
                (MouseButton::X1, true),
                (MouseButton::X2, false),
            ]
        );
    }

    #[test]
    fn wheel_deltas_are_in_notches() {
        let mut state = WindowState::default();
        let down = (-240i16 as u16 as usize) << 16;
        let events = run(
            &[
                NativeMessage::new(WM_MOUSEWHEEL, 120 << 16, 0),
                NativeMessage::new(WM_MOUSEWHEEL, down, 0),
                NativeMessage::new(WM_MOUSEHWHEEL, 60 << 16, 0),
            ],
            &mut state,
        );
        assert_eq!(
            events,
            vec![
                Event::Scroll(ScrollEvent {
                    v_scroll: 1.0,
                    h_scroll: 0.0
                }),
                Event::Scroll(ScrollEvent {
                    v_scroll: -2.0,
                    h_scroll: 0.0
                }),
                Event::Scroll(ScrollEvent {
                    v_scroll: 0.0,
                    h_scroll: 0.5
                }),
            ]
        );
    }

    #[test]
    fn size_and_move_are_deduplicated() {
        let mut state = WindowState::with_geometry(Position::new(10, 10), Size::new(800, 600));
        let size = (600 << 16) | 800;
        let larger = (600 << 16) | 1024;
        let moved = (0xFFF6 << 16) | 0xFFEC;
        let events = run(
            &[
                NativeMessage::new(WM_SIZE, 0, size),
                NativeMessage::new(WM_SIZE, 0, larger),
                NativeMessage::new(WM_SIZE, 0, larger),
                NativeMessage::new(WM_SIZE, SIZE_MINIMIZED, 0),
                NativeMessage::new(WM_MOVE, 0, moved),
                NativeMessage::new(WM_MOVE, 0, moved),
            ],
            &mut state,
        );
        assert_eq!(
            events,
            vec![
                Event::Resize(ResizeEvent {
                    size: Size::new(1024, 600)
                }),
                Event::Move(MoveEvent {
                    pos: Position::new(-20, -10)
                }),
            ]
        );
    }

    #[test]
    fn close_and_paint_dispatch_nothing() {
        let mut state = WindowState::default();
        let events = run(
            &[
                NativeMessage::new(WM_PAINT, 0, 0),
                NativeMessage::new(WM_CLOSE, 0, 0),
            ],
            &mut state,
        );
        assert!(events.is_empty());
        assert!(state.is_close_requested());
    }
}
