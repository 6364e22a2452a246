//! Translation of decoded X11 events into portable events.
//!
//! The native layer decodes `XEvent` unions into [`NativeEvent`] (running
//! input-method composition for key presses on the way) and hands them to a
//! [`Translator`]. Nothing in here touches Xlib.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::backend::WindowState;
use crate::input::utf8::decode_code_points;
use crate::input::{
    CursorExitEvent, CursorMoveEvent, CursorPos, Event, KeyCharEvent, KeyEvent, MouseButton,
    MouseButtonEvent, MoveEvent, Position, ResizeEvent, ScrollEvent, Size,
};
use crate::keytable::KeyTable;

/// X11 atom identifier, widened to 64 bits.
pub type Atom = u64;

pub const BUTTON_LEFT: u32 = 1;
pub const BUTTON_MIDDLE: u32 = 2;
pub const BUTTON_RIGHT: u32 = 3;
pub const BUTTON_SCROLL_UP: u32 = 4;
pub const BUTTON_SCROLL_DOWN: u32 = 5;
pub const BUTTON_BACK: u32 = 8;
pub const BUTTON_FORWARD: u32 = 9;

/// An X11 event reduced to the fields the translator needs.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    /// Key press with the UTF-8 text composed for it (empty if none).
    KeyPress { keycode: u32, text: Vec<u8> },
    KeyRelease { keycode: u32 },
    ButtonPress { button: u32 },
    ButtonRelease { button: u32 },
    /// Pointer motion in client (`x`, `y`) and root coordinates.
    Motion {
        x: i32,
        y: i32,
        x_root: i32,
        y_root: i32,
    },
    Leave,
    /// `WM_PROTOCOLS` client message carrying the named protocol atom.
    ClientMessage { protocol: Atom },
    /// Structure change with the client origin in root coordinates.
    Configure {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    Expose,
}

/// Maps a core pointer button to a portable button.
pub fn mouse_button(button: u32) -> Option<MouseButton> {
    match button {
        BUTTON_LEFT => Some(MouseButton::Left),
        BUTTON_MIDDLE => Some(MouseButton::Middle),
        BUTTON_RIGHT => Some(MouseButton::Right),
        BUTTON_BACK => Some(MouseButton::X1),
        BUTTON_FORWARD => Some(MouseButton::X2),
        _ => None,
    }
}

/// Per-session translation context.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    pub keys: &'a KeyTable,
    pub wm_delete_window: Atom,
}

impl Translator<'_> {
    /// Translates one native event, appending any portable events to `out`
    /// in dispatch order.
    pub fn translate(&self, event: &NativeEvent, state: &mut WindowState, out: &mut VecDeque<Event>) {
        trace!("x11 event: {event:?}");

        match event {
            NativeEvent::KeyPress { keycode, text } => {
                out.extend(
                    decode_code_points(text)
                        .map(|code_point| Event::KeyChar(KeyCharEvent { code_point })),
                );
                let key = self.keys.from_native_key_code(*keycode);
                debug!("key {key:?} down (keycode {keycode})");
                out.push_back(Event::Key(KeyEvent { key, down: true }));
            }
            NativeEvent::KeyRelease { keycode } => {
                let key = self.keys.from_native_key_code(*keycode);
                debug!("key {key:?} up (keycode {keycode})");
                out.push_back(Event::Key(KeyEvent { key, down: false }));
            }
            NativeEvent::ButtonPress { button } => match *button {
                BUTTON_SCROLL_UP => out.push_back(Event::Scroll(ScrollEvent {
                    v_scroll: 1.0,
                    h_scroll: 0.0,
                })),
                BUTTON_SCROLL_DOWN => out.push_back(Event::Scroll(ScrollEvent {
                    v_scroll: -1.0,
                    h_scroll: 0.0,
                })),
                other => self.push_button(other, true, out),
            },
            NativeEvent::ButtonRelease { button } => self.push_button(*button, false, out),
            NativeEvent::Motion {
                x,
                y,
                x_root,
                y_root,
            } => {
                let entered = state.cursor_moved();
                out.push_back(Event::CursorMove(CursorMoveEvent {
                    pos: CursorPos::new(f64::from(*x), f64::from(*y)),
                    screen_pos: CursorPos::new(f64::from(*x_root), f64::from(*y_root)),
                    entered,
                }));
            }
            NativeEvent::Leave => {
                state.cursor_left();
                out.push_back(Event::CursorExit(CursorExitEvent));
            }
            NativeEvent::ClientMessage { protocol } => {
                if *protocol == self.wm_delete_window {
                    debug!("close requested by window manager");
                    state.close_requested = true;
                }
            }
            NativeEvent::Configure {
                x,
                y,
                width,
                height,
            } => {
                let size = Size::new(*width, *height);
                if state.note_size(size) {
                    debug!("resized to {}x{}", size.width, size.height);
                    out.push_back(Event::Resize(ResizeEvent { size }));
                }
                let pos = Position::new(*x, *y);
                if state.note_position(pos) {
                    debug!("moved to {},{}", pos.x, pos.y);
                    out.push_back(Event::Move(MoveEvent { pos }));
                }
            }
            NativeEvent::Expose => {}
        }
    }

    fn push_button(&self, button: u32, down: bool, out: &mut VecDeque<Event>) {
        match mouse_button(button) {
            Some(button) => {
                debug!("mouse {button:?} {}", if down { "down" } else { "up" });
                out.push_back(Event::MouseButton(MouseButtonEvent { button, down }));
            }
            None => trace!("dropping unmapped pointer button {button}"),
        }
    }
}
