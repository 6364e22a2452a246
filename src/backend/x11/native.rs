//! Xlib-backed window.
//!
//! libX11 is loaded at runtime through `x11-dl`, so binaries start on
//! machines without X libraries and fail only when a window is opened.

use std::collections::VecDeque;
use std::ffi::{c_char, c_int, c_long, c_uchar, c_uint, c_ulong, c_void};
use std::{mem, ptr, slice};

use log::{debug, info, trace, warn};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle, XlibDisplayHandle, XlibWindowHandle};
use x11_dl::xlib;

use super::keymap::build_key_table;
use super::translate::{Atom, NativeEvent, Translator};
use crate::backend::{Backend, NativeHandles, WindowState};
use crate::error::{Result, WindowError};
use crate::input::{CursorPos, Event, Key, MouseButton, Position, Size};
use crate::keytable::KeyTable;

const XKB_USE_CORE_KBD: c_uint = 0x0100;
const XKB_KEY_NAMES_MASK: c_uint = 1 << 9;

const XIM_PREEDIT_NOTHING: c_ulong = 0x0008;
const XIM_STATUS_NOTHING: c_ulong = 0x0400;
const XN_INPUT_STYLE: &[u8] = b"inputStyle\0";
const XN_CLIENT_WINDOW: &[u8] = b"clientWindow\0";
const XN_FOCUS_WINDOW: &[u8] = b"focusWindow\0";

const X_BUFFER_OVERFLOW: c_int = -1;
const X_LOOKUP_CHARS: c_int = 2;
const X_LOOKUP_BOTH: c_int = 4;

const US_POSITION: c_long = 1 << 0;
const P_POSITION: c_long = 1 << 2;

const NET_WM_STATE_REMOVE: c_long = 0;
const NET_WM_STATE_ADD: c_long = 1;

const CAPS_LOCK_INDICATOR: c_uint = 0x1;
const NUM_LOCK_INDICATOR: c_uint = 0x2;
const SCROLL_LOCK_INDICATOR: c_uint = 0x4;

/// Longest property read, in 32-bit units.
const PROPERTY_MAX_LONGS: c_long = 1 << 16;

#[derive(Debug, Clone, Copy)]
struct Atoms {
    wm_delete_window: xlib::Atom,
    net_wm_name: xlib::Atom,
    net_wm_state: xlib::Atom,
    net_wm_state_fullscreen: xlib::Atom,
    net_frame_extents: xlib::Atom,
    utf8_string: xlib::Atom,
}

enum PropertyData {
    Bytes(Vec<u8>),
    Longs(Vec<c_ulong>),
}

struct PointerState {
    root: (c_int, c_int),
    window: (c_int, c_int),
    mask: c_uint,
}

pub(crate) struct X11Backend {
    xlib: xlib::Xlib,
    display: *mut xlib::Display,
    screen: c_int,
    root: xlib::Window,
    window: xlib::Window,
    im: xlib::XIM,
    ic: xlib::XIC,
    atoms: Atoms,
    keys: KeyTable,
    windowed: Option<(Position, Size)>,
    pending: VecDeque<Event>,
}

impl X11Backend {
    pub(crate) fn open(title: &str, size: Size, position: Option<Position>) -> Result<Self> {
        let xlib = xlib::Xlib::open()
            .map_err(|err| WindowError::Connection(format!("failed to load libX11: {err}")))?;

        // SAFETY: every call below goes through function pointers loaded from
        // libX11 and receives the display it just opened.
        unsafe {
            let display = (xlib.XOpenDisplay)(ptr::null());
            if display.is_null() {
                return Err(WindowError::Connection(
                    "XOpenDisplay failed; is DISPLAY set?".into(),
                ));
            }

            let screen = (xlib.XDefaultScreen)(display);
            let root = (xlib.XRootWindow)(display, screen);
            let origin = position.unwrap_or_default();
            let window = (xlib.XCreateSimpleWindow)(
                display,
                root,
                origin.x,
                origin.y,
                size.width.max(1),
                size.height.max(1),
                0,
                (xlib.XBlackPixel)(display, screen),
                (xlib.XWhitePixel)(display, screen),
            );
            if window == 0 {
                (xlib.XCloseDisplay)(display);
                return Err(WindowError::Creation("XCreateSimpleWindow failed".into()));
            }

            let atoms = Atoms {
                wm_delete_window: intern(&xlib, display, c"WM_DELETE_WINDOW"),
                net_wm_name: intern(&xlib, display, c"_NET_WM_NAME"),
                net_wm_state: intern(&xlib, display, c"_NET_WM_STATE"),
                net_wm_state_fullscreen: intern(&xlib, display, c"_NET_WM_STATE_FULLSCREEN"),
                net_frame_extents: intern(&xlib, display, c"_NET_FRAME_EXTENTS"),
                utf8_string: intern(&xlib, display, c"UTF8_STRING"),
            };

            let keys = read_key_table(&xlib, display);
            debug!("built X11 key table with {} mapped keycodes", keys.len());

            let mut backend = Self {
                xlib,
                display,
                screen,
                root,
                window,
                im: ptr::null_mut(),
                ic: ptr::null_mut(),
                atoms,
                keys,
                windowed: None,
                pending: VecDeque::new(),
            };
            backend.open_input_method();

            let xlib = &backend.xlib;
            (xlib.XSelectInput)(
                display,
                window,
                xlib::ExposureMask
                    | xlib::KeyPressMask
                    | xlib::KeyReleaseMask
                    | xlib::StructureNotifyMask
                    | xlib::PointerMotionMask
                    | xlib::LeaveWindowMask
                    | xlib::ButtonPressMask
                    | xlib::ButtonReleaseMask
                    | xlib::ButtonMotionMask,
            );

            let mut protocols = [atoms.wm_delete_window];
            (xlib.XSetWMProtocols)(display, window, protocols.as_mut_ptr(), 1);

            if let Some(position) = position {
                let mut hints: xlib::XSizeHints = mem::zeroed();
                hints.flags = US_POSITION | P_POSITION;
                hints.x = position.x;
                hints.y = position.y;
                (xlib.XSetWMNormalHints)(display, window, &mut hints);
            }

            (xlib.XMapWindow)(display, window);
            backend.set_title(title);
            (backend.xlib.XFlush)(display);

            info!("opened X11 window \"{title}\" ({}x{})", size.width, size.height);
            Ok(backend)
        }
    }

    /// Opens an input method for composed text, falling back to the
    /// built-in `@im=none` method when the configured one is unavailable.
    fn open_input_method(&mut self) {
        let xlib = &self.xlib;
        // SAFETY: the display is open and the locale strings are NUL terminated.
        unsafe {
            (xlib.XSetLocaleModifiers)(c"".as_ptr());
            let mut im = (xlib.XOpenIM)(self.display, ptr::null_mut(), ptr::null_mut(), ptr::null_mut());
            if im.is_null() {
                warn!("no X input method available; falling back to @im=none");
                (xlib.XSetLocaleModifiers)(c"@im=none".as_ptr());
                im = (xlib.XOpenIM)(self.display, ptr::null_mut(), ptr::null_mut(), ptr::null_mut());
            }
            if im.is_null() {
                warn!("could not open any X input method; text input is disabled");
                return;
            }

            let ic = (xlib.XCreateIC)(
                im,
                XN_INPUT_STYLE.as_ptr() as *const c_char,
                XIM_PREEDIT_NOTHING | XIM_STATUS_NOTHING,
                XN_CLIENT_WINDOW.as_ptr() as *const c_char,
                self.window,
                XN_FOCUS_WINDOW.as_ptr() as *const c_char,
                self.window,
                ptr::null_mut::<c_void>(),
            );
            if ic.is_null() {
                warn!("could not create an X input context; text input is disabled");
            }
            self.im = im;
            self.ic = ic;
        }
    }

    fn is_open(&self) -> bool {
        !self.display.is_null()
    }

    fn flush(&self) {
        // SAFETY: display is open.
        unsafe {
            (self.xlib.XFlush)(self.display);
        }
    }

    /// Runs input-method composition for a key press.
    fn compose(&self, event: &mut xlib::XKeyEvent) -> Vec<u8> {
        if self.ic.is_null() {
            return Vec::new();
        }

        let mut buffer = vec![0u8; 32];
        loop {
            let mut keysym: xlib::KeySym = 0;
            let mut status: c_int = 0;
            // SAFETY: buffer length is passed alongside the pointer.
            let len = unsafe {
                (self.xlib.Xutf8LookupString)(
                    self.ic,
                    event,
                    buffer.as_mut_ptr() as *mut c_char,
                    buffer.len() as c_int,
                    &mut keysym,
                    &mut status,
                )
            };
            if status == X_BUFFER_OVERFLOW {
                buffer.resize(len.max(0) as usize + 1, 0);
                continue;
            }
            if status != X_LOOKUP_CHARS && status != X_LOOKUP_BOTH {
                return Vec::new();
            }
            buffer.truncate(len.max(0) as usize);
            return buffer;
        }
    }

    /// Reduces an Xlib event to what the translator needs. Events for other
    /// windows or of uninteresting types yield `None`.
    fn decode(&self, event: &mut xlib::XEvent) -> Option<NativeEvent> {
        // SAFETY: union fields are read according to the event type tag.
        unsafe {
            match event.get_type() {
                xlib::KeyPress => {
                    let filtered = (self.xlib.XFilterEvent)(event, 0) != 0;
                    let keycode = event.key.keycode;
                    let text = if filtered {
                        Vec::new()
                    } else {
                        self.compose(&mut event.key)
                    };
                    Some(NativeEvent::KeyPress { keycode, text })
                }
                xlib::KeyRelease => Some(NativeEvent::KeyRelease {
                    keycode: event.key.keycode,
                }),
                xlib::ButtonPress => Some(NativeEvent::ButtonPress {
                    button: event.button.button,
                }),
                xlib::ButtonRelease => Some(NativeEvent::ButtonRelease {
                    button: event.button.button,
                }),
                xlib::MotionNotify => Some(NativeEvent::Motion {
                    x: event.motion.x,
                    y: event.motion.y,
                    x_root: event.motion.x_root,
                    y_root: event.motion.y_root,
                }),
                xlib::LeaveNotify => Some(NativeEvent::Leave),
                xlib::ClientMessage => Some(NativeEvent::ClientMessage {
                    protocol: event.client_message.data.get_long(0) as Atom,
                }),
                xlib::ConfigureNotify => {
                    let configure = &event.configure;
                    if configure.window != self.window {
                        return None;
                    }
                    // Reparenting window managers report parent-relative
                    // origins, so read the root position back.
                    let origin = self.client_origin();
                    Some(NativeEvent::Configure {
                        x: origin.x,
                        y: origin.y,
                        width: configure.width.max(0) as u32,
                        height: configure.height.max(0) as u32,
                    })
                }
                xlib::Expose => Some(NativeEvent::Expose),
                other => {
                    trace!("ignoring X11 event type {other}");
                    None
                }
            }
        }
    }

    fn client_origin(&self) -> Position {
        let mut x = 0;
        let mut y = 0;
        let mut child: xlib::Window = 0;
        // SAFETY: display and window are live; outputs are local.
        unsafe {
            (self.xlib.XTranslateCoordinates)(
                self.display,
                self.window,
                self.root,
                0,
                0,
                &mut x,
                &mut y,
                &mut child,
            );
        }
        Position::new(x, y)
    }

    fn query_pointer(&self) -> PointerState {
        let mut root_return: xlib::Window = 0;
        let mut child_return: xlib::Window = 0;
        let mut root = (0, 0);
        let mut window = (0, 0);
        let mut mask = 0;
        // SAFETY: display and window are live; outputs are local.
        unsafe {
            (self.xlib.XQueryPointer)(
                self.display,
                self.window,
                &mut root_return,
                &mut child_return,
                &mut root.0,
                &mut root.1,
                &mut window.0,
                &mut window.1,
                &mut mask,
            );
        }
        PointerState { root, window, mask }
    }

    fn read_property(&self, property: xlib::Atom) -> Option<PropertyData> {
        let mut actual_type: xlib::Atom = 0;
        let mut format: c_int = 0;
        let mut items: c_ulong = 0;
        let mut bytes_after: c_ulong = 0;
        let mut data: *mut c_uchar = ptr::null_mut();

        // SAFETY: the returned buffer holds `items` elements of `format` bits
        // and is released with XFree before returning.
        unsafe {
            let status = (self.xlib.XGetWindowProperty)(
                self.display,
                self.window,
                property,
                0,
                PROPERTY_MAX_LONGS,
                xlib::False,
                xlib::AnyPropertyType as xlib::Atom,
                &mut actual_type,
                &mut format,
                &mut items,
                &mut bytes_after,
                &mut data,
            );
            if status != xlib::Success as c_int || data.is_null() {
                return None;
            }

            let items = items as usize;
            let result = match format {
                8 => Some(PropertyData::Bytes(slice::from_raw_parts(data, items).to_vec())),
                32 => Some(PropertyData::Longs(
                    slice::from_raw_parts(data as *const c_ulong, items).to_vec(),
                )),
                other => {
                    warn!("unexpected property format {other}");
                    None
                }
            };
            (self.xlib.XFree)(data as *mut c_void);
            result
        }
    }

    fn send_wm_state(&self, add: bool) {
        // SAFETY: the message is fully initialised before being sent.
        unsafe {
            let mut message: xlib::XClientMessageEvent = mem::zeroed();
            message.type_ = xlib::ClientMessage;
            message.display = self.display;
            message.window = self.window;
            message.message_type = self.atoms.net_wm_state;
            message.send_event = xlib::True;
            message.format = 32;
            let action = if add {
                NET_WM_STATE_ADD
            } else {
                NET_WM_STATE_REMOVE
            };
            message.data.set_long(0, action);
            message.data.set_long(1, self.atoms.net_wm_state_fullscreen as c_long);
            message.data.set_long(3, 1);

            let mut event = xlib::XEvent {
                client_message: message,
            };
            (self.xlib.XSendEvent)(
                self.display,
                self.root,
                xlib::False,
                xlib::SubstructureNotifyMask | xlib::SubstructureRedirectMask,
                &mut event,
            );
        }
        self.flush();
    }

    fn warp_pointer(&self, target: xlib::Window, pos: CursorPos) {
        // SAFETY: display and target window are live.
        unsafe {
            (self.xlib.XWarpPointer)(
                self.display,
                0,
                target,
                0,
                0,
                0,
                0,
                pos.x as c_int,
                pos.y as c_int,
            );
        }
        self.flush();
    }
}

impl Drop for X11Backend {
    fn drop(&mut self) {
        self.close();
    }
}

impl Backend for X11Backend {
    fn name(&self) -> &'static str {
        "x11"
    }

    fn key_table(&self) -> &KeyTable {
        &self.keys
    }

    fn next_event(&mut self, state: &mut WindowState) -> Option<Event> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        if !self.is_open() {
            return None;
        }

        let translator = Translator {
            keys: &self.keys,
            wm_delete_window: self.atoms.wm_delete_window as Atom,
        };
        let mut queued = VecDeque::new();
        // SAFETY: display is open; events are fully written by XNextEvent.
        unsafe {
            while queued.is_empty() && (self.xlib.XPending)(self.display) > 0 {
                let mut event: xlib::XEvent = mem::zeroed();
                (self.xlib.XNextEvent)(self.display, &mut event);
                if let Some(native) = self.decode(&mut event) {
                    translator.translate(&native, state, &mut queued);
                }
            }
        }
        self.pending = queued;
        self.pending.pop_front()
    }

    fn wait_for_event(&mut self) {
        if !self.pending.is_empty() || !self.is_open() {
            return;
        }
        // SAFETY: XPeekEvent blocks until an event is queued and leaves it
        // in place for the following drain.
        unsafe {
            let mut event: xlib::XEvent = mem::zeroed();
            (self.xlib.XPeekEvent)(self.display, &mut event);
        }
    }

    fn close(&mut self) {
        if !self.is_open() {
            return;
        }
        // SAFETY: each resource is released once, in reverse creation order.
        unsafe {
            if !self.ic.is_null() {
                (self.xlib.XDestroyIC)(self.ic);
                self.ic = ptr::null_mut();
            }
            if !self.im.is_null() {
                (self.xlib.XCloseIM)(self.im);
                self.im = ptr::null_mut();
            }
            (self.xlib.XDestroyWindow)(self.display, self.window);
            (self.xlib.XCloseDisplay)(self.display);
        }
        self.display = ptr::null_mut();
        self.pending.clear();
        info!("closed X11 window");
    }

    fn title(&self) -> String {
        match self.read_property(self.atoms.net_wm_name) {
            Some(PropertyData::Bytes(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            _ => {
                warn!("could not read _NET_WM_NAME");
                String::new()
            }
        }
    }

    fn set_title(&mut self, title: &str) {
        let Ok(len) = c_int::try_from(title.len()) else {
            warn!("title too long for X11 property");
            return;
        };
        // SAFETY: title bytes outlive the call; length matches.
        unsafe {
            (self.xlib.XChangeProperty)(
                self.display,
                self.window,
                self.atoms.net_wm_name,
                self.atoms.utf8_string,
                8,
                xlib::PropModeReplace,
                title.as_ptr(),
                len,
            );
        }
        self.flush();
    }

    fn size(&self) -> Size {
        // SAFETY: attributes are written by the server on success.
        unsafe {
            let mut attributes: xlib::XWindowAttributes = mem::zeroed();
            if (self.xlib.XGetWindowAttributes)(self.display, self.window, &mut attributes) == 0 {
                warn!("XGetWindowAttributes failed");
                return Size::default();
            }
            Size::new(
                attributes.width.max(0) as u32,
                attributes.height.max(0) as u32,
            )
        }
    }

    fn set_size(&mut self, size: Size) {
        // SAFETY: display and window are live.
        unsafe {
            (self.xlib.XResizeWindow)(
                self.display,
                self.window,
                size.width.max(1),
                size.height.max(1),
            );
        }
        self.flush();
    }

    fn position(&self) -> Position {
        self.client_origin()
    }

    fn set_position(&mut self, position: Position) {
        let (left, top) = match self.read_property(self.atoms.net_frame_extents) {
            Some(PropertyData::Longs(extents)) if extents.len() >= 4 => {
                (extents[0] as c_int, extents[2] as c_int)
            }
            _ => (0, 0),
        };
        // SAFETY: display and window are live.
        unsafe {
            (self.xlib.XMoveWindow)(self.display, self.window, position.x - left, position.y - top);
        }
        self.flush();
    }

    fn is_fullscreen(&self) -> bool {
        match self.read_property(self.atoms.net_wm_state) {
            Some(PropertyData::Longs(states)) => states
                .iter()
                .any(|atom| *atom as xlib::Atom == self.atoms.net_wm_state_fullscreen),
            _ => false,
        }
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        if fullscreen == self.is_fullscreen() {
            return;
        }
        if fullscreen {
            self.windowed = Some((self.position(), self.size()));
            self.send_wm_state(true);
        } else {
            self.send_wm_state(false);
            if let Some((position, size)) = self.windowed.take() {
                self.set_size(size);
                self.set_position(position);
            }
        }
        debug!("requested fullscreen = {fullscreen}");
    }

    fn is_key_down(&self, key: Key) -> bool {
        let Some(code) = self.keys.to_native_key_code(key) else {
            return false;
        };
        let mut keymap = [0 as c_char; 32];
        // SAFETY: XQueryKeymap writes exactly 32 bytes.
        unsafe {
            (self.xlib.XQueryKeymap)(self.display, keymap.as_mut_ptr());
        }
        let byte = keymap[(code / 8) as usize % keymap.len()] as u8;
        byte & (1 << (code % 8)) != 0
    }

    fn is_key_toggled(&self, key: Key) -> bool {
        let bit = match key {
            Key::CapsLock => CAPS_LOCK_INDICATOR,
            Key::NumLock => NUM_LOCK_INDICATOR,
            Key::ScrollLock => SCROLL_LOCK_INDICATOR,
            _ => return false,
        };
        let mut indicators: c_uint = 0;
        // SAFETY: display is live; output is local.
        let status = unsafe {
            (self.xlib.XkbGetIndicatorState)(self.display, XKB_USE_CORE_KBD, &mut indicators)
        };
        if status != xlib::Success as c_int {
            warn!("XkbGetIndicatorState failed with status {status}");
            return false;
        }
        indicators & bit != 0
    }

    fn cursor_pos(&self) -> CursorPos {
        let (x, y) = self.query_pointer().window;
        CursorPos::new(f64::from(x), f64::from(y))
    }

    fn set_cursor_pos(&mut self, pos: CursorPos) {
        self.warp_pointer(self.window, pos);
    }

    fn cursor_screen_pos(&self) -> CursorPos {
        let (x, y) = self.query_pointer().root;
        CursorPos::new(f64::from(x), f64::from(y))
    }

    fn set_cursor_screen_pos(&mut self, pos: CursorPos) {
        self.warp_pointer(self.root, pos);
    }

    fn is_mouse_button_down(&self, button: MouseButton) -> Result<bool> {
        let mask = match button {
            MouseButton::Left => xlib::Button1Mask,
            MouseButton::Middle => xlib::Button2Mask,
            MouseButton::Right => xlib::Button3Mask,
            MouseButton::X1 | MouseButton::X2 => return Err(WindowError::UnmappedButton(button)),
        };
        Ok(self.query_pointer().mask & mask != 0)
    }

    fn native_handles(&self) -> Option<NativeHandles> {
        if !self.is_open() {
            return None;
        }
        let mut display = XlibDisplayHandle::empty();
        display.display = self.display as *mut c_void;
        display.screen = self.screen;
        let mut window = XlibWindowHandle::empty();
        window.window = self.window;
        Some(NativeHandles {
            display: RawDisplayHandle::Xlib(display),
            window: RawWindowHandle::Xlib(window),
        })
    }
}

fn intern(xlib: &xlib::Xlib, display: *mut xlib::Display, name: &std::ffi::CStr) -> xlib::Atom {
    // SAFETY: name is NUL terminated and display is open.
    unsafe { (xlib.XInternAtom)(display, name.as_ptr(), xlib::False) }
}

/// Reads XKB key names from the server and builds the session table.
fn read_key_table(xlib: &xlib::Xlib, display: *mut xlib::Display) -> KeyTable {
    // SAFETY: the keyboard description is checked for null before use and
    // freed together with its names.
    unsafe {
        let desc = (xlib.XkbGetMap)(display, 0, XKB_USE_CORE_KBD);
        if desc.is_null() {
            warn!("XkbGetMap failed; every key will report Unknown");
            return KeyTable::default();
        }

        let mut names: Vec<(u32, [u8; 4])> = Vec::new();
        if (xlib.XkbGetNames)(display, XKB_KEY_NAMES_MASK, desc) == xlib::Success as c_int {
            let desc_ref = &*desc;
            if !desc_ref.names.is_null() && !(*desc_ref.names).keys.is_null() {
                let max = u32::from(desc_ref.max_key_code);
                let min = u32::from(desc_ref.min_key_code);
                let keys = slice::from_raw_parts((*desc_ref.names).keys, max as usize + 1);
                names = (min..=max)
                    .map(|code| (code, keys[code as usize].name.map(|c| c as u8)))
                    .collect();
            }
            (xlib.XkbFreeNames)(desc, XKB_KEY_NAMES_MASK, xlib::True);
        } else {
            warn!("XkbGetNames failed; every key will report Unknown");
        }
        (xlib.XkbFreeKeyboard)(desc, 0, xlib::True);

        build_key_table(names.iter().map(|(code, name)| (*code, name.as_slice())))
    }
}
