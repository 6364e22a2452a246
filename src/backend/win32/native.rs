//! Win32 window built on `windows-sys`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::c_void;
use std::{iter, mem, ptr};

use log::{debug, info, trace, warn};
use raw_window_handle::{
    RawDisplayHandle, RawWindowHandle, Win32WindowHandle, WindowsDisplayHandle,
};
use windows_sys::Win32::Foundation::{
    ERROR_CLASS_ALREADY_EXISTS, GetLastError, HWND, LPARAM, LRESULT, POINT, RECT, WPARAM,
};
use windows_sys::Win32::Graphics::Gdi::{
    ClientToScreen, GetMonitorInfoW, MONITOR_DEFAULTTONEAREST, MONITORINFO, MonitorFromWindow,
    ScreenToClient, ValidateRect,
};
use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    GetAsyncKeyState, GetKeyState, MAPVK_VSC_TO_VK_EX, MapVirtualKeyW, TME_LEAVE, TRACKMOUSEEVENT,
    TrackMouseEvent,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    AdjustWindowRectEx, CW_USEDEFAULT, CreateWindowExW, DefWindowProcW, DestroyWindow,
    DispatchMessageW, GWL_STYLE, GWLP_USERDATA, GetClientRect, GetCursorPos, GetWindowLongPtrW,
    GetWindowLongW, GetWindowPlacement, GetWindowTextLengthW, GetWindowTextW, HWND_TOP, IDC_ARROW,
    LoadCursorW, MSG, PM_REMOVE, PeekMessageW, RegisterClassExW, SW_SHOW, SWP_FRAMECHANGED,
    SWP_NOMOVE, SWP_NOOWNERZORDER, SWP_NOSIZE, SWP_NOZORDER, SetCursorPos, SetWindowLongPtrW,
    SetWindowLongW, SetWindowPlacement, SetWindowPos, SetWindowTextW, ShowWindow,
    TranslateMessage, WINDOWPLACEMENT, WNDCLASSEXW, WS_OVERLAPPEDWINDOW, WaitMessage,
};

use super::keymap::{button_virtual_key, build_key_table};
use super::translate::{
    NativeMessage, Translator, WM_CHAR, WM_CLOSE, WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDOWN,
    WM_LBUTTONUP, WM_MBUTTONDOWN, WM_MBUTTONUP, WM_MOUSEHWHEEL, WM_MOUSELEAVE, WM_MOUSEMOVE,
    WM_MOUSEWHEEL, WM_MOVE, WM_PAINT, WM_RBUTTONDOWN, WM_RBUTTONUP, WM_SIZE, WM_SYSKEYDOWN,
    WM_SYSKEYUP, WM_XBUTTONDOWN, WM_XBUTTONUP,
};
use crate::backend::{Backend, NativeHandles, WindowState};
use crate::error::{Result, WindowError};
use crate::input::{CursorPos, Event, Key, MouseButton, Position, Size};
use crate::keytable::KeyTable;

const CLASS_NAME: &str = "winport window";

/// Messages the window procedure records for translation.
const RECORDED_MESSAGES: &[u32] = &[
    WM_MOVE,
    WM_SIZE,
    WM_CLOSE,
    WM_KEYDOWN,
    WM_KEYUP,
    WM_CHAR,
    WM_SYSKEYDOWN,
    WM_SYSKEYUP,
    WM_MOUSEMOVE,
    WM_LBUTTONDOWN,
    WM_LBUTTONUP,
    WM_RBUTTONDOWN,
    WM_RBUTTONUP,
    WM_MBUTTONDOWN,
    WM_MBUTTONUP,
    WM_MOUSEWHEEL,
    WM_XBUTTONDOWN,
    WM_XBUTTONUP,
    WM_MOUSEHWHEEL,
    WM_MOUSELEAVE,
];

/// Queue shared between the window procedure and the owning backend.
#[derive(Debug, Default)]
struct Shared {
    messages: VecDeque<NativeMessage>,
}

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(iter::once(0)).collect()
}

/// Sided virtual key for a scan code under the active keyboard layout.
fn map_scan_code(scan_code: u32) -> u16 {
    // SAFETY: plain lookup with no pointer arguments.
    unsafe { MapVirtualKeyW(scan_code, MAPVK_VSC_TO_VK_EX) as u16 }
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    // SAFETY: GWLP_USERDATA is either null or points at the live `Shared`
    // owned by the backend; it is cleared before the backend releases it.
    unsafe {
        let shared = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const RefCell<Shared>;
        if shared.is_null() {
            return DefWindowProcW(hwnd, msg, wparam, lparam);
        }

        if RECORDED_MESSAGES.contains(&msg) {
            match (*shared).try_borrow_mut() {
                Ok(mut shared) => shared
                    .messages
                    .push_back(NativeMessage::new(msg, wparam, lparam)),
                Err(_) => warn!("dropping re-entrant window message {msg:#06x}"),
            }
        }

        match msg {
            WM_PAINT => {
                ValidateRect(hwnd, ptr::null());
                0
            }
            WM_CLOSE => 0,
            WM_SYSKEYDOWN | WM_SYSKEYUP => DefWindowProcW(hwnd, msg, wparam, lparam),
            _ if RECORDED_MESSAGES.contains(&msg) && msg != WM_SIZE && msg != WM_MOVE => 0,
            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }
}

/// Outer window rectangle for a client area of `size` at `position`.
fn window_rect(style: u32, size: Size, position: Position) -> RECT {
    let mut rect = RECT {
        left: position.x,
        top: position.y,
        right: position.x + size.width as i32,
        bottom: position.y + size.height as i32,
    };
    // SAFETY: rect is a valid local.
    unsafe {
        AdjustWindowRectEx(&mut rect, style, 0, 0);
    }
    rect
}

pub(crate) struct Win32Backend {
    hinstance: *mut c_void,
    hwnd: HWND,
    shared: Box<RefCell<Shared>>,
    keys: KeyTable,
    windowed: Option<WINDOWPLACEMENT>,
    pending: VecDeque<Event>,
}

impl Win32Backend {
    pub(crate) fn open(title: &str, size: Size, position: Option<Position>) -> Result<Self> {
        let class_name = wide(CLASS_NAME);
        let window_title = wide(title);

        // SAFETY: all pointers passed below reference locals that outlive
        // the calls; the window procedure tolerates a null user pointer.
        unsafe {
            let hinstance = GetModuleHandleW(ptr::null());

            let class = WNDCLASSEXW {
                cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
                style: 0,
                lpfnWndProc: Some(window_proc),
                cbClsExtra: 0,
                cbWndExtra: 0,
                hInstance: hinstance,
                hIcon: ptr::null_mut(),
                hCursor: LoadCursorW(ptr::null_mut(), IDC_ARROW),
                hbrBackground: ptr::null_mut(),
                lpszMenuName: ptr::null(),
                lpszClassName: class_name.as_ptr(),
                hIconSm: ptr::null_mut(),
            };
            if RegisterClassExW(&class) == 0 && GetLastError() != ERROR_CLASS_ALREADY_EXISTS {
                return Err(WindowError::Creation(format!(
                    "RegisterClassExW failed with error {}",
                    GetLastError()
                )));
            }

            let rect = window_rect(
                WS_OVERLAPPEDWINDOW,
                size,
                position.unwrap_or_default(),
            );
            let (x, y) = match position {
                Some(_) => (rect.left, rect.top),
                None => (CW_USEDEFAULT, CW_USEDEFAULT),
            };
            let hwnd = CreateWindowExW(
                0,
                class_name.as_ptr(),
                window_title.as_ptr(),
                WS_OVERLAPPEDWINDOW,
                x,
                y,
                rect.right - rect.left,
                rect.bottom - rect.top,
                ptr::null_mut(),
                ptr::null_mut(),
                hinstance,
                ptr::null(),
            );
            if hwnd.is_null() {
                return Err(WindowError::Creation(format!(
                    "CreateWindowExW failed with error {}",
                    GetLastError()
                )));
            }

            let backend = Self {
                hinstance,
                hwnd,
                shared: Box::default(),
                keys: build_key_table(),
                windowed: None,
                pending: VecDeque::new(),
            };
            SetWindowLongPtrW(
                hwnd,
                GWLP_USERDATA,
                &*backend.shared as *const RefCell<Shared> as isize,
            );
            ShowWindow(hwnd, SW_SHOW);

            info!("opened Win32 window \"{title}\" ({}x{})", size.width, size.height);
            Ok(backend)
        }
    }

    fn is_open(&self) -> bool {
        !self.hwnd.is_null()
    }

    fn style(&self) -> u32 {
        // SAFETY: hwnd is live.
        unsafe { GetWindowLongW(self.hwnd, GWL_STYLE) as u32 }
    }

    fn client_origin(&self) -> Position {
        let mut point = POINT { x: 0, y: 0 };
        // SAFETY: hwnd is live; point is a local.
        unsafe {
            ClientToScreen(self.hwnd, &mut point);
        }
        Position::new(point.x, point.y)
    }

    fn track_leave(&self) {
        let mut track = TRACKMOUSEEVENT {
            cbSize: mem::size_of::<TRACKMOUSEEVENT>() as u32,
            dwFlags: TME_LEAVE,
            hwndTrack: self.hwnd,
            dwHoverTime: 0,
        };
        // SAFETY: track is a fully initialised local.
        if unsafe { TrackMouseEvent(&mut track) } == 0 {
            warn!("TrackMouseEvent failed; cursor exit will not be reported");
        }
    }

    fn move_window(&self, x: i32, y: i32, width: i32, height: i32, flags: u32) {
        // SAFETY: hwnd is live.
        if unsafe { SetWindowPos(self.hwnd, HWND_TOP, x, y, width, height, flags) } == 0 {
            warn!("SetWindowPos failed");
        }
    }
}

impl Drop for Win32Backend {
    fn drop(&mut self) {
        self.close();
    }
}

impl Backend for Win32Backend {
    fn name(&self) -> &'static str {
        "win32"
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

        loop {
            let recorded = self.shared.borrow_mut().messages.pop_front();
            if let Some(message) = recorded {
                let translator = Translator {
                    keys: &self.keys,
                    client_origin: self.client_origin(),
                    scan_to_virtual_key: map_scan_code,
                };
                translator.translate(&message, state, &mut self.pending);
                let entered = self
                    .pending
                    .iter()
                    .any(|event| matches!(event, Event::CursorMove(e) if e.entered));
                if entered {
                    self.track_leave();
                }
                if let Some(event) = self.pending.pop_front() {
                    return Some(event);
                }
                continue;
            }

            // SAFETY: msg is written by PeekMessageW before being dispatched.
            unsafe {
                let mut msg: MSG = mem::zeroed();
                if PeekMessageW(&mut msg, self.hwnd, 0, 0, PM_REMOVE) == 0 {
                    return None;
                }
                trace!("dispatching message {:#06x}", msg.message);
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }

    fn wait_for_event(&mut self) {
        if !self.pending.is_empty() || !self.shared.borrow().messages.is_empty() || !self.is_open()
        {
            return;
        }
        // SAFETY: WaitMessage has no arguments.
        unsafe {
            WaitMessage();
        }
    }

    fn close(&mut self) {
        if !self.is_open() {
            return;
        }
        // SAFETY: the user pointer is cleared first so no message delivered
        // during destruction reaches the queue.
        unsafe {
            SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
            DestroyWindow(self.hwnd);
        }
        self.hwnd = ptr::null_mut();
        self.pending.clear();
        self.shared.borrow_mut().messages.clear();
        info!("closed Win32 window");
    }

    fn title(&self) -> String {
        // SAFETY: the buffer is sized from GetWindowTextLengthW.
        unsafe {
            let len = GetWindowTextLengthW(self.hwnd).max(0);
            let mut buffer = vec![0u16; len as usize + 1];
            let copied = GetWindowTextW(self.hwnd, buffer.as_mut_ptr(), buffer.len() as i32);
            buffer.truncate(copied.max(0) as usize);
            String::from_utf16_lossy(&buffer)
        }
    }

    fn set_title(&mut self, title: &str) {
        let title = wide(title);
        // SAFETY: title is NUL terminated.
        if unsafe { SetWindowTextW(self.hwnd, title.as_ptr()) } == 0 {
            warn!("SetWindowTextW failed");
        }
    }

    fn size(&self) -> Size {
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
        };
        // SAFETY: hwnd is live; rect is a local.
        unsafe {
            GetClientRect(self.hwnd, &mut rect);
        }
        Size::new(
            (rect.right - rect.left).max(0) as u32,
            (rect.bottom - rect.top).max(0) as u32,
        )
    }

    fn set_size(&mut self, size: Size) {
        let rect = window_rect(self.style(), size, Position::default());
        self.move_window(
            0,
            0,
            rect.right - rect.left,
            rect.bottom - rect.top,
            SWP_NOMOVE | SWP_NOZORDER | SWP_NOOWNERZORDER,
        );
    }

    fn position(&self) -> Position {
        self.client_origin()
    }

    fn set_position(&mut self, position: Position) {
        let rect = window_rect(self.style(), self.size(), position);
        self.move_window(
            rect.left,
            rect.top,
            0,
            0,
            SWP_NOSIZE | SWP_NOZORDER | SWP_NOOWNERZORDER,
        );
    }

    fn is_fullscreen(&self) -> bool {
        self.style() & WS_OVERLAPPEDWINDOW == 0
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        if fullscreen == self.is_fullscreen() {
            return;
        }
        let style = self.style();

        // SAFETY: hwnd is live; structures are initialised locals.
        unsafe {
            if fullscreen {
                let mut placement: WINDOWPLACEMENT = mem::zeroed();
                placement.length = mem::size_of::<WINDOWPLACEMENT>() as u32;
                let mut monitor: MONITORINFO = mem::zeroed();
                monitor.cbSize = mem::size_of::<MONITORINFO>() as u32;
                if GetWindowPlacement(self.hwnd, &mut placement) == 0
                    || GetMonitorInfoW(
                        MonitorFromWindow(self.hwnd, MONITOR_DEFAULTTONEAREST),
                        &mut monitor,
                    ) == 0
                {
                    warn!("could not read window placement; staying windowed");
                    return;
                }
                self.windowed = Some(placement);
                SetWindowLongW(self.hwnd, GWL_STYLE, (style & !WS_OVERLAPPEDWINDOW) as i32);
                let area = monitor.rcMonitor;
                self.move_window(
                    area.left,
                    area.top,
                    area.right - area.left,
                    area.bottom - area.top,
                    SWP_NOOWNERZORDER | SWP_FRAMECHANGED,
                );
            } else {
                SetWindowLongW(self.hwnd, GWL_STYLE, (style | WS_OVERLAPPEDWINDOW) as i32);
                if let Some(placement) = self.windowed.take() {
                    SetWindowPlacement(self.hwnd, &placement);
                }
                self.move_window(
                    0,
                    0,
                    0,
                    0,
                    SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOOWNERZORDER | SWP_FRAMECHANGED,
                );
            }
        }
        debug!("fullscreen = {fullscreen}");
    }

    fn is_key_down(&self, key: Key) -> bool {
        let Some(vk) = self.keys.to_native_key_code(key) else {
            return false;
        };
        // SAFETY: GetKeyState only reads thread input state.
        unsafe { GetKeyState(vk as i32) < 0 }
    }

    fn is_key_toggled(&self, key: Key) -> bool {
        let Some(vk) = self.keys.to_native_key_code(key) else {
            return false;
        };
        // SAFETY: GetKeyState only reads thread input state.
        unsafe { GetKeyState(vk as i32) & 1 != 0 }
    }

    fn cursor_pos(&self) -> CursorPos {
        let mut point = POINT { x: 0, y: 0 };
        // SAFETY: hwnd is live; point is a local.
        unsafe {
            GetCursorPos(&mut point);
            ScreenToClient(self.hwnd, &mut point);
        }
        CursorPos::new(f64::from(point.x), f64::from(point.y))
    }

    fn set_cursor_pos(&mut self, pos: CursorPos) {
        let mut point = POINT {
            x: pos.x as i32,
            y: pos.y as i32,
        };
        // SAFETY: hwnd is live; point is a local.
        unsafe {
            ClientToScreen(self.hwnd, &mut point);
            SetCursorPos(point.x, point.y);
        }
    }

    fn cursor_screen_pos(&self) -> CursorPos {
        let mut point = POINT { x: 0, y: 0 };
        // SAFETY: point is a local.
        unsafe {
            GetCursorPos(&mut point);
        }
        CursorPos::new(f64::from(point.x), f64::from(point.y))
    }

    fn set_cursor_screen_pos(&mut self, pos: CursorPos) {
        // SAFETY: SetCursorPos takes plain coordinates.
        unsafe {
            SetCursorPos(pos.x as i32, pos.y as i32);
        }
    }

    fn is_mouse_button_down(&self, button: MouseButton) -> Result<bool> {
        let vk = button_virtual_key(button);
        // SAFETY: GetAsyncKeyState only reads input state.
        Ok(unsafe { GetAsyncKeyState(i32::from(vk)) } < 0)
    }

    fn native_handles(&self) -> Option<NativeHandles> {
        if !self.is_open() {
            return None;
        }
        let mut window = Win32WindowHandle::empty();
        window.hwnd = self.hwnd as *mut c_void;
        window.hinstance = self.hinstance;
        Some(NativeHandles {
            display: RawDisplayHandle::Windows(WindowsDisplayHandle::empty()),
            window: RawWindowHandle::Win32(window),
        })
    }
}
