use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use winport::backend::headless::SCREEN_SIZE;
use winport::{
    CursorPos, Event, HeadlessDisplay, Key, KeyCharEvent, KeyEvent, MouseButton, MouseButtonEvent,
    MoveEvent, Position, ResizeEvent, ScrollEvent, Size, Window, WindowError,
};

fn open(display: &HeadlessDisplay) -> Window {
    Window::open_headless(display, "T", Size::new(800, 600), None).expect("open headless window")
}

/// Registers a handler for every category that appends to a shared log.
fn record_events(window: &mut Window) -> Rc<RefCell<Vec<Event>>> {
    let log = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&log);
    window.set_key_handler(move |_, e| sink.borrow_mut().push(Event::Key(e)));
    let sink = Rc::clone(&log);
    window.set_key_char_handler(move |_, e| sink.borrow_mut().push(Event::KeyChar(e)));
    let sink = Rc::clone(&log);
    window.set_cursor_move_handler(move |_, e| sink.borrow_mut().push(Event::CursorMove(e)));
    let sink = Rc::clone(&log);
    window.set_cursor_exit_handler(move |_, e| sink.borrow_mut().push(Event::CursorExit(e)));
    let sink = Rc::clone(&log);
    window.set_mouse_button_handler(move |_, e| sink.borrow_mut().push(Event::MouseButton(e)));
    let sink = Rc::clone(&log);
    window.set_scroll_handler(move |_, e| sink.borrow_mut().push(Event::Scroll(e)));
    let sink = Rc::clone(&log);
    window.set_resize_handler(move |_, e| sink.borrow_mut().push(Event::Resize(e)));
    let sink = Rc::clone(&log);
    window.set_move_handler(move |_, e| sink.borrow_mut().push(Event::Move(e)));

    log
}

#[test]
fn opens_with_requested_title_and_size() {
    let display = HeadlessDisplay::new();
    let window = open(&display);
    assert_eq!(window.backend_name(), "headless");
    assert_eq!(window.title(), "T");
    assert_eq!(window.size(), Size::new(800, 600));
    assert_eq!(window.position(), Position::new(0, 0));
    assert!(!window.is_fullscreen());
    assert!(!window.is_close_requested());
    assert!(!window.is_cursor_in_window());
    assert!(window.native_handles().is_none());
}

#[test]
fn opens_at_requested_position() {
    let display = HeadlessDisplay::new();
    let window =
        Window::open_headless(&display, "placed", Size::new(200, 100), Some(Position::new(30, 40)))
            .unwrap();
    assert_eq!(window.position(), Position::new(30, 40));
}

#[test]
fn poll_without_events_returns_immediately() {
    let display = HeadlessDisplay::new();
    let mut window = open(&display);
    let log = record_events(&mut window);

    let start = Instant::now();
    window.poll();
    assert!(start.elapsed() < Duration::from_secs(1));
    assert!(log.borrow().is_empty());
}

#[test]
fn wait_events_blocks_until_an_event_arrives() {
    let display = HeadlessDisplay::new();
    let mut window = open(&display);
    let log = record_events(&mut window);

    let injector = display.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        injector.press_key(Key::A);
    });

    window.wait_events();
    handle.join().unwrap();
    assert_eq!(
        *log.borrow(),
        vec![Event::Key(KeyEvent {
            key: Key::A,
            down: true
        })]
    );
}

#[test]
fn handlers_run_in_native_order() {
    let display = HeadlessDisplay::new();
    let mut window = open(&display);
    let log = record_events(&mut window);

    display.press_key_with_text(Key::A, "a");
    display.release_key(Key::A);
    display.press_button(MouseButton::Right);
    display.scroll(-1);

    window.poll();
    assert_eq!(
        *log.borrow(),
        vec![
            Event::KeyChar(KeyCharEvent { code_point: 'a' as u32 }),
            Event::Key(KeyEvent {
                key: Key::A,
                down: true
            }),
            Event::Key(KeyEvent {
                key: Key::A,
                down: false
            }),
            Event::MouseButton(MouseButtonEvent {
                button: MouseButton::Right,
                down: true
            }),
            Event::Scroll(ScrollEvent {
                v_scroll: -1.0,
                h_scroll: 0.0
            }),
        ]
    );
}

#[test]
fn typed_text_produces_one_char_event_per_scalar() {
    let display = HeadlessDisplay::new();
    let mut window = open(&display);
    let chars = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&chars);
    window.set_key_char_handler(move |_, e| {
        if let Some(c) = e.as_char() {
            sink.borrow_mut().push(c);
        }
    });

    display.type_text("hi é");
    window.poll();
    assert_eq!(*chars.borrow(), "hi é");
}

#[test]
fn close_request_only_sets_the_flag() {
    let display = HeadlessDisplay::new();
    let mut window = open(&display);

    display.request_close();
    window.poll();
    assert!(window.is_close_requested());
    assert!(display.has_window());

    window.set_close_requested(false);
    assert!(!window.is_close_requested());
    assert!(display.has_window());

    window.set_close_requested(true);
    assert!(window.is_close_requested());
    window.close();
    assert!(!display.has_window());
}

#[test]
fn fullscreen_round_trip_restores_geometry() {
    let display = HeadlessDisplay::new();
    let mut window =
        Window::open_headless(&display, "fs", Size::new(640, 480), Some(Position::new(50, 60)))
            .unwrap();

    window.set_fullscreen(true);
    assert!(window.is_fullscreen());
    assert_eq!(window.size(), SCREEN_SIZE);
    assert_eq!(window.position(), Position::new(0, 0));

    window.set_fullscreen(false);
    assert!(!window.is_fullscreen());
    assert_eq!(window.size(), Size::new(640, 480));
    assert_eq!(window.position(), Position::new(50, 60));
}

#[test]
fn entered_is_set_only_on_first_motion_inside() {
    let display = HeadlessDisplay::new();
    let mut window = open(&display);
    let log = record_events(&mut window);

    display.move_pointer(10, 10);
    display.move_pointer(11, 12);
    display.leave();
    display.move_pointer(5, 5);
    window.poll();

    let entered: Vec<Option<bool>> = log
        .borrow()
        .iter()
        .map(|event| match event {
            Event::CursorMove(e) => Some(e.entered),
            _ => None,
        })
        .collect();
    assert_eq!(entered, vec![Some(true), Some(false), None, Some(true)]);
    assert!(window.is_cursor_in_window());
    assert_eq!(window.cursor_pos(), CursorPos::new(5.0, 5.0));
}

#[test]
fn leaving_clears_cursor_in_window() {
    let display = HeadlessDisplay::new();
    let mut window = open(&display);

    display.move_pointer(1, 1);
    window.poll();
    assert!(window.is_cursor_in_window());

    display.leave();
    window.poll();
    assert!(!window.is_cursor_in_window());
}

#[test]
fn repeated_geometry_is_reported_once() {
    let display = HeadlessDisplay::new();
    let mut window = open(&display);
    let log = record_events(&mut window);

    display.configure(Position::new(0, 0), Size::new(1024, 768));
    display.configure(Position::new(0, 0), Size::new(1024, 768));
    display.configure(Position::new(20, 30), Size::new(1024, 768));
    window.poll();

    assert_eq!(
        *log.borrow(),
        vec![
            Event::Resize(ResizeEvent {
                size: Size::new(1024, 768)
            }),
            Event::Move(MoveEvent {
                pos: Position::new(20, 30)
            }),
        ]
    );
}

#[test]
fn setters_are_reported_back_as_events() {
    let display = HeadlessDisplay::new();
    let mut window = open(&display);
    let log = record_events(&mut window);

    window.set_size(Size::new(400, 300));
    window.set_title("renamed");
    window.poll();

    assert_eq!(window.title(), "renamed");
    assert_eq!(
        *log.borrow(),
        vec![Event::Resize(ResizeEvent {
            size: Size::new(400, 300)
        })]
    );
}

#[test]
fn handler_can_change_the_window() {
    let display = HeadlessDisplay::new();
    let mut window = open(&display);
    window.set_key_handler(|window, event| {
        if event.key == Key::Escape && event.down {
            window.set_close_requested(true);
        }
    });

    display.press_key(Key::Esc);
    window.poll();
    assert!(window.is_close_requested());
}

#[test]
fn polling_from_a_handler_keeps_every_event() {
    let display = HeadlessDisplay::new();
    let mut window = open(&display);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    window.set_key_handler(move |window, event| {
        sink.borrow_mut().push(event.key);
        window.poll();
        window.wait_events();
    });

    display.press_key(Key::A);
    display.press_key(Key::B);
    window.poll();
    assert_eq!(*seen.borrow(), vec![Key::A, Key::B]);

    display.press_key(Key::C);
    window.poll();
    assert_eq!(*seen.borrow(), vec![Key::A, Key::B, Key::C]);
}

#[test]
fn key_state_follows_presses_and_locks() {
    let display = HeadlessDisplay::new();
    let mut window = open(&display);

    display.press_key(Key::LShift);
    display.press_key(Key::CapsLock);
    display.release_key(Key::CapsLock);
    window.poll();

    assert!(window.is_key_down(Key::LShift));
    assert!(window.modifiers().shift);
    assert!(!window.modifiers().ctrl);
    assert!(window.is_key_toggled(Key::CapsLock));
    assert!(!window.is_key_down(Key::CapsLock));

    display.press_key(Key::CapsLock);
    assert!(!window.is_key_toggled(Key::CapsLock));
}

#[test]
fn mouse_button_state_and_unmapped_buttons() {
    let display = HeadlessDisplay::new();
    let window = open(&display);

    display.press_button(MouseButton::Left);
    assert!(window.is_mouse_button_down(MouseButton::Left).unwrap());
    assert!(!window.is_mouse_button_down(MouseButton::Middle).unwrap());
    assert!(matches!(
        window.is_mouse_button_down(MouseButton::X1),
        Err(WindowError::UnmappedButton(MouseButton::X1))
    ));
}

#[test]
fn key_table_round_trips() {
    let display = HeadlessDisplay::new();
    let window = open(&display);
    let table = window.key_table();
    assert!(!table.is_empty());

    for key in [Key::A, Key::Escape, Key::F12, Key::Numpad5, Key::RShift] {
        let code = table.to_native_key_code(key).expect("key present");
        assert_eq!(table.from_native_key_code(code), key);
    }
    assert_eq!(table.to_native_key_code(Key::Unknown), None);
}

#[test]
fn refused_connection_is_reported() {
    let display = HeadlessDisplay::new();
    display.refuse_connections(true);
    let err = Window::open_headless(&display, "T", Size::new(1, 1), None).unwrap_err();
    assert!(matches!(err, WindowError::Connection(_)));
}

#[test]
fn second_window_on_a_display_fails() {
    let display = HeadlessDisplay::new();
    let _window = open(&display);
    let err = Window::open_headless(&display, "again", Size::new(1, 1), None).unwrap_err();
    assert!(matches!(err, WindowError::Creation(_)));
}

#[test]
fn display_can_host_a_new_window_after_close() {
    let display = HeadlessDisplay::new();
    open(&display).close();
    assert!(!display.has_window());
    let window = open(&display);
    assert_eq!(window.title(), "T");
}
