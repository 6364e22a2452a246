use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser};
use winport::config::{Action, MAX_DIMENSION, WindowConfig};
use winport::{Key, Modifiers, Position, Size, Window};

#[derive(Parser, Debug)]
#[command(name = "winport-demo")]
#[command(version, about = "Opens a native window and logs its input events")]
struct Cli {
    /// Window title (overrides the config file)
    #[arg(long, short = 't', value_name = "TITLE")]
    title: Option<String>,

    /// Client area width in pixels
    #[arg(long, value_name = "PIXELS")]
    width: Option<u32>,

    /// Client area height in pixels
    #[arg(long, value_name = "PIXELS")]
    height: Option<u32>,

    /// Block waiting for events instead of polling every frame
    #[arg(long, short = 'w', action = ArgAction::SetTrue)]
    wait: bool,

    /// Read settings from this file instead of ~/.config/winport/config.toml
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print every portable key name and exit
    #[arg(long, action = ArgAction::SetTrue)]
    list_keys: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if cli.list_keys {
        for key in Key::ALL {
            println!("{:<14} {}", format!("{key:?}"), key.name());
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => WindowConfig::load_from(path)?,
        None => WindowConfig::load()?,
    };
    if let Some(title) = cli.title {
        config.window.title = title;
    }
    if let Some(width) = cli.width {
        config.window.width = width;
    }
    if let Some(height) = cli.height {
        config.window.height = height;
    }
    config.demo.wait_events |= cli.wait;

    let actions = config
        .input
        .build_action_map()
        .map_err(|err| anyhow::anyhow!("Invalid key bindings: {err}"))?;

    let mut window = Window::new(
        &config.window.title,
        config.window.size(),
        config.window.position(),
    )
    .context("Failed to open a window (is a display available?)")?;

    log::info!("Opened window on the {} backend", window.backend_name());
    log::info!("Controls:");
    log::info!("  - Type to edit the title, Backspace to delete");
    log::info!("  - Arrows: move the window");
    log::info!("  - = / -: grow or shrink the window");
    log::info!("  - Close: {}", config.input.close_keys.join(", "));
    log::info!("  - Fullscreen: {}", config.input.fullscreen_keys.join(", "));

    if config.window.start_fullscreen {
        window.set_fullscreen(true);
    }

    let move_step = config.demo.move_step as i32;
    let resize_step = config.demo.resize_step;

    window.set_key_handler(move |window, event| {
        log::debug!("key {:?} down={}", event.key, event.down);
        if !event.down {
            return;
        }

        if Modifiers::is_modifier(event.key) {
            return;
        }

        let modifiers = window.modifiers();
        let action = actions
            .iter()
            .find(|(binding, _)| binding.matches(event.key, modifiers))
            .map(|(_, action)| *action);
        match action {
            Some(Action::Close) => {
                window.set_close_requested(true);
                return;
            }
            Some(Action::ToggleFullscreen) => {
                let fullscreen = !window.is_fullscreen();
                window.set_fullscreen(fullscreen);
                return;
            }
            None => {}
        }

        let position = window.position();
        let size = window.size();
        match event.key {
            Key::Left => window.set_position(offset(position, -move_step, 0)),
            Key::Right => window.set_position(offset(position, move_step, 0)),
            Key::Up => window.set_position(offset(position, 0, -move_step)),
            Key::Down => window.set_position(offset(position, 0, move_step)),
            Key::Equal => window.set_size(grow(size, resize_step)),
            Key::Dash => window.set_size(shrink(size, resize_step)),
            Key::Backspace => {
                let mut title = window.title();
                title.pop();
                window.set_title(&title);
            }
            _ => {}
        }
    });

    window.set_key_char_handler(|window, event| {
        let Some(c) = event.as_char() else {
            return;
        };
        if c.is_control() {
            return;
        }
        let mut title = window.title();
        title.push(c);
        window.set_title(&title);
    });

    window.set_cursor_move_handler(|_, event| {
        if event.entered {
            log::info!("cursor entered at ({:.0}, {:.0})", event.pos.x, event.pos.y);
        }
    });
    window.set_cursor_exit_handler(|_, _| log::info!("cursor left"));
    window.set_mouse_button_handler(|_, event| {
        log::info!("button {:?} down={}", event.button, event.down);
    });
    window.set_scroll_handler(|_, event| {
        log::info!("scroll v={} h={}", event.v_scroll, event.h_scroll);
    });
    window.set_resize_handler(|_, event| {
        log::info!("resized to {}x{}", event.size.width, event.size.height);
    });
    window.set_move_handler(|_, event| {
        log::info!("moved to ({}, {})", event.pos.x, event.pos.y);
    });

    let frame_interval = Duration::from_millis(config.demo.frame_interval_ms);
    while !window.is_close_requested() {
        if config.demo.wait_events {
            window.wait_events();
        } else {
            window.poll();
            std::thread::sleep(frame_interval);
        }
    }

    window.close();
    log::info!("Window closed.");

    Ok(())
}

fn offset(position: Position, dx: i32, dy: i32) -> Position {
    Position::new(position.x.saturating_add(dx), position.y.saturating_add(dy))
}

/// Grows both dimensions by `step`, capped at [`MAX_DIMENSION`].
fn grow(size: Size, step: u32) -> Size {
    Size::new(
        size.width.saturating_add(step).min(MAX_DIMENSION),
        size.height.saturating_add(step).min(MAX_DIMENSION),
    )
}

/// Shrinks both dimensions by `step`, never below one pixel.
fn shrink(size: Size, step: u32) -> Size {
    Size::new(
        size.width.saturating_sub(step).max(1),
        size.height.saturating_sub(step).max(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_is_capped() {
        assert_eq!(grow(Size::new(100, 200), 50), Size::new(150, 250));
        assert_eq!(
            grow(Size::new(MAX_DIMENSION - 10, 100), 50),
            Size::new(MAX_DIMENSION, 150)
        );
        assert_eq!(
            grow(Size::new(u32::MAX, u32::MAX), 1000),
            Size::new(MAX_DIMENSION, MAX_DIMENSION)
        );
    }

    #[test]
    fn shrink_keeps_one_pixel() {
        assert_eq!(shrink(Size::new(100, 30), 50), Size::new(50, 1));
        assert_eq!(shrink(Size::new(1, 1), 1000), Size::new(1, 1));
    }

    #[test]
    fn offset_saturates() {
        assert_eq!(offset(Position::new(10, 20), -50, 0), Position::new(-40, 20));
        assert_eq!(
            offset(Position::new(i32::MAX, i32::MIN), 50, -50),
            Position::new(i32::MAX, i32::MIN)
        );
    }
}
