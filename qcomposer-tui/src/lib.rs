//! qcomposer TUI - terminal front end for the composer
//!
//! This crate contains all ratatui/crossterm integration:
//! - App state and the terminal gesture host
//! - Event loop and input handling
//! - Layout shared by rendering and hit-testing
//! - Rendering (toolbar, tracks, ghost, preview, status bar)
//! - Theme system

pub mod app;
pub mod ghost;
pub mod host;
pub mod input;
pub mod layout;
pub mod terminal;
pub mod theme;
pub mod ui;

use anyhow::{Context, Result};
use crossterm::event::{Event, KeyEventKind};
use qcomposer_core::ComposeResult;
use std::time::{Duration, Instant};

// Re-export main types
pub use app::App;

/// Frame interval; also bounds how late the touch dwell can fire
const FRAME: Duration = Duration::from_millis(16);

/// Run the TUI application; returns the composed result if the user finished
pub fn run(mut app: App) -> Result<Option<ComposeResult>> {
    let mut terminal = terminal::init().context("Failed to initialize terminal")?;

    // Main event loop
    let result = run_loop(&mut terminal, &mut app);

    // A failure mid-gesture must not leave the drag session holding the host
    if result.is_err() {
        app.drag.abort();
    }

    // Always restore terminal, even if run_loop fails
    terminal::restore().context("Failed to restore terminal")?;

    result.map(|()| app.result.take())
}

fn run_loop(terminal: &mut terminal::Tui, app: &mut App) -> Result<()> {
    loop {
        let size = terminal.size().context("Failed to query terminal size")?;
        let area = ratatui::layout::Rect::new(0, 0, size.width, size.height);

        app.drag.tick(Instant::now());
        app.on_frame(area);

        terminal
            .draw(|frame| ui::draw(frame, app))
            .context("Failed to draw frame")?;

        if app.should_quit {
            break;
        }

        if crossterm::event::poll(FRAME).context("Failed to poll events")? {
            match crossterm::event::read().context("Failed to read event")? {
                // Only handle key press events, ignore release
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key);
                }
                Event::Mouse(mouse) => {
                    input::handle_mouse(app, mouse, area, Instant::now());
                }
                Event::FocusLost => {
                    // The button-up may never arrive once focus is gone
                    app.drag.abort();
                }
                _ => {}
            }
        }
    }

    Ok(())
}
