//! Input handling and keybindings

use crate::app::{App, Mode};
use crate::layout::{self, ScreenLayout, ToolbarAction};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use log::debug;
use qcomposer_core::drag::{PointerDown, PointerId, PointerTarget};
use qcomposer_core::drop_target::resolve_drop_index;
use qcomposer_core::geometry::Point;
use qcomposer_core::module::ModuleType;
use ratatui::layout::Rect;
use std::time::Instant;

/// Terminals report a single mouse
pub const MOUSE_POINTER: PointerId = 1;

/// Result of handling input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Handle a key event
pub fn handle_key(app: &mut App, key: KeyEvent) -> Action {
    // Clear status message on any keystroke (except pure modifiers)
    if !matches!(key.code, KeyCode::Modifier(_)) {
        app.clear_status_message();
    }

    if matches!(
        key,
        KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            ..
        }
    ) {
        app.drag.abort();
        app.quit();
        return Action::Quit;
    }

    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            app.toggle_help();
        }
        return Action::Continue;
    }

    // Escape always drops a live gesture first
    if key.code == KeyCode::Esc && !app.drag.is_idle() {
        app.drag.abort();
        return Action::Continue;
    }

    let action = match app.mode() {
        Mode::Normal => handle_normal_key(app, key),
        Mode::Edit => {
            handle_edit_key(app, key);
            Action::Continue
        }
        Mode::Entry => {
            handle_entry_key(app, key);
            Action::Continue
        }
    };
    app.refresh_macro_prompt();
    action
}

fn handle_normal_key(app: &mut App, key: KeyEvent) -> Action {
    match key {
        KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            ..
        } => {
            app.quit();
            return Action::Quit;
        }

        KeyEvent {
            code: KeyCode::Char('s'),
            modifiers: KeyModifiers::CONTROL,
            ..
        } => {
            app.complete();
            return Action::Quit;
        }

        KeyEvent {
            code: KeyCode::Esc, ..
        } => {
            app.selected = None;
            app.composer.clear_cursor();
        }

        KeyEvent {
            code: KeyCode::Tab, ..
        } => app.switch_track(),

        KeyEvent {
            code: KeyCode::Left | KeyCode::Char('h'),
            modifiers: KeyModifiers::NONE,
            ..
        } => app.select_prev(),

        KeyEvent {
            code: KeyCode::Right | KeyCode::Char('l'),
            modifiers: KeyModifiers::NONE,
            ..
        } => app.select_next(),

        // Shift+H / Shift+L reorder the selected module
        KeyEvent {
            code: KeyCode::Char('H'),
            ..
        } => app.move_selected(-1),
        KeyEvent {
            code: KeyCode::Char('L'),
            ..
        } => app.move_selected(1),

        KeyEvent {
            code: KeyCode::Char(c @ '1'..='5'),
            modifiers: KeyModifiers::NONE,
            ..
        } => {
            let index = c as usize - '1' as usize;
            if let Some(module_type) = ModuleType::all().get(index) {
                app.add_module_type(*module_type);
            }
        }

        KeyEvent {
            code: KeyCode::Enter | KeyCode::Char('i'),
            modifiers: KeyModifiers::NONE,
            ..
        } => app.edit_selected(),

        KeyEvent {
            code: KeyCode::Char('['),
            ..
        } => app.cycle_ending(false),
        KeyEvent {
            code: KeyCode::Char(']'),
            ..
        } => app.cycle_ending(true),

        KeyEvent {
            code: KeyCode::Char('x') | KeyCode::Delete,
            ..
        } => app.remove_selected(),

        KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::NONE,
            ..
        } => app.cycle_category(),

        KeyEvent {
            code: KeyCode::Char('e'),
            modifiers: KeyModifiers::NONE,
            ..
        } => app.load_example(),

        #[cfg(feature = "clipboard")]
        KeyEvent {
            code: KeyCode::Char('y'),
            modifiers: KeyModifiers::NONE,
            ..
        } => app.copy_active(),

        KeyEvent {
            code: KeyCode::Char('t'),
            modifiers: KeyModifiers::NONE,
            ..
        } => app.toggle_theme(),

        KeyEvent {
            code: KeyCode::Char('?'),
            ..
        } => app.toggle_help(),

        _ => {}
    }
    Action::Continue
}

fn handle_edit_key(app: &mut App, key: KeyEvent) {
    let prompt_open = app.macro_prompt.is_some();
    match key.code {
        KeyCode::Esc => app.end_edit(),
        KeyCode::Tab if prompt_open => {
            app.apply_macro_choice();
        }
        KeyCode::Up if prompt_open => app.cycle_macro(false),
        KeyCode::Down if prompt_open => app.cycle_macro(true),
        KeyCode::Enter => app.split_at_caret(),
        KeyCode::Backspace => {
            app.composer.edit_backspace();
        }
        KeyCode::Left => app.composer.edit_move_caret(-1),
        KeyCode::Right => app.composer.edit_move_caret(1),
        KeyCode::Home => app.composer.edit_move_caret(isize::MIN),
        KeyCode::End => app.composer.edit_move_caret(isize::MAX),
        KeyCode::Char(' ') if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.expand_exact_macro();
            app.composer.edit_insert(' ');
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.composer.edit_insert(c);
        }
        _ => {}
    }
}

fn handle_entry_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_entry(),
        KeyCode::Enter => app.commit_entry(),
        KeyCode::Backspace => {
            if let Some(entry) = app.entry.as_mut() {
                entry.buffer.pop();
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(entry) = app.entry.as_mut() {
                entry.buffer.push(c);
            }
        }
        _ => {}
    }
}

/// Handle a mouse event; `area` is the frame the layout was drawn into
pub fn handle_mouse(app: &mut App, mouse: MouseEvent, area: Rect, now: Instant) {
    let MouseEvent {
        kind, column, row, ..
    } = mouse;
    let point = layout::cell_point(column, row);

    // Compute layout areas (must match ui.rs layout logic)
    let screen = layout::compute(app, area);

    match kind {
        MouseEventKind::Down(MouseButton::Left) => handle_mouse_down(app, point, &screen, now),
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            if !app.drag.is_idle() {
                app.drag.pointer_move(MOUSE_POINTER, point, now);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => handle_mouse_up(app, point, &screen),
        MouseEventKind::ScrollDown => handle_scroll(app, point, &screen, 1),
        MouseEventKind::ScrollUp => handle_scroll(app, point, &screen, -1),
        _ => {}
    }
    app.refresh_macro_prompt();
}

fn contains(rect: Rect, point: Point) -> bool {
    layout::rect_bounds(rect).contains(point)
}

fn handle_mouse_down(app: &mut App, point: Point, screen: &ScreenLayout, now: Instant) {
    if !app.drag.is_idle() {
        return;
    }
    if app.show_help {
        app.toggle_help();
        return;
    }
    app.clear_status_message();
    app.cancel_entry();

    if let Some((action, _)) = screen.buttons.iter().find(|(_, r)| contains(*r, point)) {
        match *action {
            ToolbarAction::Add(module_type) => app.add_module_type(module_type),
            ToolbarAction::Preset(index) => app.add_preset(index),
        }
        return;
    }

    if let Some((word, _)) = screen.keyword_chips.iter().find(|(_, r)| contains(*r, point)) {
        app.add_keyword(word);
        return;
    }

    let Some(track) = screen.tracks().into_iter().find(|t| contains(t.outer, point)) else {
        return;
    };
    let side = track.side;
    app.activate_track(side);

    match track.hit(point) {
        Some((index, PointerTarget::Control)) => app.remove_at(side, index),
        Some((index, target)) => {
            let down = PointerDown {
                pointer_id: MOUSE_POINTER,
                kind: app.pointer_kind,
                pos: point,
                side,
                index,
                target,
                chip: track.chips[index].bounds,
            };
            if app.drag.pointer_down(down, app.composer.track(side), now) {
                debug!("armed {:?}[{}]", side, index);
            }
        }
        None if contains(track.inner, point) => {
            // A click between chips opens the insertion cursor at that gap
            let bounds: Vec<_> = track.chips.iter().map(|c| c.bounds).collect();
            let gap = resolve_drop_index(point, &bounds);
            app.end_edit();
            app.selected = None;
            app.composer.open_cursor(gap);
        }
        None => {}
    }
}

fn handle_mouse_up(app: &mut App, point: Point, screen: &ScreenLayout) {
    let Some((side, _)) = app.drag.source() else {
        return;
    };
    let track_layout = screen.track(side).to_track_layout();
    let outcome = app.drag.pointer_up(
        MOUSE_POINTER,
        point,
        &track_layout,
        app.composer.track_mut(side),
    );
    if let Some(outcome) = outcome {
        app.apply_drag_outcome(outcome);
    }
}

fn handle_scroll(app: &mut App, point: Point, screen: &ScreenLayout, delta: isize) {
    if let Some(track) = screen.tracks().into_iter().find(|t| contains(t.outer, point)) {
        app.scroll_track(track.side, delta, track.rows);
    }
}
