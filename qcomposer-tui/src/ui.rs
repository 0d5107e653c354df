//! UI rendering

use crate::app::{App, Entry, MessageKind, Mode};
use crate::ghost;
use crate::layout::{self, button_text, chip_label, ScreenLayout, TrackArea};
use qcomposer_core::config::ThemeVariant;
use qcomposer_core::drag::DragPhase;
use qcomposer_core::geometry::Bounds;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Draw the UI
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let screen = layout::compute(app, area);

    render_toolbar(frame, app, &screen);
    for track in screen.tracks() {
        render_track(frame, app, track);
    }
    render_keywords(frame, app, &screen);
    render_preview(frame, app, screen.preview);
    render_status_bar(frame, app, screen.status);

    if let Some(entry) = &app.entry {
        render_entry(frame, app, &screen, entry);
    }
    if app.macro_prompt.is_some() {
        render_macro_popup(frame, app, &screen);
    }

    // Ghost is drawn last so it stays above the tracks
    ghost::render(frame, app);

    if app.show_help {
        render_help(frame, app, area);
    }
}

fn block<'a>(title: String, border: ratatui::style::Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title)
}

fn render_toolbar(frame: &mut Frame, app: &App, screen: &ScreenLayout) {
    frame.render_widget(
        block(" 모듈 ".to_string(), app.theme.border),
        screen.toolbar,
    );
    for (action, rect) in &screen.buttons {
        let button = Paragraph::new(Span::styled(button_text(app, *action), app.theme.button));
        frame.render_widget(button, *rect);
    }
}

/// One-cell marker in the gap before `index` (after the last chip at `len`)
fn gap_marker(track: &TrackArea, index: usize) -> Option<Rect> {
    let bounds = match track.chips.get(index) {
        Some(chip) => Bounds::new(chip.bounds.x - 1.0, chip.bounds.y, 1.0, 1.0),
        None => match track.chips.last() {
            Some(last) => Bounds::new(last.bounds.right(), last.bounds.y, 1.0, 1.0),
            None => Bounds::new(track.inner.x as f32, track.inner.y as f32, 1.0, 1.0),
        },
    };
    track.visible(bounds)
}

/// Chip spans for the module under edit, with the caret cell highlighted
fn edit_spans<'a>(text: &str, caret: usize, style: Style, caret_style: Style) -> Vec<Span<'a>> {
    let chars: Vec<char> = text.chars().collect();
    let caret = caret.min(chars.len());
    let before: String = chars[..caret].iter().collect();
    let (at, after) = match chars.get(caret) {
        Some(c) => (c.to_string(), chars[caret + 1..].iter().collect::<String>() + " "),
        None => (" ".to_string(), String::new()),
    };
    vec![
        Span::styled(format!(" {}", before), style),
        Span::styled(at, caret_style),
        Span::styled(format!("{} ×", after), style),
    ]
}

fn render_track(frame: &mut Frame, app: &App, track: &TrackArea) {
    let side = track.side;
    let modules = app.composer.track(side);
    let active = app.composer.active_side() == side;

    let border = if active {
        app.theme.border_active
    } else {
        app.theme.border
    };
    let title = format!(" {} · {} ", side.label(), modules.len());
    frame.render_widget(block(title, border), track.outer);

    if modules.is_empty() {
        let hint = Paragraph::new(Span::styled(
            "Add modules from the toolbar (1-5)",
            app.theme.placeholder,
        ));
        frame.render_widget(hint, track.inner);
    }

    let dragged = app.drag.dragged_module();
    let edit = app.composer.edit().filter(|_| active);

    for (index, chip) in track.chips.iter().enumerate() {
        let (Some(rect), Some(module)) = (track.visible(chip.bounds), modules.get(index)) else {
            continue;
        };

        // The source chip stays in place but hidden while its ghost is out
        if dragged == Some((side, module.id)) {
            let blank = " ".repeat(rect.width as usize);
            frame.render_widget(Paragraph::new(Span::styled(blank, app.theme.chip_hidden)), rect);
            continue;
        }

        let mut style = app.theme.chip_style(module.module_type());
        if active && app.selected == Some(index) {
            style = style.add_modifier(app.theme.chip_selected);
        }

        let line = match edit {
            Some(e) if e.index == index => Line::from(edit_spans(
                module.data.as_text().unwrap_or(""),
                e.caret,
                style,
                app.theme.caret,
            )),
            _ => Line::from(Span::styled(
                layout::chip_text(&chip_label(app, side, index)),
                style,
            )),
        };
        frame.render_widget(Paragraph::new(line), rect);
    }

    // Drop caret while dragging over this track, else the pending insertion cursor
    let marker = match app.drag.source() {
        Some((drag_side, _)) if app.drag.is_dragging() => {
            if drag_side == side {
                app.drag
                    .drop_index()
                    .and_then(|d| gap_marker(track, d))
                    .map(|r| (r, "│", app.theme.drop_caret))
            } else {
                None
            }
        }
        _ if active => app
            .composer
            .cursor()
            .and_then(|c| gap_marker(track, c))
            .map(|r| (r, "┃", app.theme.insertion_cursor)),
        _ => None,
    };
    if let Some((rect, glyph, style)) = marker {
        frame.render_widget(Paragraph::new(Span::styled(glyph, style)), rect);
    }
}

fn render_keywords(frame: &mut Frame, app: &App, screen: &ScreenLayout) {
    let title = match app.composer.category() {
        Some(category) => format!(" 키워드 · {} ", category),
        None => " 키워드 ".to_string(),
    };
    frame.render_widget(block(title, app.theme.border), screen.keywords);

    if screen.keyword_chips.is_empty() {
        let inner = Rect::new(
            screen.keywords.x.saturating_add(1),
            screen.keywords.y.saturating_add(1),
            screen.keywords.width.saturating_sub(2),
            1,
        )
        .intersection(screen.keywords);
        frame.render_widget(
            Paragraph::new(Span::styled("No keywords (c: change category)", app.theme.placeholder)),
            inner,
        );
        return;
    }
    for (word, rect) in &screen.keyword_chips {
        frame.render_widget(
            Paragraph::new(Span::styled(format!("#{}", word), app.theme.keyword)),
            *rect,
        );
    }
}

fn render_preview(frame: &mut Frame, app: &App, area: Rect) {
    let result = app.composer.complete();
    let lines = vec![
        Line::from(vec![
            Span::styled("Q ", app.theme.preview_label),
            Span::styled(result.question, app.theme.base),
        ]),
        Line::from(vec![
            Span::styled("A ", app.theme.preview_label),
            Span::styled(result.answer, app.theme.base),
        ]),
    ];
    let preview = Paragraph::new(lines)
        .block(block(" 미리보기 ".to_string(), app.theme.border))
        .wrap(Wrap { trim: false });
    frame.render_widget(preview, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode_str = match app.mode() {
        Mode::Normal => "NORMAL",
        Mode::Edit => "EDIT",
        Mode::Entry => "ENTRY",
    };
    let drag_str = match app.drag.phase() {
        DragPhase::Idle => "",
        DragPhase::Armed => "  [ARMED]",
        DragPhase::Dragging => "  [DRAG]",
    };
    let theme_str = match app.theme_variant {
        ThemeVariant::Dark => "DARK",
        ThemeVariant::Light => "LIGHT",
    };
    let cursor_str = app
        .composer
        .cursor()
        .map(|c| format!("  insert@{}", c))
        .unwrap_or_default();

    let status_text = format!(
        " qcomposer  [{}]  {}  {}{}{}  [{}]  ?:help ",
        mode_str,
        app.composer.active_side().label(),
        app.composer.category().unwrap_or("-"),
        cursor_str,
        drag_str,
        theme_str,
    );

    let bar_style = Style::default()
        .fg(app.theme.status_bar_fg)
        .bg(app.theme.status_bar_bg)
        .add_modifier(Modifier::BOLD);
    let mut spans = vec![Span::styled(status_text, bar_style)];
    if let Some((message, kind)) = &app.status_message {
        let style = match kind {
            MessageKind::Info => bar_style,
            MessageKind::Error => app.theme.error,
        };
        spans.push(Span::styled(format!(" {} ", message), style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bar_style), area);
}

/// Popup placed just under a chip of the active track, kept inside the frame
fn popup_near_chip(screen: &ScreenLayout, app: &App, index: usize, width: u16, height: u16) -> Rect {
    let track = screen.track(app.composer.active_side());
    let anchor = track
        .chips
        .get(index)
        .map(|c| (c.bounds.x, c.bounds.bottom()))
        .unwrap_or((track.inner.x as f32, track.inner.y as f32));
    let frame_area = screen.toolbar.union(screen.status);
    let wanted = Bounds::new(anchor.0, anchor.1, width as f32, height as f32);
    layout::to_rect(wanted.clamped_within(&layout::rect_bounds(frame_area))).intersection(frame_area)
}

fn render_entry(frame: &mut Frame, app: &App, screen: &ScreenLayout, entry: &Entry) {
    let area = popup_near_chip(screen, app, entry.index, 44, 3);
    let title = format!(" {} (comma separated, Enter) ", entry.module_type.label());
    let input = Paragraph::new(Line::from(vec![
        Span::styled(entry.buffer.clone(), app.theme.base),
        Span::styled(" ", app.theme.caret),
    ]))
    .block(block(title, app.theme.border_active))
    .style(Style::default().bg(app.theme.popup_bg));

    frame.render_widget(Clear, area);
    frame.render_widget(input, area);
}

fn render_macro_popup(frame: &mut Frame, app: &App, screen: &ScreenLayout) {
    let (Some(prompt), Some(edit)) = (&app.macro_prompt, app.composer.edit()) else {
        return;
    };
    let lines: Vec<Line> = prompt
        .candidates
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let text = format!(
                "{}{}  {}",
                app.config.macros.trigger, entry.trigger, entry.replacement
            );
            let style = if i == app.macro_selected {
                app.theme.popup_active
            } else {
                app.theme.base
            };
            Line::from(Span::styled(text, style))
        })
        .collect();

    let height = lines.len() as u16 + 2;
    let area = popup_near_chip(screen, app, edit.index, 40, height);
    let popup = Paragraph::new(lines)
        .block(block(" Tab: insert ".to_string(), app.theme.border_active))
        .style(Style::default().bg(app.theme.popup_bg));

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let bindings: &[(&str, &str)] = &[
        ("1-5", "Add time / date / ending / symbol / text"),
        ("Tab", "Switch question / answer"),
        ("h l, ←→", "Select module"),
        ("H L", "Move selected module"),
        ("Enter, i", "Edit selected module"),
        ("[ ]", "Cycle ending"),
        ("x, Del", "Remove selected module"),
        ("c / e", "Next category / load example"),
        ("y", "Copy active track"),
        ("t", "Toggle theme"),
        ("Ctrl+S", "Finish and print result"),
        ("q", "Quit without result"),
        ("", ""),
        ("Edit: Enter", "Split at caret"),
        ("Edit: /word", "Macro, Tab to insert"),
        ("Mouse", "Drag chips to reorder, × removes"),
    ];
    let lines: Vec<Line> = bindings
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{:<12}", key), app.theme.preview_label),
                Span::styled(*what, app.theme.base),
            ])
        })
        .collect();

    let width = 56.min(area.width);
    let height = (lines.len() as u16 + 2).min(area.height);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block(" Help ".to_string(), app.theme.border_active))
            .style(Style::default().bg(app.theme.popup_bg)),
        popup,
    );
}
