//! Screen layout shared by rendering and mouse hit-testing

use crate::app::App;
use qcomposer_core::drag::PointerTarget;
use qcomposer_core::drop_target::TrackLayout;
use qcomposer_core::geometry::{Bounds, Point};
use qcomposer_core::module::ModuleType;
use qcomposer_core::TrackSide;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use unicode_width::UnicodeWidthStr;

/// Blank columns between chips
pub const CHIP_GAP: u16 = 1;
/// A chip row plus one blank row
pub const ROW_STRIDE: u16 = 2;
/// Width of the trailing close control (" ×")
pub const CLOSE_WIDTH: u16 = 2;

/// Geometry of one module chip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChipBox {
    pub bounds: Bounds,
    pub close: Bounds,
}

/// One track block and its chips
#[derive(Debug, Clone)]
pub struct TrackArea {
    pub side: TrackSide,
    pub outer: Rect,
    pub inner: Rect,
    pub chips: Vec<ChipBox>,
    /// Total chip rows, including rows scrolled out of view
    pub rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Add(ModuleType),
    Preset(usize),
}

#[derive(Debug, Clone)]
pub struct ScreenLayout {
    pub toolbar: Rect,
    pub buttons: Vec<(ToolbarAction, Rect)>,
    pub question: TrackArea,
    pub answer: TrackArea,
    pub keywords: Rect,
    pub keyword_chips: Vec<(String, Rect)>,
    pub preview: Rect,
    pub status: Rect,
}

impl ScreenLayout {
    pub fn track(&self, side: TrackSide) -> &TrackArea {
        match side {
            TrackSide::Question => &self.question,
            TrackSide::Answer => &self.answer,
        }
    }

    pub fn tracks(&self) -> [&TrackArea; 2] {
        [&self.question, &self.answer]
    }
}

impl TrackArea {
    /// Geometry handed to the drag engine; the whole block is the tracked region
    pub fn to_track_layout(&self) -> TrackLayout {
        TrackLayout::new(
            rect_bounds(self.outer),
            self.chips.iter().map(|c| c.bounds).collect(),
        )
    }

    /// Chip under the pointer and whether it hit the nested close control
    pub fn hit(&self, point: Point) -> Option<(usize, PointerTarget)> {
        if !rect_bounds(self.inner).contains(point) {
            return None;
        }
        self.chips
            .iter()
            .position(|c| c.bounds.contains(point))
            .map(|index| {
                let target = if self.chips[index].close.contains(point) {
                    PointerTarget::Control
                } else {
                    PointerTarget::Chip
                };
                (index, target)
            })
    }

    /// Screen rect of a chip if it is fully inside the visible area
    pub fn visible(&self, bounds: Bounds) -> Option<Rect> {
        let inner = rect_bounds(self.inner);
        let fits = bounds.x >= inner.x
            && bounds.y >= inner.y
            && bounds.right() <= inner.right()
            && bounds.bottom() <= inner.bottom();
        fits.then(|| to_rect(bounds))
    }
}

/// Centre of a terminal cell in pointer space
pub fn cell_point(column: u16, row: u16) -> Point {
    Point::new(column as f32 + 0.5, row as f32 + 0.5)
}

pub fn rect_bounds(rect: Rect) -> Bounds {
    Bounds::new(
        rect.x as f32,
        rect.y as f32,
        rect.width as f32,
        rect.height as f32,
    )
}

/// Cell rect for non-negative bounds
pub fn to_rect(bounds: Bounds) -> Rect {
    Rect::new(
        bounds.x.max(0.0).round() as u16,
        bounds.y.max(0.0).round() as u16,
        bounds.width.max(0.0).round() as u16,
        bounds.height.max(0.0).round() as u16,
    )
}

/// Text drawn inside a chip: label plus the close glyph
pub fn chip_text(label: &str) -> String {
    format!(" {} ×", label)
}

/// Label of a chip; the module under edit shows its raw text with room for the caret
pub fn chip_label(app: &App, side: TrackSide, index: usize) -> String {
    let composer = &app.composer;
    let Some(module) = composer.track(side).get(index) else {
        return String::new();
    };
    match composer.edit() {
        Some(edit) if side == composer.active_side() && edit.index == index => {
            format!("{} ", module.data.as_text().unwrap_or(""))
        }
        _ => module.label(),
    }
}

fn flow_chips(app: &App, side: TrackSide, inner: Rect, scroll: usize) -> (Vec<ChipBox>, usize) {
    let mut chips = Vec::new();
    let count = app.composer.track(side).len();
    let mut x = inner.x;
    let mut row: usize = 0;

    for index in 0..count {
        let text = chip_text(&chip_label(app, side, index));
        let width = (text.width() as u16).min(inner.width.max(1));
        if x > inner.x && x + width > inner.x + inner.width {
            row += 1;
            x = inner.x;
        }

        let y = inner.y as f32 + ((row as f32) - (scroll as f32)) * ROW_STRIDE as f32;
        let bounds = Bounds::new(x as f32, y, width as f32, 1.0);
        let close_width = CLOSE_WIDTH.min(width) as f32;
        let close = Bounds::new(bounds.right() - close_width, y, close_width, 1.0);
        chips.push(ChipBox { bounds, close });
        x += width + CHIP_GAP;
    }

    let rows = if count == 0 { 0 } else { row + 1 };
    (chips, rows)
}

fn track_area(app: &App, side: TrackSide, outer: Rect) -> TrackArea {
    let inner = Rect::new(
        outer.x.saturating_add(1),
        outer.y.saturating_add(1),
        outer.width.saturating_sub(2),
        outer.height.saturating_sub(2),
    );
    let (chips, rows) = flow_chips(app, side, inner, app.scroll(side));
    TrackArea {
        side,
        outer,
        inner,
        chips,
        rows,
    }
}

/// Lay out `labels` left to right on one line, dropping those that do not fit
fn flow_line<T: Copy>(items: &[(T, String)], line: Rect) -> Vec<(T, Rect)> {
    let mut out = Vec::new();
    let mut x = line.x;
    for (item, label) in items {
        let width = label.width() as u16;
        if x + width > line.x + line.width {
            break;
        }
        out.push((*item, Rect::new(x, line.y, width, 1)));
        x += width + CHIP_GAP;
    }
    out
}

/// Toolbar button text
pub fn button_text(app: &App, action: ToolbarAction) -> String {
    match action {
        ToolbarAction::Add(t) => format!("[+{}]", t.label()),
        ToolbarAction::Preset(i) => app
            .toolbar
            .get(i)
            .map(|p| format!("[{}]", p.label))
            .unwrap_or_default(),
    }
}

/// Compute the full screen layout (must match ui.rs drawing order)
pub fn compute(app: &App, area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Toolbar: module types + presets
            Constraint::Min(4),    // Question track
            Constraint::Min(4),    // Answer track
            Constraint::Length(3), // Keyword chips
            Constraint::Length(4), // Serialized preview
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let toolbar = chunks[0];
    let toolbar_inner = Rect::new(
        toolbar.x.saturating_add(1),
        toolbar.y.saturating_add(1),
        toolbar.width.saturating_sub(2),
        toolbar.height.saturating_sub(2),
    );

    let add_items: Vec<(ToolbarAction, String)> = ModuleType::all()
        .into_iter()
        .map(|t| {
            let action = ToolbarAction::Add(t);
            (action, button_text(app, action))
        })
        .collect();
    let preset_items: Vec<(ToolbarAction, String)> = (0..app.toolbar.len())
        .map(|i| {
            let action = ToolbarAction::Preset(i);
            (action, button_text(app, action))
        })
        .collect();

    let mut buttons = Vec::new();
    if toolbar_inner.height > 0 {
        buttons = flow_line(&add_items, Rect { height: 1, ..toolbar_inner });
    }
    if toolbar_inner.height > 1 {
        let second = Rect {
            y: toolbar_inner.y + 1,
            height: 1,
            ..toolbar_inner
        };
        buttons.extend(flow_line(&preset_items, second));
    }

    let keywords = chunks[3];
    let keyword_line = Rect::new(
        keywords.x.saturating_add(1),
        keywords.y.saturating_add(1),
        keywords.width.saturating_sub(2),
        1,
    );
    let keyword_items: Vec<(usize, String)> = app
        .keywords()
        .iter()
        .enumerate()
        .map(|(i, k)| (i, format!("#{}", k)))
        .collect();
    let keyword_chips = if keywords.height > 2 {
        flow_line(&keyword_items, keyword_line)
            .into_iter()
            .filter_map(|(i, rect)| app.keywords().get(i).map(|k| (k.to_string(), rect)))
            .collect()
    } else {
        Vec::new()
    };

    ScreenLayout {
        toolbar,
        buttons,
        question: track_area(app, TrackSide::Question, chunks[1]),
        answer: track_area(app, TrackSide::Answer, chunks[2]),
        keywords,
        keyword_chips,
        preview: chunks[4],
        status: chunks[5],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcomposer_core::{Config, ModuleData, Presets};

    fn app_with(texts: &[&str]) -> App {
        let mut app = App::new(Config::default(), Presets::default(), None);
        for t in texts {
            app.composer
                .add_module(TrackSide::Question, ModuleData::text(*t), None);
        }
        app
    }

    #[test]
    fn test_chips_flow_and_wrap() {
        let app = app_with(&["aaaa", "bbbb", "cccc"]);
        let layout = compute(&app, Rect::new(0, 0, 20, 30));
        let chips = &layout.question.chips;
        assert_eq!(chips.len(), 3);
        // " aaaa ×" is 7 cells wide
        assert_eq!(chips[0].bounds.width, 7.0);
        assert_eq!(chips[1].bounds.x, chips[0].bounds.right() + 1.0);
        // Inner width is 18: the third chip wraps to the next row
        assert_eq!(chips[2].bounds.x, layout.question.inner.x as f32);
        assert_eq!(chips[2].bounds.y, chips[0].bounds.y + ROW_STRIDE as f32);
        assert_eq!(layout.question.rows, 2);
    }

    #[test]
    fn test_hit_distinguishes_close_control() {
        let app = app_with(&["aaaa"]);
        let layout = compute(&app, Rect::new(0, 0, 40, 30));
        let chip = layout.question.chips[0].bounds;
        let body = Point::new(chip.x + 1.5, chip.y + 0.5);
        let close = Point::new(chip.right() - 0.5, chip.y + 0.5);
        assert_eq!(layout.question.hit(body), Some((0, PointerTarget::Chip)));
        assert_eq!(layout.question.hit(close), Some((0, PointerTarget::Control)));
        assert_eq!(layout.answer.hit(body), None);
    }

    #[test]
    fn test_hangul_labels_use_display_width() {
        let app = app_with(&["안녕"]);
        let layout = compute(&app, Rect::new(0, 0, 40, 30));
        // 1 + 4 (two wide chars) + 2
        assert_eq!(layout.question.chips[0].bounds.width, 7.0);
    }

    #[test]
    fn test_toolbar_has_type_buttons() {
        let app = app_with(&[]);
        let layout = compute(&app, Rect::new(0, 0, 100, 30));
        let adds = layout
            .buttons
            .iter()
            .filter(|(a, _)| matches!(a, ToolbarAction::Add(_)))
            .count();
        assert_eq!(adds, 5);
        assert!(layout
            .buttons
            .iter()
            .any(|(a, _)| *a == ToolbarAction::Preset(0)));
    }
}
