//! Ghost rendering: the dragged chip follows the pointer above everything else

use crate::app::App;
use crate::layout::{chip_text, rect_bounds, to_rect};
use ratatui::{
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

/// Draw the ghost at its current position, kept inside the frame
pub fn render(frame: &mut Frame, app: &App) {
    let (Some(ghost), Some(bounds)) = (app.drag.ghost(), app.drag.ghost_bounds()) else {
        return;
    };
    let area = frame.area();
    let placed = bounds.clamped_within(&rect_bounds(area));
    let rect = to_rect(placed).intersection(area);
    if rect.is_empty() {
        return;
    }

    let style = app
        .theme
        .chip_style(ghost.module_type)
        .patch(app.theme.ghost);
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(chip_text(&ghost.label), style))),
        rect,
    );
}
