//! Theme system for dark/light modes

use qcomposer_core::config::ThemeVariant;
use qcomposer_core::ModuleType;
use ratatui::style::{Color, Modifier, Style};

/// Theme definition
#[derive(Clone, Debug)]
pub struct Theme {
    pub base: Style,
    /// Chip styles indexed in `ModuleType::all()` order
    pub chip: [Style; 5],
    pub chip_selected: Modifier,
    /// Placeholder left where the dragged chip used to be
    pub chip_hidden: Style,
    pub caret: Style,
    pub drop_caret: Style,
    pub insertion_cursor: Style,
    pub ghost: Style,
    pub button: Style,
    pub keyword: Style,
    pub placeholder: Style,
    pub border: Color,
    pub border_active: Color,
    pub preview_label: Style,
    pub popup_bg: Color,
    pub popup_active: Style,
    pub error: Style,
    pub status_bar_fg: Color,
    pub status_bar_bg: Color,
}

impl Theme {
    /// Create a theme for the given variant
    pub fn for_variant(variant: ThemeVariant) -> Self {
        match variant {
            ThemeVariant::Dark => Self::dark(),
            ThemeVariant::Light => Self::light(),
        }
    }

    pub fn chip_style(&self, module_type: ModuleType) -> Style {
        let index = ModuleType::all()
            .iter()
            .position(|t| *t == module_type)
            .unwrap_or(0);
        self.chip[index]
    }

    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            base: Style::default().fg(Color::White),
            chip: [
                Style::default().fg(Color::Black).bg(Color::LightBlue),
                Style::default().fg(Color::Black).bg(Color::LightGreen),
                Style::default().fg(Color::Black).bg(Color::LightMagenta),
                Style::default().fg(Color::Black).bg(Color::LightYellow),
                Style::default().fg(Color::White).bg(Color::Rgb(60, 60, 60)),
            ],
            chip_selected: Modifier::BOLD | Modifier::UNDERLINED,
            chip_hidden: Style::default().bg(Color::Rgb(30, 30, 30)),
            caret: Style::default().fg(Color::Black).bg(Color::White),
            drop_caret: Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
            insertion_cursor: Style::default().fg(Color::LightCyan),
            ghost: Style::default()
                .fg(Color::Black)
                .bg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
            button: Style::default().fg(Color::LightCyan),
            keyword: Style::default().fg(Color::LightGreen),
            placeholder: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            border: Color::DarkGray,
            border_active: Color::LightCyan,
            preview_label: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
            popup_bg: Color::Black,
            popup_active: Style::default()
                .fg(Color::Black)
                .bg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
            error: Style::default().fg(Color::White).bg(Color::Red),
            status_bar_fg: Color::Black,
            status_bar_bg: Color::LightBlue,
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            base: Style::default().fg(Color::Black),
            chip: [
                Style::default().fg(Color::White).bg(Color::Blue),
                Style::default().fg(Color::White).bg(Color::Green),
                Style::default().fg(Color::White).bg(Color::Magenta),
                Style::default().fg(Color::Black).bg(Color::Rgb(230, 200, 80)),
                Style::default().fg(Color::Black).bg(Color::Rgb(220, 220, 220)),
            ],
            chip_selected: Modifier::BOLD | Modifier::UNDERLINED,
            chip_hidden: Style::default().bg(Color::Rgb(235, 235, 235)),
            caret: Style::default().fg(Color::White).bg(Color::Black),
            drop_caret: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            insertion_cursor: Style::default().fg(Color::Blue),
            ghost: Style::default()
                .fg(Color::White)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            button: Style::default().fg(Color::Blue),
            keyword: Style::default().fg(Color::Green),
            placeholder: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            border: Color::Gray,
            border_active: Color::Blue,
            preview_label: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            popup_bg: Color::White,
            popup_active: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            error: Style::default().fg(Color::White).bg(Color::Red),
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
        }
    }
}
