//! Application state

use crate::host::TerminalHost;
use crate::layout;
use crate::theme::Theme;
use log::{debug, info, warn};
use qcomposer_core::composer::MacroPrompt;
use qcomposer_core::config::ThemeVariant;
use qcomposer_core::drag::{CancelReason, DragOutcome};
use qcomposer_core::macros::StaticLibrary;
use qcomposer_core::module::{DateSet, ModuleData, ModuleType, TimeSet};
use qcomposer_core::presets::Preset;
use qcomposer_core::{
    ComposeResult, Composer, Config, DragController, PointerKind, Presets, TrackSide,
};
use ratatui::layout::Rect;

/// Input mode, derived from the editing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Typing into a text or symbol module
    Edit,
    /// Entering comma-separated values for a time or date module
    Entry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

/// Value entry for a time/date module of the active track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub index: usize,
    pub module_type: ModuleType,
    pub buffer: String,
}

/// Main application state
pub struct App {
    pub config: Config,
    pub presets: Presets,
    pub library: StaticLibrary,
    /// Toolbar presets in display order
    pub toolbar: Vec<Preset>,
    pub composer: Composer,
    pub drag: DragController<TerminalHost>,
    pub pointer_kind: PointerKind,
    pub theme: Theme,
    pub theme_variant: ThemeVariant,
    pub selected: Option<usize>,
    pub entry: Option<Entry>,
    pub macro_prompt: Option<MacroPrompt>,
    pub macro_selected: usize,
    scroll: [usize; 2],
    example_index: usize,
    pub status_message: Option<(String, MessageKind)>,
    pub show_help: bool,
    pub should_quit: bool,
    /// Set when the user completes the session
    pub result: Option<ComposeResult>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config, presets: Presets, category: Option<String>) -> Self {
        let theme_variant = config.theme;
        let drag = DragController::new(TerminalHost::default(), config.drag.settings());
        let category = category.or_else(|| presets.categories.first().cloned());
        info!(
            "composer started (category {:?}, pointer {:?})",
            category, config.drag.pointer
        );

        Self {
            pointer_kind: config.drag.pointer,
            library: presets.library(),
            toolbar: presets.toolbar(),
            composer: Composer::new(category),
            drag,
            theme: Theme::for_variant(theme_variant),
            theme_variant,
            selected: None,
            entry: None,
            macro_prompt: None,
            macro_selected: 0,
            scroll: [0, 0],
            example_index: 0,
            status_message: None,
            show_help: false,
            should_quit: false,
            result: None,
            config,
            presets,
        }
    }

    pub fn mode(&self) -> Mode {
        if self.entry.is_some() {
            Mode::Entry
        } else if self.composer.edit().is_some() {
            Mode::Edit
        } else {
            Mode::Normal
        }
    }

    /// Keyword chips for the current category
    pub fn keywords(&self) -> Vec<&str> {
        self.composer
            .category()
            .map(|c| self.presets.keywords_for(c))
            .unwrap_or_default()
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Finish composing: the result is handed back to the caller of `run`
    pub fn complete(&mut self) {
        let result = self.composer.complete();
        info!(
            "composition complete ({} question / {} answer modules)",
            result.question_modules.len(),
            result.answer_modules.len()
        );
        self.result = Some(result);
        self.should_quit = true;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_theme(&mut self) {
        self.theme_variant = match self.theme_variant {
            ThemeVariant::Dark => ThemeVariant::Light,
            ThemeVariant::Light => ThemeVariant::Dark,
        };
        self.theme = Theme::for_variant(self.theme_variant);
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), MessageKind::Info));
    }

    pub fn set_error_message(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), MessageKind::Error));
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }

    /// Rows scrolled off the top of a track
    pub fn scroll(&self, side: TrackSide) -> usize {
        self.scroll[side_slot(side)]
    }

    /// Scroll a track by `delta` rows; refused while a drag holds the scroll lock
    pub fn scroll_track(&mut self, side: TrackSide, delta: isize, rows: usize) -> bool {
        if self.drag.host().scroll_locked() {
            return false;
        }
        let slot = &mut self.scroll[side_slot(side)];
        let max = rows.saturating_sub(1);
        *slot = slot.saturating_add_signed(delta).min(max);
        true
    }

    /// Make `side` the active track
    pub fn activate_track(&mut self, side: TrackSide) {
        if self.composer.active_side() != side {
            self.entry = None;
            self.selected = None;
            self.composer.set_active(side);
        }
    }

    pub fn switch_track(&mut self) {
        if !self.drag.is_idle() {
            return;
        }
        let other = self.composer.active_side().other();
        self.activate_track(other);
    }

    pub fn select_next(&mut self) {
        let len = self.composer.active_track().len();
        if len == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        });
    }

    pub fn select_prev(&mut self) {
        let len = self.composer.active_track().len();
        if len == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => i.saturating_sub(1),
            None => len - 1,
        });
    }

    fn clamp_selection(&mut self) {
        let len = self.composer.active_track().len();
        if let Some(i) = self.selected {
            self.selected = if len == 0 { None } else { Some(i.min(len - 1)) };
        }
    }

    /// Toolbar type button: add an empty module and start filling it in
    pub fn add_module_type(&mut self, module_type: ModuleType) {
        let data = match module_type {
            ModuleType::Ending => ModuleData::Ending(self.presets.default_ending()),
            other => ModuleData::empty(other),
        };
        let side = self.composer.active_side();
        let index = self.composer.add_module(side, data, None);
        self.selected = Some(index);
        if module_type != ModuleType::Ending {
            self.edit_selected();
        }
    }

    /// Toolbar preset button
    pub fn add_preset(&mut self, preset_index: usize) {
        let Some(preset) = self.toolbar.get(preset_index).cloned() else {
            return;
        };
        let index = self.composer.add_preset(&preset);
        self.selected = Some(index);
        debug!("preset {:?} added at {}", preset.label, index);
    }

    pub fn add_keyword(&mut self, keyword: &str) {
        let index = self.composer.add_keyword(keyword);
        self.selected = Some(index);
    }

    /// Replace both tracks with the next example of the current category
    pub fn load_example(&mut self) {
        let examples = match self.composer.category() {
            Some(category) => self.presets.examples_for(category),
            None => self.presets.examples.iter().collect(),
        };
        if examples.is_empty() {
            self.set_error_message("No examples for this category");
            return;
        }
        let pair = examples[self.example_index % examples.len()].clone();
        self.example_index = self.example_index.wrapping_add(1);

        self.entry = None;
        self.composer.load_example(&pair);
        self.selected = None;
        self.scroll = [0, 0];
        self.set_status_message(format!("Loaded example: {}", pair.question));
    }

    /// Step through the configured categories
    pub fn cycle_category(&mut self) {
        let categories = &self.presets.categories;
        if categories.is_empty() {
            return;
        }
        let next = match self.composer.category() {
            Some(current) => categories
                .iter()
                .position(|c| c == current)
                .map(|i| (i + 1) % categories.len())
                .unwrap_or(0),
            None => 0,
        };
        let category = categories[next].clone();
        self.example_index = 0;
        self.set_status_message(format!("Category: {}", category));
        self.composer.set_category(Some(category));
    }

    /// Open the selected module for editing according to its type
    pub fn edit_selected(&mut self) {
        let Some(index) = self.selected else {
            return;
        };
        let Some(module) = self.composer.active_track().get(index) else {
            return;
        };
        match module.module_type() {
            ModuleType::Text | ModuleType::Symbol => {
                self.composer.begin_edit(index, None);
            }
            ModuleType::Time | ModuleType::Date => {
                let buffer = module.data.token();
                self.entry = Some(Entry {
                    index,
                    module_type: module.module_type(),
                    buffer,
                });
            }
            ModuleType::Ending => self.cycle_ending(true),
        }
    }

    /// Parse the entry buffer into the module it was opened for
    pub fn commit_entry(&mut self) {
        let Some(entry) = self.entry.take() else {
            return;
        };
        let parts: Vec<&str> = entry
            .buffer
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let (data, accepted) = match entry.module_type {
            ModuleType::Time => {
                let mut set = TimeSet::default();
                let accepted = parts.iter().filter(|p| set.insert(p)).count();
                (ModuleData::Time(set), accepted)
            }
            ModuleType::Date => {
                let mut set = DateSet::default();
                let accepted = parts
                    .iter()
                    .filter(|p| set.insert(p, &self.presets.date_tokens))
                    .count();
                (ModuleData::Date(set), accepted)
            }
            _ => return,
        };

        let side = self.composer.active_side();
        if !self.composer.update_module(side, entry.index, data) {
            warn!("entry target {} vanished", entry.index);
            return;
        }
        let ignored = parts.len() - accepted;
        if ignored > 0 {
            self.set_error_message(format!("Ignored {} invalid or duplicate value(s)", ignored));
        }
    }

    pub fn cancel_entry(&mut self) {
        self.entry = None;
    }

    pub fn cycle_ending(&mut self, forward: bool) {
        let Some(index) = self.selected else {
            return;
        };
        let side = self.composer.active_side();
        self.composer.update_with(side, index, |data| {
            if let ModuleData::Ending(ending) = data {
                ending.cycle(forward);
            }
        });
    }

    pub fn remove_selected(&mut self) {
        if let Some(index) = self.selected {
            let side = self.composer.active_side();
            self.remove_at(side, index);
        }
    }

    /// Remove a module; used by the chip's close control and the keyboard
    pub fn remove_at(&mut self, side: TrackSide, index: usize) {
        if let Some(module) = self.composer.remove_module(side, index) {
            debug!("removed {:?} from {:?}", module.id, side);
            if self.entry.as_ref().is_some_and(|e| e.index == index) {
                self.entry = None;
            }
            self.clamp_selection();
        }
    }

    /// Keyboard reorder of the selected module by one slot
    pub fn move_selected(&mut self, delta: isize) {
        if !self.drag.is_idle() {
            return;
        }
        let Some(from) = self.selected else {
            return;
        };
        let drop_index = if delta > 0 {
            from + 2
        } else if from == 0 {
            return;
        } else {
            from - 1
        };
        let side = self.composer.active_side();
        if let Some(to) = self.composer.track_mut(side).move_module(from, drop_index) {
            self.selected = Some(to);
        }
    }

    /// Apply the terminal transition of a pointer gesture
    pub fn apply_drag_outcome(&mut self, outcome: DragOutcome) {
        match outcome {
            DragOutcome::Committed { from, to } => {
                debug!("module moved {} -> {}", from, to);
                self.entry = None;
                self.selected = Some(to);
            }
            DragOutcome::Cancelled(CancelReason::SelfDrop) => {}
            DragOutcome::Cancelled(reason) => {
                debug!("drag cancelled: {:?}", reason);
                self.clamp_selection();
            }
            DragOutcome::Click { side, index } => {
                self.activate_track(side);
                if self.selected == Some(index) {
                    self.edit_selected();
                } else {
                    self.selected = Some(index);
                }
            }
        }
    }

    /// Resolve the drop target for this frame (at most once per frame)
    pub fn on_frame(&mut self, area: Rect) {
        let Some((side, _)) = self.drag.source() else {
            return;
        };
        if !self.drag.is_dragging() {
            return;
        }
        let track_layout = layout::compute(self, area).track(side).to_track_layout();
        self.drag.on_frame(&track_layout);
    }

    pub fn end_edit(&mut self) {
        self.composer.end_edit();
        self.macro_prompt = None;
    }

    /// Enter in edit mode: split at the caret and open the insertion cursor
    pub fn split_at_caret(&mut self) {
        if let Some(cursor) = self.composer.split_at_caret() {
            self.selected = None;
            self.macro_prompt = None;
            self.set_status_message(format!("Insert position {}", cursor));
        }
    }

    /// Recompute macro candidates for the caret; selection resets when they change
    pub fn refresh_macro_prompt(&mut self) {
        let prompt = self
            .composer
            .macro_prompt(&self.library, self.config.macros.trigger);
        if prompt != self.macro_prompt {
            self.macro_selected = 0;
        }
        self.macro_prompt = prompt;
    }

    pub fn cycle_macro(&mut self, forward: bool) {
        let Some(prompt) = &self.macro_prompt else {
            return;
        };
        let len = prompt.candidates.len();
        self.macro_selected = if forward {
            (self.macro_selected + 1) % len
        } else {
            (self.macro_selected + len - 1) % len
        };
    }

    /// Expand an exactly typed trigger in front of the caret
    pub fn expand_exact_macro(&mut self) -> bool {
        let expanded = self
            .composer
            .expand_exact_macro(&self.library, self.config.macros.trigger);
        if expanded {
            self.macro_prompt = None;
        }
        expanded
    }

    /// Substitute the highlighted macro; returns false with no prompt open
    pub fn apply_macro_choice(&mut self) -> bool {
        let Some(prompt) = self.macro_prompt.take() else {
            return false;
        };
        let Some(entry) = prompt.candidates.get(self.macro_selected) else {
            return false;
        };
        self.composer.apply_macro(&prompt.trigger, &entry.replacement)
    }

    /// Copy the active track's text to the system clipboard
    #[cfg(feature = "clipboard")]
    pub fn copy_active(&mut self) {
        let text = self.composer.active_track().serialize();
        match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text)) {
            Ok(()) => self.set_status_message("Copied to clipboard"),
            Err(e) => {
                warn!("clipboard error: {}", e);
                self.set_error_message(format!("Clipboard error: {}", e));
            }
        }
    }
}

fn side_slot(side: TrackSide) -> usize {
    match side {
        TrackSide::Question => 0,
        TrackSide::Answer => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(Config::default(), Presets::default(), None)
    }

    fn labels(app: &App, side: TrackSide) -> Vec<String> {
        app.composer
            .track(side)
            .modules()
            .iter()
            .map(|m| m.label())
            .collect()
    }

    #[test]
    fn test_new_app_defaults() {
        let app = app();
        assert_eq!(app.mode(), Mode::Normal);
        assert_eq!(app.composer.active_side(), TrackSide::Question);
        // First configured category is preselected
        assert_eq!(app.composer.category(), Some("영업시간"));
        assert!(!app.keywords().is_empty());
        assert!(!app.toolbar.is_empty());
    }

    #[test]
    fn test_add_text_enters_edit_mode() {
        let mut app = app();
        app.add_module_type(ModuleType::Text);
        assert_eq!(app.mode(), Mode::Edit);
        assert_eq!(app.selected, Some(0));
    }

    #[test]
    fn test_time_entry_normalizes_values() {
        let mut app = app();
        app.add_module_type(ModuleType::Time);
        assert_eq!(app.mode(), Mode::Entry);
        if let Some(entry) = app.entry.as_mut() {
            entry.buffer = "9, 1830, nope".to_string();
        }
        app.commit_entry();

        assert_eq!(app.mode(), Mode::Normal);
        assert_eq!(labels(&app, TrackSide::Question), ["09:00, 18:30"]);
        assert!(matches!(app.status_message, Some((_, MessageKind::Error))));
    }

    #[test]
    fn test_ending_uses_default_options_and_cycles() {
        let mut app = app();
        app.add_module_type(ModuleType::Ending);
        assert_eq!(app.mode(), Mode::Normal);
        assert_eq!(labels(&app, TrackSide::Question), ["입니다"]);
        app.cycle_ending(true);
        assert_eq!(labels(&app, TrackSide::Question), ["이에요"]);
        app.cycle_ending(false);
        app.cycle_ending(false);
        assert_eq!(labels(&app, TrackSide::Question), ["예요"]);
    }

    #[test]
    fn test_move_selected_with_keyboard() {
        let mut app = app();
        for k in ["a", "b", "c"] {
            app.add_keyword(k);
        }
        app.selected = Some(0);
        app.move_selected(1);
        assert_eq!(labels(&app, TrackSide::Question), ["b", "a", "c"]);
        assert_eq!(app.selected, Some(1));

        app.move_selected(-1);
        assert_eq!(labels(&app, TrackSide::Question), ["a", "b", "c"]);
        assert_eq!(app.selected, Some(0));

        // Already first: nothing happens
        app.move_selected(-1);
        assert_eq!(labels(&app, TrackSide::Question), ["a", "b", "c"]);
    }

    #[test]
    fn test_remove_clamps_selection() {
        let mut app = app();
        app.add_keyword("a");
        app.add_keyword("b");
        app.selected = Some(1);
        app.remove_selected();
        assert_eq!(app.selected, Some(0));
        app.remove_selected();
        assert_eq!(app.selected, None);
    }

    #[test]
    fn test_click_selects_then_edits() {
        let mut app = app();
        app.add_keyword("hello");
        app.selected = None;

        app.apply_drag_outcome(DragOutcome::Click {
            side: TrackSide::Question,
            index: 0,
        });
        assert_eq!(app.selected, Some(0));
        assert_eq!(app.mode(), Mode::Normal);

        app.apply_drag_outcome(DragOutcome::Click {
            side: TrackSide::Question,
            index: 0,
        });
        assert_eq!(app.mode(), Mode::Edit);
    }

    #[test]
    fn test_macro_prompt_and_apply() {
        let mut app = app();
        app.add_module_type(ModuleType::Text);
        for ch in "위치 /주".chars() {
            app.composer.edit_insert(ch);
        }
        app.refresh_macro_prompt();
        assert!(app.macro_prompt.is_some());

        assert!(app.apply_macro_choice());
        let text = app.composer.edit_text().unwrap_or_default().to_string();
        assert!(text.starts_with("위치 "));
        assert!(!text.contains("/주"));
    }

    #[test]
    fn test_scroll_clamps_to_rows() {
        let mut app = app();
        assert!(app.scroll_track(TrackSide::Question, 1, 3));
        assert_eq!(app.scroll(TrackSide::Question), 1);
        assert!(app.scroll_track(TrackSide::Question, 10, 3));
        assert_eq!(app.scroll(TrackSide::Question), 2);
        assert!(app.scroll_track(TrackSide::Question, -5, 3));
        assert_eq!(app.scroll(TrackSide::Question), 0);
    }

    #[test]
    fn test_cycle_category_wraps() {
        let mut app = app();
        let count = app.presets.categories.len();
        let start = app.composer.category().map(str::to_string);
        for _ in 0..count {
            app.cycle_category();
        }
        assert_eq!(app.composer.category().map(str::to_string), start);
    }

    #[test]
    fn test_load_example_fills_both_tracks() {
        let mut app = app();
        app.load_example();
        assert_eq!(app.composer.track(TrackSide::Question).len(), 1);
        assert_eq!(app.composer.track(TrackSide::Answer).len(), 1);
    }

    #[test]
    fn test_complete_sets_result_and_quits() {
        let mut app = app();
        app.add_keyword("안녕");
        app.complete();
        assert!(app.should_quit);
        assert_eq!(app.result.as_ref().map(|r| r.question.as_str()), Some("안녕"));
    }
}
