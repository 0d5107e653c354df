//! Composer session: question/answer tracks plus editing state

use log::debug;
use serde::{Deserialize, Serialize};

use crate::macros::{apply_replacement, detect_trigger, MacroEntry, MacroLibrary, Trigger};
use crate::module::{Module, ModuleData};
use crate::presets::{ExamplePair, Preset};
use crate::split::{byte_offset, InsertionCursor};
use crate::track::{Track, TrackSide};

/// Payload handed to the host when composing is done
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeResult {
    pub question: String,
    pub answer: String,
    pub question_modules: Vec<Module>,
    pub answer_modules: Vec<Module>,
    pub category: Option<String>,
}

/// Caret inside a text-bearing module of the active track (character offset)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    pub index: usize,
    pub caret: usize,
}

/// Macro candidates offered for the trigger in front of the caret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroPrompt {
    pub trigger: Trigger,
    pub candidates: Vec<MacroEntry>,
}

pub struct Composer {
    question: Track,
    answer: Track,
    active: TrackSide,
    category: Option<String>,
    cursor: InsertionCursor,
    edit: Option<TextEdit>,
}

impl Composer {
    pub fn new(category: Option<String>) -> Self {
        Self {
            question: Track::new(TrackSide::Question),
            answer: Track::new(TrackSide::Answer),
            active: TrackSide::Question,
            category,
            cursor: InsertionCursor::default(),
            edit: None,
        }
    }

    pub fn track(&self, side: TrackSide) -> &Track {
        match side {
            TrackSide::Question => &self.question,
            TrackSide::Answer => &self.answer,
        }
    }

    /// Direct track access for the drag controller; drops pending editing state
    pub fn track_mut(&mut self, side: TrackSide) -> &mut Track {
        self.cursor.clear();
        self.edit = None;
        match side {
            TrackSide::Question => &mut self.question,
            TrackSide::Answer => &mut self.answer,
        }
    }

    fn side_mut(&mut self, side: TrackSide) -> &mut Track {
        match side {
            TrackSide::Question => &mut self.question,
            TrackSide::Answer => &mut self.answer,
        }
    }

    pub fn active_side(&self) -> TrackSide {
        self.active
    }

    pub fn active_track(&self) -> &Track {
        self.track(self.active)
    }

    /// Switch the active track; the insertion cursor and edit belong to the old one
    pub fn set_active(&mut self, side: TrackSide) {
        if self.active != side {
            self.active = side;
            self.cursor.clear();
            self.edit = None;
        }
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category;
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor.get()
    }

    /// Place the insertion cursor in the active track
    pub fn open_cursor(&mut self, index: usize) {
        self.cursor.open(index);
        self.cursor.clamp(self.active_track().len());
    }

    pub fn clear_cursor(&mut self) {
        self.cursor.clear();
    }

    pub fn edit(&self) -> Option<TextEdit> {
        self.edit
    }

    /// Add a module to `side`.
    ///
    /// Without an explicit index the active track's pending cursor is used,
    /// then the module is appended. Returns the index it landed at.
    pub fn add_module(&mut self, side: TrackSide, data: ModuleData, at: Option<usize>) -> usize {
        let at = if side == self.active {
            at.or(self.cursor.get())
        } else {
            at
        };
        let index = self.side_mut(side).add_module(data, at);
        if side == self.active {
            self.cursor.inserted_at(index);
            if let Some(edit) = self.edit.as_mut() {
                if index <= edit.index {
                    edit.index += 1;
                }
            }
        }
        debug!("added module to {:?} at {}", side, index);
        index
    }

    pub fn update_module(&mut self, side: TrackSide, index: usize, data: ModuleData) -> bool {
        self.side_mut(side).update_module(index, data)
    }

    /// In-place payload mutation (ending cycling, toggles)
    pub fn update_with<F>(&mut self, side: TrackSide, index: usize, f: F) -> bool
    where
        F: FnOnce(&mut ModuleData),
    {
        self.side_mut(side).update_with(index, f)
    }

    pub fn remove_module(&mut self, side: TrackSide, index: usize) -> Option<Module> {
        let removed = self.side_mut(side).remove_module(index)?;
        if side == self.active {
            self.cursor.removed_at(index);
            if let Some(edit) = self.edit {
                if edit.index == index {
                    self.edit = None;
                } else if edit.index > index {
                    self.edit = Some(TextEdit {
                        index: edit.index - 1,
                        ..edit
                    });
                }
            }
        }
        Some(removed)
    }

    /// Toolbar preset click
    pub fn add_preset(&mut self, preset: &Preset) -> usize {
        self.add_module(self.active, preset.data.clone(), None)
    }

    /// Keyword chip click: the keyword becomes a text module
    pub fn add_keyword(&mut self, keyword: &str) -> usize {
        self.add_module(self.active, ModuleData::text(keyword), None)
    }

    /// Replace both tracks with an example pair, one text module each
    pub fn load_example(&mut self, pair: &ExamplePair) {
        self.cursor.clear();
        self.edit = None;
        self.question.replace_all([ModuleData::text(&pair.question)]);
        self.answer.replace_all([ModuleData::text(&pair.answer)]);
        if self.category.is_none() {
            self.category = Some(pair.category.clone());
        }
    }

    /// Start editing a text-bearing module of the active track
    pub fn begin_edit(&mut self, index: usize, caret: Option<usize>) -> bool {
        let Some(text) = self.active_track().get(index).and_then(|m| m.data.as_text()) else {
            return false;
        };
        let len = text.chars().count();
        self.edit = Some(TextEdit {
            index,
            caret: caret.unwrap_or(len).min(len),
        });
        self.cursor.clear();
        true
    }

    pub fn end_edit(&mut self) {
        self.edit = None;
    }

    /// Text of the module under edit
    pub fn edit_text(&self) -> Option<&str> {
        let edit = self.edit?;
        self.active_track().get(edit.index)?.data.as_text()
    }

    fn edit_with<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut String, usize) -> usize,
    {
        let Some(edit) = self.edit else {
            return false;
        };
        let mut caret = edit.caret;
        let side = self.active;
        let changed = self.side_mut(side).update_with(edit.index, |data| {
            if let Some(text) = data.as_text_mut() {
                caret = f(text, edit.caret);
            }
        });
        if changed {
            self.edit = Some(TextEdit {
                index: edit.index,
                caret,
            });
        }
        changed
    }

    pub fn edit_insert(&mut self, ch: char) -> bool {
        self.edit_with(|text, caret| {
            text.insert(byte_offset(text, caret), ch);
            caret + 1
        })
    }

    pub fn edit_backspace(&mut self) -> bool {
        self.edit_with(|text, caret| {
            if caret == 0 {
                return 0;
            }
            text.remove(byte_offset(text, caret - 1));
            caret - 1
        })
    }

    /// Move the caret by `delta` characters, clamped to the text
    pub fn edit_move_caret(&mut self, delta: isize) {
        let Some(len) = self.edit_text().map(|t| t.chars().count()) else {
            return;
        };
        if let Some(edit) = self.edit.as_mut() {
            edit.caret = edit.caret.saturating_add_signed(delta).min(len);
        }
    }

    /// Split the edited module at its caret and open the insertion cursor there.
    ///
    /// At either end of the text nothing is split; the cursor opens before or
    /// after the module instead. Returns the cursor position.
    pub fn split_at_caret(&mut self) -> Option<usize> {
        let edit = self.edit?;
        let len = self.edit_text()?.chars().count();
        let side = self.active;

        let cursor = if edit.caret == 0 {
            Some(edit.index)
        } else if edit.caret >= len {
            Some(edit.index + 1)
        } else {
            self.side_mut(side).split_module(edit.index, edit.caret)
        }?;

        self.edit = None;
        self.cursor.open(cursor);
        debug!("insertion cursor opened at {}", cursor);
        Some(cursor)
    }

    /// Macro candidates for a trigger in front of the edit caret
    pub fn macro_prompt<L: MacroLibrary>(&self, library: &L, trigger_char: char) -> Option<MacroPrompt> {
        let edit = self.edit?;
        let trigger = detect_trigger(self.edit_text()?, edit.caret, trigger_char)?;
        let candidates: Vec<MacroEntry> = library
            .candidates(&trigger.query)
            .into_iter()
            .cloned()
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(MacroPrompt {
            trigger,
            candidates,
        })
    }

    /// Expand the trigger in front of the caret when its query names a macro
    /// exactly. Returns false and leaves the text alone otherwise.
    pub fn expand_exact_macro<L: MacroLibrary>(&mut self, library: &L, trigger_char: char) -> bool {
        let Some(edit) = self.edit else {
            return false;
        };
        let Some(trigger) = self
            .edit_text()
            .and_then(|text| detect_trigger(text, edit.caret, trigger_char))
        else {
            return false;
        };
        let Some(replacement) = library.lookup(&trigger.query).map(str::to_string) else {
            return false;
        };
        self.apply_macro(&trigger, &replacement)
    }

    /// Substitute a chosen macro for the trigger in the edited module
    pub fn apply_macro(&mut self, trigger: &Trigger, replacement: &str) -> bool {
        self.edit_with(|text, caret| {
            if trigger.end != caret {
                return caret;
            }
            let (replaced, new_caret) = apply_replacement(text, trigger, replacement);
            *text = replaced;
            new_caret
        })
    }

    /// Completion payload for the host
    pub fn complete(&self) -> ComposeResult {
        ComposeResult {
            question: self.question.serialize(),
            answer: self.answer.serialize(),
            question_modules: self.question.modules().to_vec(),
            answer_modules: self.answer.modules().to_vec(),
            category: self.category.clone(),
        }
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(None)
    }
}
