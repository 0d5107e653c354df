//! In-text macro triggers
//!
//! Typing the trigger character followed by a query inside a text module
//! offers library entries; picking one replaces `<trigger><query>` with the
//! entry's replacement text.

use serde::{Deserialize, Serialize};

use crate::split::byte_offset;

/// One library entry: trigger token and the text it expands to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroEntry {
    pub trigger: String,
    pub replacement: String,
}

impl MacroEntry {
    pub fn new(trigger: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            replacement: replacement.into(),
        }
    }
}

/// Host-managed macro lookup
pub trait MacroLibrary {
    /// Replacement for an exact trigger
    fn lookup(&self, trigger: &str) -> Option<&str>;
    /// Entries whose trigger starts with `prefix`, in library order
    fn candidates(&self, prefix: &str) -> Vec<&MacroEntry>;
}

/// Library backed by a fixed list of entries
#[derive(Debug, Clone, Default)]
pub struct StaticLibrary {
    entries: Vec<MacroEntry>,
}

impl StaticLibrary {
    pub fn new(entries: Vec<MacroEntry>) -> Self {
        Self { entries }
    }
}

impl MacroLibrary for StaticLibrary {
    fn lookup(&self, trigger: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.trigger == trigger)
            .map(|e| e.replacement.as_str())
    }

    fn candidates(&self, prefix: &str) -> Vec<&MacroEntry> {
        self.entries
            .iter()
            .filter(|e| e.trigger.starts_with(prefix))
            .collect()
    }
}

/// A trigger found before the caret; offsets are in characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    /// Offset of the trigger character
    pub start: usize,
    /// Caret offset (end of the query)
    pub end: usize,
    pub query: String,
}

/// Find `<trigger_char><query>` ending at the caret.
///
/// The trigger character must start the text or follow whitespace, and the
/// query may not contain whitespace.
pub fn detect_trigger(text: &str, caret: usize, trigger_char: char) -> Option<Trigger> {
    let chars: Vec<char> = text.chars().collect();
    if caret > chars.len() {
        return None;
    }

    let mut i = caret;
    while i > 0 {
        let ch = chars[i - 1];
        if ch.is_whitespace() {
            return None;
        }
        if ch == trigger_char {
            let start = i - 1;
            if start > 0 && !chars[start - 1].is_whitespace() {
                return None;
            }
            return Some(Trigger {
                start,
                end: caret,
                query: chars[i..caret].iter().collect(),
            });
        }
        i -= 1;
    }
    None
}

/// Replace the trigger span with `replacement`; returns the new text and caret
pub fn apply_replacement(text: &str, trigger: &Trigger, replacement: &str) -> (String, usize) {
    let start = byte_offset(text, trigger.start);
    let end = byte_offset(text, trigger.end);
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..start]);
    out.push_str(replacement);
    out.push_str(&text[end..]);
    (out, trigger.start + replacement.chars().count())
}
