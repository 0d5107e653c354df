//! Ordered module tracks (question / answer)

use serde::{Deserialize, Serialize};

use crate::module::{self, Module, ModuleData, ModuleId};
use crate::split::split_text;

/// Which side of the composed content a track holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackSide {
    Question,
    Answer,
}

impl TrackSide {
    pub fn other(self) -> Self {
        match self {
            TrackSide::Question => TrackSide::Answer,
            TrackSide::Answer => TrackSide::Question,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrackSide::Question => "질문",
            TrackSide::Answer => "답변",
        }
    }
}

/// An ordered sequence of modules with its own id allocator.
///
/// `revision` increments on every mutation; an unchanged revision means the
/// track was not touched.
#[derive(Debug, Clone)]
pub struct Track {
    side: TrackSide,
    modules: Vec<Module>,
    next_id: u64,
    revision: u64,
}

impl Track {
    pub fn new(side: TrackSide) -> Self {
        Self {
            side,
            modules: Vec::new(),
            next_id: 1,
            revision: 0,
        }
    }

    /// Create a track holding the given payloads in order
    pub fn from_data<I>(side: TrackSide, data: I) -> Self
    where
        I: IntoIterator<Item = ModuleData>,
    {
        let mut track = Self::new(side);
        for d in data {
            track.add_module(d, None);
        }
        track
    }

    pub fn side(&self) -> TrackSide {
        self.side
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn get(&self, index: usize) -> Option<&Module> {
        self.modules.get(index)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Ordered ids, used as the shape snapshot of a drag gesture
    pub fn ids(&self) -> Vec<ModuleId> {
        self.modules.iter().map(|m| m.id).collect()
    }

    fn alloc_id(&mut self) -> ModuleId {
        let id = ModuleId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert at `at` (clamped to the length) or append; returns the index used
    pub fn add_module(&mut self, data: ModuleData, at: Option<usize>) -> usize {
        let id = self.alloc_id();
        let index = at.map_or(self.modules.len(), |i| i.min(self.modules.len()));
        self.modules.insert(index, Module { id, data });
        self.revision += 1;
        index
    }

    /// Replace the payload, keeping id and type; a payload of another type is rejected
    pub fn update_module(&mut self, index: usize, data: ModuleData) -> bool {
        match self.modules.get_mut(index) {
            Some(m) if m.module_type() == data.module_type() => {
                m.data = data;
                self.revision += 1;
                true
            }
            _ => false,
        }
    }

    /// Mutate the payload in place; the change is discarded if it altered the type
    pub fn update_with<F>(&mut self, index: usize, f: F) -> bool
    where
        F: FnOnce(&mut ModuleData),
    {
        let Some(current) = self.modules.get(index) else {
            return false;
        };
        let mut data = current.data.clone();
        f(&mut data);
        if data == current.data {
            return true;
        }
        self.update_module(index, data)
    }

    pub fn remove_module(&mut self, index: usize) -> Option<Module> {
        if index >= self.modules.len() {
            return None;
        }
        self.revision += 1;
        Some(self.modules.remove(index))
    }

    /// Drop every module and refill from `data`
    pub fn replace_all<I>(&mut self, data: I)
    where
        I: IntoIterator<Item = ModuleData>,
    {
        self.modules.clear();
        self.revision += 1;
        for d in data {
            self.add_module(d, None);
        }
    }

    /// Move the module at `from` to the gap at `drop_index` (remove then insert).
    ///
    /// A drop index past the source is decremented to account for the removal.
    /// Returns the final index, or `None` when the move would be an identity
    /// (dropping onto either gap next to the source) or is out of range.
    pub fn move_module(&mut self, from: usize, drop_index: usize) -> Option<usize> {
        let len = self.modules.len();
        if from >= len || drop_index > len {
            return None;
        }
        if drop_index == from || drop_index == from + 1 {
            return None;
        }

        let target = if drop_index > from {
            drop_index - 1
        } else {
            drop_index
        };
        let module = self.modules.remove(from);
        self.modules.insert(target, module);
        self.revision += 1;
        Some(target)
    }

    /// Replace a text-bearing module with two fresh modules split at `caret` (chars).
    ///
    /// Offsets `0..=char_count` are valid, so an edge split yields one empty
    /// half. Returns `index + 1` as the new insertion cursor; non-text targets
    /// or out-of-range offsets leave the track untouched.
    pub fn split_module(&mut self, index: usize, caret: usize) -> Option<usize> {
        let module = self.modules.get(index)?;
        let text = module.data.as_text()?;
        let (left, right) = split_text(text, caret)?;

        let (left, right) = match &module.data {
            ModuleData::Symbol(_) => (ModuleData::Symbol(left), ModuleData::Symbol(right)),
            _ => (ModuleData::Text(left), ModuleData::Text(right)),
        };

        let left_id = self.alloc_id();
        let right_id = self.alloc_id();
        self.modules.splice(
            index..=index,
            [
                Module {
                    id: left_id,
                    data: left,
                },
                Module {
                    id: right_id,
                    data: right,
                },
            ],
        );
        self.revision += 1;
        Some(index + 1)
    }

    /// Plain-text form of the track
    pub fn serialize(&self) -> String {
        module::serialize(&self.modules)
    }
}
