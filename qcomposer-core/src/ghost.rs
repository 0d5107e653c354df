//! Floating proxy of the dragged module

use crate::geometry::{Bounds, Point};
use crate::module::{Module, ModuleId, ModuleType};

/// Snapshot of the dragged chip taken when the gesture starts.
///
/// Positioning only: the ghost never feeds back into drop resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Ghost {
    pub module_id: ModuleId,
    pub module_type: ModuleType,
    pub label: String,
    /// Pointer position relative to the chip's top-left corner at grab time
    pub grab_offset: Point,
    pub width: f32,
    pub height: f32,
}

impl Ghost {
    pub fn capture(module: &Module, chip: Bounds, grab: Point) -> Self {
        Self {
            module_id: module.id,
            module_type: module.module_type(),
            label: module.label(),
            grab_offset: grab.offset_from(chip.origin()),
            width: chip.width,
            height: chip.height,
        }
    }

    /// Box of the ghost for the current pointer position, keeping the grab offset
    pub fn bounds_at(&self, pointer: Point) -> Bounds {
        Bounds::new(
            pointer.x - self.grab_offset.x,
            pointer.y - self.grab_offset.y,
            self.width,
            self.height,
        )
    }
}
