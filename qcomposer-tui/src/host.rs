//! Gesture host for a terminal.
//!
//! Crossterm delivers every mouse event to the application once mouse
//! capture is on, so there is no per-element pointer capture to acquire.
//! The host instead records whether drag listeners are live (motion events
//! are routed to the drag controller) and whether wheel scrolling of the
//! tracks is suppressed.

use log::debug;
use qcomposer_core::drag::PointerId;
use qcomposer_core::GestureHost;

#[derive(Debug, Default)]
pub struct TerminalHost {
    listening: bool,
    scroll_locked: bool,
}

impl TerminalHost {
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }
}

impl GestureHost for TerminalHost {
    fn install_listeners(&mut self) {
        debug!("drag listeners installed");
        self.listening = true;
    }

    fn remove_listeners(&mut self) {
        debug!("drag listeners removed");
        self.listening = false;
    }

    fn lock_scroll(&mut self) {
        self.scroll_locked = true;
    }

    fn unlock_scroll(&mut self) {
        self.scroll_locked = false;
    }

    fn capture_pointer(&mut self, _pointer_id: PointerId) -> bool {
        false
    }
}
