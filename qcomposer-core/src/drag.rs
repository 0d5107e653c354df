//! Pointer-driven reorder state machine
//!
//! `Idle -> Armed -> Dragging -> (commit | cancel) -> Idle`
//!
//! - Pointer-down on a chip arms the controller; nested controls never do.
//! - Fine pointers start dragging once movement exceeds the threshold.
//! - Coarse pointers must hold still for the activation dwell; moving past the
//!   threshold first is a scroll and drops the gesture with no side effects.
//! - While dragging, the host's listeners and scroll lock are held by a
//!   `DragSession` and released on every exit path.

use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::drop_target::TrackLayout;
use crate::geometry::{Bounds, Point};
use crate::ghost::Ghost;
use crate::module::ModuleId;
use crate::track::{Track, TrackSide};

pub type PointerId = u64;

/// Pointer precision class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    /// Mouse or pen: no scroll ambiguity
    #[default]
    Fine,
    /// Touch: needs a dwell to tell a drag from a scroll
    Coarse,
}

/// What the pointer went down on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// The chip body
    Chip,
    /// A button/input nested in the chip; keeps normal click behaviour
    Control,
}

/// Pointer-down over a module chip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerDown {
    pub pointer_id: PointerId,
    pub kind: PointerKind,
    pub pos: Point,
    pub side: TrackSide,
    pub index: usize,
    pub target: PointerTarget,
    pub chip: Bounds,
}

/// Gesture tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSettings {
    pub activation_dwell: Duration,
    pub move_threshold: f32,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            activation_dwell: Duration::from_millis(150),
            move_threshold: 8.0,
        }
    }
}

/// Environment hooks acquired for the lifetime of one drag
pub trait GestureHost {
    /// Start receiving pointer move/up events globally
    fn install_listeners(&mut self);
    fn remove_listeners(&mut self);
    /// Suppress native scrolling of the track container
    fn lock_scroll(&mut self);
    fn unlock_scroll(&mut self);
    /// Route the pointer to the drag; `false` when unsupported
    fn capture_pointer(&mut self, _pointer_id: PointerId) -> bool {
        false
    }
    fn release_pointer(&mut self, _pointer_id: PointerId) {}
}

/// Coarse view of the controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Armed,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Released with the pointer outside the track region
    OutsideRegion,
    /// The track changed underneath the gesture
    StaleShape,
    /// Dropped back onto its own position
    SelfDrop,
    /// Released against a different track than it started on
    WrongTrack,
    /// Aborted by the host
    Aborted,
}

/// Result of a terminal transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Committed { from: usize, to: usize },
    Cancelled(CancelReason),
    /// Released before the drag activated: an ordinary click on the chip
    Click { side: TrackSide, index: usize },
}

#[derive(Debug)]
struct Armed {
    down: PointerDown,
    at: Instant,
    last: Point,
    shape: Vec<ModuleId>,
    ghost: Ghost,
}

/// Live state of an active drag. Holding one means the host's listeners and
/// scroll lock are acquired.
#[derive(Debug)]
struct DragSession {
    pointer_id: PointerId,
    side: TrackSide,
    source: usize,
    shape: Vec<ModuleId>,
    ghost: Ghost,
    pointer: Point,
    drop_index: Option<usize>,
    frame_pending: bool,
    captured: bool,
}

impl DragSession {
    fn acquire<H: GestureHost>(host: &mut H, armed: Armed) -> Self {
        host.install_listeners();
        host.lock_scroll();
        let captured = host.capture_pointer(armed.down.pointer_id);
        if !captured {
            debug!("pointer capture unavailable, tracking through listeners");
        }
        Self {
            pointer_id: armed.down.pointer_id,
            side: armed.down.side,
            source: armed.down.index,
            shape: armed.shape,
            ghost: armed.ghost,
            pointer: armed.last,
            drop_index: None,
            frame_pending: true,
            captured,
        }
    }

    fn release<H: GestureHost>(&self, host: &mut H) {
        if self.captured {
            host.release_pointer(self.pointer_id);
        }
        host.unlock_scroll();
        host.remove_listeners();
    }
}

/// Releases the session when dropped, so cleanup also runs on unwind
struct SessionGuard<'a, H: GestureHost> {
    host: &'a mut H,
    session: DragSession,
}

impl<H: GestureHost> Drop for SessionGuard<'_, H> {
    fn drop(&mut self) {
        self.session.release(&mut *self.host);
    }
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Armed(Armed),
    Dragging(DragSession),
}

/// Single global drag controller; at most one gesture is live at a time
pub struct DragController<H: GestureHost> {
    host: H,
    settings: DragSettings,
    state: State,
}

impl<H: GestureHost> DragController<H> {
    pub fn new(host: H, settings: DragSettings) -> Self {
        Self {
            host,
            settings,
            state: State::Idle,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn settings(&self) -> &DragSettings {
        &self.settings
    }

    pub fn phase(&self) -> DragPhase {
        match self.state {
            State::Idle => DragPhase::Idle,
            State::Armed(_) => DragPhase::Armed,
            State::Dragging(_) => DragPhase::Dragging,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, State::Dragging(_))
    }

    /// Track and source index of the gesture in progress
    pub fn source(&self) -> Option<(TrackSide, usize)> {
        match &self.state {
            State::Idle => None,
            State::Armed(armed) => Some((armed.down.side, armed.down.index)),
            State::Dragging(session) => Some((session.side, session.source)),
        }
    }

    /// Module being dragged, once the drag is active
    pub fn dragged_module(&self) -> Option<(TrackSide, ModuleId)> {
        match &self.state {
            State::Dragging(session) => Some((session.side, session.ghost.module_id)),
            _ => None,
        }
    }

    /// Drop index from the last resolved frame
    pub fn drop_index(&self) -> Option<usize> {
        match &self.state {
            State::Dragging(session) => session.drop_index,
            _ => None,
        }
    }

    pub fn ghost(&self) -> Option<&Ghost> {
        match &self.state {
            State::Dragging(session) => Some(&session.ghost),
            _ => None,
        }
    }

    /// Ghost box at the latest pointer position
    pub fn ghost_bounds(&self) -> Option<Bounds> {
        match &self.state {
            State::Dragging(session) => Some(session.ghost.bounds_at(session.pointer)),
            _ => None,
        }
    }

    /// Pointer went down over a chip of `track`.
    ///
    /// Ignored while another gesture is live, on nested controls, and when
    /// the index does not name a module of the track.
    pub fn pointer_down(&mut self, down: PointerDown, track: &Track, now: Instant) -> bool {
        if !self.is_idle() {
            debug!("pointer {} down ignored, gesture already live", down.pointer_id);
            return false;
        }
        if down.target == PointerTarget::Control || track.side() != down.side {
            return false;
        }
        let Some(module) = track.get(down.index) else {
            return false;
        };

        debug!(
            "armed {:?}[{}] with {:?} pointer",
            down.side, down.index, down.kind
        );
        self.state = State::Armed(Armed {
            down,
            at: now,
            last: down.pos,
            shape: track.ids(),
            ghost: Ghost::capture(module, down.chip, down.pos),
        });
        true
    }

    /// Pointer moved; returns true when the visible state changed
    pub fn pointer_move(&mut self, pointer_id: PointerId, pos: Point, now: Instant) -> bool {
        match &mut self.state {
            State::Idle => false,
            State::Armed(armed) => {
                if armed.down.pointer_id != pointer_id {
                    return false;
                }
                armed.last = pos;
                let moved = pos.distance(armed.down.pos) > self.settings.move_threshold;
                let dwelled = now.duration_since(armed.at) >= self.settings.activation_dwell;
                let kind = armed.down.kind;
                match kind {
                    PointerKind::Fine => {
                        if moved {
                            self.activate();
                        }
                        moved
                    }
                    PointerKind::Coarse => {
                        if dwelled {
                            self.activate();
                            true
                        } else if moved {
                            debug!("coarse pointer moved before dwell, treating as scroll");
                            self.state = State::Idle;
                            true
                        } else {
                            false
                        }
                    }
                }
            }
            State::Dragging(session) => {
                if session.pointer_id != pointer_id {
                    return false;
                }
                session.pointer = pos;
                session.frame_pending = true;
                true
            }
        }
    }

    /// Fire the coarse-pointer dwell timer; returns true when the drag activated
    pub fn tick(&mut self, now: Instant) -> bool {
        let due = match &self.state {
            State::Armed(armed) => {
                armed.down.kind == PointerKind::Coarse
                    && now.duration_since(armed.at) >= self.settings.activation_dwell
            }
            _ => false,
        };
        if due {
            self.activate();
        }
        due
    }

    /// Animation-frame hook: resolves the drop index at most once per frame
    pub fn on_frame(&mut self, layout: &TrackLayout) -> Option<usize> {
        match &mut self.state {
            State::Dragging(session) => {
                if session.frame_pending {
                    session.drop_index = layout.resolve(session.pointer);
                    session.frame_pending = false;
                }
                session.drop_index
            }
            _ => None,
        }
    }

    /// Pointer released.
    ///
    /// `layout` and `track` must describe the track the gesture started on;
    /// anything else cancels. Returns `None` when no gesture was live.
    pub fn pointer_up(
        &mut self,
        pointer_id: PointerId,
        pos: Point,
        layout: &TrackLayout,
        track: &mut Track,
    ) -> Option<DragOutcome> {
        let matches_pointer = match &self.state {
            State::Idle => return None,
            State::Armed(armed) => armed.down.pointer_id == pointer_id,
            State::Dragging(session) => session.pointer_id == pointer_id,
        };
        if !matches_pointer {
            return None;
        }

        match std::mem::take(&mut self.state) {
            State::Idle => None,
            State::Armed(armed) => Some(DragOutcome::Click {
                side: armed.down.side,
                index: armed.down.index,
            }),
            State::Dragging(mut session) => {
                session.pointer = pos;
                let guard = SessionGuard {
                    host: &mut self.host,
                    session,
                };
                let outcome = commit(&guard.session, layout, track);
                drop(guard);
                debug!("drag finished: {:?}", outcome);
                Some(outcome)
            }
        }
    }

    /// Cancel any live gesture; cleanup is unconditional
    pub fn abort(&mut self) -> Option<DragOutcome> {
        match std::mem::take(&mut self.state) {
            State::Idle => None,
            State::Armed(_) => Some(DragOutcome::Cancelled(CancelReason::Aborted)),
            State::Dragging(session) => {
                warn!("drag aborted mid-gesture");
                session.release(&mut self.host);
                Some(DragOutcome::Cancelled(CancelReason::Aborted))
            }
        }
    }

    fn activate(&mut self) {
        if let State::Armed(armed) = std::mem::take(&mut self.state) {
            debug!(
                "drag active on {:?}[{}]",
                armed.down.side, armed.down.index
            );
            let session = DragSession::acquire(&mut self.host, armed);
            self.state = State::Dragging(session);
        }
    }
}

impl<H: GestureHost> Drop for DragController<H> {
    fn drop(&mut self) {
        if let State::Dragging(session) = &self.state {
            session.release(&mut self.host);
        }
    }
}

fn commit(session: &DragSession, layout: &TrackLayout, track: &mut Track) -> DragOutcome {
    if track.side() != session.side {
        return DragOutcome::Cancelled(CancelReason::WrongTrack);
    }
    if track.ids() != session.shape || layout.chips.len() != track.len() {
        return DragOutcome::Cancelled(CancelReason::StaleShape);
    }
    let Some(drop_index) = layout.resolve(session.pointer) else {
        return DragOutcome::Cancelled(CancelReason::OutsideRegion);
    };
    match track.move_module(session.source, drop_index) {
        Some(to) => DragOutcome::Committed {
            from: session.source,
            to,
        },
        None => DragOutcome::Cancelled(CancelReason::SelfDrop),
    }
}
