//! End-to-end scenarios for the module model and the drag engine
//!
//! These drive the public API the way a UI host does: build tracks, feed
//! pointer events with explicit timestamps, and inspect the resulting order.

use qcomposer_core::drag::{
    CancelReason, DragController, DragOutcome, DragSettings, GestureHost, PointerDown,
    PointerKind, PointerTarget,
};
use qcomposer_core::drop_target::{resolve_drop_index, TrackLayout};
use qcomposer_core::geometry::{Bounds, Point};
use qcomposer_core::module::{serialize, ModuleData, TimeSet};
use qcomposer_core::{Composer, Track, TrackSide};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Host {
    listeners: bool,
    scroll_locked: bool,
    lock_count: usize,
}

impl GestureHost for Host {
    fn install_listeners(&mut self) {
        self.listeners = true;
    }
    fn remove_listeners(&mut self) {
        self.listeners = false;
    }
    fn lock_scroll(&mut self) {
        self.scroll_locked = true;
        self.lock_count += 1;
    }
    fn unlock_scroll(&mut self) {
        self.scroll_locked = false;
    }
}

/// One row of equally sized chips, 20 wide with a 4 gap, inside a 200x20 region
fn row_layout(count: usize) -> TrackLayout {
    TrackLayout::new(
        Bounds::new(0.0, 0.0, 200.0, 20.0),
        (0..count)
            .map(|i| Bounds::new(i as f32 * 24.0, 0.0, 20.0, 10.0))
            .collect(),
    )
}

fn press(layout: &TrackLayout, index: usize, kind: PointerKind) -> PointerDown {
    let chip = layout.chips[index];
    PointerDown {
        pointer_id: 7,
        kind,
        pos: chip.center(),
        side: TrackSide::Question,
        index,
        target: PointerTarget::Chip,
        chip,
    }
}

fn labels(track: &Track) -> Vec<String> {
    track.modules().iter().map(|m| m.label()).collect()
}

#[test]
fn scenario_add_at_index_shifts_later_modules() {
    let mut track = Track::from_data(
        TrackSide::Question,
        [
            ModuleData::text("안녕"),
            ModuleData::Time(TimeSet::default()),
            ModuleData::text("입니다"),
        ],
    );

    let index = track.add_module(ModuleData::Time(TimeSet::new(["09:00"])), Some(1));

    assert_eq!(index, 1);
    assert_eq!(labels(&track), ["안녕", "09:00", "[시간]", "입니다"]);
}

#[test]
fn scenario_drag_first_to_drop_index_two() {
    let t0 = Instant::now();
    let layout = row_layout(3);
    let mut track = Track::from_data(
        TrackSide::Question,
        ["old0", "old1", "old2"].into_iter().map(ModuleData::text),
    );
    let before = track.ids();

    let mut drag = DragController::new(Host::default(), DragSettings::default());
    assert!(drag.pointer_down(press(&layout, 0, PointerKind::Fine), &track, t0));

    // Left half of chip 2 resolves to gap 2
    let target = Point::new(50.0, 5.0);
    assert_eq!(resolve_drop_index(target, &layout.chips), 2);
    drag.pointer_move(7, target, t0 + Duration::from_millis(16));
    assert_eq!(drag.on_frame(&layout), Some(2));

    let outcome = drag.pointer_up(7, target, &layout, &mut track);
    assert_eq!(outcome, Some(DragOutcome::Committed { from: 0, to: 1 }));
    assert_eq!(labels(&track), ["old1", "old0", "old2"]);
    assert_eq!(track.ids(), vec![before[1], before[0], before[2]]);
    assert!(!drag.host().listeners);
    assert!(!drag.host().scroll_locked);
}

#[test]
fn scenario_serialize_times_and_text() {
    let modules = Track::from_data(
        TrackSide::Answer,
        [
            ModuleData::Time(TimeSet::new(["09:00", "10:00"])),
            ModuleData::text("까지"),
        ],
    );
    assert_eq!(serialize(modules.modules()), "09:00, 10:00 까지");
}

#[test]
fn scenario_touch_move_before_dwell_is_scroll() {
    let t0 = Instant::now();
    let layout = row_layout(3);
    let mut track = Track::from_data(
        TrackSide::Question,
        ["a", "b", "c"].into_iter().map(ModuleData::text),
    );
    let revision = track.revision();

    let mut drag = DragController::new(Host::default(), DragSettings::default());
    let down = press(&layout, 0, PointerKind::Coarse);
    drag.pointer_down(down, &track, t0);
    drag.pointer_move(
        7,
        Point::new(down.pos.x + 10.0, down.pos.y),
        t0 + Duration::from_millis(100),
    );
    assert!(!drag.tick(t0 + Duration::from_millis(200)));
    assert_eq!(
        drag.pointer_up(7, Point::new(60.0, 5.0), &layout, &mut track),
        None
    );

    assert_eq!(labels(&track), ["a", "b", "c"]);
    assert_eq!(track.revision(), revision);
    assert_eq!(drag.host().lock_count, 0);
    assert!(!drag.host().scroll_locked);
}

#[test]
fn touch_hold_then_drag_commits() {
    let t0 = Instant::now();
    let layout = row_layout(3);
    let mut track = Track::from_data(
        TrackSide::Question,
        ["a", "b", "c"].into_iter().map(ModuleData::text),
    );

    let mut drag = DragController::new(Host::default(), DragSettings::default());
    drag.pointer_down(press(&layout, 2, PointerKind::Coarse), &track, t0);
    assert!(drag.tick(t0 + Duration::from_millis(160)));
    assert!(drag.host().scroll_locked);

    let target = Point::new(2.0, 5.0);
    drag.pointer_move(7, target, t0 + Duration::from_millis(200));
    assert_eq!(drag.on_frame(&layout), Some(0));
    let outcome = drag.pointer_up(7, target, &layout, &mut track);
    assert_eq!(outcome, Some(DragOutcome::Committed { from: 2, to: 0 }));
    assert_eq!(labels(&track), ["c", "a", "b"]);
}

#[test]
fn every_commit_is_a_single_relocation() {
    let layout = row_layout(5);
    for from in 0..5 {
        for x in (0..130).step_by(3) {
            let t0 = Instant::now();
            let mut track = Track::from_data(
                TrackSide::Question,
                ["a", "b", "c", "d", "e"].into_iter().map(ModuleData::text),
            );
            let before = track.ids();
            let revision = track.revision();

            let mut drag = DragController::new(Host::default(), DragSettings::default());
            drag.pointer_down(press(&layout, from, PointerKind::Fine), &track, t0);
            let target = Point::new(x as f32, 5.0);
            drag.pointer_move(7, Point::new(target.x, 15.0), t0);
            let outcome = drag.pointer_up(7, target, &layout, &mut track);

            let after = track.ids();
            assert_eq!(after.len(), before.len());
            match outcome {
                Some(DragOutcome::Committed { from: f, to }) => {
                    assert_eq!(f, from);
                    let mut expected = before.clone();
                    let moved = expected.remove(from);
                    expected.insert(to, moved);
                    assert_eq!(after, expected);
                }
                Some(DragOutcome::Cancelled(_)) => {
                    assert_eq!(after, before);
                    assert_eq!(track.revision(), revision);
                }
                other => panic!("unexpected outcome {:?}", other),
            }
            assert!(!drag.host().listeners);
        }
    }
}

#[test]
fn drop_after_track_changed_cancels() {
    let t0 = Instant::now();
    let layout = row_layout(3);
    let mut composer = Composer::default();
    for t in ["a", "b", "c"] {
        composer.add_keyword(t);
    }

    let mut drag = DragController::new(Host::default(), DragSettings::default());
    drag.pointer_down(
        press(&layout, 0, PointerKind::Fine),
        composer.track(TrackSide::Question),
        t0,
    );
    drag.pointer_move(7, Point::new(60.0, 5.0), t0);

    composer.add_keyword("d");
    let outcome = drag.pointer_up(
        7,
        Point::new(60.0, 5.0),
        &layout,
        composer.track_mut(TrackSide::Question),
    );
    assert_eq!(outcome, Some(DragOutcome::Cancelled(CancelReason::StaleShape)));
    assert_eq!(composer.active_track().serialize(), "a b c d");
}

#[test]
fn dropping_controller_mid_drag_releases_host() {
    #[derive(Default)]
    struct Flag(std::rc::Rc<std::cell::Cell<bool>>);
    impl GestureHost for Flag {
        fn install_listeners(&mut self) {
            self.0.set(true);
        }
        fn remove_listeners(&mut self) {
            self.0.set(false);
        }
        fn lock_scroll(&mut self) {}
        fn unlock_scroll(&mut self) {}
    }

    let t0 = Instant::now();
    let layout = row_layout(2);
    let track = Track::from_data(
        TrackSide::Question,
        ["a", "b"].into_iter().map(ModuleData::text),
    );
    let live = std::rc::Rc::new(std::cell::Cell::new(false));
    {
        let mut drag = DragController::new(Flag(live.clone()), DragSettings::default());
        drag.pointer_down(press(&layout, 0, PointerKind::Fine), &track, t0);
        drag.pointer_move(7, Point::new(40.0, 5.0), t0);
        assert!(live.get());
    }
    assert!(!live.get());
}
