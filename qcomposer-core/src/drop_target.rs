//! Drop index resolution shared by the live insertion caret and the commit

use crate::geometry::{Bounds, Point};

/// Geometry of one track as laid out on screen: the tracked region plus one
/// box per module, in track order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackLayout {
    pub region: Bounds,
    pub chips: Vec<Bounds>,
}

impl TrackLayout {
    pub fn new(region: Bounds, chips: Vec<Bounds>) -> Self {
        Self { region, chips }
    }

    /// Drop index for a pointer, or `None` when the pointer left the region
    pub fn resolve(&self, pointer: Point) -> Option<usize> {
        self.region
            .contains(pointer)
            .then(|| resolve_drop_index(pointer, &self.chips))
    }
}

/// Gap index (`0..=chips.len()`) at which a dragged module would be reinserted.
///
/// The chip containing the pointer wins (first in order on overlap); otherwise
/// the chip whose centre is nearest. The pointer's side of that chip's
/// horizontal midpoint picks the gap before or after it.
pub fn resolve_drop_index(pointer: Point, chips: &[Bounds]) -> usize {
    let hit = chips
        .iter()
        .enumerate()
        .find(|(_, chip)| chip.contains(pointer))
        .or_else(|| {
            chips.iter().enumerate().min_by(|(_, a), (_, b)| {
                pointer
                    .distance(a.center())
                    .total_cmp(&pointer.distance(b.center()))
            })
        });

    match hit {
        Some((index, chip)) if pointer.x > chip.mid_x() => index + 1,
        Some((index, _)) => index,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Three chips on one row: [0,10) [12,22) [24,34)
    fn row() -> Vec<Bounds> {
        (0..3)
            .map(|i| Bounds::new(i as f32 * 12.0, 0.0, 10.0, 1.0))
            .collect()
    }

    #[test]
    fn test_empty_track_resolves_to_zero() {
        assert_eq!(resolve_drop_index(Point::new(50.0, 50.0), &[]), 0);
    }

    #[test]
    fn test_hit_uses_midpoint() {
        let chips = row();
        assert_eq!(resolve_drop_index(Point::new(2.0, 0.5), &chips), 0);
        assert_eq!(resolve_drop_index(Point::new(5.0, 0.5), &chips), 0);
        assert_eq!(resolve_drop_index(Point::new(8.0, 0.5), &chips), 1);
        assert_eq!(resolve_drop_index(Point::new(20.0, 0.5), &chips), 2);
        assert_eq!(resolve_drop_index(Point::new(33.0, 0.5), &chips), 3);
    }

    #[test]
    fn test_nearest_fallback() {
        let chips = row();
        // Gap between chip 0 and chip 1
        assert_eq!(resolve_drop_index(Point::new(11.0, 0.5), &chips), 1);
        // Below the row, under the last chip
        assert_eq!(resolve_drop_index(Point::new(31.0, 5.0), &chips), 3);
        // Far left
        assert_eq!(resolve_drop_index(Point::new(-20.0, 0.5), &chips), 0);
    }

    #[test]
    fn test_overlap_resolves_to_first() {
        let chips = vec![Bounds::new(0.0, 0.0, 10.0, 1.0), Bounds::new(0.0, 0.0, 10.0, 1.0)];
        assert_eq!(resolve_drop_index(Point::new(2.0, 0.5), &chips), 0);
    }

    #[test]
    fn test_monotonic_in_x_along_row() {
        let chips = row();
        let mut last = 0;
        let mut x = -5.0;
        while x < 40.0 {
            let index = resolve_drop_index(Point::new(x, 0.5), &chips);
            assert!(index >= last, "regressed at x={}: {} < {}", x, index, last);
            last = index;
            x += 0.25;
        }
        assert_eq!(last, 3);
    }

    #[test]
    fn test_layout_outside_region() {
        let layout = TrackLayout::new(Bounds::new(0.0, 0.0, 40.0, 3.0), row());
        assert_eq!(layout.resolve(Point::new(5.0, 0.5)), Some(0));
        assert_eq!(layout.resolve(Point::new(5.0, 10.0)), None);
    }
}
