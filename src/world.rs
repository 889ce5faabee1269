//! World data model: base, stones, obstacles and the delivery counter.

use crate::geometry;
use serde::{Deserialize, Serialize};

/// Axis-aligned obstacle rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w * 0.5, self.y + self.h * 0.5)
    }
}

/// The drop-off base, a fixed circle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub x: f32,
    pub y: f32,
    pub r: f32,
}

/// A mineable stone deposit. `quantity` counts the remaining units; an
/// exhausted stone stays in place until the map generator finds a
/// replacement spot for it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stone {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub quantity: u32,
    pub initial_quantity: u32,
}

impl Stone {
    #[inline]
    pub fn is_live(&self) -> bool {
        self.quantity > 0
    }
}

/// Static world geometry plus the run-wide delivery counter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub height: f32,
    pub base: Base,
    pub stones: Vec<Stone>,
    pub obstacles: Vec<Rect>,
    pub stones_delivered: u64,
}

impl World {
    pub fn new(width: f32, height: f32, base: Base) -> Self {
        Self {
            width,
            height,
            base,
            stones: Vec::new(),
            obstacles: Vec::new(),
            stones_delivered: 0,
        }
    }

    /// Diagonal length, used as the normalization denominator for
    /// proximity shaping. Never returns zero.
    #[inline]
    pub fn diagonal(&self) -> f32 {
        self.width.hypot(self.height).max(1.0)
    }

    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x > 0.0 && x < self.width && y > 0.0 && y < self.height
    }

    /// Distance from `(x, y)` to the nearest stone that still has units.
    pub fn nearest_live_stone_distance(&self, x: f32, y: f32) -> Option<f32> {
        self.stones
            .iter()
            .filter(|s| s.is_live())
            .map(|s| geometry::distance(x, y, s.x, s.y))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Index of the first live stone whose rim is within `reach` of
    /// `(x, y)`, if any.
    pub fn stone_index_near(&self, x: f32, y: f32, reach: f32) -> Option<usize> {
        self.stones.iter().position(|s| {
            if !s.is_live() {
                return false;
            }
            let dx = x - s.x;
            let dy = y - s.y;
            let threshold = s.r + reach;
            dx * dx + dy * dy < threshold * threshold
        })
    }

    /// Total stone units still available for mining.
    pub fn total_stone_quantity(&self) -> u32 {
        self.stones.iter().map(|s| s.quantity).sum()
    }

    #[inline]
    pub fn distance_to_base(&self, x: f32, y: f32) -> f32 {
        geometry::distance(x, y, self.base.x, self.base.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_world() -> World {
        let mut world = World::new(800.0, 600.0, Base { x: 400.0, y: 300.0, r: 18.0 });
        world.stones.push(Stone { x: 100.0, y: 100.0, r: 12.0, quantity: 5, initial_quantity: 5 });
        world.stones.push(Stone { x: 700.0, y: 500.0, r: 12.0, quantity: 0, initial_quantity: 8 });
        world
    }

    #[test]
    fn test_nearest_live_stone_ignores_exhausted() {
        let world = test_world();
        // (700, 500) hosts an exhausted stone; the live one at (100, 100)
        // must win even though it is much farther.
        let d = world.nearest_live_stone_distance(690.0, 490.0).unwrap();
        assert!(d > 500.0);
    }

    #[test]
    fn test_stone_index_near_respects_quantity() {
        let world = test_world();
        assert_eq!(world.stone_index_near(100.0, 100.0, 12.0), Some(0));
        assert_eq!(world.stone_index_near(700.0, 500.0, 12.0), None);
    }

    #[test]
    fn test_diagonal_guard() {
        let world = World::new(0.0, 0.0, Base { x: 0.0, y: 0.0, r: 1.0 });
        assert_eq!(world.diagonal(), 1.0);
    }

    #[test]
    fn test_total_quantity() {
        assert_eq!(test_world().total_stone_quantity(), 5);
    }
}
