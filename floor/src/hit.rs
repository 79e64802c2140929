#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use std::num::NonZeroU32;

use crate::camera::Point;
use crate::consts::TABLE_GAP_PX;
use crate::doc::{Table, TableId, Tables};

/// Floor-space rectangle a table covers: anchored at its cell's top-left
/// corner, `grid - TABLE_GAP_PX` wide and tall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

impl Footprint {
    #[must_use]
    pub fn of(table: &Table, grid: NonZeroU32) -> Self {
        let g = f64::from(grid.get());
        Self {
            x: f64::from(table.col) * g,
            y: f64::from(table.row) * g,
            size: (g - TABLE_GAP_PX).max(1.0),
        }
    }

    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x < self.x + self.size && pt.y >= self.y && pt.y < self.y + self.size
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.size / 2.0, self.y + self.size / 2.0)
    }
}

/// The table under `world_pt`, if any. Later tables draw on top, so they win.
#[must_use]
pub fn hit_test(world_pt: Point, tables: &Tables, grid: NonZeroU32) -> Option<TableId> {
    tables
        .iter()
        .rev()
        .find(|t| Footprint::of(t, grid).contains(world_pt))
        .map(|t| t.id)
}
