//! Grid snapping: raw pointer deltas to discrete cell positions.

#[cfg(test)]
#[path = "snap_test.rs"]
mod snap_test;

use std::num::NonZeroU32;

/// A grid cell position. Unsigned, so a cell can never be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub col: u32,
    pub row: u32,
}

impl Cell {
    #[must_use]
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// Snap a pixel delta measured from the gesture start onto the grid.
///
/// Each axis moves by `round(delta / grid)` cells from `start` (ties round away
/// from zero) and is clamped at zero. Non-finite deltas are treated as zero.
#[must_use]
pub fn snap(grid: NonZeroU32, dx: f64, dy: f64, start: Cell) -> Cell {
    let g = f64::from(grid.get());
    Cell {
        col: offset_axis(start.col, dx, g),
        row: offset_axis(start.row, dy, g),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn offset_axis(start: u32, delta_px: f64, grid_px: f64) -> u32 {
    let cells = if delta_px.is_finite() { (delta_px / grid_px).round() } else { 0.0 };
    // Float-to-int `as` saturates, so huge drags pin to the i64 range before clamping.
    let moved = i64::from(start).saturating_add(cells as i64);
    u32::try_from(moved.max(0)).unwrap_or(u32::MAX)
}
