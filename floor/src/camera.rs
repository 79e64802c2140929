#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{MAX_ZOOM, MIN_ZOOM};

/// A point in either screen (client) or floor space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// View transform over the floor grid: `screen = floor * zoom + pan`.
///
/// Fields are private so the scale factor always stays within
/// `[MIN_ZOOM, MAX_ZOOM]`; every conversion divides by it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pan: Point,
    zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan: Point::new(0.0, 0.0), zoom: 1.0 }
    }
}

fn clamp_zoom(zoom: f64) -> Option<f64> {
    zoom.is_finite().then(|| zoom.clamp(MIN_ZOOM, MAX_ZOOM))
}

impl Camera {
    /// Camera with the given pan offset (CSS pixels) and zoom. A non-finite
    /// zoom falls back to 1.0; any other value is clamped.
    #[must_use]
    pub fn new(pan: Point, zoom: f64) -> Self {
        Self { pan, zoom: clamp_zoom(zoom).unwrap_or(1.0) }
    }

    #[must_use]
    pub fn pan(&self) -> Point {
        self.pan
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(self.screen_dist_to_world(screen.x - self.pan.x), self.screen_dist_to_world(screen.y - self.pan.y))
    }

    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(self.pan.x + world.x * self.zoom, self.pan.y + world.y * self.zoom)
    }

    /// Length of a screen-space span measured in floor pixels.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Change the zoom factor. Non-finite input is ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if let Some(zoom) = clamp_zoom(zoom) {
            self.zoom = zoom;
        }
    }

    /// Shift the view by a screen-space offset.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan = Point::new(self.pan.x + dx, self.pan.y + dy);
    }
}
