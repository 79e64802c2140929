//! Shared numeric and naming constants for the floor crate.

// ── Grid ────────────────────────────────────────────────────────

/// Default grid cell size in pixels.
pub const DEFAULT_GRID_SIZE_PX: u32 = 90;

/// Empty space between neighbouring tables; a table is `grid - gap` pixels square.
pub const TABLE_GAP_PX: f64 = 10.0;

/// Columns and rows of the default layout.
pub const DEFAULT_LAYOUT_COLS: u32 = 3;
pub const DEFAULT_LAYOUT_ROWS: u32 = 2;

// ── Camera ──────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.25;

/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 4.0;

// ── Persistence ─────────────────────────────────────────────────

/// Key of the durable slot holding the whole area registry.
pub const DEFAULT_STORAGE_KEY: &str = "tableTracker_areas_v1";
