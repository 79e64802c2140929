//! Input model: unified pointer samples, global listener subscriptions, the
//! drag gesture state machine, and the editor state.
//!
//! Mouse and touch events reach the engine as [`PointerSample`]s. A drag
//! session owns a [`ListenerGuard`] for the move/release listeners registered
//! on the whole input surface; dropping the session (release, abandonment,
//! mode toggle) drops the guard, which deregisters them.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::fmt;

use crate::area::Area;
use crate::camera::Point;
use crate::doc::TableId;
use crate::snap::Cell;

/// Which kind of device produced a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

/// One press, move, or release from either a mouse or a touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Client-area position in CSS pixels.
    pub client: Point,
    /// Whether the underlying event's default action (scrolling) can be prevented.
    pub cancelable: bool,
    pub source: PointerSource,
}

impl PointerSample {
    #[must_use]
    pub fn mouse(x: f64, y: f64) -> Self {
        Self { client: Point::new(x, y), cancelable: true, source: PointerSource::Mouse }
    }

    #[must_use]
    pub fn touch(x: f64, y: f64, cancelable: bool) -> Self {
        Self { client: Point::new(x, y), cancelable, source: PointerSource::Touch }
    }
}

/// Releases a set of global input listeners when dropped.
pub struct ListenerGuard {
    release: Option<Box<dyn FnOnce()>>,
}

impl ListenerGuard {
    /// Guard that runs `release` exactly once, on drop.
    #[must_use]
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    /// Guard with nothing to release, for hosts that deliver moves directly.
    #[must_use]
    pub fn detached() -> Self {
        Self { release: None }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard").field("armed", &self.release.is_some()).finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to register input listeners: {0}")]
pub struct SurfaceError(pub String);

/// The global surface drag listeners attach to (the browser window, a test double).
pub trait InputSurface {
    /// Register move and release listeners for one drag session.
    fn subscribe(&mut self) -> Result<ListenerGuard, SurfaceError>;
}

/// Surface for hosts that feed every event to the engine themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedSurface;

impl InputSurface for DetachedSurface {
    fn subscribe(&mut self) -> Result<ListenerGuard, SurfaceError> {
        Ok(ListenerGuard::detached())
    }
}

/// Context captured when a drag starts.
#[derive(Debug)]
pub struct DragSession {
    /// Table being dragged.
    pub id: TableId,
    /// Area the table lives in; moves keep targeting it after an area switch.
    pub area: Area,
    /// Table cell at press time; deltas are snapped relative to it.
    pub origin: Cell,
    /// Client position of the press.
    pub start: Point,
    /// Whether any move changed the table's cell.
    pub moved: bool,
    _listeners: ListenerGuard,
}

impl DragSession {
    #[must_use]
    pub fn new(id: TableId, area: Area, origin: Cell, start: Point, guard: ListenerGuard) -> Self {
        Self { id, area, origin, start, moved: false, _listeners: guard }
    }
}

/// Drag gesture state machine.
#[derive(Debug, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next press.
    #[default]
    Idle,
    /// A table is following the pointer.
    Dragging(DragSession),
}

impl InputState {
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging(_))
    }

    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        match self {
            Self::Idle => None,
            Self::Dragging(session) => Some(session),
        }
    }

    /// End any session, releasing its listeners. Returns the finished session.
    pub fn finish(&mut self) -> Option<DragSession> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Dragging(session) => Some(session),
        }
    }
}

/// Which editor, if any, is open and for which table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditorState {
    #[default]
    Closed,
    /// Server assignment and status cycling (service mode).
    Service { id: TableId, server_draft: String },
    /// Table number (layout edit mode).
    Number { id: TableId, number_draft: String },
}

impl EditorState {
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Table the open editor refers to.
    #[must_use]
    pub fn table_id(&self) -> Option<TableId> {
        match self {
            Self::Closed => None,
            Self::Service { id, .. } | Self::Number { id, .. } => Some(*id),
        }
    }
}
