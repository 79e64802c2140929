use std::num::NonZeroU32;

use tracing::{debug, warn};

use crate::area::{Area, AreaLayout, AreaRegistry};
use crate::camera::{Camera, Point};
use crate::config::FloorConfig;
use crate::doc::{Table, TableId, Tables};
use crate::hit::{Footprint, hit_test};
use crate::image::{EncodedImage, ImageError};
use crate::input::{DragSession, EditorState, InputState, InputSurface, PointerSample};
use crate::persist::{Gateway, StorageSlot};
use crate::snap::{Cell, snap};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// An area's tables or background changed; persist and redraw.
    LayoutChanged { area: Area },
    /// The editor opened, closed, or its draft changed.
    EditorChanged,
    /// A drag session began on a table.
    DragStarted { area: Area, id: TableId },
    /// A drag session ended (released or abandoned).
    DragEnded { area: Area, id: TableId },
    /// Call `preventDefault` on the event being handled.
    PreventDefault,
    /// Mode, area, or camera changed; redraw.
    RenderNeeded,
}

fn changes_layout(actions: &[Action]) -> bool {
    actions.iter().any(|a| matches!(a, Action::LayoutChanged { .. }))
}

/// Core engine state — all logic that doesn't depend on a storage backend or the DOM.
///
/// Separated from `Engine` so it can be tested without persistence or browser dependencies.
#[derive(Debug)]
pub struct EngineCore {
    registry: AreaRegistry,
    active: Area,
    edit_mode: bool,
    input: InputState,
    editor: EditorState,
    /// Set when a release ends a drag that moved its table; swallows the click that follows.
    suppress_click: bool,
    camera: Camera,
    grid: NonZeroU32,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_registry(AreaRegistry::new(), &FloorConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: &FloorConfig) -> Self {
        Self::with_registry(AreaRegistry::new(), config)
    }

    #[must_use]
    pub fn with_registry(registry: AreaRegistry, config: &FloorConfig) -> Self {
        Self {
            registry,
            active: config.default_area,
            edit_mode: false,
            input: InputState::Idle,
            editor: EditorState::Closed,
            suppress_click: false,
            camera: Camera::default(),
            grid: config.grid_size,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn registry(&self) -> &AreaRegistry {
        &self.registry
    }

    #[must_use]
    pub fn active_area(&self) -> Area {
        self.active
    }

    /// Layout of the area currently on screen.
    #[must_use]
    pub fn active_layout(&self) -> &AreaLayout {
        self.registry.layout(self.active)
    }

    #[must_use]
    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.registry.tables(self.active).get(id)
    }

    #[must_use]
    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    #[must_use]
    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn grid(&self) -> NonZeroU32 {
        self.grid
    }

    // --- Areas / modes ---

    /// Show another area. Any open editor is closed; an active drag keeps
    /// moving the table it grabbed in its own area.
    pub fn switch_area(&mut self, area: Area) -> Vec<Action> {
        let mut actions = self.close_editor();
        if area != self.active {
            self.active = area;
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Enter or leave layout edit mode. Abandons any drag and closes any editor.
    pub fn toggle_edit_mode(&mut self) -> Vec<Action> {
        self.edit_mode = !self.edit_mode;
        self.suppress_click = false;
        let mut actions = self.abandon_drag();
        actions.extend(self.close_editor());
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Restore every area to the default layout.
    pub fn reset(&mut self) -> Vec<Action> {
        let mut actions = self.abandon_drag();
        actions.extend(self.close_editor());
        self.registry = AreaRegistry::new();
        actions.extend(Area::ALL.into_iter().map(|area| Action::LayoutChanged { area }));
        actions
    }

    // --- Camera ---

    pub fn set_zoom(&mut self, zoom: f64) -> Vec<Action> {
        self.camera.set_zoom(zoom);
        vec![Action::RenderNeeded]
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Vec<Action> {
        self.camera.pan_by(dx, dy);
        vec![Action::RenderNeeded]
    }

    // --- Backgrounds ---

    /// Attach an encoded background to `area`, replacing any previous one.
    pub fn set_background(&mut self, area: Area, image: EncodedImage) -> Vec<Action> {
        self.registry.set_background(area, image);
        vec![Action::LayoutChanged { area }]
    }

    /// Finish an asynchronous background upload. A failed decode is logged and skipped.
    pub fn attach_background(&mut self, area: Area, decoded: Result<EncodedImage, ImageError>) -> Vec<Action> {
        match decoded {
            Ok(image) => self.set_background(area, image),
            Err(e) => {
                warn!(area = %area, error = %e, "background upload skipped");
                Vec::new()
            }
        }
    }

    // --- Table operations (active area) ---

    pub fn cycle_status(&mut self, id: TableId) -> Vec<Action> {
        self.edit_active(|t| t.cycle_status(id))
    }

    pub fn set_server(&mut self, id: TableId, name: &str) -> Vec<Action> {
        self.edit_active(|t| t.set_server(id, name))
    }

    /// Set a table number from text. Text that is not a positive integer is discarded.
    pub fn set_number(&mut self, id: TableId, text: &str) -> Vec<Action> {
        match self.registry.tables(self.active).set_number(id, text) {
            Ok(next) => self.replace_active(next),
            Err(e) => {
                debug!(table = %id, error = %e, "table number edit discarded");
                Vec::new()
            }
        }
    }

    pub fn move_table(&mut self, id: TableId, cell: Cell) -> Vec<Action> {
        self.edit_active(|t| t.move_table(id, cell))
    }

    fn edit_active<F>(&mut self, edit: F) -> Vec<Action>
    where
        F: FnOnce(&Tables) -> Tables,
    {
        let next = edit(self.registry.tables(self.active));
        self.replace_active(next)
    }

    fn replace_active(&mut self, next: Tables) -> Vec<Action> {
        let area = self.active;
        if self.registry.set_tables(area, next) { vec![Action::LayoutChanged { area }] } else { Vec::new() }
    }

    // --- Pointer input ---

    /// Press (mouse-down / touch-start). In edit mode, a press on a table
    /// starts a drag of the topmost table under the pointer.
    pub fn on_press(&mut self, sample: PointerSample, surface: &mut dyn InputSurface) -> Vec<Action> {
        self.suppress_click = false;
        if !self.edit_mode {
            return Vec::new();
        }
        let world = self.camera.screen_to_world(sample.client);
        match hit_test(world, self.registry.tables(self.active), self.grid) {
            Some(id) => self.begin_drag(id, sample, surface),
            None => Vec::new(),
        }
    }

    /// Start dragging table `id` of the active area from `sample`, subscribing
    /// to global move/release events. Hosts that already know which table to
    /// move call this directly instead of relying on the hit test.
    pub fn begin_drag(&mut self, id: TableId, sample: PointerSample, surface: &mut dyn InputSurface) -> Vec<Action> {
        self.suppress_click = false;
        if !self.edit_mode {
            return Vec::new();
        }
        let Some(origin) = self.table(id).map(Table::cell) else {
            return Vec::new();
        };

        let mut actions = self.abandon_drag();
        let guard = match surface.subscribe() {
            Ok(guard) => guard,
            Err(e) => {
                warn!(table = %id, error = %e, "drag not started");
                return actions;
            }
        };
        let area = self.active;
        debug!(table = %id, area = %area, col = origin.col, row = origin.row, "drag started");
        self.input = InputState::Dragging(DragSession::new(id, area, origin, sample.client, guard));
        actions.push(Action::DragStarted { area, id });
        actions
    }

    /// Move (mouse-move / touch-move) while dragging: snap the pointer delta
    /// to the grid and move the table when its cell changes.
    pub fn on_move(&mut self, sample: PointerSample) -> Vec<Action> {
        let InputState::Dragging(session) = &mut self.input else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        if sample.cancelable {
            actions.push(Action::PreventDefault);
        }

        let dx = self.camera.screen_dist_to_world(sample.client.x - session.start.x);
        let dy = self.camera.screen_dist_to_world(sample.client.y - session.start.y);
        let target = snap(self.grid, dx, dy, session.origin);

        let (area, id) = (session.area, session.id);
        let Some(current) = self.registry.tables(area).get(id).map(Table::cell) else {
            return actions;
        };
        if current != target && self.registry.edit_tables(area, |t| t.move_table(id, target)) {
            session.moved = true;
            actions.push(Action::LayoutChanged { area });
        }
        actions
    }

    /// Release (mouse-up / touch-end): end the drag and drop its listeners.
    pub fn on_release(&mut self) -> Vec<Action> {
        let Some(session) = self.input.finish() else {
            return Vec::new();
        };
        debug!(table = %session.id, area = %session.area, moved = session.moved, "drag released");
        self.suppress_click = session.moved;
        vec![Action::DragEnded { area: session.area, id: session.id }]
    }

    /// Click / tap on the floor. Opens the number editor in edit mode and the
    /// service editor otherwise, unless the click ends a drag.
    pub fn on_click(&mut self, sample: PointerSample) -> Vec<Action> {
        if std::mem::take(&mut self.suppress_click) {
            debug!("click after drag ignored");
            return Vec::new();
        }
        if self.input.is_dragging() {
            return Vec::new();
        }
        let tables = self.registry.tables(self.active);
        let world = self.camera.screen_to_world(sample.client);
        let Some(table) = hit_test(world, tables, self.grid).and_then(|id| tables.get(id)) else {
            return Vec::new();
        };
        self.editor = if self.edit_mode {
            EditorState::Number { id: table.id, number_draft: table.number.to_string() }
        } else {
            EditorState::Service { id: table.id, server_draft: table.server.clone() }
        };
        vec![Action::EditorChanged]
    }

    fn abandon_drag(&mut self) -> Vec<Action> {
        match self.input.finish() {
            Some(session) => {
                debug!(table = %session.id, area = %session.area, "drag abandoned");
                vec![Action::DragEnded { area: session.area, id: session.id }]
            }
            None => Vec::new(),
        }
    }

    // --- Editors ---

    /// Open the service editor for a table in the active area.
    pub fn open_service_editor(&mut self, id: TableId) -> Vec<Action> {
        let Some(table) = self.table(id) else {
            return Vec::new();
        };
        self.editor = EditorState::Service { id, server_draft: table.server.clone() };
        vec![Action::EditorChanged]
    }

    /// Open the number editor for a table in the active area.
    pub fn open_number_editor(&mut self, id: TableId) -> Vec<Action> {
        let Some(table) = self.table(id) else {
            return Vec::new();
        };
        self.editor = EditorState::Number { id, number_draft: table.number.to_string() };
        vec![Action::EditorChanged]
    }

    /// Replace the open editor's draft text.
    pub fn set_editor_draft(&mut self, text: &str) -> Vec<Action> {
        match &mut self.editor {
            EditorState::Closed => return Vec::new(),
            EditorState::Service { server_draft: draft, .. } | EditorState::Number { number_draft: draft, .. } => {
                text.clone_into(draft);
            }
        }
        vec![Action::EditorChanged]
    }

    /// Cycle the status of the table in the open service editor. Applies immediately.
    pub fn cycle_editor_status(&mut self) -> Vec<Action> {
        match self.editor {
            EditorState::Service { id, .. } => self.cycle_status(id),
            _ => Vec::new(),
        }
    }

    /// Apply the open editor's draft and close it. An unparsable number or a
    /// table that no longer exists just closes the editor.
    pub fn save_editor(&mut self) -> Vec<Action> {
        let mut actions = match std::mem::take(&mut self.editor) {
            EditorState::Closed => return Vec::new(),
            EditorState::Service { id, server_draft } => self.set_server(id, &server_draft),
            EditorState::Number { id, number_draft } => self.set_number(id, &number_draft),
        };
        actions.push(Action::EditorChanged);
        actions
    }

    /// Close the editor without applying its draft.
    pub fn close_editor(&mut self) -> Vec<Action> {
        if std::mem::take(&mut self.editor).is_open() { vec![Action::EditorChanged] } else { Vec::new() }
    }
}

/// The full floor engine. Wraps `EngineCore` and owns the persistence gateway,
/// writing the registry after every handler that changed a layout.
pub struct Engine<S: StorageSlot> {
    gateway: Gateway<S>,
    pub core: EngineCore,
}

impl<S: StorageSlot> Engine<S> {
    /// Load the registry from `slot` (defaults when absent or corrupt) and start an engine.
    #[must_use]
    pub fn open(slot: S, config: &FloorConfig) -> Self {
        let gateway = Gateway::new(slot);
        let registry = gateway.load();
        Self { gateway, core: EngineCore::with_registry(registry, config) }
    }

    #[must_use]
    pub fn gateway(&self) -> &Gateway<S> {
        &self.gateway
    }

    fn commit(&mut self, actions: Vec<Action>) -> Vec<Action> {
        if changes_layout(&actions) {
            self.gateway.save(self.core.registry());
        }
        actions
    }

    // --- Delegated mutations ---

    pub fn switch_area(&mut self, area: Area) -> Vec<Action> {
        let actions = self.core.switch_area(area);
        self.commit(actions)
    }

    pub fn toggle_edit_mode(&mut self) -> Vec<Action> {
        let actions = self.core.toggle_edit_mode();
        self.commit(actions)
    }

    pub fn reset(&mut self) -> Vec<Action> {
        let actions = self.core.reset();
        self.commit(actions)
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Vec<Action> {
        self.core.set_zoom(zoom)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Vec<Action> {
        self.core.pan_by(dx, dy)
    }

    pub fn set_background(&mut self, area: Area, image: EncodedImage) -> Vec<Action> {
        let actions = self.core.set_background(area, image);
        self.commit(actions)
    }

    pub fn attach_background(&mut self, area: Area, decoded: Result<EncodedImage, ImageError>) -> Vec<Action> {
        let actions = self.core.attach_background(area, decoded);
        self.commit(actions)
    }

    pub fn cycle_status(&mut self, id: TableId) -> Vec<Action> {
        let actions = self.core.cycle_status(id);
        self.commit(actions)
    }

    pub fn set_server(&mut self, id: TableId, name: &str) -> Vec<Action> {
        let actions = self.core.set_server(id, name);
        self.commit(actions)
    }

    pub fn set_number(&mut self, id: TableId, text: &str) -> Vec<Action> {
        let actions = self.core.set_number(id, text);
        self.commit(actions)
    }

    pub fn move_table(&mut self, id: TableId, cell: Cell) -> Vec<Action> {
        let actions = self.core.move_table(id, cell);
        self.commit(actions)
    }

    // --- Input events ---

    pub fn on_press(&mut self, sample: PointerSample, surface: &mut dyn InputSurface) -> Vec<Action> {
        let actions = self.core.on_press(sample, surface);
        self.commit(actions)
    }

    pub fn begin_drag(&mut self, id: TableId, sample: PointerSample, surface: &mut dyn InputSurface) -> Vec<Action> {
        let actions = self.core.begin_drag(id, sample, surface);
        self.commit(actions)
    }

    pub fn on_move(&mut self, sample: PointerSample) -> Vec<Action> {
        let actions = self.core.on_move(sample);
        self.commit(actions)
    }

    pub fn on_release(&mut self) -> Vec<Action> {
        let actions = self.core.on_release();
        self.commit(actions)
    }

    pub fn on_click(&mut self, sample: PointerSample) -> Vec<Action> {
        let actions = self.core.on_click(sample);
        self.commit(actions)
    }

    // --- Editors ---

    pub fn open_service_editor(&mut self, id: TableId) -> Vec<Action> {
        self.core.open_service_editor(id)
    }

    pub fn open_number_editor(&mut self, id: TableId) -> Vec<Action> {
        self.core.open_number_editor(id)
    }

    pub fn set_editor_draft(&mut self, text: &str) -> Vec<Action> {
        self.core.set_editor_draft(text)
    }

    pub fn cycle_editor_status(&mut self) -> Vec<Action> {
        let actions = self.core.cycle_editor_status();
        self.commit(actions)
    }

    pub fn save_editor(&mut self) -> Vec<Action> {
        let actions = self.core.save_editor();
        self.commit(actions)
    }

    pub fn close_editor(&mut self) -> Vec<Action> {
        self.core.close_editor()
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn registry(&self) -> &AreaRegistry {
        self.core.registry()
    }

    #[must_use]
    pub fn active_area(&self) -> Area {
        self.core.active_area()
    }

    #[must_use]
    pub fn active_layout(&self) -> &AreaLayout {
        self.core.active_layout()
    }

    #[must_use]
    pub fn editor(&self) -> &EditorState {
        self.core.editor()
    }

    #[must_use]
    pub fn is_edit_mode(&self) -> bool {
        self.core.is_edit_mode()
    }

    /// Client position of a table's center, for hosts that synthesize gestures.
    #[must_use]
    pub fn table_center(&self, id: TableId) -> Option<Point> {
        let table = self.core.table(id)?;
        let center = Footprint::of(table, self.core.grid()).center();
        Some(self.core.camera().world_to_screen(center))
    }
}
