//! Browser host: `localStorage` persistence, DOM event adapters, and the
//! window-level listeners that follow a drag past the floor element.
//!
//! The listener closures are created once per [`WebFloor`] and only their
//! registrations come and go with each drag, so a closure is never freed
//! while the browser is running it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::{Function, Uint8Array};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AddEventListenerOptions, Event, EventTarget, File, MouseEvent, Storage, TouchEvent};

use crate::area::Area;
use crate::config::FloorConfig;
use crate::engine::{Action, Engine};
use crate::image::{EncodedImage, ImageError, encode_data_uri};
use crate::input::{InputSurface, ListenerGuard, PointerSample, SurfaceError};
use crate::persist::{PersistError, StorageSlot};

/// Engine persisted to `localStorage`.
pub type BrowserEngine = Engine<LocalStorageSlot>;

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("no browser window")]
    NoWindow,
    #[error(transparent)]
    Storage(#[from] PersistError),
}

// =============================================================
// localStorage
// =============================================================

/// A single `localStorage` key.
pub struct LocalStorageSlot {
    storage: Storage,
    key: String,
}

impl LocalStorageSlot {
    /// Bind `key` in the current window's `localStorage`.
    pub fn from_window(key: impl Into<String>) -> Result<Self, WebError> {
        let window = web_sys::window().ok_or(WebError::NoWindow)?;
        let storage = window
            .local_storage()
            .map_err(|e| PersistError::Storage(js_message(&e)))?
            .ok_or_else(|| PersistError::Storage("localStorage disabled".into()))?;
        Ok(Self { storage, key: key.into() })
    }
}

impl StorageSlot for LocalStorageSlot {
    fn read(&self) -> Result<Option<String>, PersistError> {
        self.storage.get_item(&self.key).map_err(|e| PersistError::Storage(js_message(&e)))
    }

    fn write(&mut self, value: &str) -> Result<(), PersistError> {
        self.storage.set_item(&self.key, value).map_err(|e| PersistError::Storage(js_message(&e)))
    }
}

// =============================================================
// Event adapters
// =============================================================

#[must_use]
pub fn sample_from_mouse(event: &MouseEvent) -> PointerSample {
    PointerSample::mouse(f64::from(event.client_x()), f64::from(event.client_y()))
}

/// First active touch, or the touch that just lifted on `touchend`.
#[must_use]
pub fn sample_from_touch(event: &TouchEvent) -> Option<PointerSample> {
    let touch = event.touches().get(0).or_else(|| event.changed_touches().get(0))?;
    Some(PointerSample::touch(f64::from(touch.client_x()), f64::from(touch.client_y()), event.cancelable()))
}

// =============================================================
// Dispatch
// =============================================================

type Notify = Rc<dyn Fn(&[Action])>;

/// Weak route from a DOM callback back to the engine.
#[derive(Clone)]
struct Hooks {
    engine: Weak<RefCell<BrowserEngine>>,
    notify: Notify,
}

impl Hooks {
    fn run(&self, handler: impl FnOnce(&mut BrowserEngine) -> Vec<Action>) -> Vec<Action> {
        let Some(engine) = self.engine.upgrade() else {
            return Vec::new();
        };
        let actions = match engine.try_borrow_mut() {
            Ok(mut engine) => handler(&mut engine),
            Err(_) => {
                warn!("engine busy; event dropped");
                return Vec::new();
            }
        };
        if !actions.is_empty() {
            (self.notify)(&actions);
        }
        actions
    }

    fn dispatch(&self, event: &Event, handler: impl FnOnce(&mut BrowserEngine) -> Vec<Action>) {
        if self.run(handler).contains(&Action::PreventDefault) {
            event.prevent_default();
        }
    }
}

// =============================================================
// Window listeners
// =============================================================

struct WindowListeners {
    target: EventTarget,
    bindings: Vec<(&'static str, Function)>,
    _mouse: Vec<Closure<dyn FnMut(MouseEvent)>>,
    _touch: Vec<Closure<dyn FnMut(TouchEvent)>>,
}

impl WindowListeners {
    fn new(target: EventTarget, hooks: &Hooks) -> Self {
        let mouse_move = {
            let hooks = hooks.clone();
            Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
                hooks.dispatch(&event, |engine| engine.on_move(sample_from_mouse(&event)));
            })
        };
        let mouse_up = {
            let hooks = hooks.clone();
            Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
                hooks.dispatch(&event, Engine::on_release);
            })
        };
        let touch_move = {
            let hooks = hooks.clone();
            Closure::<dyn FnMut(TouchEvent)>::new(move |event: TouchEvent| {
                hooks.dispatch(&event, |engine| match sample_from_touch(&event) {
                    Some(sample) => engine.on_move(sample),
                    None => Vec::new(),
                });
            })
        };
        let touch_end = {
            let hooks = hooks.clone();
            Closure::<dyn FnMut(TouchEvent)>::new(move |event: TouchEvent| {
                hooks.dispatch(&event, Engine::on_release);
            })
        };

        let function = |c: &Closure<dyn FnMut(MouseEvent)>| c.as_ref().unchecked_ref::<Function>().clone();
        let touch_function = |c: &Closure<dyn FnMut(TouchEvent)>| c.as_ref().unchecked_ref::<Function>().clone();
        let bindings = vec![
            ("mousemove", function(&mouse_move)),
            ("mouseup", function(&mouse_up)),
            ("touchmove", touch_function(&touch_move)),
            ("touchend", touch_function(&touch_end)),
        ];
        Self { target, bindings, _mouse: vec![mouse_move, mouse_up], _touch: vec![touch_move, touch_end] }
    }

    fn attach(&self) -> Result<(), JsValue> {
        // touchmove must be able to cancel scrolling.
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        for (kind, callback) in &self.bindings {
            self.target
                .add_event_listener_with_callback_and_add_event_listener_options(kind, callback, &options)?;
        }
        Ok(())
    }

    fn detach(&self) {
        for (kind, callback) in &self.bindings {
            if let Err(e) = self.target.remove_event_listener_with_callback(kind, callback) {
                warn!(event = *kind, error = %js_message(&e), "listener removal failed");
            }
        }
    }
}

/// Window-level move/release listeners, registered for the life of one drag.
pub struct WindowSurface {
    listeners: Rc<WindowListeners>,
}

impl InputSurface for WindowSurface {
    fn subscribe(&mut self) -> Result<ListenerGuard, SurfaceError> {
        if let Err(e) = self.listeners.attach() {
            self.listeners.detach();
            return Err(SurfaceError(js_message(&e)));
        }
        let listeners = Rc::clone(&self.listeners);
        Ok(ListenerGuard::new(move || listeners.detach()))
    }
}

// =============================================================
// WebFloor
// =============================================================

/// Browser binding for one floor view. The host forwards the floor element's
/// `mousedown`, `touchstart`, and `click` events and redraws on `notify`.
pub struct WebFloor {
    engine: Rc<RefCell<BrowserEngine>>,
    surface: WindowSurface,
    hooks: Hooks,
}

impl WebFloor {
    /// Load the registry from `localStorage` and bind window listeners.
    /// `notify` receives every non-empty batch of actions after the engine handled it.
    pub fn open(config: &FloorConfig, notify: impl Fn(&[Action]) + 'static) -> Result<Self, WebError> {
        let window = web_sys::window().ok_or(WebError::NoWindow)?;
        let slot = LocalStorageSlot::from_window(config.storage_key.clone())?;
        let engine = Rc::new(RefCell::new(Engine::open(slot, config)));
        let hooks = Hooks { engine: Rc::downgrade(&engine), notify: Rc::new(notify) };
        let listeners = Rc::new(WindowListeners::new(window.into(), &hooks));
        debug!(key = %config.storage_key, "floor bound to window");
        Ok(Self { engine, surface: WindowSurface { listeners }, hooks })
    }

    /// Read-only access to the engine, `None` while a handler is running.
    pub fn with_engine<R>(&self, read: impl FnOnce(&BrowserEngine) -> R) -> Option<R> {
        match self.engine.try_borrow() {
            Ok(engine) => Some(read(&engine)),
            Err(_) => None,
        }
    }

    /// Run a command from the host UI (area tabs, edit toggle, editor buttons).
    pub fn run(&self, command: impl FnOnce(&mut BrowserEngine) -> Vec<Action>) -> Vec<Action> {
        self.hooks.run(command)
    }

    pub fn on_mouse_down(&mut self, event: &MouseEvent) {
        self.press(sample_from_mouse(event));
    }

    pub fn on_touch_start(&mut self, event: &TouchEvent) {
        if let Some(sample) = sample_from_touch(event) {
            self.press(sample);
        }
    }

    fn press(&mut self, sample: PointerSample) {
        let actions = match self.engine.try_borrow_mut() {
            Ok(mut engine) => engine.on_press(sample, &mut self.surface),
            Err(_) => {
                warn!("engine busy; press dropped");
                return;
            }
        };
        if !actions.is_empty() {
            (self.hooks.notify)(&actions);
        }
    }

    pub fn on_click(&self, event: &MouseEvent) {
        let sample = sample_from_mouse(event);
        self.hooks.run(|engine| engine.on_click(sample));
    }

    /// Decode `file` in the background and attach it to `area`. A file that
    /// cannot be read or is not an image leaves the area untouched.
    pub fn upload_background(&self, area: Area, file: File) {
        let hooks = self.hooks.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let decoded = read_image(&file).await;
            hooks.run(|engine| engine.attach_background(area, decoded));
        });
    }
}

/// Read a user-selected file into a data URI.
pub async fn read_image(file: &File) -> Result<EncodedImage, ImageError> {
    let buffer = JsFuture::from(file.array_buffer()).await.map_err(|e| ImageError::Read(js_message(&e)))?;
    let bytes = Uint8Array::new(&buffer).to_vec();
    encode_data_uri(&file.type_(), &bytes)
}
