//! Persistence gateway: the whole area registry in one durable key-value slot.
//!
//! DESIGN
//! ======
//! A [`StorageSlot`] is a single named value that can be read and overwritten.
//! The browser backs it with `localStorage` (see `web`), the CLI with a file,
//! and tests with memory. [`Gateway`] layers the registry's JSON contract on
//! top: loading never fails (absent or corrupt state becomes the default
//! registry) and saving is fire-and-forget (failures are logged, not returned).

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, error, warn};

use crate::area::AreaRegistry;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("persisted state is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Storage(String),
}

/// One durable, overwritable string value.
pub trait StorageSlot {
    /// Current contents, or `None` when nothing was ever written.
    fn read(&self) -> Result<Option<String>, PersistError>;

    /// Replace the contents. Must be complete when this returns.
    fn write(&mut self, value: &str) -> Result<(), PersistError>;
}

/// In-memory slot. Clones share the same value, so a test can keep a handle
/// while an engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    value: Rc<RefCell<Option<String>>>,
}

impl MemorySlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with `value`.
    #[must_use]
    pub fn with_value(value: impl Into<String>) -> Self {
        Self { value: Rc::new(RefCell::new(Some(value.into()))) }
    }

    /// The stored value, if any.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.value.borrow().clone()
    }
}

impl StorageSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>, PersistError> {
        Ok(self.contents())
    }

    fn write(&mut self, value: &str) -> Result<(), PersistError> {
        *self.value.borrow_mut() = Some(value.to_string());
        Ok(())
    }
}

/// Slot stored as a single file. Writes go to a sibling temp file that is then
/// renamed over the target, so a crash never leaves a half-written registry.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StorageSlot for FileSlot {
    fn read(&self) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, value: &str) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Serializes the registry into a slot and back.
#[derive(Debug)]
pub struct Gateway<S> {
    slot: S,
}

impl<S: StorageSlot> Gateway<S> {
    #[must_use]
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    #[must_use]
    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Read and parse the slot. `Ok(None)` means nothing was stored yet.
    pub fn try_load(&self) -> Result<Option<AreaRegistry>, PersistError> {
        let Some(raw) = self.slot.read()? else {
            return Ok(None);
        };
        let registry = serde_json::from_str(&raw)?;
        Ok(Some(registry))
    }

    /// Load the registry, falling back to defaults when the slot is empty,
    /// unreadable, or holds something that does not parse.
    pub fn load(&self) -> AreaRegistry {
        match self.try_load() {
            Ok(Some(registry)) => {
                debug!("restored floor layout from storage");
                registry
            }
            Ok(None) => {
                debug!("no stored floor layout, using defaults");
                AreaRegistry::new()
            }
            Err(e) => {
                warn!(error = %e, "discarding stored floor layout, using defaults");
                AreaRegistry::new()
            }
        }
    }

    /// Serialize the full registry and overwrite the slot.
    pub fn try_save(&mut self, registry: &AreaRegistry) -> Result<(), PersistError> {
        let raw = serde_json::to_string(registry)?;
        self.slot.write(&raw)
    }

    /// Save without reporting failure to the caller; errors are logged.
    pub fn save(&mut self, registry: &AreaRegistry) {
        if let Err(e) = self.try_save(registry) {
            error!(error = %e, "failed to persist floor layout");
        }
    }
}
