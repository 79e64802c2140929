use super::*;
use crate::area::Area;
use crate::doc::{Status, TableId};
use crate::image::EncodedImage;
use crate::snap::Cell;

/// Slot whose every operation fails.
struct BrokenSlot;

impl StorageSlot for BrokenSlot {
    fn read(&self) -> Result<Option<String>, PersistError> {
        Err(PersistError::Storage("quota exceeded".into()))
    }

    fn write(&mut self, _value: &str) -> Result<(), PersistError> {
        Err(PersistError::Storage("quota exceeded".into()))
    }
}

fn edited_registry() -> AreaRegistry {
    let mut registry = AreaRegistry::new();
    registry.edit_tables(Area::MainBar, |t| {
        t.cycle_status(TableId(1)).cycle_status(TableId(1)).set_server(TableId(2), "Sam")
    });
    registry.edit_tables(Area::Patio, |t| t.move_table(TableId(6), Cell::new(8, 5)));
    registry.set_background(Area::Bowling, EncodedImage::from_encoded("data:image/png;base64,iVBOR"));
    registry
}

// =============================================================
// Load
// =============================================================

#[test]
fn load_empty_slot_gives_defaults() {
    let gateway = Gateway::new(MemorySlot::new());
    assert_eq!(gateway.load(), AreaRegistry::new());
    assert!(gateway.try_load().unwrap().is_none());
}

#[test]
fn load_garbage_gives_defaults() {
    let gateway = Gateway::new(MemorySlot::with_value("{not json"));
    assert_eq!(gateway.load(), AreaRegistry::new());
    assert!(matches!(gateway.try_load(), Err(PersistError::Malformed(_))));
}

#[test]
fn load_wrong_shape_gives_defaults() {
    let gateway = Gateway::new(MemorySlot::with_value(r#"{"Main Bar": {"tables": "six"}}"#));
    assert_eq!(gateway.load(), AreaRegistry::new());
}

#[test]
fn load_zero_number_gives_defaults() {
    let raw = r#"{"Main Bar": {"tables": [{"id": 1, "number": 0, "server": "", "status": "sat", "col": 5, "row": 5}], "backgroundImage": null}}"#;
    let registry = Gateway::new(MemorySlot::with_value(raw)).load();
    assert_eq!(registry, AreaRegistry::new());
}

#[test]
fn load_unreadable_slot_gives_defaults() {
    let gateway = Gateway::new(BrokenSlot);
    assert_eq!(gateway.load(), AreaRegistry::new());
}

#[test]
fn load_bg_data_url_documents() {
    let raw = r#"{
        "Main Bar": {"tables": [{"id": 1, "number": 9, "server": "Li", "status": "food", "col": 3, "row": 0}], "bgDataUrl": null},
        "Bowling": {"tables": [], "bgDataUrl": "data:image/png;base64,AA=="},
        "Dining": {"tables": [], "bgDataUrl": null},
        "Patio": {"tables": [], "bgDataUrl": null}
    }"#;
    let registry = Gateway::new(MemorySlot::with_value(raw)).load();
    let table = registry.tables(Area::MainBar).get(TableId(1)).unwrap().clone();
    assert_eq!(table.number, 9);
    assert_eq!(table.status, Status::Food);
    assert!(registry.layout(Area::Bowling).background.is_some());
}

// =============================================================
// Save / round trip
// =============================================================

#[test]
fn save_then_load_roundtrips() {
    let registry = edited_registry();
    let slot = MemorySlot::new();
    let mut gateway = Gateway::new(slot.clone());
    gateway.save(&registry);

    assert!(slot.contents().is_some());
    assert_eq!(Gateway::new(slot).load(), registry);
}

#[test]
fn save_overwrites_previous_value() {
    let slot = MemorySlot::with_value("stale");
    let mut gateway = Gateway::new(slot.clone());
    gateway.save(&AreaRegistry::new());
    let stored = slot.contents().unwrap();
    assert!(stored.starts_with('{'));
    assert!(stored.contains("\"Patio\""));
}

#[test]
fn save_failure_is_swallowed() {
    let mut gateway = Gateway::new(BrokenSlot);
    gateway.save(&AreaRegistry::new());
    assert!(gateway.try_save(&AreaRegistry::new()).is_err());
}

// =============================================================
// FileSlot
// =============================================================

#[test]
fn file_slot_missing_file_reads_none() {
    let dir = tempfile::tempdir().unwrap();
    let slot = FileSlot::new(dir.path().join("floor.json"));
    assert!(slot.read().unwrap().is_none());
}

#[test]
fn file_slot_roundtrip_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("floor.json");
    let registry = edited_registry();

    let mut gateway = Gateway::new(FileSlot::new(&path));
    gateway.try_save(&registry).unwrap();

    assert!(path.exists());
    assert!(!dir.path().join("nested").join("floor.json.tmp").exists());
    assert_eq!(Gateway::new(FileSlot::new(&path)).load(), registry);
}

#[test]
fn file_slot_corrupt_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("floor.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();
    assert_eq!(Gateway::new(FileSlot::new(&path)).load(), AreaRegistry::new());
}
