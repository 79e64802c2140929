use std::path::Path;

use floor::doc::Status;

use super::*;

// =============================================================
// Helpers
// =============================================================

fn open(path: &Path) -> FileEngine {
    Engine::open(FileSlot::new(path), &FloorConfig::default())
}

fn store() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tabletrack.json");
    (dir, path)
}

fn here() -> AreaArg {
    AreaArg { area: None }
}

fn cell(engine: &FileEngine, area: Area, id: u32) -> Cell {
    engine.registry().tables(area).get(TableId(id)).unwrap().cell()
}

// =============================================================
// Area selection
// =============================================================

#[test]
fn area_arg_falls_back_to_configured_default() {
    let config = FloorConfig { default_area: Area::Bowling, ..FloorConfig::default() };
    assert_eq!(here().resolve(&config), Area::Bowling);
    assert_eq!(AreaArg { area: Some(Area::Patio) }.resolve(&config), Area::Patio);
}

#[test]
fn area_arg_parses_names_and_slugs() {
    let cli = Cli::try_parse_from(["tabletrack", "show", "--area", "main-bar"]).unwrap();
    assert!(matches!(cli.command, Command::Show { area: AreaArg { area: Some(Area::MainBar) }, .. }));
    assert!(Cli::try_parse_from(["tabletrack", "show", "--area", "Rooftop"]).is_err());
}

#[test]
fn select_switches_area_and_rejects_unknown_table() {
    let (_dir, path) = store();
    let mut engine = open(&path);
    let patio = AreaArg { area: Some(Area::Patio) };

    let id = select(&mut engine, &patio, &FloorConfig::default(), 3).unwrap();
    assert_eq!(id, TableId(3));
    assert_eq!(engine.active_area(), Area::Patio);

    let err = select(&mut engine, &patio, &FloorConfig::default(), 9).unwrap_err();
    assert!(matches!(err, CliError::UnknownTable { area: Area::Patio, id: TableId(9) }));
}

// =============================================================
// Table commands
// =============================================================

#[tokio::test]
async fn server_name_is_stored_verbatim() {
    let (_dir, path) = store();
    let mut engine = open(&path);
    let command = Command::Server { id: 2, name: "  Ana ".into(), area: here() };
    run(&mut engine, &FloorConfig::default(), command).await.unwrap();
    assert_eq!(open(&path).registry().tables(Area::MainBar).get(TableId(2)).unwrap().server, "  Ana ");
}

#[tokio::test]
async fn number_rejects_non_integer_text() {
    let (_dir, path) = store();
    let mut engine = open(&path);
    let command = Command::Number { id: 1, number: "12abc".into(), area: here() };
    let err = run(&mut engine, &FloorConfig::default(), command).await.unwrap_err();
    assert!(matches!(err, CliError::Number(_)));
    assert_eq!(engine.registry().tables(Area::MainBar).get(TableId(1)).unwrap().number, 1);
    assert!(!path.exists());
}

#[tokio::test]
async fn cycle_persists_to_store() {
    let (_dir, path) = store();
    let mut engine = open(&path);
    let command = Command::Cycle { id: 5, area: AreaArg { area: Some(Area::Dining) } };
    run(&mut engine, &FloorConfig::default(), command).await.unwrap();
    assert_eq!(open(&path).registry().tables(Area::Dining).get(TableId(5)).unwrap().status, Status::Sat);
}

// =============================================================
// Drag
// =============================================================

#[tokio::test]
async fn drag_moves_named_table_and_restores_service_mode() {
    let (_dir, path) = store();
    let mut engine = open(&path);
    let command = Command::Drag { id: 1, dx: 95.0, dy: 5.0, area: here() };
    run(&mut engine, &FloorConfig::default(), command).await.unwrap();

    assert!(!engine.is_edit_mode());
    assert_eq!(cell(&open(&path), Area::MainBar, 1), Cell::new(1, 0));
}

#[tokio::test]
async fn drag_moves_named_table_when_another_covers_it() {
    let (_dir, path) = store();
    let mut engine = open(&path);
    engine.move_table(TableId(2), Cell::new(0, 0));

    let command = Command::Drag { id: 1, dx: 95.0, dy: 5.0, area: here() };
    run(&mut engine, &FloorConfig::default(), command).await.unwrap();

    let stored = open(&path);
    assert_eq!(cell(&stored, Area::MainBar, 1), Cell::new(1, 0));
    assert_eq!(cell(&stored, Area::MainBar, 2), Cell::new(0, 0));
}

#[test]
fn drag_keeps_edit_mode_when_already_editing() {
    let (_dir, path) = store();
    let mut engine = open(&path);
    engine.toggle_edit_mode();
    run_drag(&mut engine, TableId(4), 0.0, 180.0).unwrap();
    assert!(engine.is_edit_mode());
    assert_eq!(cell(&engine, Area::MainBar, 4), Cell::new(0, 3));
}

#[test]
fn drag_of_unknown_table_fails() {
    let (_dir, path) = store();
    let mut engine = open(&path);
    let err = run_drag(&mut engine, TableId(77), 90.0, 0.0).unwrap_err();
    assert!(matches!(err, CliError::DragNotStarted { id: TableId(77), .. }));
    assert!(!engine.is_edit_mode());
}

// =============================================================
// Background
// =============================================================

#[tokio::test]
async fn background_from_png_file() {
    let (dir, path) = store();
    let image = dir.path().join("patio.png");
    std::fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();
    let mut engine = open(&path);

    run_background(&mut engine, Area::Patio, image).await.unwrap();
    let stored = open(&path);
    let background = stored.registry().layout(Area::Patio).background.as_ref().unwrap();
    assert!(background.as_str().starts_with("data:image/png;base64,"));
    assert!(stored.registry().layout(Area::MainBar).background.is_none());
}

#[tokio::test]
async fn background_rejects_non_image() {
    let (dir, path) = store();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "hello").unwrap();
    let mut engine = open(&path);

    let err = run_background(&mut engine, Area::Dining, notes).await.unwrap_err();
    assert!(matches!(err, CliError::Background { area: Area::Dining, source: ImageError::NotAnImage { .. } }));
    assert!(engine.registry().layout(Area::Dining).background.is_none());
}

#[tokio::test]
async fn background_missing_file_is_read_error() {
    let (dir, path) = store();
    let mut engine = open(&path);
    let err = run_background(&mut engine, Area::Bowling, dir.path().join("gone.jpg")).await.unwrap_err();
    assert!(matches!(err, CliError::Background { source: ImageError::Read(_), .. }));
}
