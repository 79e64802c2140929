use super::*;

fn id(n: u32) -> TableId {
    TableId(n)
}

fn positions(tables: &Tables) -> Vec<(u32, u32)> {
    tables.iter().map(|t| (t.col, t.row)).collect()
}

// =============================================================
// Status
// =============================================================

#[test]
fn status_default_is_empty() {
    assert_eq!(Status::default(), Status::Empty);
}

#[test]
fn status_cycle_order() {
    assert_eq!(Status::Empty.next(), Status::Sat);
    assert_eq!(Status::Sat.next(), Status::Food);
    assert_eq!(Status::Food.next(), Status::Touched);
    assert_eq!(Status::Touched.next(), Status::Empty);
}

#[test]
fn status_serde_names() {
    for status in Status::ALL {
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, format!("\"{}\"", status.as_str()));
    }
    let back: Status = serde_json::from_str("\"touched\"").unwrap();
    assert_eq!(back, Status::Touched);
}

#[test]
fn status_unknown_name_rejected() {
    assert!(serde_json::from_str::<Status>("\"seated\"").is_err());
}

#[test]
fn status_swatches_distinct() {
    let swatches: std::collections::HashSet<_> = Status::ALL.iter().map(|s| s.swatch()).collect();
    assert_eq!(swatches.len(), Status::ALL.len());
}

// =============================================================
// Default layout
// =============================================================

#[test]
fn default_layout_is_three_by_two() {
    let tables = Tables::default_layout();
    assert_eq!(tables.len(), 6);
    assert_eq!(positions(&tables), vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    let numbers: Vec<u32> = tables.iter().map(|t| t.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    assert!(tables.iter().all(|t| t.status == Status::Empty && t.server.is_empty()));
    assert!(tables.duplicate_id().is_none());
}

#[test]
fn server_label_falls_back() {
    let tables = Tables::default_layout();
    let t = tables.get(id(1)).unwrap();
    assert_eq!(t.server_label(), "No server");
    let named = tables.set_server(id(1), "Ana");
    assert_eq!(named.get(id(1)).unwrap().server_label(), "Ana");
}

// =============================================================
// cycle_status
// =============================================================

#[test]
fn cycle_status_advances_only_target() {
    let tables = Tables::default_layout();
    let next = tables.cycle_status(id(3));
    assert_eq!(next.get(id(3)).unwrap().status, Status::Sat);
    assert!(next.iter().filter(|t| t.id != id(3)).all(|t| t.status == Status::Empty));
}

#[test]
fn cycle_status_four_times_returns_to_empty() {
    let mut tables = Tables::default_layout();
    for _ in 0..4 {
        tables = tables.cycle_status(id(1));
    }
    assert_eq!(tables.get(id(1)).unwrap().status, Status::Empty);
}

#[test]
fn cycle_status_unknown_id_is_same_snapshot() {
    let tables = Tables::default_layout();
    let next = tables.cycle_status(id(99));
    assert!(Tables::same_snapshot(&tables, &next));
}

#[test]
fn cycle_status_leaves_original_untouched() {
    let tables = Tables::default_layout();
    let next = tables.cycle_status(id(1));
    assert!(!Tables::same_snapshot(&tables, &next));
    assert_eq!(tables.get(id(1)).unwrap().status, Status::Empty);
}

// =============================================================
// set_server
// =============================================================

#[test]
fn set_server_assigns_and_clears() {
    let tables = Tables::default_layout().set_server(id(2), "Marco");
    assert_eq!(tables.get(id(2)).unwrap().server, "Marco");
    let cleared = tables.set_server(id(2), "");
    assert_eq!(cleared.get(id(2)).unwrap().server, "");
}

#[test]
fn set_server_same_value_is_same_snapshot() {
    let tables = Tables::default_layout().set_server(id(2), "Marco");
    let again = tables.set_server(id(2), "Marco");
    assert!(Tables::same_snapshot(&tables, &again));
}

#[test]
fn set_server_unknown_id_is_noop() {
    let tables = Tables::default_layout();
    assert!(Tables::same_snapshot(&tables, &tables.set_server(id(7), "X")));
}

// =============================================================
// set_number
// =============================================================

#[test]
fn set_number_parses_integer() {
    let tables = Tables::default_layout().set_number(id(1), "12").unwrap();
    assert_eq!(tables.get(id(1)).unwrap().number, 12);
}

#[test]
fn set_number_trims_whitespace() {
    let tables = Tables::default_layout().set_number(id(1), " 7 ").unwrap();
    assert_eq!(tables.get(id(1)).unwrap().number, 7);
}

#[test]
fn set_number_rejects_trailing_garbage() {
    let err = Tables::default_layout().set_number(id(1), "12abc").unwrap_err();
    assert_eq!(err.input, "12abc");
}

#[test]
fn set_number_rejects_empty_zero_negative() {
    let tables = Tables::default_layout();
    assert!(tables.set_number(id(1), "").is_err());
    assert!(tables.set_number(id(1), "0").is_err());
    assert!(tables.set_number(id(1), "-4").is_err());
    assert!(tables.set_number(id(1), "3.5").is_err());
}

#[test]
fn set_number_allows_duplicates() {
    let tables = Tables::default_layout().set_number(id(2), "1").unwrap();
    let ones = tables.iter().filter(|t| t.number == 1).count();
    assert_eq!(ones, 2);
}

// =============================================================
// move_table
// =============================================================

#[test]
fn move_table_sets_cell() {
    let tables = Tables::default_layout().move_table(id(6), Cell::new(7, 3));
    assert_eq!(tables.get(id(6)).unwrap().cell(), Cell::new(7, 3));
}

#[test]
fn move_table_to_same_cell_is_same_snapshot() {
    let tables = Tables::default_layout();
    let moved = tables.move_table(id(1), Cell::new(0, 0));
    assert!(Tables::same_snapshot(&tables, &moved));
}

#[test]
fn move_table_preserves_order() {
    let tables = Tables::default_layout().move_table(id(1), Cell::new(9, 9));
    let ids: Vec<u32> = tables.iter().map(|t| t.id.0).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
}

// =============================================================
// Serde
// =============================================================

#[test]
fn table_wire_shape() {
    let tables = Tables::default_layout();
    let json = serde_json::to_value(tables.get(id(4)).unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"id": 4, "number": 4, "server": "", "status": "empty", "col": 0, "row": 1})
    );
}

#[test]
fn duplicate_id_detected() {
    let mut list = Tables::default_layout().as_slice().to_vec();
    list[5].id = id(2);
    assert_eq!(Tables::new(list).duplicate_id(), Some(id(2)));
}
