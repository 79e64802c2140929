//! Table model: table records, service status, and immutable table snapshots.
//!
//! This module defines what sits on a floor (`Table`, `Status`) and the
//! copy-on-write sequence that holds one area's tables (`Tables`). Every
//! mutating operation returns a new snapshot; when nothing changes (unknown
//! id, identical value) it hands back the same shared allocation, so callers
//! can detect "did anything change" with [`Tables::same_snapshot`].
//!
//! Data flows into this layer from persistence (JSON deserialization) and from
//! the engine (status cycling, editor saves, drag moves).

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_LAYOUT_COLS, DEFAULT_LAYOUT_ROWS};
use crate::snap::Cell;

/// Stable identifier for a table. Never reassigned once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(pub u32);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Service state of a table, in cycling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Nobody seated.
    #[default]
    Empty,
    /// Guests seated, waiting on food.
    Sat,
    /// Food delivered.
    Food,
    /// Server has checked back.
    Touched,
}

impl Status {
    /// All statuses in cycling order.
    pub const ALL: [Status; 4] = [Status::Empty, Status::Sat, Status::Food, Status::Touched];

    /// The status after this one; `Touched` wraps to `Empty`.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Empty => Self::Sat,
            Self::Sat => Self::Food,
            Self::Food => Self::Touched,
            Self::Touched => Self::Empty,
        }
    }

    /// Lowercase name as stored on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Sat => "sat",
            Self::Food => "food",
            Self::Touched => "touched",
        }
    }

    /// Legend color for this status as a CSS hex string.
    #[must_use]
    pub fn swatch(self) -> &'static str {
        match self {
            Self::Empty => "#D1D5DB",
            Self::Sat => "#FACC15",
            Self::Food => "#60A5FA",
            Self::Touched => "#4ADE80",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A table as stored in an area layout and on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Stable identifier.
    pub id: TableId,
    /// Number printed on the table. Not required to be unique.
    pub number: u32,
    /// Assigned server; empty means unassigned.
    pub server: String,
    /// Current service state.
    pub status: Status,
    /// Grid column.
    pub col: u32,
    /// Grid row.
    pub row: u32,
}

impl Table {
    /// Grid cell the table occupies.
    #[must_use]
    pub fn cell(&self) -> Cell {
        Cell::new(self.col, self.row)
    }

    /// Server name for display, or `"No server"` when unassigned.
    #[must_use]
    pub fn server_label(&self) -> &str {
        if self.server.is_empty() { "No server" } else { &self.server }
    }
}

/// Rejected table-number text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid table number {input:?}: expected a positive integer")]
pub struct NumberInputError {
    pub input: String,
}

/// Parse table-number text from an editor. Surrounding whitespace is ignored;
/// anything else that is not a positive integer is rejected.
pub fn parse_table_number(text: &str) -> Result<u32, NumberInputError> {
    match text.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(NumberInputError { input: text.to_string() }),
    }
}

/// Immutable, shareable snapshot of one area's tables, in draw order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tables(Arc<[Table]>);

impl Tables {
    /// Build a snapshot from a table list.
    #[must_use]
    pub fn new(tables: Vec<Table>) -> Self {
        Self(Arc::from(tables))
    }

    /// The canonical starting layout: six empty tables in a 3×2 grid, numbered 1–6.
    #[must_use]
    pub fn default_layout() -> Self {
        let tables = (0..DEFAULT_LAYOUT_ROWS)
            .flat_map(|row| (0..DEFAULT_LAYOUT_COLS).map(move |col| (col, row)))
            .zip(1u32..)
            .map(|((col, row), n)| Table {
                id: TableId(n),
                number: n,
                server: String::new(),
                status: Status::Empty,
                col,
                row,
            })
            .collect();
        Self::new(tables)
    }

    /// Tables in draw order.
    #[must_use]
    pub fn as_slice(&self) -> &[Table] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Table> {
        self.0.iter()
    }

    #[must_use]
    pub fn get(&self, id: TableId) -> Option<&Table> {
        self.0.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether both values share one allocation, i.e. no operation changed anything.
    #[must_use]
    pub fn same_snapshot(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// First id that appears more than once, if any.
    #[must_use]
    pub fn duplicate_id(&self) -> Option<TableId> {
        let mut seen = std::collections::HashSet::new();
        self.0.iter().map(|t| t.id).find(|id| !seen.insert(*id))
    }

    /// Advance a table's status to the next in the cycle.
    #[must_use]
    pub fn cycle_status(&self, id: TableId) -> Self {
        self.update(id, |t| {
            t.status = t.status.next();
        })
    }

    /// Assign a server; an empty name unassigns.
    #[must_use]
    pub fn set_server(&self, id: TableId, name: &str) -> Self {
        self.update(id, |t| {
            if t.server != name {
                t.server = name.to_string();
            }
        })
    }

    /// Set a table's number from editor text. Rejected text leaves every table untouched.
    pub fn set_number(&self, id: TableId, text: &str) -> Result<Self, NumberInputError> {
        let number = parse_table_number(text)?;
        Ok(self.update(id, |t| t.number = number))
    }

    /// Place a table on a grid cell.
    #[must_use]
    pub fn move_table(&self, id: TableId, cell: Cell) -> Self {
        self.update(id, |t| {
            t.col = cell.col;
            t.row = cell.row;
        })
    }

    /// Copy-on-write edit of one table. Returns `self` unchanged (same
    /// allocation) when the id is unknown or the edit leaves the table equal.
    fn update<F>(&self, id: TableId, edit: F) -> Self
    where
        F: FnOnce(&mut Table),
    {
        let Some(index) = self.0.iter().position(|t| t.id == id) else {
            return self.clone();
        };
        let mut edited = self.0[index].clone();
        edit(&mut edited);
        if edited == self.0[index] {
            return self.clone();
        }
        let mut tables = self.0.to_vec();
        tables[index] = edited;
        Self::new(tables)
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self::default_layout()
    }
}

impl<'a> IntoIterator for &'a Tables {
    type Item = &'a Table;
    type IntoIter = std::slice::Iter<'a, Table>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
