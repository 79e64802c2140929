//! Areas of the restaurant and the registry that owns one layout per area.
//!
//! The set of areas is closed ([`Area::ALL`]); [`AreaRegistry`] always holds a
//! layout for every one of them. Layouts are replaced wholesale on each edit,
//! so a change to one area can never reach another.

#[cfg(test)]
#[path = "area_test.rs"]
mod area_test;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::doc::{TableId, Tables};
use crate::image::EncodedImage;

/// A physical area of the restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Area {
    #[default]
    #[serde(rename = "Main Bar")]
    MainBar,
    #[serde(rename = "Bowling")]
    Bowling,
    #[serde(rename = "Dining")]
    Dining,
    #[serde(rename = "Patio")]
    Patio,
}

impl Area {
    /// Number of areas.
    pub const COUNT: usize = 4;

    /// Every area, in display order.
    pub const ALL: [Area; Area::COUNT] = [Area::MainBar, Area::Bowling, Area::Dining, Area::Patio];

    /// Human-readable name, also used as the persisted key.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::MainBar => "Main Bar",
            Self::Bowling => "Bowling",
            Self::Dining => "Dining",
            Self::Patio => "Patio",
        }
    }

    /// Lowercase, hyphenated name for command lines and URLs.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::MainBar => "main-bar",
            Self::Bowling => "bowling",
            Self::Dining => "dining",
            Self::Patio => "patio",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::MainBar => 0,
            Self::Bowling => 1,
            Self::Dining => 2,
            Self::Patio => 3,
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown area {0:?}")]
pub struct UnknownArea(pub String);

impl FromStr for Area {
    type Err = UnknownArea;

    /// Accepts the display name or the slug, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(wanted) || a.slug().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownArea(s.to_string()))
    }
}

/// Tables and background for one area.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AreaLayout {
    pub tables: Tables,
    #[serde(rename = "backgroundImage", alias = "bgDataUrl", default)]
    pub background: Option<EncodedImage>,
}

/// One layout per [`Area`]; the unit of persistence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<Area, AreaLayout>")]
pub struct AreaRegistry {
    layouts: [AreaLayout; Area::COUNT],
}

impl Default for AreaRegistry {
    fn default() -> Self {
        Self { layouts: std::array::from_fn(|_| AreaLayout::default()) }
    }
}

impl AreaRegistry {
    /// Registry with the default layout in every area.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn layout(&self, area: Area) -> &AreaLayout {
        &self.layouts[area.index()]
    }

    #[must_use]
    pub fn tables(&self, area: Area) -> &Tables {
        &self.layout(area).tables
    }

    /// All areas with their layouts, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Area, &AreaLayout)> {
        Area::ALL.into_iter().map(|a| (a, self.layout(a)))
    }

    /// Replace an area's tables. Returns `false` when `tables` is the snapshot
    /// already stored, so callers can skip persisting.
    pub fn set_tables(&mut self, area: Area, tables: Tables) -> bool {
        let slot = &mut self.layouts[area.index()].tables;
        if Tables::same_snapshot(slot, &tables) {
            return false;
        }
        *slot = tables;
        true
    }

    /// Apply a table edit to one area, returning whether anything changed.
    pub fn edit_tables<F>(&mut self, area: Area, edit: F) -> bool
    where
        F: FnOnce(&Tables) -> Tables,
    {
        let next = edit(self.tables(area));
        self.set_tables(area, next)
    }

    /// Attach a background to one area, replacing any previous one.
    pub fn set_background(&mut self, area: Area, image: EncodedImage) {
        self.layouts[area.index()].background = Some(image);
    }
}

impl Serialize for AreaRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Area::COUNT))?;
        for (area, layout) in self.iter() {
            map.serialize_entry(&area, layout)?;
        }
        map.end()
    }
}

/// A persisted registry that breaks a table invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidLayout {
    #[error("area {area} has duplicate table id {id}")]
    DuplicateTableId { area: Area, id: TableId },
    #[error("area {area} table {id} has number 0")]
    ZeroNumber { area: Area, id: TableId },
}

impl TryFrom<BTreeMap<Area, AreaLayout>> for AreaRegistry {
    type Error = InvalidLayout;

    /// Areas absent from the map keep the default layout.
    fn try_from(mut map: BTreeMap<Area, AreaLayout>) -> Result<Self, Self::Error> {
        let mut registry = Self::new();
        for area in Area::ALL {
            let Some(layout) = map.remove(&area) else {
                continue;
            };
            if let Some(id) = layout.tables.duplicate_id() {
                return Err(InvalidLayout::DuplicateTableId { area, id });
            }
            if let Some(table) = layout.tables.iter().find(|t| t.number == 0) {
                return Err(InvalidLayout::ZeroNumber { area, id: table.id });
            }
            registry.layouts[area.index()] = layout;
        }
        Ok(registry)
    }
}
