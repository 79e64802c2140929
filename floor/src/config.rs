//! Floor configuration parsed from environment variables.

use std::num::NonZeroU32;

use crate::area::{Area, UnknownArea};
use crate::consts::{DEFAULT_GRID_SIZE_PX, DEFAULT_STORAGE_KEY};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid FLOOR_GRID_SIZE {0:?}: expected a positive integer")]
    GridSize(String),
    #[error("FLOOR_STORAGE_KEY must not be empty")]
    EmptyStorageKey,
    #[error("invalid FLOOR_DEFAULT_AREA: {0}")]
    DefaultArea(#[from] UnknownArea),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorConfig {
    /// Pixels per grid cell.
    pub grid_size: NonZeroU32,
    /// Key of the durable slot.
    pub storage_key: String,
    /// Area shown at startup.
    pub default_area: Area,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            grid_size: NonZeroU32::new(DEFAULT_GRID_SIZE_PX).unwrap_or(NonZeroU32::MIN),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_area: Area::default(),
        }
    }
}

impl FloorConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `FLOOR_GRID_SIZE`: pixels per cell, default 90
    /// - `FLOOR_STORAGE_KEY`: default `tableTracker_areas_v1`
    /// - `FLOOR_DEFAULT_AREA`: area name or slug, default `Main Bar`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).into_iter().next())
    }

    /// Build config from any key lookup (environment, query string, test map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let grid_size = match lookup("FLOOR_GRID_SIZE") {
            Some(raw) => parse_grid_size(&raw)?,
            None => defaults.grid_size,
        };
        let storage_key = match lookup("FLOOR_STORAGE_KEY") {
            Some(raw) if raw.trim().is_empty() => return Err(ConfigError::EmptyStorageKey),
            Some(raw) => raw,
            None => defaults.storage_key,
        };
        let default_area = match lookup("FLOOR_DEFAULT_AREA") {
            Some(raw) => raw.parse()?,
            None => defaults.default_area,
        };

        Ok(Self { grid_size, storage_key, default_area })
    }
}

fn parse_grid_size(raw: &str) -> Result<NonZeroU32, ConfigError> {
    raw.trim()
        .parse::<NonZeroU32>()
        .map_err(|_| ConfigError::GridSize(raw.to_string()))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
