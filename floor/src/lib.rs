//! Floor-plan engine for tracking restaurant tables across service areas.
//!
//! Each area (Main Bar, Bowling, Dining, Patio) holds an independent grid of
//! tables plus an optional background image. Servers tap a table to cycle its
//! status or assign a server; in edit mode tables are dragged on a snapping
//! grid and renumbered. The whole registry is written back to a single
//! storage slot after every change.
//!
//! The engine is host-agnostic: [`engine::EngineCore`] turns pointer samples
//! and editor commands into [`engine::Action`]s, and [`engine::Engine`] adds
//! persistence. The browser host lives in [`web`]; the `tabletrack` CLI
//! drives the same engine against a JSON file.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Table records, statuses, and copy-on-write table lists |
//! | [`area`] | Service areas and the per-area layout registry |
//! | [`snap`] | Grid snapping for drag deltas |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`input`] | Pointer samples, drag sessions, and editor state |
//! | [`hit`] | Table footprints and hit-testing |
//! | [`image`] | Background image encoding |
//! | [`persist`] | Storage slots and the registry gateway |
//! | [`config`] | Environment-driven configuration |
//! | [`web`] | Browser bindings (`localStorage`, DOM events) |
//! | [`consts`] | Shared numeric constants (grid size, zoom limits, etc.) |

pub mod area;
pub mod camera;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod image;
pub mod input;
pub mod persist;
pub mod snap;
pub mod web;
