//! Terminal kanban board with mouse drag-and-drop reordering of columns and
//! cards, persisted to a local key-value file.

pub mod app;
pub mod board;
pub mod cli;
pub mod drag;
pub mod logging;
pub mod persistence;
pub mod realm;
pub mod settings;
pub mod theme;
pub mod ui;
