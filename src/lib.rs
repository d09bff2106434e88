//! # Team Board Core
//!
//! Board model and local persistence for the Team Kanban Board.
//!
//! This crate owns the columns and items of a single-user board, the
//! operations that mutate them, and the adapter that keeps them in a
//! device-local key-value store. Rendering stays with the host, which
//! talks to the core through [`Command`]s and the [`Presenter`] port.

pub mod app;
pub mod autosave;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod persistence;
pub mod presenter;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use app::BoardApp;
pub use autosave::AutoSave;
pub use config::PersistenceConfig;
pub use domain::{
    board::{Board, BoardCounts, BoardSettings, Column, ColumnId},
    item::{Item, ItemId, ItemPatch, Priority},
};
pub use error::{BoardError, Result};
pub use persistence::{LoadOutcome, PersistenceAdapter};
pub use presenter::{NoticeKind, Presenter};
pub use storage::KeyValueStore;
pub use store::{BoardStore, Command, Outcome};
