pub mod board;
pub mod item;

pub use board::{Board, BoardCounts, BoardSettings, Column, ColumnId};
pub use item::{Item, ItemId, ItemPatch, Priority};
