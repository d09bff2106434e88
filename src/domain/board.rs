use crate::domain::item::{Item, ItemId};
use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, str::FromStr};

/// The fixed set of board columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnId {
    Todo,
    Completed,
    Resources,
}

impl ColumnId {
    /// All columns in display order
    pub const ALL: [ColumnId; 3] = [Self::Todo, Self::Completed, Self::Resources];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Completed => "completed",
            Self::Resources => "resources",
        }
    }

    /// Display label of the column
    pub fn title(&self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::Completed => "Completed",
            Self::Resources => "Resources",
        }
    }

    /// What an item in this column is called
    pub fn item_noun(&self) -> &'static str {
        match self {
            Self::Resources => "Resource",
            Self::Todo | Self::Completed => "Task",
        }
    }

    /// Columns an item in this column can be moved to
    pub fn move_targets(&self) -> Vec<ColumnId> {
        Self::ALL.into_iter().filter(|c| c != self).collect()
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColumnId {
    type Err = BoardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "completed" => Ok(Self::Completed),
            "resources" => Ok(Self::Resources),
            _ => Err(BoardError::ColumnNotFound(s.to_string())),
        }
    }
}

/// A board column and its items in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Column {
    pub fn new(id: ColumnId) -> Self {
        Self {
            id,
            title: id.title().to_string(),
            items: Vec::new(),
        }
    }

    pub fn position(&self, item_id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == item_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn default_true() -> bool {
    true
}

fn default_title() -> String {
    "Team Kanban Board".to_string()
}

fn default_subtitle() -> String {
    "Daily Task Management".to_string()
}

/// User facing board settings, persisted with the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSettings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
    #[serde(default = "default_true")]
    pub enable_timestamps: bool,
    #[serde(default = "default_true")]
    pub enable_priority: bool,
    #[serde(default = "default_true")]
    pub auto_save: bool,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: default_subtitle(),
            enable_timestamps: true,
            enable_priority: true,
            auto_save: true,
        }
    }
}

/// Item counts per column plus the total
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardCounts {
    per_column: BTreeMap<ColumnId, usize>,
    total: usize,
}

impl BoardCounts {
    pub fn get(&self, column: ColumnId) -> usize {
        self.per_column.get(&column).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColumnId, usize)> + '_ {
        self.per_column.iter().map(|(id, count)| (*id, *count))
    }
}

/// Kanban board state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub columns: Vec<Column>,
    #[serde(default)]
    pub settings: BoardSettings,
    #[serde(rename = "itemIdCounter")]
    pub next_item_number: u64,
}

impl Board {
    pub fn new(settings: BoardSettings) -> Self {
        Self {
            columns: ColumnId::ALL.into_iter().map(Column::new).collect(),
            settings,
            next_item_number: 1,
        }
    }

    /// Generates the next item ID.
    ///
    /// `u64::MAX` is never handed out; once the counter reaches it, minting
    /// fails instead of wrapping onto an id that may already exist.
    pub fn next_item_id(&mut self) -> Result<ItemId> {
        let next = self
            .next_item_number
            .checked_add(1)
            .ok_or(BoardError::CounterExhausted)?;
        let id = ItemId::new(self.next_item_number);
        self.next_item_number = next;
        Ok(id)
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|col| col.id == id)
    }

    pub fn column_mut(&mut self, id: ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|col| col.id == id)
    }

    /// Finds the column holding an item and the item's index in it
    pub fn locate(&self, item_id: &ItemId) -> Option<(ColumnId, usize)> {
        self.columns
            .iter()
            .find_map(|col| col.position(item_id).map(|idx| (col.id, idx)))
    }

    pub fn find_item(&self, item_id: &ItemId) -> Option<&Item> {
        self.columns
            .iter()
            .flat_map(|col| col.items.iter())
            .find(|item| &item.id == item_id)
    }

    pub fn find_item_mut(&mut self, item_id: &ItemId) -> Option<&mut Item> {
        self.columns
            .iter_mut()
            .flat_map(|col| col.items.iter_mut())
            .find(|item| &item.id == item_id)
    }

    /// Iterates over every item together with its column
    pub fn items(&self) -> impl Iterator<Item = (ColumnId, &Item)> + '_ {
        self.columns
            .iter()
            .flat_map(|col| col.items.iter().map(move |item| (col.id, item)))
    }

    /// Derived counts, recomputed on every call
    pub fn counters(&self) -> BoardCounts {
        let per_column: BTreeMap<ColumnId, usize> =
            self.columns.iter().map(|col| (col.id, col.len())).collect();
        let total = per_column.values().sum();
        BoardCounts { per_column, total }
    }

    /// Lowest counter that cannot re-mint any id on the board.
    ///
    /// Ids without a numeric suffix, and suffixes too large to step past,
    /// are skipped.
    pub fn counter_floor(&self) -> u64 {
        self.items()
            .filter_map(|(_, item)| item.id.number())
            .filter_map(|n| n.checked_add(1))
            .max()
            .unwrap_or(1)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_creation() {
        let board = Board::default();
        assert_eq!(board.next_item_number, 1);
        assert_eq!(
            board.columns.iter().map(|c| c.id).collect::<Vec<_>>(),
            ColumnId::ALL.to_vec()
        );
        assert!(board.columns.iter().all(Column::is_empty));
        assert_eq!(board.column(ColumnId::Todo).unwrap().title, "To Do");
    }

    #[test]
    fn test_next_item_id() {
        let mut board = Board::default();

        let id1 = board.next_item_id().unwrap();
        assert_eq!(id1.as_str(), "task-1");

        let id2 = board.next_item_id().unwrap();
        assert_eq!(id2.as_str(), "task-2");
        assert_eq!(board.next_item_number, 3);
    }

    #[test]
    fn test_next_item_id_exhausted_counter() {
        let mut board = Board::default();
        board.next_item_number = u64::MAX - 1;

        let last = board.next_item_id().unwrap();
        assert_eq!(last.number(), Some(u64::MAX - 1));

        assert!(matches!(
            board.next_item_id(),
            Err(BoardError::CounterExhausted)
        ));
        assert_eq!(board.next_item_number, u64::MAX);
    }

    #[test]
    fn test_column_id_parsing() {
        assert_eq!(ColumnId::from_str("todo").unwrap(), ColumnId::Todo);
        assert_eq!(ColumnId::from_str("Completed").unwrap(), ColumnId::Completed);
        assert!(matches!(
            ColumnId::from_str("archive"),
            Err(BoardError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_move_targets_exclude_self() {
        assert_eq!(
            ColumnId::Todo.move_targets(),
            vec![ColumnId::Completed, ColumnId::Resources]
        );
        assert_eq!(
            ColumnId::Resources.move_targets(),
            vec![ColumnId::Todo, ColumnId::Completed]
        );
    }

    #[test]
    fn test_item_noun() {
        assert_eq!(ColumnId::Todo.item_noun(), "Task");
        assert_eq!(ColumnId::Resources.item_noun(), "Resource");
    }

    #[test]
    fn test_locate_and_counters() {
        let mut board = Board::default();
        let id = board.next_item_id().unwrap();
        board
            .column_mut(ColumnId::Resources)
            .unwrap()
            .items
            .push(Item::new(id.clone(), "Docs".to_string()));

        assert_eq!(board.locate(&id), Some((ColumnId::Resources, 0)));
        assert_eq!(board.find_item(&id).unwrap().title, "Docs");

        let counts = board.counters();
        assert_eq!(counts.get(ColumnId::Resources), 1);
        assert_eq!(counts.get(ColumnId::Todo), 0);
        assert_eq!(counts.total(), 1);
    }

    #[test]
    fn test_counter_floor_skips_malformed_ids() {
        let mut board = Board::default();
        let todo = board.column_mut(ColumnId::Todo).unwrap();
        todo.items.push(Item::new(ItemId::from("task-4"), "A".to_string()));
        todo.items.push(Item::new(ItemId::from("custom"), "B".to_string()));
        todo.items.push(Item::new(ItemId::from("task-x9"), "C".to_string()));

        assert_eq!(board.counter_floor(), 5);
        assert_eq!(Board::default().counter_floor(), 1);
    }

    #[test]
    fn test_counter_floor_skips_unbumpable_suffix() {
        let mut board = Board::default();
        let todo = board.column_mut(ColumnId::Todo).unwrap();
        todo.items.push(Item::new(ItemId::new(u64::MAX), "Edge".to_string()));
        todo.items.push(Item::new(ItemId::new(4_294_967_295), "Big".to_string()));

        assert_eq!(board.counter_floor(), 4_294_967_296);
    }

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let settings: BoardSettings = serde_json::from_str(r#"{"title":"Ops"}"#).unwrap();
        assert_eq!(settings.title, "Ops");
        assert_eq!(settings.subtitle, "Daily Task Management");
        assert!(settings.auto_save);
    }
}
