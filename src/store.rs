//! In-memory owner of the board state.
//!
//! Every mutation takes `&mut self` and completes before returning, so no
//! caller can observe an item in two columns or in none.

use crate::domain::{
    item::{normalize_description, normalize_title},
    Board, BoardCounts, ColumnId, Item, ItemId, ItemPatch, Priority,
};
use crate::error::{BoardError, Result};
use log::debug;

/// A user intent coming from the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        column: ColumnId,
        title: String,
        description: Option<String>,
        priority: Option<Priority>,
    },
    Update {
        id: ItemId,
        patch: ItemPatch,
    },
    Delete {
        id: ItemId,
    },
    Move {
        id: ItemId,
        from: ColumnId,
        to: ColumnId,
    },
}

impl Command {
    /// Builds a move from raw column ids as carried by drag and drop payloads
    pub fn parse_move(id: &str, from: &str, to: &str) -> Result<Self> {
        Ok(Self::Move {
            id: id.parse()?,
            from: from.parse()?,
            to: to.parse()?,
        })
    }
}

/// Result of an applied command, telling the caller what to re-render
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Added { item: Item, column: ColumnId },
    Updated { item: Item, column: ColumnId },
    Deleted { item: Item, column: ColumnId },
    Moved { item: Item, from: ColumnId, to: ColumnId },
    /// The command succeeded without changing anything
    Unchanged { item: Item, column: ColumnId },
    /// The user declined a confirmation
    Cancelled,
}

impl Outcome {
    pub fn item(&self) -> Option<&Item> {
        match self {
            Self::Added { item, .. }
            | Self::Updated { item, .. }
            | Self::Deleted { item, .. }
            | Self::Moved { item, .. }
            | Self::Unchanged { item, .. } => Some(item),
            Self::Cancelled => None,
        }
    }

    /// Columns whose rendering is stale after this outcome
    pub fn affected_columns(&self) -> Vec<ColumnId> {
        match self {
            Self::Added { column, .. }
            | Self::Updated { column, .. }
            | Self::Deleted { column, .. } => vec![*column],
            Self::Moved { from, to, .. } => vec![*from, *to],
            Self::Unchanged { .. } | Self::Cancelled => Vec::new(),
        }
    }

    pub fn is_change(&self) -> bool {
        !self.affected_columns().is_empty()
    }
}

/// Sole owner and mutator of board state
#[derive(Debug, Default)]
pub struct BoardStore {
    board: Board,
    revision: u64,
    saved_revision: u64,
}

impl BoardStore {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            revision: 0,
            saved_revision: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    /// Adds a new item at the end of `column`
    pub fn add(
        &mut self,
        column: ColumnId,
        title: &str,
        description: Option<&str>,
        priority: Option<Priority>,
    ) -> Result<Item> {
        let title = normalize_title(title)?;
        // Resolve the column before minting so a failed add leaves the counter alone
        let slot = self
            .board
            .columns
            .iter()
            .position(|col| col.id == column)
            .ok_or_else(|| BoardError::ColumnNotFound(column.to_string()))?;

        let mut item = Item::new(self.board.next_item_id()?, title);
        item.description = normalize_description(description.map(str::to_string));
        item.priority = priority.unwrap_or_default();

        self.board.columns[slot].items.push(item.clone());
        self.bump();

        debug!("Added {} to {}", item.id, column);
        Ok(item)
    }

    /// Applies field changes to an existing item
    pub fn update(&mut self, item_id: &ItemId, patch: ItemPatch) -> Result<Item> {
        let item = self
            .board
            .find_item_mut(item_id)
            .ok_or_else(|| BoardError::ItemNotFound(item_id.to_string()))?;
        item.apply(patch)?;
        let updated = item.clone();
        self.bump();

        debug!("Updated {}", item_id);
        Ok(updated)
    }

    /// Removes an item from whichever column holds it
    pub fn delete(&mut self, item_id: &ItemId) -> Result<Item> {
        let (column, idx) = self
            .board
            .locate(item_id)
            .ok_or_else(|| BoardError::ItemNotFound(item_id.to_string()))?;
        let removed = self
            .board
            .column_mut(column)
            .map(|col| col.items.remove(idx))
            .ok_or_else(|| BoardError::ColumnNotFound(column.to_string()))?;
        self.bump();

        debug!("Deleted {} from {}", item_id, column);
        Ok(removed)
    }

    /// Moves an item from `source` to the end of `target`
    pub fn move_item(
        &mut self,
        item_id: &ItemId,
        source: ColumnId,
        target: ColumnId,
    ) -> Result<Item> {
        if self.board.column(target).is_none() {
            return Err(BoardError::ColumnNotFound(target.to_string()));
        }
        let from = self
            .board
            .column_mut(source)
            .ok_or_else(|| BoardError::ColumnNotFound(source.to_string()))?;
        let idx = from.position(item_id).ok_or_else(|| {
            BoardError::ItemNotFound(format!("{} in column {}", item_id, source))
        })?;

        if source == target {
            return Ok(from.items[idx].clone());
        }

        let mut item = from.items.remove(idx);
        item.touch();
        let moved = item.clone();
        // Target presence was checked above; the removal cannot be orphaned
        if let Some(to) = self.board.column_mut(target) {
            to.items.push(item);
        }
        self.bump();

        debug!("Moved {} from {} to {}", item_id, source, target);
        Ok(moved)
    }

    /// Read-only lookup across all columns
    pub fn find(&self, item_id: &ItemId) -> Option<&Item> {
        self.board.find_item(item_id)
    }

    /// Lookup returning the owning column as well
    pub fn locate(&self, item_id: &ItemId) -> Option<(ColumnId, &Item)> {
        let (column, idx) = self.board.locate(item_id)?;
        self.board
            .column(column)
            .and_then(|col| col.items.get(idx))
            .map(|item| (column, item))
    }

    pub fn counters(&self) -> BoardCounts {
        self.board.counters()
    }

    /// Routes a typed command to the matching operation
    pub fn apply(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::Add {
                column,
                title,
                description,
                priority,
            } => {
                let item = self.add(column, &title, description.as_deref(), priority)?;
                Ok(Outcome::Added { item, column })
            }
            Command::Update { id, patch } => {
                let item = self.update(&id, patch)?;
                let column = self.column_of(&id)?;
                Ok(Outcome::Updated { item, column })
            }
            Command::Delete { id } => {
                let column = self.column_of(&id)?;
                let item = self.delete(&id)?;
                Ok(Outcome::Deleted { item, column })
            }
            Command::Move { id, from, to } => {
                let item = self.move_item(&id, from, to)?;
                if from == to {
                    Ok(Outcome::Unchanged { item, column: from })
                } else {
                    Ok(Outcome::Moved { item, from, to })
                }
            }
        }
    }

    /// Number of mutations applied since the store was created
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True when mutations happened after the last successful save
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    /// Records that the board as of `revision` has been persisted
    pub fn mark_saved(&mut self, revision: u64) {
        self.saved_revision = revision;
    }

    fn column_of(&self, item_id: &ItemId) -> Result<ColumnId> {
        self.board
            .locate(item_id)
            .map(|(column, _)| column)
            .ok_or_else(|| BoardError::ItemNotFound(item_id.to_string()))
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}
