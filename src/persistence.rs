//! Board (de)serialization against a [`KeyValueStore`].
//!
//! The whole board lives in a single JSON record. Loading never fails: a
//! missing record yields the default board and an unreadable one yields the
//! default board plus the reason, so the caller can show a notice.

use crate::config::PersistenceConfig;
use crate::domain::{
    item::normalize_description, Board, BoardSettings, Column, ColumnId, Item, ItemId,
};
use crate::error::{BoardError, Result};
use crate::storage::KeyValueStore;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// Bump when the record layout changes incompatibly
const STORAGE_VERSION: u32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BoardRecord<'a> {
    version: u32,
    columns: &'a [Column],
    settings: &'a BoardSettings,
    item_id_counter: u64,
}

/// Lenient shape used for reading; records written by older pages lack the
/// version and counter and carry extra presentation fields per column.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredBoard {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    columns: Vec<StoredColumn>,
    #[serde(default)]
    settings: BoardSettings,
    #[serde(default)]
    item_id_counter: Option<u64>,
}

/// Items stay raw so one malformed entry can be dropped on its own
#[derive(Deserialize)]
struct StoredColumn {
    id: String,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

/// What [`PersistenceAdapter::load`] found
#[derive(Debug)]
pub enum LoadOutcome {
    /// Saved state was read and restored
    Restored(Board),
    /// Nothing was saved yet
    Fresh(Board),
    /// Saved state was unreadable; defaults were used instead
    Recovered { board: Board, reason: BoardError },
}

impl LoadOutcome {
    pub fn board(&self) -> &Board {
        match self {
            Self::Restored(board) | Self::Fresh(board) => board,
            Self::Recovered { board, .. } => board,
        }
    }

    pub fn into_board(self) -> Board {
        match self {
            Self::Restored(board) | Self::Fresh(board) => board,
            Self::Recovered { board, .. } => board,
        }
    }

    /// The recovered error, if the load fell back to defaults
    pub fn recovered_from(&self) -> Option<&BoardError> {
        match self {
            Self::Recovered { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Saves and restores a board through a key-value store
pub struct PersistenceAdapter<S> {
    storage: S,
    config: PersistenceConfig,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, PersistenceConfig::default())
    }

    pub fn with_config(storage: S, config: PersistenceConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &PersistenceConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads the saved board, falling back to defaults on any failure
    pub async fn load(&self) -> LoadOutcome {
        let key = &self.config.storage_key;

        let raw = match self.storage.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("No saved board under '{}', starting fresh", key);
                return LoadOutcome::Fresh(Board::default());
            }
            Err(e) => {
                let reason = BoardError::Persistence(e.to_string());
                warn!("Error loading data from storage: {}", reason);
                return LoadOutcome::Recovered {
                    board: Board::default(),
                    reason,
                };
            }
        };

        match decode(&raw) {
            Ok(board) => {
                info!(
                    "Loaded board '{}' with {} items",
                    key,
                    board.counters().total()
                );
                LoadOutcome::Restored(board)
            }
            Err(reason) => {
                warn!("Error loading data from storage: {}", reason);
                LoadOutcome::Recovered {
                    board: Board::default(),
                    reason,
                }
            }
        }
    }

    /// Writes the whole board. Errors are reported, never fatal.
    pub async fn save(&self, board: &Board) -> Result<()> {
        let json = encode(board)?;
        self.storage
            .set(&self.config.storage_key, &json)
            .await
            .map_err(|e| {
                let err = match e {
                    BoardError::Persistence(msg) => BoardError::Persistence(msg),
                    other => BoardError::Persistence(other.to_string()),
                };
                warn!("Error saving data to storage: {}", err);
                err
            })
    }

    /// Drops the saved record
    pub async fn clear(&self) -> Result<()> {
        self.storage.remove(&self.config.storage_key).await
    }
}

/// Serializes a board into its stored JSON record
pub fn encode(board: &Board) -> Result<String> {
    let record = BoardRecord {
        version: STORAGE_VERSION,
        columns: &board.columns,
        settings: &board.settings,
        item_id_counter: board.next_item_number,
    };
    serde_json::to_string(&record).map_err(|e| BoardError::Persistence(e.to_string()))
}

/// Parses and normalizes a stored JSON record
pub fn decode(raw: &str) -> Result<Board> {
    let stored: StoredBoard =
        serde_json::from_str(raw).map_err(|e| BoardError::Parse(e.to_string()))?;

    if stored.version > STORAGE_VERSION {
        return Err(BoardError::Parse(format!(
            "Unsupported storage version {} (newest known is {})",
            stored.version, STORAGE_VERSION
        )));
    }

    let mut board = Board::new(stored.settings);
    let mut seen: HashSet<ItemId> = HashSet::new();

    for saved in stored.columns {
        let column_id = match saved.id.parse::<ColumnId>() {
            Ok(id) => id,
            Err(_) => {
                warn!(
                    "Dropping unknown column '{}' with {} items",
                    saved.id,
                    saved.items.len()
                );
                continue;
            }
        };
        let Some(column) = board.column_mut(column_id) else {
            continue;
        };

        for raw_item in saved.items {
            let mut item: Item = match serde_json::from_value(raw_item) {
                Ok(item) => item,
                Err(e) => {
                    warn!("Dropping unreadable item in column '{}': {}", column_id, e);
                    continue;
                }
            };
            let title = item.title.trim();
            if title.is_empty() {
                warn!("Dropping item {} with an empty title", item.id);
                continue;
            }
            if !seen.insert(item.id.clone()) {
                warn!("Dropping duplicate item {}", item.id);
                continue;
            }
            item.title = title.to_string();
            item.description = normalize_description(item.description.take());
            column.items.push(item);
        }
    }

    board.next_item_number = stored
        .item_id_counter
        .unwrap_or(1)
        .max(board.counter_floor())
        .max(1);

    Ok(board)
}
