use std::time::Duration;

/// Key under which the board record is stored
pub const DEFAULT_STORAGE_KEY: &str = "teamKanbanData";

/// Interval between automatic saves
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

/// Persistence settings for a board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceConfig {
    pub storage_key: String,
    pub autosave_interval: Duration,
}

impl PersistenceConfig {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval = interval;
        self
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
        }
    }
}
