use crate::error::BoardError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Unique identifier for a board item (e.g., task-1, task-2, task-100)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    const PREFIX: &'static str = "task-";

    /// Creates a new ItemId from a counter
    pub fn new(counter: u64) -> Self {
        Self(format!("{}{}", Self::PREFIX, counter))
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric suffix of the id, if it has one.
    ///
    /// Ids restored from saved state are not guaranteed to follow the
    /// `task-<n>` scheme; those return `None`.
    pub fn number(&self) -> Option<u64> {
        self.0
            .strip_prefix(Self::PREFIX)
            .and_then(|rest| rest.parse::<u64>().ok())
    }
}

impl FromStr for ItemId {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(BoardError::Validation("Item id cannot be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Priority of a board item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

impl FromStr for Priority {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(BoardError::Validation(format!(
                "Invalid priority '{}'. Valid priorities: low, medium, high",
                s
            ))),
        }
    }
}

/// A card on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Creates a new item with the given ID and title.
    ///
    /// Callers are expected to have validated the title with [`normalize_title`].
    pub fn new(id: ItemId, title: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            description: None,
            priority: Priority::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a patch after validating it. The item is untouched on error.
    pub fn apply(&mut self, patch: ItemPatch) -> Result<(), BoardError> {
        let title = patch.title.as_deref().map(normalize_title).transpose()?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = normalize_description(Some(description));
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        self.touch();
        Ok(())
    }

    /// Bumps `updated_at` to now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Human readable age of the item relative to `now`
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let days = (now - self.created_at).num_days();
        match days {
            d if d <= 0 => "Today".to_string(),
            1 => "Yesterday".to_string(),
            d if d < 7 => format!("{} days ago", d),
            _ => self.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Field changes for [`Item::apply`]. `None` leaves a field as it is; an
/// empty description clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
}

impl ItemPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Trims a title and rejects it when nothing is left
pub fn normalize_title(title: &str) -> Result<String, BoardError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(BoardError::Validation("Task title is required".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Trims a description; blank descriptions are stored as absent
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}
