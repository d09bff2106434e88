use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Saved state could not be parsed: {0}")]
    Parse(String),

    #[error("Item id counter exhausted; no new ids can be minted")]
    CounterExhausted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BoardError {
    /// True for the unknown item / unknown column family
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ItemNotFound(_) | Self::ColumnNotFound(_))
    }
}
