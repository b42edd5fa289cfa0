use thiserror::Error;

#[derive(Error, Debug)]
pub enum TickError {
    #[error("No ID in tick data")]
    MissingId,

    #[error("Invalid tick data: {0}")]
    InvalidItem(String),

    #[error("No tick was found with id {id}")]
    TickNotFound { id: String },

    #[error("Media transport failed: {0}")]
    MediaTransport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TickError {
    /// Errors that concern one item and leave the rest of a batch valid.
    pub fn is_item_local(&self) -> bool {
        matches!(
            self,
            TickError::MissingId | TickError::InvalidItem(_) | TickError::TickNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TickError>;
