use bridge_traits::error::BridgeError;
use core_ticks::TickError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Remote snapshot {key} is not valid JSON: {reason}")]
    InvalidSnapshot { key: String, reason: String },

    #[error("Object store error: {0}")]
    Remote(#[from] BridgeError),

    #[error(transparent)]
    Tick(#[from] TickError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
