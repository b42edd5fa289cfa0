use bridge_traits::error::BridgeError;
use core_ticks::ResolveError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Media file not found: {0}")]
    NotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Image processing error: {0}")]
    ImageError(String),

    #[error("Failed to read {path}: {source}")]
    Read { path: String, source: BridgeError },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Object store error: {0}")]
    Remote(BridgeError),

    #[error("Background task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, MediaError>;

impl From<MediaError> for ResolveError {
    fn from(error: MediaError) -> Self {
        match error {
            MediaError::Remote(e) => ResolveError::Transport(e.to_string()),
            other => ResolveError::Unavailable(other.to_string()),
        }
    }
}
