use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Remote request failed (status {status_code}): {message}")]
    Remote { status_code: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether the error reports a missing file or object rather than a failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            BridgeError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            BridgeError::Remote { status_code, .. } => *status_code == 404,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        let io = BridgeError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(io.is_not_found());

        let remote = BridgeError::Remote {
            status_code: 404,
            message: "NoSuchKey".to_string(),
        };
        assert!(remote.is_not_found());

        let denied = BridgeError::Remote {
            status_code: 403,
            message: "AccessDenied".to_string(),
        };
        assert!(!denied.is_not_found());
        assert!(!BridgeError::OperationFailed("boom".to_string()).is_not_found());
    }
}
