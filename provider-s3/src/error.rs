//! Error types for the S3 provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// S3 provider errors
#[derive(Error, Debug)]
pub enum S3Error {
    /// The configured endpoint cannot be used
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Request signing failed
    #[error("Signing failed: {0}")]
    Signing(String),

    /// S3 answered with a non-success status
    #[error("S3 error (status {status_code}): {code}: {message}")]
    Api {
        status_code: u16,
        code: String,
        message: String,
    },

    /// Bridge error
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Result type for S3 operations
pub type Result<T> = std::result::Result<T, S3Error>;

impl S3Error {
    /// Build an API error from an S3 XML error document.
    pub fn from_response(status_code: u16, body: &[u8]) -> Self {
        let body = String::from_utf8_lossy(body);
        let code = extract_tag(&body, "Code").unwrap_or("Unknown").to_string();
        let message = extract_tag(&body, "Message")
            .map(str::to_string)
            .unwrap_or_else(|| body.trim().to_string());

        S3Error::Api {
            status_code,
            code,
            message,
        }
    }
}

fn extract_tag<'a>(body: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(&body[start..end])
}

impl From<S3Error> for BridgeError {
    fn from(error: S3Error) -> Self {
        match error {
            S3Error::InvalidEndpoint(msg) => {
                BridgeError::NotAvailable(format!("S3 endpoint: {}", msg))
            }
            S3Error::Signing(msg) => {
                BridgeError::OperationFailed(format!("Signing failed: {}", msg))
            }
            S3Error::Api {
                status_code,
                code,
                message,
            } => BridgeError::Remote {
                status_code,
                message: format!("{}: {}", code, message),
            },
            S3Error::Bridge(e) => e,
        }
    }
}
