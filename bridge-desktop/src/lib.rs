//! # Desktop Bridge Implementations
//!
//! Host implementations of the bridge traits used by the `ticktack` binary:
//!
//! - [`ReqwestHttpClient`] talks to the object store over rustls, retrying
//!   throttled and failed requests according to a `RetryPolicy`.
//! - [`TokioFileSystem`] reads media files from local disk.
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, TokioFileSystem};
//!
//! let http = ReqwestHttpClient::new()?;
//! let files = TokioFileSystem::new();
//! ```

mod filesystem;
mod http;

pub use filesystem::TokioFileSystem;
pub use http::ReqwestHttpClient;
