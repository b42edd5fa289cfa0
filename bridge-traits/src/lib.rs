//! # Host Bridge Traits
//!
//! Platform abstraction traits the ticker core is written against.
//!
//! ## Overview
//!
//! This crate defines the contract between the core crates and the concrete
//! adapters that talk to the outside world. Each trait represents a capability
//! the core requires but that is implemented elsewhere (desktop adapters,
//! cloud connectors, or test doubles).
//!
//! ## Traits
//!
//! ### Networking & I/O
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with retry and TLS
//! - [`ObjectStore`](storage::ObjectStore) - Remote object store holding snapshot, feeds and media
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Local file reads for media uploads
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Adapters
//! should convert provider-specific errors into it and keep the remote status
//! code when there is one.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so handles can be shared
//! across tasks behind an `Arc`.

pub mod error;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use storage::{
    FileMetadata, FileSystemAccess, ObjectFetch, ObjectStore, ObjectVisibility, PutObject,
};
pub use time::{Clock, FixedClock, LogLevel, SystemClock};
