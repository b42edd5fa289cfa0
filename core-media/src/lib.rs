//! # Media Module
//!
//! Content-addressed storage for images attached to ticks.
//!
//! ## Overview
//!
//! - [`hasher`]: streaming SHA-256 digests of local files
//! - [`inspect`]: format and dimension probing with the `image` crate
//! - [`store`]: idempotent uploads keyed by digest; implements
//!   [`core_ticks::MediaResolver`] so the merge engine can resolve local paths

pub mod error;
pub mod hasher;
pub mod inspect;
pub mod store;

pub use error::{MediaError, Result};
pub use hasher::{hash_bytes, ContentHasher};
pub use inspect::{inspect, inspect_jpeg, ImageInfo};
pub use store::{MediaStore, StoredMedia};
