//! # Amazon S3 Provider
//!
//! Implements the `ObjectStore` bridge trait for Amazon S3 (and S3-compatible
//! endpoints) on top of the `HttpClient` bridge.
//!
//! ## Overview
//!
//! This module provides:
//! - AWS Signature Version 4 request signing
//! - Object fetch, existence checks and public-read uploads
//! - Public URL construction for uploaded media

pub mod connector;
pub mod error;
pub mod signing;

pub use connector::S3Connector;
pub use error::{Result, S3Error};
pub use signing::{payload_hash, SigV4Signer};
