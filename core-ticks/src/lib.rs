//! # Ticks
//!
//! The data model and merge rules of the ticker.
//!
//! ## Overview
//!
//! - [`models`]: `Tick`, `Media`, loose `TickInput` and `IncomingSnapshot`
//! - [`normalize`]: loose input to canonical tick
//! - [`dataset`]: live ticks ordered by `updated`, plus tombstones
//! - [`merge`]: set/delete/snapshot merge with media resolution
//! - [`feeds`]: filtered projections for publishing
//!
//! Nothing in this crate performs I/O except through the injected
//! [`MediaResolver`].

pub mod dataset;
pub mod error;
pub mod feeds;
pub mod merge;
pub mod models;
pub mod normalize;

pub use dataset::{Dataset, SetOutcome};
pub use error::{Result, TickError};
pub use feeds::{project, Feed, FeedData, FeedDefinition};
pub use merge::{
    ItemFailure, ItemSection, MediaResolver, MergeEngine, MergeReport, PassthroughResolver,
    ResolveError,
};
pub use models::{IncomingSnapshot, Media, Tick, TickId, TickInput};
pub use normalize::normalize;
