//! # Sync Module
//!
//! Reconciles the local working copy with the remote snapshot.
//!
//! ## Overview
//!
//! One invocation is a single cycle:
//! - Fetch the full snapshot from the object store (missing or denied means empty)
//! - Merge it into a fresh [`Dataset`](core_ticks::Dataset)
//! - Apply at most one local mutation
//! - Write the full snapshot and every partial feed back, each to its own key
//!
//! ## Components
//!
//! - **Sync Coordinator** (`coordinator`): the fetch/merge/mutate/store cycle

pub mod coordinator;
pub mod error;

pub use coordinator::{Mutation, RunSummary, SnapshotPayload, SyncConfig, SyncCoordinator};
pub use error::{Result, SyncError};
