//! # Sync Coordinator
//!
//! Owns the working [`Dataset`] for one invocation and moves it between the
//! object store and the merge engine.
//!
//! ## Workflow
//!
//! 1. Fetch the full snapshot key. `NotFound` and `AccessDenied` mean "no prior
//!    data"; any other store error aborts.
//! 2. Decode the body once. Invalid JSON aborts so the remote copy is never
//!    clobbered; a JSON value that is not an object is treated as empty.
//! 3. Merge into a fresh dataset through the [`MergeEngine`].
//! 4. Apply the local mutation, if any.
//! 5. Upload the full dataset and each projected feed, concurrently.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::{Mutation, SyncConfig, SyncCoordinator};
//! use core_ticks::TickInput;
//!
//! let mut coordinator = SyncCoordinator::new(store, engine, config);
//! let summary = coordinator
//!     .run(Mutation::Set(TickInput::new("4").content("hello")))
//!     .await?;
//! println!("wrote {:?}", summary.written);
//! ```

use crate::error::{Result, SyncError};
use bridge_traits::storage::{ObjectFetch, ObjectStore, ObjectVisibility, PutObject};
use bytes::Bytes;
use core_runtime::config::normalize_key;
use core_ticks::{
    project, Dataset, FeedData, FeedDefinition, IncomingSnapshot, MergeEngine, MergeReport,
    SetOutcome, TickId, TickInput,
};
use futures::future::try_join_all;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Content type of every JSON object written by the coordinator
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Where the coordinator reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Key of the full snapshot
    pub full_key: String,

    /// Partial feeds written next to the full snapshot
    pub feeds: Vec<FeedDefinition>,
}

impl SyncConfig {
    /// Keys are stored without a leading `/`.
    pub fn new(full_key: impl AsRef<str>, feeds: Vec<FeedDefinition>) -> Self {
        Self {
            full_key: normalize_key(full_key.as_ref()).to_string(),
            feeds: feeds
                .into_iter()
                .map(|mut feed| {
                    feed.key = normalize_key(&feed.key).to_string();
                    feed
                })
                .collect(),
        }
    }
}

/// Snapshot body as fetched, or a document decoded elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotPayload {
    Raw(Bytes),
    Decoded(Value),
}

impl SnapshotPayload {
    /// Decode into an [`IncomingSnapshot`]. `key` only labels errors.
    pub fn decode(self, key: &str) -> Result<IncomingSnapshot> {
        let document = match self {
            SnapshotPayload::Raw(bytes) => {
                serde_json::from_slice::<Value>(&bytes).map_err(|e| {
                    SyncError::InvalidSnapshot {
                        key: key.to_string(),
                        reason: e.to_string(),
                    }
                })?
            }
            SnapshotPayload::Decoded(document) => document,
        };

        if !document.is_object() {
            warn!(key, "Remote snapshot is not an object, treating it as empty");
            return Ok(IncomingSnapshot::default());
        }

        IncomingSnapshot::from_value(document).map_err(|e| SyncError::InvalidSnapshot {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Local change applied between load and store
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Publish the remote state again without changes
    Republish,
    Set(TickInput),
    Delete(TickId),
}

/// Result of a full [`SyncCoordinator::run`]
#[derive(Debug)]
pub struct RunSummary {
    pub report: MergeReport,
    /// Outcome of a `Set` mutation
    pub outcome: Option<SetOutcome>,
    /// Keys written, full snapshot first
    pub written: Vec<String>,
}

pub struct SyncCoordinator {
    store: Arc<dyn ObjectStore>,
    engine: MergeEngine,
    config: SyncConfig,
    dataset: Dataset,
}

impl SyncCoordinator {
    pub fn new(store: Arc<dyn ObjectStore>, engine: MergeEngine, config: SyncConfig) -> Self {
        Self {
            store,
            engine,
            config,
            dataset: Dataset::new(),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The working copy
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Fetch the full snapshot and merge it into a fresh dataset.
    #[instrument(skip(self), fields(key = %self.config.full_key))]
    pub async fn load(&mut self) -> Result<MergeReport> {
        let payload = self.fetch().await?;
        self.dataset.flush();

        let Some(payload) = payload else {
            info!("No remote snapshot, starting empty");
            return Ok(MergeReport::default());
        };

        self.merge(payload).await
    }

    /// Merge a snapshot payload into the current dataset.
    pub async fn merge(&mut self, payload: SnapshotPayload) -> Result<MergeReport> {
        let snapshot = payload.decode(&self.config.full_key)?;
        let report = self
            .engine
            .load_snapshot(&mut self.dataset, snapshot)
            .await?;

        for failure in &report.failures {
            warn!(
                section = ?failure.section,
                index = failure.index,
                error = %failure.error,
                "Remote item rejected"
            );
        }
        Ok(report)
    }

    #[instrument(skip(self, input), fields(id = %input.id))]
    pub async fn set(&mut self, input: TickInput) -> Result<SetOutcome> {
        Ok(self.engine.set_tick(&mut self.dataset, input).await?)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub fn delete(&mut self, id: &TickId) {
        self.engine.delete_tick(&mut self.dataset, id);
    }

    /// Upload the full dataset and every partial feed.
    ///
    /// Returns the written keys, full snapshot first then feeds in
    /// configuration order.
    #[instrument(skip(self), fields(feeds = self.config.feeds.len()))]
    pub async fn store(&self) -> Result<Vec<String>> {
        let now = self.engine.clock().unix_timestamp();

        let mut objects = Vec::with_capacity(self.config.feeds.len() + 1);
        objects.push(json_object(
            &self.config.full_key,
            &FeedData::from(&self.dataset),
        )?);
        for feed in project(&self.dataset, &self.config.feeds, now) {
            debug!(key = %feed.key, live = feed.data.live.len(), "Projected feed");
            objects.push(json_object(&feed.key, &feed.data)?);
        }

        let keys: Vec<String> = objects.iter().map(|object| object.key.clone()).collect();
        try_join_all(
            objects
                .into_iter()
                .map(|object| self.store.put_object(object)),
        )
        .await?;

        info!(count = keys.len(), "Stored snapshot and feeds");
        Ok(keys)
    }

    /// Load, apply `mutation`, then store.
    pub async fn run(&mut self, mutation: Mutation) -> Result<RunSummary> {
        let report = self.load().await?;

        let outcome = match mutation {
            Mutation::Republish => None,
            Mutation::Set(input) => Some(self.set(input).await?),
            Mutation::Delete(id) => {
                self.delete(&id);
                None
            }
        };

        let written = self.store().await?;
        Ok(RunSummary {
            report,
            outcome,
            written,
        })
    }

    async fn fetch(&self) -> Result<Option<SnapshotPayload>> {
        match self.store.get_object(&self.config.full_key).await? {
            ObjectFetch::Found(bytes) => {
                debug!(bytes = bytes.len(), "Fetched remote snapshot");
                Ok(Some(SnapshotPayload::Raw(bytes)))
            }
            ObjectFetch::NotFound => Ok(None),
            ObjectFetch::AccessDenied => {
                warn!("Access denied on remote snapshot, treating it as empty");
                Ok(None)
            }
        }
    }
}

fn json_object(key: &str, data: &FeedData) -> Result<PutObject> {
    let body = serde_json::to_vec(data)?;
    Ok(PutObject::new(key, Bytes::from(body), JSON_CONTENT_TYPE)
        .visibility(ObjectVisibility::PublicRead))
}
