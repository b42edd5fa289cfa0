//! # Merge Engine
//!
//! Applies local edits and remote snapshots to a [`Dataset`].
//!
//! ## Rules
//!
//! - A local `set` is stamped with the current time before normalization, so
//!   any real change moves the tick to the end of the ordering. A `set` that
//!   changes nothing leaves `updated` and the position untouched.
//! - Snapshot items are not stamped: they keep their own `updated`, or their
//!   `time` when they carry none.
//! - Tombstones of a snapshot are applied before its live items, so an id in
//!   both lists ends up live.
//! - A truthy `updated` carried by a snapshot item is pinned after the item is
//!   applied, which preserves remote recency across reloads.
//! - Media is resolved through a [`MediaResolver`]. Local failures leave the
//!   reference unresolved; transport failures abort.
//!
//! ## Usage
//!
//! ```ignore
//! use core_ticks::{Dataset, MergeEngine, TickInput, TickId};
//!
//! let engine = MergeEngine::new(resolver, clock);
//! let mut dataset = Dataset::new();
//! let report = engine.load_snapshot(&mut dataset, snapshot).await?;
//! engine.set_tick(&mut dataset, TickInput::new("4").content("hello")).await?;
//! engine.delete_tick(&mut dataset, &TickId::from("3"));
//! ```

use crate::dataset::{Dataset, SetOutcome};
use crate::error::{Result, TickError};
use crate::models::{IncomingSnapshot, Media, Tick, TickId, TickInput};
use crate::normalize::{is_truthy, normalize, numeric_timestamp};
use async_trait::async_trait;
use bridge_traits::time::Clock;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Media resolutions in flight while loading one snapshot.
const MEDIA_CONCURRENCY: usize = 4;

/// Failure to resolve a media reference.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The reference cannot be stored (missing file, unsupported format).
    /// The tick keeps its unresolved media.
    #[error("media unavailable: {0}")]
    Unavailable(String),

    /// The object store could not be reached. Fatal for the invocation.
    #[error("media transport failed: {0}")]
    Transport(String),
}

/// Turns unresolved media into stored media.
///
/// Implementations must return resolved or foreign references unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve(&self, media: &Media) -> std::result::Result<Media, ResolveError>;
}

/// Resolver that never uploads anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughResolver;

#[async_trait]
impl MediaResolver for PassthroughResolver {
    async fn resolve(&self, media: &Media) -> std::result::Result<Media, ResolveError> {
        Ok(media.clone())
    }
}

/// Where a rejected snapshot entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSection {
    Live,
    Tombstones,
}

/// One snapshot entry that could not be applied.
#[derive(Debug)]
pub struct ItemFailure {
    pub section: ItemSection,
    /// Position in the section's list
    pub index: usize,
    pub error: TickError,
}

/// Summary of a snapshot merge.
#[derive(Debug, Default)]
pub struct MergeReport {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub tombstoned: usize,
    pub failures: Vec<ItemFailure>,
}

impl MergeReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, outcome: SetOutcome) {
        match outcome {
            SetOutcome::Inserted => self.inserted += 1,
            SetOutcome::Updated => self.updated += 1,
            SetOutcome::Unchanged => self.unchanged += 1,
        }
    }
}

pub struct MergeEngine {
    resolver: Arc<dyn MediaResolver>,
    clock: Arc<dyn Clock>,
}

impl MergeEngine {
    pub fn new(resolver: Arc<dyn MediaResolver>, clock: Arc<dyn Clock>) -> Self {
        Self { resolver, clock }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Add a tick or update an existing one.
    #[instrument(skip(self, dataset, input), fields(id = %input.id))]
    pub async fn set_tick(&self, dataset: &mut Dataset, input: TickInput) -> Result<SetOutcome> {
        let candidate = self.prepare(input)?;
        let candidate = self.resolve_media(candidate).await?;
        let outcome = dataset.upsert(candidate);
        debug!(?outcome, "Tick applied");
        Ok(outcome)
    }

    /// Tombstone an id. Idempotent.
    pub fn delete_tick(&self, dataset: &mut Dataset, id: &TickId) {
        let removed = dataset.delete(id);
        debug!(id = %id, removed, "Tick deleted");
    }

    /// Pin `updated` of a live tick. Non-numeric values mean "now".
    pub fn set_updated_timestamp(
        &self,
        dataset: &mut Dataset,
        id: &TickId,
        time: &Value,
    ) -> Result<()> {
        let updated = numeric_timestamp(time).unwrap_or_else(|| self.clock.unix_timestamp());
        dataset.set_updated(id, updated)
    }

    /// Merge a remote snapshot.
    ///
    /// Malformed entries are collected in the report and skipped; every valid
    /// entry is still applied. Only media transport failures abort.
    #[instrument(
        skip_all,
        fields(live = snapshot.live.len(), tombstones = snapshot.tombstones.len())
    )]
    pub async fn load_snapshot(
        &self,
        dataset: &mut Dataset,
        snapshot: IncomingSnapshot,
    ) -> Result<MergeReport> {
        let mut report = MergeReport::default();
        let IncomingSnapshot { live, tombstones } = snapshot;

        for (index, value) in tombstones.iter().enumerate() {
            match TickId::from_value(value) {
                Ok(id) => {
                    self.delete_tick(dataset, &id);
                    report.tombstoned += 1;
                }
                Err(error) if !error.is_item_local() => return Err(error),
                Err(error) => {
                    warn!(index, error = %error, "Skipping malformed tombstone");
                    report.failures.push(ItemFailure {
                        section: ItemSection::Tombstones,
                        index,
                        error,
                    });
                }
            }
        }

        let mut prepared = Vec::with_capacity(live.len());
        for (index, value) in live.into_iter().enumerate() {
            let now = self.clock.unix_timestamp();
            let candidate = TickInput::from_value(value).and_then(|input| {
                normalize(&input, now).map(|tick| (tick, input.updated))
            });
            match candidate {
                Ok((tick, pinned)) => prepared.push((index, tick, pinned)),
                Err(error) if !error.is_item_local() => return Err(error),
                Err(error) => {
                    warn!(index, error = %error, "Skipping malformed tick");
                    report.failures.push(ItemFailure {
                        section: ItemSection::Live,
                        index,
                        error,
                    });
                }
            }
        }

        let resolved: Vec<_> = stream::iter(prepared)
            .map(|(index, tick, pinned)| async move {
                (index, self.resolve_media(tick).await, pinned)
            })
            .buffered(MEDIA_CONCURRENCY)
            .collect()
            .await;

        for (index, tick, pinned) in resolved {
            let tick = tick?;
            let id = tick.id.clone();
            report.record(dataset.upsert(tick));

            if is_truthy(&pinned) {
                if let Err(error) = self.set_updated_timestamp(dataset, &id, &pinned) {
                    if !error.is_item_local() {
                        return Err(error);
                    }
                    report.failures.push(ItemFailure {
                        section: ItemSection::Live,
                        index,
                        error,
                    });
                }
            }
        }

        info!(
            inserted = report.inserted,
            updated = report.updated,
            unchanged = report.unchanged,
            tombstoned = report.tombstoned,
            failed = report.failures.len(),
            "Snapshot merged"
        );

        Ok(report)
    }

    /// Normalize with `updated` stamped to now.
    fn prepare(&self, mut input: TickInput) -> Result<Tick> {
        let now = self.clock.unix_timestamp();
        input.updated = Value::from(now);
        normalize(&input, now)
    }

    async fn resolve_media(&self, mut tick: Tick) -> Result<Tick> {
        let Some(media) = tick.media.as_ref() else {
            return Ok(tick);
        };
        if media.is_resolved() {
            return Ok(tick);
        }

        match self.resolver.resolve(media).await {
            Ok(resolved) => {
                tick.media = Some(resolved);
                Ok(tick)
            }
            Err(ResolveError::Unavailable(reason)) => {
                warn!(id = %tick.id, reason = %reason, "Keeping unresolved media");
                Ok(tick)
            }
            Err(ResolveError::Transport(message)) => Err(TickError::MediaTransport(message)),
        }
    }
}
