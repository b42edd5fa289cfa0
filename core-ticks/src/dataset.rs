//! The canonical live + tombstone collection.
//!
//! Live ticks stay sorted ascending by `updated` (stable, so equal stamps keep
//! insertion order). An id is never live and tombstoned at the same time.

use crate::error::{Result, TickError};
use crate::models::{Tick, TickId};
use indexmap::IndexSet;
use serde::Serialize;

/// What `upsert` did with a candidate tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Inserted,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dataset {
    #[serde(rename = "+")]
    live: Vec<Tick>,
    #[serde(rename = "-")]
    tombstones: IndexSet<TickId>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live ticks in ascending `updated` order
    pub fn live(&self) -> &[Tick] {
        &self.live
    }

    /// Tombstoned ids in first-deletion order
    pub fn tombstones(&self) -> &IndexSet<TickId> {
        &self.tombstones
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty() && self.tombstones.is_empty()
    }

    pub fn find(&self, id: &TickId) -> Option<&Tick> {
        self.live.iter().find(|tick| &tick.id == id)
    }

    pub fn find_tick(&self, id: &TickId) -> Result<&Tick> {
        self.find(id).ok_or_else(|| TickError::TickNotFound {
            id: id.to_string(),
        })
    }

    pub fn contains(&self, id: &TickId) -> bool {
        self.find(id).is_some()
    }

    pub fn is_tombstoned(&self, id: &TickId) -> bool {
        self.tombstones.contains(id)
    }

    /// Live ids in current sort order
    pub fn ids(&self) -> Vec<&TickId> {
        self.live.iter().map(|tick| &tick.id).collect()
    }

    /// Insert a new tick or apply the changed fields of an existing one.
    ///
    /// An existing record only takes `candidate.updated` when at least one of
    /// `content`, `time`, `important` or `media` differs. A new record clears
    /// its tombstone.
    pub fn upsert(&mut self, candidate: Tick) -> SetOutcome {
        let outcome = match self.live.iter().position(|tick| tick.id == candidate.id) {
            Some(index) => {
                let existing = &mut self.live[index];
                let mut changed = false;

                if existing.content != candidate.content {
                    existing.content = candidate.content;
                    changed = true;
                }
                if existing.time != candidate.time {
                    existing.time = candidate.time;
                    changed = true;
                }
                if existing.important != candidate.important {
                    existing.important = candidate.important;
                    changed = true;
                }
                if existing.media != candidate.media {
                    existing.media = candidate.media;
                    changed = true;
                }

                if changed {
                    existing.updated = candidate.updated;
                    SetOutcome::Updated
                } else {
                    SetOutcome::Unchanged
                }
            }
            None => {
                self.tombstones.shift_remove(&candidate.id);
                self.live.push(candidate);
                SetOutcome::Inserted
            }
        };

        self.sort();
        outcome
    }

    /// Remove the live tick (if any) and record the tombstone.
    ///
    /// Returns whether a live tick was removed.
    pub fn delete(&mut self, id: &TickId) -> bool {
        let before = self.live.len();
        self.live.retain(|tick| &tick.id != id);
        self.tombstones.insert(id.clone());
        self.live.len() != before
    }

    /// Pin the `updated` stamp of a live tick.
    pub fn set_updated(&mut self, id: &TickId, updated: i64) -> Result<()> {
        let tick = self
            .live
            .iter_mut()
            .find(|tick| &tick.id == id)
            .ok_or_else(|| TickError::TickNotFound {
                id: id.to_string(),
            })?;
        tick.updated = updated;
        self.sort();
        Ok(())
    }

    /// Empty both the live list and the tombstones.
    pub fn flush(&mut self) {
        self.live.clear();
        self.tombstones.clear();
    }

    fn sort(&mut self) {
        self.live.sort_by_key(|tick| tick.updated);
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
