//! Feed projection
//!
//! A feed is a filtered copy of the dataset published under its own key.
//! Filters only apply to live ticks; tombstones are always carried over so
//! that readers of any feed learn about deletions.

use crate::dataset::Dataset;
use crate::models::{Tick, TickId};
use serde::Serialize;

/// Destination key plus optional filters. Both filters compose as AND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDefinition {
    pub key: String,
    /// Keep only the last `n` live ticks in sort order
    pub max_items: Option<usize>,
    /// Keep only ticks with `now - updated <= max_age`
    pub max_age: Option<i64>,
}

impl FeedDefinition {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            max_items: None,
            max_age: None,
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    fn admits(&self, tick: &Tick, now: i64) -> bool {
        match self.max_age {
            Some(max_age) => now.saturating_sub(tick.updated) <= max_age,
            None => true,
        }
    }
}

/// Serialized body of a feed, same shape as the full snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedData {
    #[serde(rename = "+")]
    pub live: Vec<Tick>,
    #[serde(rename = "-")]
    pub tombstones: Vec<TickId>,
}

impl From<&Dataset> for FeedData {
    fn from(dataset: &Dataset) -> Self {
        Self {
            live: dataset.live().to_vec(),
            tombstones: dataset.tombstones().iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub key: String,
    pub data: FeedData,
}

/// Project the dataset through every definition, in definition order.
pub fn project(dataset: &Dataset, definitions: &[FeedDefinition], now: i64) -> Vec<Feed> {
    definitions
        .iter()
        .map(|definition| Feed {
            key: definition.key.clone(),
            data: project_one(dataset, definition, now),
        })
        .collect()
}

fn project_one(dataset: &Dataset, definition: &FeedDefinition, now: i64) -> FeedData {
    let live = dataset.live();
    let start = definition
        .max_items
        .map(|n| live.len().saturating_sub(n))
        .unwrap_or(0);

    FeedData {
        live: live[start..]
            .iter()
            .filter(|tick| definition.admits(tick, now))
            .cloned()
            .collect(),
        tombstones: dataset.tombstones().iter().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset_with(updated: &[i64], tombstones: &[&str]) -> Dataset {
        let mut dataset = Dataset::new();
        for (i, stamp) in updated.iter().enumerate() {
            dataset.upsert(Tick {
                id: TickId::new(format!("t{}", i)),
                content: String::new(),
                time: *stamp,
                important: false,
                media: None,
                updated: *stamp,
            });
        }
        for id in tombstones {
            dataset.delete(&TickId::from(*id));
        }
        dataset
    }

    fn ids(feed: &Feed) -> Vec<&str> {
        feed.data.live.iter().map(|tick| tick.id.as_str()).collect()
    }

    #[test]
    fn test_max_items_keeps_most_recent() {
        let dataset = dataset_with(&[10, 20, 30, 40, 50], &["x", "y"]);
        let feeds = project(&dataset, &[FeedDefinition::new("initial").with_max_items(2)], 0);

        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].key, "initial");
        assert_eq!(ids(&feeds[0]), vec!["t3", "t4"]);
        assert_eq!(
            feeds[0].data.tombstones,
            vec![TickId::from("x"), TickId::from("y")]
        );
    }

    #[test]
    fn test_max_items_larger_than_dataset() {
        let dataset = dataset_with(&[10, 20], &[]);
        let feeds = project(&dataset, &[FeedDefinition::new("k").with_max_items(10)], 0);
        assert_eq!(ids(&feeds[0]), vec!["t0", "t1"]);
    }

    #[test]
    fn test_max_age_window_is_inclusive() {
        let dataset = dataset_with(&[600, 700, 900, 1000], &[]);
        let feeds = project(&dataset, &[FeedDefinition::new("latest").with_max_age(300)], 1000);

        assert_eq!(ids(&feeds[0]), vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_filters_compose_as_and() {
        let dataset = dataset_with(&[100, 950, 960, 970], &[]);
        let definition = FeedDefinition::new("both").with_max_items(2).with_max_age(35);
        let feeds = project(&dataset, &[definition], 1000);

        assert_eq!(ids(&feeds[0]), vec!["t3"]);
    }

    #[test]
    fn test_empty_feed_still_carries_tombstones() {
        let dataset = dataset_with(&[10], &["gone"]);
        let feeds = project(&dataset, &[FeedDefinition::new("latest").with_max_age(5)], 1000);

        assert!(feeds[0].data.live.is_empty());
        assert_eq!(
            serde_json::to_value(&feeds[0].data).unwrap(),
            serde_json::json!({"+": [], "-": ["gone"]})
        );
    }

    #[test]
    fn test_max_age_with_extreme_updated() {
        let dataset = dataset_with(&[i64::MIN, 990, i64::MAX], &[]);
        let feeds = project(&dataset, &[FeedDefinition::new("latest").with_max_age(300)], 1000);

        assert_eq!(ids(&feeds[0]), vec!["t1", "t2"]);
    }

    #[test]
    fn test_unfiltered_definition_matches_dataset() {
        let dataset = dataset_with(&[1, 2, 3], &["z"]);
        let feeds = project(&dataset, &[FeedDefinition::new("all")], 0);
        assert_eq!(feeds[0].data, FeedData::from(&dataset));
    }
}
