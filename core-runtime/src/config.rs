//! # Ticker Configuration
//!
//! Resolves every setting the sync tool needs: the bucket and region of the
//! object store, the key of the full feed, the partial feed definitions, the
//! media prefix, logging, and the AWS credentials.
//!
//! ## Sources
//!
//! - A JSON file (default `config.json` in the working directory). A missing
//!   default file means "all defaults".
//! - [`TickerConfigBuilder`] for programmatic construction.
//! - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and `AWS_SESSION_TOKEN` for
//!   credentials. They are never read from the file.
//!
//! ## File format
//!
//! ```json
//! {
//!   "s3": { "bucket": "mybucket", "region": "eu-central-1", "media_path": "/ticktack/media" },
//!   "feeds": {
//!     "full": "/ticktack/ticker.json",
//!     "partial": [
//!       { "key": "/ticktack/ticker-initial.json", "max_items": 10 },
//!       { "key": "/ticktack/ticker-latest.json", "max_age": 300 }
//!     ]
//!   },
//!   "logging": { "level": "info", "format": "compact" }
//! }
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::TickerConfig;
//!
//! let config = TickerConfig::builder()
//!     .bucket("news-ticker")
//!     .region("us-east-1")
//!     .build()?;
//! assert_eq!(config.full_feed_key(), "ticktack/ticker.json");
//! ```

use crate::error::{Error, Result};
use crate::logging::{redact_if_sensitive, LogFormat, LoggingConfig};
use bridge_traits::time::LogLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_BUCKET: &str = "mybucket";
pub const DEFAULT_REGION: &str = "eu-central-1";
pub const DEFAULT_MEDIA_PATH: &str = "/ticktack/media";
pub const DEFAULT_FULL_FEED: &str = "/ticktack/ticker.json";
pub const DEFAULT_INITIAL_FEED: &str = "/ticktack/ticker-initial.json";
pub const DEFAULT_LATEST_FEED: &str = "/ticktack/ticker-latest.json";

/// Resolved configuration for one invocation.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    pub s3: S3Config,
    pub feeds: FeedsConfig,
    pub logging: LoggingSettings,

    /// Populated from the environment, never from the file
    #[serde(skip)]
    pub credentials: Option<AwsCredentials>,
}

impl std::fmt::Debug for TickerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickerConfig")
            .field("s3", &self.s3)
            .field("feeds", &self.feeds)
            .field("logging", &self.logging)
            .field(
                "credentials",
                &self.credentials.as_ref().map(|_| "AwsCredentials { ... }"),
            )
            .finish()
    }
}

/// Object store location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Prefix under which media objects are stored
    pub media_path: String,
    /// Override for S3-compatible services (e.g. `http://localhost:9000`)
    pub endpoint: Option<String>,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            region: DEFAULT_REGION.to_string(),
            media_path: DEFAULT_MEDIA_PATH.to_string(),
            endpoint: None,
        }
    }
}

/// Feed destinations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    /// Key of the complete snapshot, which is also read back on load
    pub full: String,
    pub partial: Vec<PartialFeedConfig>,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            full: DEFAULT_FULL_FEED.to_string(),
            partial: vec![
                PartialFeedConfig::new(DEFAULT_INITIAL_FEED).with_max_items(10),
                PartialFeedConfig::new(DEFAULT_LATEST_FEED).with_max_age(300),
            ],
        }
    }
}

/// A filtered view published under its own key.
///
/// Both limits are optional and compose as AND.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialFeedConfig {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i64>,
}

impl PartialFeedConfig {
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
}

/// Logging section of the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevel,
    pub format: LogFormat,
    pub filter: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            filter: None,
        }
    }
}

impl LoggingSettings {
    pub fn to_logging_config(&self) -> LoggingConfig {
        let config = LoggingConfig::default()
            .with_level(self.level)
            .with_format(self.format);
        match &self.filter {
            Some(filter) => config.with_filter(filter.clone()),
            None => config,
        }
    }
}

/// AWS access credentials
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl AwsCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Read credentials from the process environment.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary variable lookup.
    ///
    /// Returns `None` unless both the key id and the secret are set and non-empty.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let access_key_id = non_empty("AWS_ACCESS_KEY_ID")?;
        let secret_access_key = non_empty("AWS_SECRET_ACCESS_KEY")?;

        Some(Self {
            access_key_id,
            secret_access_key,
            session_token: non_empty("AWS_SESSION_TOKEN"),
        })
    }
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &redact_if_sensitive("secret_access_key", &self.secret_access_key),
            )
            .field(
                "session_token",
                &self
                    .session_token
                    .as_deref()
                    .map(|token| redact_if_sensitive("session_token", token)),
            )
            .finish()
    }
}

/// Object keys are written without a leading `/`.
pub fn normalize_key(key: &str) -> &str {
    key.strip_prefix('/').unwrap_or(key)
}

impl TickerConfig {
    pub fn builder() -> TickerConfigBuilder {
        TickerConfigBuilder::default()
    }

    /// Parse a configuration document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TickerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file. The file must exist.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Cannot read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&contents)
    }

    /// Load a configuration file, falling back to defaults when it is absent.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json_str(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Attach credentials from the process environment.
    pub fn with_env_credentials(mut self) -> Self {
        if self.credentials.is_none() {
            self.credentials = AwsCredentials::from_env();
        }
        self
    }

    /// Key of the full snapshot, without a leading `/`.
    pub fn full_feed_key(&self) -> &str {
        normalize_key(&self.feeds.full)
    }

    /// Media prefix without leading or trailing `/`.
    pub fn media_prefix(&self) -> &str {
        normalize_key(&self.s3.media_path).trim_end_matches('/')
    }

    /// Partial feeds with normalized keys.
    pub fn partial_feeds(&self) -> Vec<PartialFeedConfig> {
        self.feeds
            .partial
            .iter()
            .map(|feed| PartialFeedConfig {
                key: normalize_key(&feed.key).to_string(),
                ..feed.clone()
            })
            .collect()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Bucket, region and full feed key are not empty
    /// - Partial feed keys are unique and differ from the full feed key
    /// - `max_items` is positive and `max_age` is not negative
    pub fn validate(&self) -> Result<()> {
        if self.s3.bucket.trim().is_empty() {
            return Err(Error::Config("S3 bucket cannot be empty".to_string()));
        }

        if self.s3.region.trim().is_empty() {
            return Err(Error::Config("S3 region cannot be empty".to_string()));
        }

        if self.full_feed_key().is_empty() {
            return Err(Error::Config("Full feed key cannot be empty".to_string()));
        }

        let mut seen = HashSet::new();
        seen.insert(self.full_feed_key());

        for feed in &self.feeds.partial {
            let key = normalize_key(&feed.key);
            if key.is_empty() {
                return Err(Error::Config("Partial feed key cannot be empty".to_string()));
            }
            if !seen.insert(key) {
                return Err(Error::Config(format!(
                    "Feed key '{}' is used more than once",
                    key
                )));
            }
            if feed.max_items == Some(0) {
                return Err(Error::Config(format!(
                    "Feed '{}': max_items must be greater than 0",
                    key
                )));
            }
            if matches!(feed.max_age, Some(age) if age < 0) {
                return Err(Error::Config(format!(
                    "Feed '{}': max_age cannot be negative",
                    key
                )));
            }
        }

        Ok(())
    }
}

/// Builder for constructing [`TickerConfig`] instances.
///
/// Unset values keep their defaults. [`build()`](TickerConfigBuilder::build)
/// validates the result.
#[derive(Default)]
pub struct TickerConfigBuilder {
    s3: S3Config,
    feeds: FeedsConfig,
    logging: LoggingSettings,
    credentials: Option<AwsCredentials>,
}

impl TickerConfigBuilder {
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.s3.bucket = bucket.into();
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.s3.region = region.into();
        self
    }

    pub fn media_path(mut self, path: impl Into<String>) -> Self {
        self.s3.media_path = path.into();
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.s3.endpoint = Some(endpoint.into());
        self
    }

    pub fn full_feed(mut self, key: impl Into<String>) -> Self {
        self.feeds.full = key.into();
        self
    }

    /// Replace all partial feeds.
    pub fn partial_feeds(mut self, feeds: Vec<PartialFeedConfig>) -> Self {
        self.feeds.partial = feeds;
        self
    }

    /// Append one partial feed to the current list.
    pub fn partial_feed(mut self, feed: PartialFeedConfig) -> Self {
        self.feeds.partial.push(feed);
        self
    }

    pub fn logging(mut self, logging: LoggingSettings) -> Self {
        self.logging = logging;
        self
    }

    pub fn credentials(mut self, credentials: AwsCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn build(self) -> Result<TickerConfig> {
        let config = TickerConfig {
            s3: self.s3,
            feeds: self.feeds,
            logging: self.logging,
            credentials: self.credentials,
        };

        config.validate()?;

        Ok(config)
    }
}
