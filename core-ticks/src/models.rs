//! Domain models for the ticker
//!
//! `Tick` and `Media` are the canonical, strongly typed records. `TickInput`
//! and `IncomingSnapshot` carry loosely typed data (CLI arguments, remote JSON)
//! until the normalizer turns them into canonical records.

use crate::error::{Result, TickError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use std::fmt;

// =============================================================================
// ID Type
// =============================================================================

/// External identifier of a tick.
///
/// Always a string on the wire; numeric ids are converted to their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TickId(String);

impl TickId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert a loosely typed id.
    ///
    /// `null` means the id is missing. Strings and numbers are accepted.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Err(TickError::MissingId),
            Value::String(s) => Ok(Self(s.clone())),
            Value::Number(n) => Ok(Self(number_to_string(n))),
            other => Err(TickError::InvalidItem(format!(
                "id must be a string or a number, got {}",
                value_kind(other)
            ))),
        }
    }
}

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TickId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TickId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for TickId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        TickId::from_value(&value).map_err(serde::de::Error::custom)
    }
}

fn number_to_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("{}", f as i64),
            Some(f) => f.to_string(),
            None => n.to_string(),
        }
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Media
// =============================================================================

/// Media attached to a tick.
///
/// A local path stays `Unresolved` until the media store has uploaded it. On
/// the wire both forms are `{src, w, h}`; an unresolved reference carries zero
/// dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MediaWire", into = "MediaWire")]
pub enum Media {
    Unresolved { path: String },
    Resolved { url: String, width: u32, height: u32 },
}

impl Media {
    pub fn unresolved(path: impl Into<String>) -> Self {
        Media::Unresolved { path: path.into() }
    }

    pub fn resolved(url: impl Into<String>, width: u32, height: u32) -> Self {
        Media::Resolved {
            url: url.into(),
            width,
            height,
        }
    }

    /// Path or URL, the `src` field on the wire
    pub fn src(&self) -> &str {
        match self {
            Media::Unresolved { path } => path,
            Media::Resolved { url, .. } => url,
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            Media::Unresolved { .. } => 0,
            Media::Resolved { width, .. } => *width,
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Media::Unresolved { .. } => 0,
            Media::Resolved { height, .. } => *height,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Media::Resolved { .. })
    }

    /// Convert the `media` field of a loose input.
    ///
    /// A non-empty string is a local path. An object must carry a string `src`.
    /// Anything else means "no media".
    pub fn from_value(value: &Value) -> Result<Option<Self>> {
        match value {
            Value::String(path) if !path.is_empty() => Ok(Some(Media::unresolved(path.clone()))),
            Value::Object(_) => {
                let wire: MediaWire = serde_json::from_value(value.clone()).map_err(|e| {
                    TickError::InvalidItem(format!("media object is malformed: {}", e))
                })?;
                Ok(Some(Media::from(wire)))
            }
            _ => Ok(None),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({ "src": self.src(), "w": self.width(), "h": self.height() })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MediaWire {
    src: String,
    #[serde(default, deserialize_with = "lenient_dimension")]
    w: u32,
    #[serde(default, deserialize_with = "lenient_dimension")]
    h: u32,
}

impl From<MediaWire> for Media {
    fn from(wire: MediaWire) -> Self {
        if wire.src.contains("://") {
            Media::Resolved {
                url: wire.src,
                width: wire.w,
                height: wire.h,
            }
        } else {
            Media::Unresolved { path: wire.src }
        }
    }
}

impl From<Media> for MediaWire {
    fn from(media: Media) -> Self {
        let (w, h) = (media.width(), media.height());
        let src = match media {
            Media::Unresolved { path } => path,
            Media::Resolved { url, .. } => url,
        };
        MediaWire { src, w, h }
    }
}

/// Dimensions written by older tools may be strings (`"640"`).
fn lenient_dimension<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(parsed.and_then(|v| u32::try_from(v).ok()).unwrap_or(0))
}

// =============================================================================
// Tick
// =============================================================================

/// One timestamped message in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub id: TickId,
    pub content: String,
    /// Authoring time, seconds since the epoch
    pub time: i64,
    pub important: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
    /// Last observed change; drives ordering and the recent-window feeds
    pub updated: i64,
}

/// Loosely typed tick fields, as found in remote snapshots or built from CLI
/// arguments.
///
/// Every field defaults to `null`. See [`crate::normalize::normalize`] for the
/// coercion rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickInput {
    pub id: Value,
    pub content: Value,
    pub time: Value,
    pub important: Value,
    pub media: Value,
    pub updated: Value,
}

impl TickInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Value::String(id.into()),
            ..Self::default()
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Value::String(content.into());
        self
    }

    pub fn time(mut self, time: i64) -> Self {
        self.time = Value::from(time);
        self
    }

    pub fn important(mut self, important: bool) -> Self {
        self.important = Value::Bool(important);
        self
    }

    /// Attach media by local path or URL
    pub fn media_path(mut self, path: impl Into<String>) -> Self {
        self.media = Value::String(path.into());
        self
    }

    pub fn media(mut self, media: &Media) -> Self {
        self.media = media.to_value();
        self
    }

    pub fn updated(mut self, updated: i64) -> Self {
        self.updated = Value::from(updated);
        self
    }

    /// Read one element of a snapshot's `+` list.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(TickError::InvalidItem(format!(
                "tick must be an object, got {}",
                value_kind(&value)
            )));
        }
        Ok(serde_json::from_value(value)?)
    }
}

impl From<&Tick> for TickInput {
    fn from(tick: &Tick) -> Self {
        Self {
            id: Value::String(tick.id.as_str().to_string()),
            content: Value::String(tick.content.clone()),
            time: Value::from(tick.time),
            important: Value::Bool(tick.important),
            media: tick.media.as_ref().map(Media::to_value).unwrap_or(Value::Null),
            updated: Value::from(tick.updated),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// A decoded remote snapshot before normalization: `{"+": [...], "-": [...]}`.
///
/// Items stay loosely typed so that one malformed entry can be reported
/// without rejecting the whole document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IncomingSnapshot {
    #[serde(rename = "+", default, deserialize_with = "null_as_empty")]
    pub live: Vec<Value>,
    #[serde(rename = "-", default, deserialize_with = "null_as_empty")]
    pub tombstones: Vec<Value>,
}

impl IncomingSnapshot {
    pub fn new(live: Vec<Value>, tombstones: Vec<Value>) -> Self {
        Self { live, tombstones }
    }

    /// Decode a snapshot document. The value must be a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(TickError::InvalidItem(format!(
                "snapshot must be an object, got {}",
                value_kind(&value)
            )));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty() && self.tombstones.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}
