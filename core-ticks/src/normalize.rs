//! Tick normalization
//!
//! Turns a [`TickInput`] into a canonical [`Tick`]. Falsy values (`null`,
//! `false`, `0`, `""`) count as absent and fall back to defaults.

use crate::error::{Result, TickError};
use crate::models::{value_kind, Media, Tick, TickId, TickInput};
use serde_json::Value;

/// Build a canonical tick. `now` supplies the default `time`.
///
/// `updated` is taken from the input when truthy and coercible to an integer,
/// otherwise it equals the resolved `time`.
pub fn normalize(input: &TickInput, now: i64) -> Result<Tick> {
    let id = TickId::from_value(&input.id)?;

    let content = match &input.content {
        Value::String(s) => s.clone(),
        Value::Number(n) if is_truthy(&input.content) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Array(_) | Value::Object(_) => {
            return Err(TickError::InvalidItem(format!(
                "content of tick {} must be text, got {}",
                id,
                value_kind(&input.content)
            )))
        }
        _ => String::new(),
    };

    let time = coerce_timestamp(&input.time).unwrap_or(now);
    let important = is_truthy(&input.important);
    let media = Media::from_value(&input.media)?;
    let updated = coerce_timestamp(&input.updated).unwrap_or(time);

    Ok(Tick {
        id,
        content,
        time,
        important,
        media,
        updated,
    })
}

/// JavaScript-style truthiness of a loose value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Integer seconds from a truthy number or numeric string.
///
/// Floats truncate toward zero. Strings use their leading integer prefix
/// (`"123abc"` is 123). Returns `None` for falsy or non-numeric values.
pub fn coerce_timestamp(value: &Value) -> Option<i64> {
    if !is_truthy(value) {
        return None;
    }
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

/// Numeric value of an explicit timestamp, accepting numbers only.
pub fn numeric_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        _ => None,
    }
}

fn parse_int_prefix(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_478_316_163;

    #[test]
    fn test_missing_id() {
        let input = TickInput::default();
        assert!(matches!(normalize(&input, NOW), Err(TickError::MissingId)));
    }

    #[test]
    fn test_defaults() {
        let tick = normalize(&TickInput::new("4"), NOW).unwrap();

        assert_eq!(tick.id.as_str(), "4");
        assert_eq!(tick.content, "");
        assert_eq!(tick.time, NOW);
        assert!(!tick.important);
        assert!(tick.media.is_none());
        assert_eq!(tick.updated, NOW);
    }

    #[test]
    fn test_updated_defaults_to_time() {
        let tick = normalize(&TickInput::new("4").content("a").time(100), NOW).unwrap();
        assert_eq!(tick.time, 100);
        assert_eq!(tick.updated, 100);

        let pinned = normalize(&TickInput::new("4").time(100).updated(250), NOW).unwrap();
        assert_eq!(pinned.updated, 250);
    }

    #[test]
    fn test_falsy_values_use_defaults() {
        let input = TickInput {
            id: json!(9),
            content: json!(""),
            time: json!(0),
            important: json!(0),
            media: json!(""),
            updated: json!(null),
        };
        let tick = normalize(&input, NOW).unwrap();

        assert_eq!(tick.id.as_str(), "9");
        assert_eq!(tick.time, NOW);
        assert!(!tick.important);
        assert!(tick.media.is_none());
        assert_eq!(tick.updated, NOW);
    }

    #[test]
    fn test_time_coercion() {
        let from_float = TickInput {
            time: json!(123.9),
            ..TickInput::new("1")
        };
        assert_eq!(normalize(&from_float, NOW).unwrap().time, 123);

        let from_string = TickInput {
            time: json!("1478316000xyz"),
            ..TickInput::new("1")
        };
        assert_eq!(normalize(&from_string, NOW).unwrap().time, 1_478_316_000);

        let garbage = TickInput {
            time: json!("soon"),
            ..TickInput::new("1")
        };
        assert_eq!(normalize(&garbage, NOW).unwrap().time, NOW);
    }

    #[test]
    fn test_important_is_truthy() {
        let input = TickInput {
            important: json!("yes"),
            ..TickInput::new("1")
        };
        assert!(normalize(&input, NOW).unwrap().important);
    }

    #[test]
    fn test_media_wrapping() {
        let tick = normalize(&TickInput::new("1").media_path("/tmp/cat.jpg"), NOW).unwrap();
        assert_eq!(tick.media, Some(Media::unresolved("/tmp/cat.jpg")));
        assert_eq!(tick.media.as_ref().map(Media::width), Some(0));

        let passthrough = TickInput {
            media: json!({"src": "https://x.s3.amazonaws.com/a.jpg", "w": 10, "h": 20}),
            ..TickInput::new("1")
        };
        assert_eq!(
            normalize(&passthrough, NOW).unwrap().media,
            Some(Media::resolved("https://x.s3.amazonaws.com/a.jpg", 10, 20))
        );
    }

    #[test]
    fn test_object_content_is_rejected() {
        let input = TickInput {
            content: json!({"text": "a"}),
            ..TickInput::new("1")
        };
        assert!(matches!(
            normalize(&input, NOW),
            Err(TickError::InvalidItem(_))
        ));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let input = TickInput {
            id: json!(12),
            content: json!("hello"),
            time: json!("300"),
            important: json!(1),
            media: json!("/tmp/a.jpg"),
            updated: json!(400),
        };
        let once = normalize(&input, NOW).unwrap();
        let twice = normalize(&TickInput::from(&once), NOW + 50).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("  42"), Some(42));
        assert_eq!(parse_int_prefix("-7days"), Some(-7));
        assert_eq!(parse_int_prefix("+5"), Some(5));
        assert_eq!(parse_int_prefix("x1"), None);
        assert_eq!(parse_int_prefix(""), None);
    }

    #[test]
    fn test_numeric_timestamp_accepts_numbers_only() {
        assert_eq!(numeric_timestamp(&json!(500)), Some(500));
        assert_eq!(numeric_timestamp(&json!(0)), Some(0));
        assert_eq!(numeric_timestamp(&json!("500")), None);
    }
}
