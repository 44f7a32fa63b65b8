//! Template filters registered on every template set.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Output format of [`human_date`], e.g. `02 Jan 2024 at 15:04`.
pub const HUMAN_DATE_FORMAT: &str = "%d %b %Y at %H:%M";

/// Registers every Pressbox filter on `tera`.
pub fn register(tera: &mut Tera) {
    tera.register_filter("human_date", human_date);
}

/// Formats an RFC 3339 timestamp for people, in UTC.
///
/// Null and empty strings render as an empty string so optional dates need
/// no guard in the template:
///
/// ```text
/// {{ item.created | human_date }}
/// ```
pub fn human_date(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    match value {
        Value::Null => Ok(Value::String(String::new())),
        Value::String(raw) if raw.is_empty() => Ok(Value::String(String::new())),
        Value::String(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|time| {
                Value::String(time.with_timezone(&Utc).format(HUMAN_DATE_FORMAT).to_string())
            })
            .map_err(|error| {
                tera::Error::msg(format!("human_date: {raw:?} is not an RFC 3339 timestamp: {error}"))
            }),
        other => Err(tera::Error::msg(format!(
            "human_date expects a timestamp string, got {other}"
        ))),
    }
}
