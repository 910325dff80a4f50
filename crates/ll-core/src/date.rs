//! Date encoding for stored records.
//!
//! Records carry a human-readable local date such as `Jan 5, 2024, 3:04:05 PM`.
//! Some historical writers put a narrow no-break space (U+202F) before the
//! AM/PM marker instead of an ordinary space. Both spellings are read; only
//! the ordinary space is written. A date that parses as neither is read as
//! missing so the rest of the record survives.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer};

/// Format used for writing and, after normalization, for reading.
pub const DATE_FORMAT: &str = "%b %-d, %Y, %-I:%M:%S %p";

const NARROW_NO_BREAK_SPACE: char = '\u{202F}';

/// Formats a date the way new log lines are written.
pub fn format(value: &NaiveDateTime) -> String {
    value.format(DATE_FORMAT).to_string()
}

/// Parses either historical date spelling.
pub fn parse(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let normalized = value.replace(NARROW_NO_BREAK_SPACE, " ");
    NaiveDateTime::parse_from_str(normalized.trim(), DATE_FORMAT)
}

pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(date) => serializer.serialize_str(&format(date)),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match parse(&raw) {
        Ok(date) => Ok(Some(date)),
        Err(e) => {
            tracing::warn!(date = %raw, error = %e, "unreadable record date");
            Ok(None)
        }
    }
}
