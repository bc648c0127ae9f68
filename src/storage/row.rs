//! Owned result rows.
//!
//! A rusqlite `Statement` borrows its `Connection`, so a streaming import
//! cannot keep one open across calls that also need the connection.
//! `Database::select` therefore drains the statement into a `Cursor` of
//! owned `Row`s which the caller then consumes at its own pace.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rusqlite::types::Value;
use serde_json::json;

/// One result row, keyed by lower-cased column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: IndexMap<String, Value>,
}

impl Row {
    pub(crate) fn from_pairs(pairs: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(name, value)| (name.to_lowercase(), value))
                .collect(),
        }
    }

    /// Raw value of a column. Unknown columns read as NULL.
    #[must_use]
    pub fn value(&self, column: &str) -> &Value {
        self.values.get(column).unwrap_or(&Value::Null)
    }

    /// Text value, converting numbers. NULL and blobs read as `None`.
    #[must_use]
    pub fn get_string(&self, column: &str) -> Option<String> {
        match self.value(column) {
            Value::Text(text) => Some(text.clone()),
            Value::Integer(n) => Some(n.to_string()),
            Value::Real(f) => Some(f.to_string()),
            Value::Null | Value::Blob(_) => None,
        }
    }

    /// Text value, with empty strings read as `None`.
    #[must_use]
    pub fn get_non_empty(&self, column: &str) -> Option<String> {
        self.get_string(column).filter(|s| !s.is_empty())
    }

    /// Integer value. NULL reads as 0.
    #[must_use]
    pub fn get_i64(&self, column: &str) -> i64 {
        match self.value(column) {
            Value::Integer(n) => *n,
            #[allow(clippy::cast_possible_truncation)]
            Value::Real(f) => *f as i64,
            Value::Text(text) => text.trim().parse().unwrap_or_default(),
            Value::Null | Value::Blob(_) => 0,
        }
    }

    /// Nullable boolean stored as an integer.
    #[must_use]
    pub fn get_bool(&self, column: &str) -> Option<bool> {
        match self.value(column) {
            Value::Null => None,
            Value::Text(text) => Some(matches!(text.as_str(), "1" | "true" | "TRUE" | "Y")),
            _ => Some(self.get_i64(column) != 0),
        }
    }

    /// Timestamp stored as Unix milliseconds or as RFC 3339 text.
    #[must_use]
    pub fn get_timestamp(&self, column: &str) -> Option<DateTime<Utc>> {
        match self.value(column) {
            Value::Integer(millis) => DateTime::from_timestamp_millis(*millis),
            Value::Text(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_blob(&self, column: &str) -> Option<Vec<u8>> {
        match self.value(column) {
            Value::Blob(bytes) => Some(bytes.clone()),
            Value::Text(text) => Some(text.clone().into_bytes()),
            _ => None,
        }
    }

    /// JSON object of every column. Blobs are reported by size.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .values
            .iter()
            .map(|(name, value)| {
                let json = match value {
                    Value::Null => serde_json::Value::Null,
                    Value::Integer(n) => json!(n),
                    Value::Real(f) => json!(f),
                    Value::Text(text) => json!(text),
                    Value::Blob(bytes) => json!(format!("<{} bytes>", bytes.len())),
                };
                (name.clone(), json)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

/// Rows of one query, consumed front to back.
#[derive(Debug, Default)]
pub struct Cursor {
    rows: VecDeque<Row>,
}

impl Cursor {
    #[must_use]
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows: rows.into() }
    }

    /// Rows not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl Iterator for Cursor {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::from_pairs([
            ("ID".to_string(), Value::Text("e1".to_string())),
            ("version".to_string(), Value::Integer(3)),
            ("is_locked".to_string(), Value::Integer(1)),
            ("created_on".to_string(), Value::Integer(1_700_000_000_000)),
            ("documentation".to_string(), Value::Null),
            ("image".to_string(), Value::Blob(vec![1, 2, 3])),
        ])
    }

    #[test]
    fn test_typed_getters() {
        let row = row();
        assert_eq!(row.get_string("id").as_deref(), Some("e1"));
        assert_eq!(row.get_i64("version"), 3);
        assert_eq!(row.get_string("version").as_deref(), Some("3"));
        assert_eq!(row.get_bool("is_locked"), Some(true));
        assert_eq!(row.get_string("documentation"), None);
        assert_eq!(row.get_i64("missing"), 0);
        assert_eq!(row.get_blob("image"), Some(vec![1, 2, 3]));
        assert_eq!(
            row.get_timestamp("created_on").unwrap().timestamp_millis(),
            1_700_000_000_000
        );
    }

    #[test]
    fn test_to_json() {
        let json = row().to_json();
        assert_eq!(json["id"], "e1");
        assert_eq!(json["version"], 3);
        assert_eq!(json["image"], "<3 bytes>");
        assert!(json["documentation"].is_null());
    }

    #[test]
    fn test_cursor_consumes_in_order() {
        let mut cursor = Cursor::new(vec![row(), Row::default()]);
        assert_eq!(cursor.remaining(), 2);
        assert_eq!(cursor.next().unwrap().get_i64("version"), 3);
        assert!(cursor.next().is_some());
        assert!(cursor.next().is_none());
    }
}
