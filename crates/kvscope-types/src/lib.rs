//! Shared types for kvscope
//!
//! This crate contains data structures used across multiple kvscope crates.

use ratatui::style::Color;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================================================
// Wire Types
// ============================================================================

/// One page of keys as returned by `GET /api/db/{name}/keys`
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct KeyPage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keys: Vec<String>,

    /// Continuation token. The server omits the field, sends `null`, or sends
    /// an empty string when there is nothing left; all three mean `None`.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub next_key: Option<String>,
}

impl KeyPage {
    pub fn new(keys: Vec<String>, next_key: Option<String>) -> Self {
        Self { keys, next_key }
    }
}

/// A key and its value, used both as the `GET .../key/{key}` response and as
/// the `POST .../key` body
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

// ============================================================================
// Navigation Types
// ============================================================================

/// A `(cursor, prefix)` pair identifying one page of a listing
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PageSnapshot {
    /// `None` is the first page
    pub cursor: Option<String>,
    pub prefix: String,
}

impl PageSnapshot {
    pub fn new(cursor: Option<String>, prefix: impl Into<String>) -> Self {
        Self {
            cursor,
            prefix: prefix.into(),
        }
    }
}

/// Identifies one issued request so that its completion can be matched
/// against the request that is currently authoritative
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Return the next id in sequence
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Notice Types
// ============================================================================

/// Severity of a blocking notice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NoticeLevel {
    #[default]
    Info,
    Error,
}

impl NoticeLevel {
    /// Get display color for this level
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Cyan,
            Self::Error => Color::Red,
        }
    }

    /// Title shown on the notice popup
    pub fn title(&self) -> &'static str {
        match self {
            Self::Info => " Notice ",
            Self::Error => " Error ",
        }
    }
}

/// A message the user has to acknowledge before continuing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_page_next_key_variants() {
        let page: KeyPage = serde_json::from_str(r#"{"keys":["a","b"],"next_key":"c"}"#).unwrap();
        assert_eq!(page.next_key.as_deref(), Some("c"));

        let page: KeyPage = serde_json::from_str(r#"{"keys":["a"],"next_key":null}"#).unwrap();
        assert_eq!(page.next_key, None);

        let page: KeyPage = serde_json::from_str(r#"{"keys":["a"],"next_key":""}"#).unwrap();
        assert_eq!(page.next_key, None);

        let page: KeyPage = serde_json::from_str(r#"{"keys":["a"]}"#).unwrap();
        assert_eq!(page.next_key, None);
    }

    #[test]
    fn test_key_page_missing_keys() {
        let page: KeyPage = serde_json::from_str(r#"{"keys":null}"#).unwrap();
        assert!(page.keys.is_empty());

        let page: KeyPage = serde_json::from_str(r#"{}"#).unwrap();
        assert!(page.keys.is_empty());
    }

    #[test]
    fn test_key_value_body() {
        let body = serde_json::to_string(&KeyValue::new("user:1", "alice")).unwrap();
        assert_eq!(body, r#"{"key":"user:1","value":"alice"}"#);
    }

    #[test]
    fn test_request_id_sequence() {
        let id = RequestId::default();
        assert_eq!(id.next(), RequestId(1));
        assert_eq!(id.next().next().to_string(), "#2");
    }
}
