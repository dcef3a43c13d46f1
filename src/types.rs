// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions shared across the engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Payload attached to a message lookup.
///
/// The three populated variants preserve the three substitution behaviors:
/// a scalar selects a plural form (and fills `{0}`), a positional list fills
/// `{0}`/`{1}`/... placeholders, and a named map fills `{field}` placeholders.
///
/// `Named` uses a `BTreeMap` so the canonical byte encoding used for cache
/// fingerprints is independent of insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageData {
    #[default]
    None,
    Scalar(i64),
    Positional(Vec<String>),
    Named(BTreeMap<String, String>),
}

impl MessageData {
    /// Numeric value used for plural-form selection, if any.
    pub fn scalar(&self) -> Option<i64> {
        match self {
            MessageData::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    /// Value for a positional placeholder `{index}`.
    pub fn positional(&self, index: usize) -> Option<String> {
        match self {
            MessageData::Scalar(value) if index == 0 => Some(value.to_string()),
            MessageData::Positional(items) => items.get(index).cloned(),
            _ => None,
        }
    }

    /// Value for a named placeholder `{field}`.
    pub fn named(&self, field: &str) -> Option<&str> {
        match self {
            MessageData::Named(map) => map.get(field).map(String::as_str),
            _ => None,
        }
    }
}

impl From<i64> for MessageData {
    fn from(value: i64) -> Self {
        MessageData::Scalar(value)
    }
}

impl From<Vec<String>> for MessageData {
    fn from(items: Vec<String>) -> Self {
        MessageData::Positional(items)
    }
}

impl From<&[&str]> for MessageData {
    fn from(items: &[&str]) -> Self {
        MessageData::Positional(items.iter().map(|s| (*s).to_string()).collect())
    }
}

impl From<BTreeMap<String, String>> for MessageData {
    fn from(map: BTreeMap<String, String>) -> Self {
        MessageData::Named(map)
    }
}

/// Opaque identity of the host-side owner of a reference binding.
///
/// Never dereferenced by the engine; only ever used as a map key. `Instance`
/// carries whatever id the host runtime uses for its objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    Global,
    Instance(u64),
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Global => write!(f, "global"),
            Owner::Instance(id) => write!(f, "instance#{id}"),
        }
    }
}

/// Dot-separated variable path identifying a bound slot within an owner
/// (e.g. `"text.title"`). Opaque: the engine never evaluates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarPath(String);

impl VarPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VarPath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl fmt::Display for VarPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque handle to a host asset (sprite, sound, ...). Stored and returned,
/// never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetHandle(pub u64);

/// Which kind of reference bindings an `update_refs` pass touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    All,
    Messages,
    Assets,
}

/// Declarative bootstrap entry for one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleInit {
    pub code: String,
    pub name: String,
    /// Locale JSON files loaded at startup (immediately, or incrementally
    /// when a load interval is configured).
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

impl LocaleInit {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            files: Vec::new(),
        }
    }

    pub fn with_files(
        code: impl Into<String>,
        name: impl Into<String>,
        files: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            files: files.into_iter().collect(),
        }
    }
}

/// Cadence at which the incremental loader consumes its file queue.
///
/// Units are ticks in tick-driven updates and seconds in delta-time updates;
/// the interpretation is chosen per `update` call, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadInterval {
    /// One cadence applied uniformly to every queued file.
    Uniform(f64),
    /// One cadence per step. If fewer steps are declared than files are
    /// queued, the loader catches up by merging the remainder immediately.
    PerStep(Vec<f64>),
}

/// Engine configuration. `Default` carries the original defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct I18nOptions {
    /// Returned when a key is missing from both the target and the default
    /// locale. Missing translations are not errors.
    pub default_message: String,
    /// Consult the hashed (integer-keyed) dictionary before the string-keyed
    /// message map.
    pub hashed: bool,
    /// Delimiters for linked message segments nesting another key inline.
    pub linked_start: char,
    pub linked_end: char,
    /// Splits a template into ordered plural forms.
    pub plural_delimiter: char,
    /// Index the first plural form corresponds to.
    pub plural_start_at: i64,
    /// Incremental loading cadence for locale files. `None` loads every
    /// declared file immediately at construction.
    pub load_interval: Option<LoadInterval>,
    /// Populate the message cache on every successful query.
    pub cached: bool,
}

impl Default for I18nOptions {
    fn default() -> Self {
        Self {
            default_message: String::new(),
            hashed: true,
            linked_start: '[',
            linked_end: ']',
            plural_delimiter: '|',
            plural_start_at: 0,
            load_interval: None,
            cached: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_fills_first_positional_slot() {
        let data = MessageData::Scalar(7);
        assert_eq!(data.positional(0).as_deref(), Some("7"));
        assert_eq!(data.positional(1), None);
    }

    #[test]
    fn named_lookup_misses_on_other_variants() {
        assert_eq!(MessageData::None.named("x"), None);
        assert_eq!(MessageData::Scalar(1).named("x"), None);
    }

    #[test]
    fn default_options_match_originals() {
        let opts = I18nOptions::default();
        assert_eq!(opts.linked_start, '[');
        assert_eq!(opts.linked_end, ']');
        assert_eq!(opts.plural_delimiter, '|');
        assert_eq!(opts.plural_start_at, 0);
        assert!(opts.hashed);
        assert!(opts.default_message.is_empty());
    }
}
