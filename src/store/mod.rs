// SPDX-License-Identifier: PMPL-1.0-or-later

//! Locale store: per-locale message maps, hashed dictionaries, and drawing
//! presets.
//!
//! One [`LocaleEntry`] exists per registered locale code. Entries are created
//! by registration (or lazily by a merge addressing an unknown code), mutated
//! by message add/remove and by the incremental loader, and never destroyed:
//! clearing a locale empties the entry but keeps the shell, so handles to a
//! locale code stay valid for the store's lifetime.

pub mod drawing;

pub use drawing::{
    ColorSpec, DrawingPreset, HAlign, PresetField, PresetUpdate, PresetValue, VAlign,
};

use crate::error::{I18nError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Separator used when a prefix (or a nested JSON object) is projected onto
/// flat dotted keys.
pub const KEY_SEPARATOR: char = '.';

/// All localized data registered under one locale code.
#[derive(Debug, Clone, Default)]
pub struct LocaleEntry {
    pub code: String,
    pub name: String,
    /// Source files queued but not yet merged by the incremental loader,
    /// in load order.
    pending_files: Vec<PathBuf>,
    messages: HashMap<String, String>,
    dictionaries: HashMap<u64, String>,
    presets: HashMap<String, DrawingPreset>,
}

impl LocaleEntry {
    fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn message(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    pub fn dictionary(&self, id: u64) -> Option<&str> {
        self.dictionaries.get(&id).map(String::as_str)
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn pending_files(&self) -> &[PathBuf] {
        &self.pending_files
    }
}

/// Mapping from locale code to its [`LocaleEntry`], plus the current/default
/// locale selection. Registration order is preserved for listing APIs.
#[derive(Debug, Clone)]
pub struct LocaleStore {
    default_locale: String,
    current_locale: String,
    entries: HashMap<String, LocaleEntry>,
    order: Vec<String>,
}

impl LocaleStore {
    /// Create a store whose default (fallback) locale is `default_locale`.
    /// The default locale is registered immediately.
    pub fn new(default_locale: &str) -> Self {
        let mut store = Self {
            default_locale: default_locale.to_string(),
            current_locale: default_locale.to_string(),
            entries: HashMap::new(),
            order: Vec::new(),
        };
        // Registered without a display name so a later add_locale can fill it.
        store.add_locale(default_locale, "");
        store
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn current_locale(&self) -> &str {
        &self.current_locale
    }

    /// Switch the current locale. The target must already be registered;
    /// there is no sensible fallback for an explicit switch.
    pub fn set_current_locale(&mut self, code: &str) -> Result<()> {
        if !self.entries.contains_key(code) {
            return Err(I18nError::locale_not_found(code));
        }
        debug!(from = %self.current_locale, to = %code, "locale switch");
        self.current_locale = code.to_string();
        Ok(())
    }

    /// Resolve the `""`-means-current convention used by query parameters.
    pub fn effective_locale<'a>(&'a self, locale: &'a str) -> &'a str {
        if locale.is_empty() {
            &self.current_locale
        } else {
            locale
        }
    }

    /// Register a locale. Idempotent: an existing entry is left untouched
    /// except that an empty display name is filled in.
    pub fn add_locale(&mut self, code: &str, name: &str) {
        match self.entries.get_mut(code) {
            Some(entry) => {
                if entry.name.is_empty() {
                    entry.name = name.to_string();
                }
            }
            None => {
                self.entries
                    .insert(code.to_string(), LocaleEntry::new(code, name));
                self.order.push(code.to_string());
            }
        }
    }

    pub fn locale_exists(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    pub fn entry(&self, code: &str) -> Option<&LocaleEntry> {
        self.entries.get(code)
    }

    fn entry_mut_or_create(&mut self, code: &str) -> &mut LocaleEntry {
        if !self.entries.contains_key(code) {
            self.add_locale(code, "");
        }
        self.entries
            .get_mut(code)
            .unwrap_or_else(|| unreachable!("entry registered above"))
    }

    /// Registered locales in registration order.
    pub fn locales(&self) -> Vec<&LocaleEntry> {
        self.order
            .iter()
            .filter_map(|code| self.entries.get(code))
            .collect()
    }

    pub fn locale_codes(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn locale_names(&self) -> Vec<&str> {
        self.locales().iter().map(|entry| entry.name.as_str()).collect()
    }

    // ─── Messages ───────────────────────────────────────────────────────

    /// Merge `pairs` into a locale's message map. `prefix` (if non-empty) is
    /// prepended to every key with a `.` separator; the flatten operation
    /// uses this to project nested objects onto dotted keys. Existing keys
    /// are overwritten (merges are additive and idempotent).
    pub fn add_messages<I, K, V>(&mut self, locale: &str, pairs: I, prefix: &str)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entry = self.entry_mut_or_create(locale);
        for (key, value) in pairs {
            let key = key.into();
            let full_key = if prefix.is_empty() {
                key
            } else {
                format!("{prefix}{KEY_SEPARATOR}{key}")
            };
            entry.messages.insert(full_key, value.into());
        }
    }

    /// Store entries under the hashed (integer-keyed) dictionary. Keys are
    /// expected to be precomputed stable hashes.
    pub fn add_dictionaries<I>(&mut self, locale: &str, entries: I)
    where
        I: IntoIterator<Item = (u64, String)>,
    {
        let entry = self.entry_mut_or_create(locale);
        for (id, value) in entries {
            entry.dictionaries.insert(id, value);
        }
    }

    /// Walk a nested JSON structure and insert every string leaf as
    /// `prefix.path.to.leaf -> value`. Returns the inserted keys.
    ///
    /// Purely a convenience projection onto [`add_messages`]; no caching
    /// implications.
    ///
    /// [`add_messages`]: LocaleStore::add_messages
    pub fn flatten(&mut self, data: &Value, locale: &str, prefix: &str) -> Vec<String> {
        let pairs = flatten_pairs(data, prefix);
        let keys = pairs.iter().map(|(key, _)| key.clone()).collect();
        self.add_messages(locale, pairs, "");
        keys
    }

    /// Delete `keys` from one locale, or from every locale when `locale` is
    /// `None`. Addressing an unregistered locale is an error: removal has no
    /// fallback semantics.
    pub fn remove_messages(&mut self, keys: &[&str], locale: Option<&str>) -> Result<()> {
        match locale {
            Some(code) => {
                let entry = self
                    .entries
                    .get_mut(code)
                    .ok_or_else(|| I18nError::locale_not_found(code))?;
                for key in keys {
                    entry.messages.remove(*key);
                }
            }
            None => {
                for entry in self.entries.values_mut() {
                    for key in keys {
                        entry.messages.remove(*key);
                    }
                }
            }
        }
        Ok(())
    }

    /// Empty the message map of one locale (or all). The entry itself
    /// persists as an empty shell.
    pub fn clear_messages(&mut self, locale: Option<&str>) -> Result<()> {
        match locale {
            Some(code) => {
                let entry = self
                    .entries
                    .get_mut(code)
                    .ok_or_else(|| I18nError::locale_not_found(code))?;
                entry.messages.clear();
            }
            None => {
                for entry in self.entries.values_mut() {
                    entry.messages.clear();
                }
            }
        }
        Ok(())
    }

    pub fn message(&self, key: &str, locale: &str) -> Option<&str> {
        let locale = self.effective_locale(locale);
        self.entries.get(locale).and_then(|entry| entry.message(key))
    }

    pub fn dictionary(&self, id: u64, locale: &str) -> Option<&str> {
        let locale = self.effective_locale(locale);
        self.entries
            .get(locale)
            .and_then(|entry| entry.dictionary(id))
    }

    pub fn message_exists(&self, key: &str, locale: &str) -> bool {
        self.message(key, locale).is_some()
    }

    // ─── Pending files (loader bookkeeping) ─────────────────────────────

    pub(crate) fn queue_pending_file(&mut self, locale: &str, path: &Path) {
        self.entry_mut_or_create(locale)
            .pending_files
            .push(path.to_path_buf());
    }

    pub(crate) fn mark_file_merged(&mut self, locale: &str, path: &Path) {
        if let Some(entry) = self.entries.get_mut(locale) {
            entry.pending_files.retain(|pending| pending != path);
        }
    }

    // ─── Drawing presets ────────────────────────────────────────────────

    pub fn add_preset(&mut self, locale: &str, name: &str, preset: DrawingPreset) {
        self.entry_mut_or_create(locale)
            .presets
            .insert(name.to_string(), preset);
    }

    /// Look up a preset by name, falling back to the default locale when the
    /// target locale has no preset of that name.
    pub fn preset(&self, name: &str, locale: &str) -> Option<&DrawingPreset> {
        let locale = self.effective_locale(locale);
        if let Some(preset) = self
            .entries
            .get(locale)
            .and_then(|entry| entry.presets.get(name))
        {
            return Some(preset);
        }
        if locale != self.default_locale {
            return self
                .entries
                .get(&self.default_locale)
                .and_then(|entry| entry.presets.get(name));
        }
        None
    }

    /// Preset names registered in a locale, sorted for stable listing.
    pub fn preset_names(&self, locale: &str) -> Vec<&str> {
        let locale = self.effective_locale(locale);
        let mut names: Vec<&str> = self
            .entries
            .get(locale)
            .map(|entry| entry.presets.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Apply field updates to one preset. Returns false when the preset does
    /// not exist in that locale (fallback does not apply to mutation).
    pub fn update_preset(&mut self, name: &str, locale: &str, updates: &[PresetUpdate]) -> bool {
        let locale = self.effective_locale(locale).to_string();
        match self
            .entries
            .get_mut(&locale)
            .and_then(|entry| entry.presets.get_mut(name))
        {
            Some(preset) => {
                preset.apply(updates);
                true
            }
            None => {
                warn!(preset = %name, locale = %locale, "update_preset: no such preset");
                false
            }
        }
    }
}

/// Flatten a nested JSON value into `(dotted_key, value)` pairs.
///
/// Object values recurse with an extended prefix; string leaves are taken as
/// is; numbers and booleans are stringified. Arrays and nulls have no message
/// representation and are skipped.
pub fn flatten_pairs(data: &Value, prefix: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    collect_pairs(data, prefix, &mut pairs);
    pairs
}

fn collect_pairs(data: &Value, prefix: &str, out: &mut Vec<(String, String)>) {
    let Value::Object(map) = data else {
        warn!("locale content is not a JSON object; nothing to flatten");
        return;
    };
    for (key, value) in map {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}{KEY_SEPARATOR}{key}")
        };
        match value {
            Value::Object(_) => collect_pairs(value, &full_key, out),
            Value::String(text) => out.push((full_key, text.clone())),
            Value::Number(number) => out.push((full_key, number.to_string())),
            Value::Bool(flag) => out.push((full_key, flag.to_string())),
            Value::Array(_) | Value::Null => {
                warn!(key = %full_key, "skipping non-message value in locale content");
            }
        }
    }
}
