// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fingerprint-keyed message cache.
//!
//! A cache id is a deterministic 53-bit fingerprint of (key, data, locale).
//! The 53-bit mask keeps ids exactly representable as IEEE doubles so they
//! survive JSON round-trips and host runtimes without 64-bit integers.
//! Hashing is blake3 over a canonical length-prefixed encoding, so equal
//! logical inputs produce equal ids across calls and across process runs —
//! callers persist ids (reference bindings do) and reuse them later.
//!
//! The cache is intentionally unbounded: no LRU, no TTL, no eviction of any
//! kind. Entries live until explicit invalidation or a full clear, and a
//! cached value is a snapshot of resolution at creation time. An application
//! that creates caches every frame with varying data manages its own
//! invalidation.

use crate::error::{I18nError, Result};
use crate::types::MessageData;
use std::collections::HashMap;
use tracing::debug;

/// Ids are masked to 53 bits (f64-safe integers).
pub const FINGERPRINT_MASK: u64 = (1 << 53) - 1;

/// Compute the cache id for a (key, data, locale) triple.
///
/// Pure and deterministic across process runs for equal logical inputs.
/// `Named` data iterates in `BTreeMap` order, so two maps with the same
/// entries fingerprint identically regardless of insertion order.
pub fn fingerprint(key: &str, data: &MessageData, locale: &str) -> u64 {
    let mut hasher = blake3::Hasher::new();
    write_segment(&mut hasher, key.as_bytes());
    match data {
        MessageData::None => {
            hasher.update(b"n");
        }
        MessageData::Scalar(value) => {
            hasher.update(b"s");
            hasher.update(&value.to_le_bytes());
        }
        MessageData::Positional(items) => {
            hasher.update(b"p");
            for item in items {
                write_segment(&mut hasher, item.as_bytes());
            }
        }
        MessageData::Named(map) => {
            hasher.update(b"m");
            for (field, value) in map {
                write_segment(&mut hasher, field.as_bytes());
                write_segment(&mut hasher, value.as_bytes());
            }
        }
    }
    write_segment(&mut hasher, locale.as_bytes());

    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(bytes) & FINGERPRINT_MASK
}

/// Length-prefix each variable-length segment so concatenated inputs cannot
/// collide ("ab"+"c" vs "a"+"bc").
fn write_segment(hasher: &mut blake3::Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// Resolved-message store keyed by fingerprint.
#[derive(Debug, Clone, Default)]
pub struct MessageCache {
    entries: HashMap<u64, String>,
}

impl MessageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the value for `id`.
    pub fn insert(&mut self, id: u64, value: String) {
        self.entries.insert(id, value);
    }

    /// Fetch a cached value. Absent ids are a [`I18nError::CacheMiss`]:
    /// callers are expected to have created the entry first.
    pub fn value(&self, id: u64) -> Result<&str> {
        self.entries
            .get(&id)
            .map(String::as_str)
            .ok_or(I18nError::CacheMiss { id })
    }

    /// Fetch several cached values; fails on the first absent id.
    pub fn values(&self, ids: &[u64]) -> Result<Vec<&str>> {
        ids.iter().map(|id| self.value(*id)).collect()
    }

    pub fn exists(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    /// Overwrite an existing entry. Unlike [`insert`], updating an id that
    /// was never created is a miss.
    ///
    /// [`insert`]: MessageCache::insert
    pub fn update(&mut self, id: u64, value: String) -> Result<()> {
        match self.entries.get_mut(&id) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(I18nError::CacheMiss { id }),
        }
    }

    /// Remove one entry, returning its value if it existed.
    pub fn remove(&mut self, id: u64) -> Option<String> {
        self.entries.remove(&id)
    }

    pub fn clear(&mut self) {
        debug!(entries = self.entries.len(), "clearing message cache");
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn fingerprint_is_deterministic() {
        let data = MessageData::Positional(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            fingerprint("key", &data, "en"),
            fingerprint("key", &data, "en")
        );
    }

    #[test]
    fn fingerprint_fits_in_53_bits() {
        for key in ["a", "b", "menu.title", "x.y.z"] {
            let id = fingerprint(key, &MessageData::None, "en");
            assert!(id <= FINGERPRINT_MASK);
            assert_eq!(id as f64 as u64, id, "id must survive an f64 round-trip");
        }
    }

    #[test]
    fn fingerprint_separates_key_data_and_locale() {
        let base = fingerprint("key", &MessageData::None, "en");
        assert_ne!(base, fingerprint("key2", &MessageData::None, "en"));
        assert_ne!(base, fingerprint("key", &MessageData::Scalar(1), "en"));
        assert_ne!(base, fingerprint("key", &MessageData::None, "fr"));
    }

    #[test]
    fn fingerprint_ignores_named_insertion_order() {
        let mut forward = BTreeMap::new();
        forward.insert("a".to_string(), "1".to_string());
        forward.insert("b".to_string(), "2".to_string());
        let mut reverse = BTreeMap::new();
        reverse.insert("b".to_string(), "2".to_string());
        reverse.insert("a".to_string(), "1".to_string());
        assert_eq!(
            fingerprint("k", &MessageData::Named(forward), "en"),
            fingerprint("k", &MessageData::Named(reverse), "en")
        );
    }

    #[test]
    fn segment_boundaries_do_not_collide() {
        let ab = MessageData::Positional(vec!["ab".to_string(), "c".to_string()]);
        let a = MessageData::Positional(vec!["a".to_string(), "bc".to_string()]);
        assert_ne!(fingerprint("k", &ab, "en"), fingerprint("k", &a, "en"));
    }

    #[test]
    fn missing_entry_is_a_cache_miss() {
        let cache = MessageCache::new();
        assert!(matches!(
            cache.value(7),
            Err(I18nError::CacheMiss { id: 7 })
        ));
    }

    #[test]
    fn insert_overwrites_and_update_requires_presence() {
        let mut cache = MessageCache::new();
        cache.insert(1, "first".to_string());
        cache.insert(1, "second".to_string());
        assert_eq!(cache.value(1).unwrap(), "second");

        cache.update(1, "third".to_string()).unwrap();
        assert_eq!(cache.value(1).unwrap(), "third");
        assert!(cache.update(2, "nope".to_string()).is_err());
    }

    #[test]
    fn clear_removes_everything() {
        let mut cache = MessageCache::new();
        cache.insert(1, "a".to_string());
        cache.insert(2, "b".to_string());
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.value(1).is_err());
    }
}
