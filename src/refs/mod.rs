// SPDX-License-Identifier: PMPL-1.0-or-later

//! Live reference bindings: bind once, re-resolve en masse.
//!
//! A binding ties an `(owner, variable path)` identity to either a message
//! (key + data snapshot + optional plural value) or a locale→asset map, and
//! holds the owner-visible slot the engine writes resolved values into.
//! After a locale switch one `update_refs` pass rewrites every slot, so call
//! sites never re-query.
//!
//! The engine knows nothing about host object lifecycles. Bindings are only
//! removed explicitly; a binding whose owner was destroyed keeps resolving
//! into its slot harmlessly until the caller removes it.

use crate::types::{AssetHandle, MessageData, Owner, RefKind, VarPath};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Identity of one binding. Two owners binding the same path are distinct.
pub type RefId = (Owner, VarPath);

/// A bound localized message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageBinding {
    pub key: String,
    /// Data snapshot taken at bind time.
    pub data: MessageData,
    /// Set by `update_plurals`; overrides any scalar in `data`.
    pub plural_value: Option<i64>,
    /// Owner-visible slot, rewritten by every update pass.
    pub value: String,
}

/// A bound localized asset.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetBinding {
    /// Locale code → host asset handle.
    pub assets: HashMap<String, AssetHandle>,
    /// Owner-visible slot; `None` when no locale in the map matched.
    pub value: Option<AssetHandle>,
}

/// Table of all live bindings, keyed by `(owner, path)`.
///
/// Insertion order is tracked per kind so diagnostic lookups by index are
/// stable.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    messages: HashMap<RefId, MessageBinding>,
    message_order: Vec<RefId>,
    assets: HashMap<RefId, AssetBinding>,
    asset_order: Vec<RefId>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a message binding. The caller supplies the already
    /// resolved initial slot value.
    pub fn insert_message(
        &mut self,
        owner: Owner,
        path: VarPath,
        key: String,
        data: MessageData,
        value: String,
    ) {
        let id = (owner, path);
        if self.messages.contains_key(&id) {
            debug!(owner = %id.0, path = %id.1, "replacing message binding");
        } else {
            self.message_order.push(id.clone());
        }
        self.messages.insert(
            id,
            MessageBinding {
                key,
                data,
                plural_value: None,
                value,
            },
        );
    }

    /// Insert or replace an asset binding with its initial slot value.
    pub fn insert_asset(
        &mut self,
        owner: Owner,
        path: VarPath,
        assets: HashMap<String, AssetHandle>,
        value: Option<AssetHandle>,
    ) {
        let id = (owner, path);
        if !self.assets.contains_key(&id) {
            self.asset_order.push(id.clone());
        }
        self.assets.insert(id, AssetBinding { assets, value });
    }

    pub fn message(&self, owner: Owner, path: &VarPath) -> Option<&MessageBinding> {
        self.messages.get(&(owner, path.clone()))
    }

    pub fn asset(&self, owner: Owner, path: &VarPath) -> Option<&AssetBinding> {
        self.assets.get(&(owner, path.clone()))
    }

    /// Owning identity of the nth message binding, for diagnostics.
    pub fn message_owner_at(&self, index: usize) -> Option<&RefId> {
        self.message_order.get(index)
    }

    /// Owning identity of the nth asset binding, for diagnostics.
    pub fn asset_owner_at(&self, index: usize) -> Option<&RefId> {
        self.asset_order.get(index)
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Remove a binding from both tables. Returns whether anything existed.
    pub fn remove(&mut self, owner: Owner, path: &VarPath) -> bool {
        let id = (owner, path.clone());
        let had_message = self.messages.remove(&id).is_some();
        let had_asset = self.assets.remove(&id).is_some();
        if had_message {
            self.message_order.retain(|existing| *existing != id);
        }
        if had_asset {
            self.asset_order.retain(|existing| *existing != id);
        }
        had_message || had_asset
    }

    /// Re-resolve every binding of the requested kind(s) and rewrite slots.
    ///
    /// `resolve` maps (key, data, plural value) to a new slot value, or
    /// `None` to leave the slot untouched (e.g. a resolution error — the
    /// pass must stay exhaustive, one broken binding cannot abort the rest).
    /// `choose` picks the handle matching the current locale out of an asset
    /// map.
    pub fn update_refs<F, G>(&mut self, kind: RefKind, mut resolve: F, mut choose: G)
    where
        F: FnMut(&str, &MessageData, Option<i64>) -> Option<String>,
        G: FnMut(&HashMap<String, AssetHandle>) -> Option<AssetHandle>,
    {
        if matches!(kind, RefKind::All | RefKind::Messages) {
            for binding in self.messages.values_mut() {
                if let Some(value) = resolve(&binding.key, &binding.data, binding.plural_value) {
                    binding.value = value;
                }
            }
        }
        if matches!(kind, RefKind::All | RefKind::Assets) {
            for binding in self.assets.values_mut() {
                binding.value = choose(&binding.assets);
            }
        }
        debug!(kind = ?kind, "reference update pass complete");
    }

    /// Set the plural value on one binding and re-resolve it. With
    /// `also_update_all`, every binding in any owner sharing the same key
    /// and data snapshot receives the new plural value and is refreshed too
    /// (each exactly once; order across owners is unspecified).
    ///
    /// Returns false when the addressed binding does not exist.
    pub fn update_plurals<F>(
        &mut self,
        owner: Owner,
        path: &VarPath,
        value: i64,
        also_update_all: bool,
        mut resolve: F,
    ) -> bool
    where
        F: FnMut(&str, &MessageData, Option<i64>) -> Option<String>,
    {
        let id = (owner, path.clone());
        let Some(target) = self.messages.get_mut(&id) else {
            warn!(owner = %owner, path = %path, "update_plurals: no such binding");
            return false;
        };
        target.plural_value = Some(value);
        if let Some(resolved) = resolve(&target.key, &target.data, Some(value)) {
            target.value = resolved;
        }

        if also_update_all {
            let key = target.key.clone();
            let data = target.data.clone();
            for (other_id, binding) in self.messages.iter_mut() {
                if *other_id == id || binding.key != key || binding.data != data {
                    continue;
                }
                binding.plural_value = Some(value);
                if let Some(resolved) = resolve(&binding.key, &binding.data, Some(value)) {
                    binding.value = resolved;
                }
            }
        }
        true
    }
}
