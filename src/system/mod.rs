// SPDX-License-Identifier: PMPL-1.0-or-later

//! The engine facade: one [`I18n`] value owns a locale store, a fingerprint
//! cache, a reference table, and (while loading) an incremental loader.
//!
//! Instances are fully independent. Nothing in here is shared or static, so
//! a "global" instance plus any number of scoped instances never observe one
//! another's state; the convenience default instance lives in
//! [`crate::global`] behind an explicit lifecycle.
//!
//! A locale switch never clears the cache. Cache ids encode the locale they
//! were created under, so entries for the old locale stay retrievable by
//! their original id while new resolutions fingerprint under the new locale.
//! Invalidation is always explicit.

use crate::cache::{fingerprint, MessageCache};
use crate::error::Result;
use crate::loader::{merge_content, FileContentProvider, JsonFileProvider, Loader, LoaderState};
use crate::refs::{ReferenceTable, RefId};
use crate::resolver;
use crate::store::{DrawingPreset, LocaleStore, PresetUpdate};
use crate::types::{
    AssetHandle, I18nOptions, LocaleInit, MessageData, Owner, RefKind, VarPath,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A self-contained localization system instance.
#[derive(Debug, Clone)]
pub struct I18n {
    opts: I18nOptions,
    store: LocaleStore,
    cache: MessageCache,
    refs: ReferenceTable,
    loader: Option<Loader>,
}

impl I18n {
    /// Create an instance, reading declared locale files through the default
    /// JSON provider. With a configured `load_interval` the files are queued
    /// for incremental loading; without one they load here, immediately.
    pub fn new(default_locale: &str, locales: &[LocaleInit], opts: I18nOptions) -> Result<Self> {
        Self::with_provider(default_locale, locales, opts, &JsonFileProvider)
    }

    /// Like [`new`], with an injected file content provider.
    ///
    /// [`new`]: I18n::new
    pub fn with_provider(
        default_locale: &str,
        locales: &[LocaleInit],
        opts: I18nOptions,
        provider: &dyn FileContentProvider,
    ) -> Result<Self> {
        let mut store = LocaleStore::new(default_locale);
        let mut files: Vec<(PathBuf, String)> = Vec::new();
        for init in locales {
            store.add_locale(&init.code, &init.name);
            for file in &init.files {
                files.push((file.clone(), init.code.clone()));
            }
        }

        let loader = if files.is_empty() {
            None
        } else if let Some(interval) = opts.load_interval.clone() {
            for (path, locale) in &files {
                store.queue_pending_file(locale, path);
            }
            debug!(files = files.len(), "queued locale files for incremental load");
            Some(Loader::new(files, interval))
        } else {
            for (path, locale) in &files {
                let content = provider.read_locale_file(path)?;
                merge_content(&mut store, &content, locale, path);
            }
            None
        };

        Ok(Self {
            opts,
            store,
            cache: MessageCache::new(),
            refs: ReferenceTable::new(),
            loader,
        })
    }

    // ─── Locale selection ───────────────────────────────────────────────

    pub fn locale(&self) -> &str {
        self.store.current_locale()
    }

    pub fn default_locale(&self) -> &str {
        self.store.default_locale()
    }

    /// Switch the current locale and (optionally) re-resolve every reference
    /// binding. The cache is left alone either way.
    pub fn set_locale(&mut self, code: &str, update_refs: bool) -> Result<()> {
        self.store.set_current_locale(code)?;
        if update_refs {
            self.update_refs(RefKind::All);
        }
        Ok(())
    }

    pub fn options(&self) -> &I18nOptions {
        &self.opts
    }

    pub fn set_default_message(&mut self, message: impl Into<String>) {
        self.opts.default_message = message.into();
    }

    // ─── Locale store passthrough ───────────────────────────────────────

    pub fn store(&self) -> &LocaleStore {
        &self.store
    }

    pub fn add_locale(&mut self, code: &str, name: &str) {
        self.store.add_locale(code, name);
    }

    pub fn locale_exists(&self, code: &str) -> bool {
        self.store.locale_exists(code)
    }

    pub fn add_messages<I, K, V>(&mut self, locale: &str, pairs: I, prefix: &str)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.store.add_messages(locale, pairs, prefix);
    }

    pub fn add_dictionaries<I>(&mut self, locale: &str, entries: I)
    where
        I: IntoIterator<Item = (u64, String)>,
    {
        self.store.add_dictionaries(locale, entries);
    }

    pub fn flatten(&mut self, data: &serde_json::Value, locale: &str, prefix: &str) -> Vec<String> {
        self.store.flatten(data, locale, prefix)
    }

    pub fn remove_messages(&mut self, keys: &[&str], locale: Option<&str>) -> Result<()> {
        self.store.remove_messages(keys, locale)
    }

    pub fn clear_messages(&mut self, locale: Option<&str>) -> Result<()> {
        self.store.clear_messages(locale)
    }

    pub fn message_exists(&self, key: &str, locale: &str) -> bool {
        self.store.message_exists(key, locale)
    }

    pub fn add_preset(&mut self, locale: &str, name: &str, preset: DrawingPreset) {
        self.store.add_preset(locale, name, preset);
    }

    pub fn preset(&self, name: &str, locale: &str) -> Option<&DrawingPreset> {
        self.store.preset(name, locale)
    }

    pub fn preset_names(&self, locale: &str) -> Vec<&str> {
        self.store.preset_names(locale)
    }

    /// Read one preset field by selector (default-locale fallback applies).
    pub fn preset_data(
        &self,
        name: &str,
        field: crate::store::PresetField,
        locale: &str,
    ) -> Option<crate::store::PresetValue> {
        self.store.preset(name, locale).map(|preset| preset.field(field))
    }

    pub fn update_preset(&mut self, name: &str, locale: &str, updates: &[PresetUpdate]) -> bool {
        self.store.update_preset(name, locale, updates)
    }

    // ─── Resolution ─────────────────────────────────────────────────────

    /// Resolve one message. Populates the cache when the `cached` option is
    /// on.
    pub fn message(&mut self, key: &str, data: &MessageData, locale: &str) -> Result<String> {
        let value = resolver::resolve(&self.store, &self.opts, key, data, locale)?;
        if self.opts.cached {
            let id = self.cache_id(key, data, locale);
            self.cache.insert(id, value.clone());
        }
        Ok(value)
    }

    /// Resolve several keys against the same data and locale.
    pub fn messages(
        &mut self,
        keys: &[&str],
        data: &MessageData,
        locale: &str,
    ) -> Result<Vec<String>> {
        keys.iter().map(|key| self.message(key, data, locale)).collect()
    }

    /// Pick the entry of a locale→value map matching the current locale,
    /// falling back to the default locale's entry.
    pub fn choose<'a, T>(&self, map: &'a HashMap<String, T>, locale: &str) -> Option<&'a T> {
        let locale = self.store.effective_locale(locale);
        map.get(locale).or_else(|| map.get(self.store.default_locale()))
    }

    // ─── Cache ──────────────────────────────────────────────────────────

    /// Fingerprint for (key, data, locale). Pure; stable across runs. The
    /// empty-locale convention is resolved first so equal logical queries
    /// get equal ids.
    pub fn cache_id(&self, key: &str, data: &MessageData, locale: &str) -> u64 {
        fingerprint(key, data, self.store.effective_locale(locale))
    }

    /// Resolve (or take `explicit_value`) and store under the fingerprint,
    /// overwriting any existing entry. Returns the id.
    pub fn create_cache(
        &mut self,
        key: &str,
        data: &MessageData,
        locale: &str,
        explicit_value: Option<String>,
    ) -> Result<u64> {
        let id = self.cache_id(key, data, locale);
        let value = match explicit_value {
            Some(value) => value,
            None => resolver::resolve(&self.store, &self.opts, key, data, locale)?,
        };
        self.cache.insert(id, value);
        Ok(id)
    }

    pub fn use_cache(&self, id: u64) -> Result<&str> {
        self.cache.value(id)
    }

    pub fn use_caches(&self, ids: &[u64]) -> Result<Vec<&str>> {
        self.cache.values(ids)
    }

    pub fn cache_exists(&self, id: u64) -> bool {
        self.cache.exists(id)
    }

    /// Overwrite an existing cache entry with an explicit value. To
    /// recompute from inputs instead, call [`create_cache`] again — the id
    /// is derivable from the same inputs.
    ///
    /// [`create_cache`]: I18n::create_cache
    pub fn update_cache(&mut self, id: u64, value: impl Into<String>) -> Result<()> {
        self.cache.update(id, value.into())
    }

    pub fn remove_cache(&mut self, id: u64) -> Option<String> {
        self.cache.remove(id)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    // ─── References ─────────────────────────────────────────────────────

    /// Bind `(owner, path)` to a message and resolve it once. Returns the
    /// initial slot value.
    pub fn create_ref_message(
        &mut self,
        owner: Owner,
        path: VarPath,
        key: &str,
        data: MessageData,
    ) -> Result<String> {
        let value = resolver::resolve(&self.store, &self.opts, key, &data, "")?;
        self.refs
            .insert_message(owner, path, key.to_string(), data, value.clone());
        Ok(value)
    }

    /// Bind `(owner, path)` to a locale→asset map and choose the entry for
    /// the current locale (default-locale fallback). Returns the choice.
    pub fn create_ref_asset(
        &mut self,
        owner: Owner,
        path: VarPath,
        assets: HashMap<String, AssetHandle>,
    ) -> Option<AssetHandle> {
        let value = choose_asset(&self.store, &assets);
        self.refs.insert_asset(owner, path, assets, value);
        value
    }

    /// Current slot value of a message binding.
    pub fn message_from_ref(&self, owner: Owner, path: &VarPath) -> Option<&str> {
        self.refs.message(owner, path).map(|binding| binding.value.as_str())
    }

    /// Current slot value of an asset binding.
    pub fn asset_from_ref(&self, owner: Owner, path: &VarPath) -> Option<AssetHandle> {
        self.refs.asset(owner, path).and_then(|binding| binding.value)
    }

    /// Cache id a message binding would resolve under right now (its key and
    /// data snapshot, the current locale).
    pub fn cache_id_from_ref(&self, owner: Owner, path: &VarPath) -> Option<u64> {
        self.refs.message(owner, path).map(|binding| {
            fingerprint(&binding.key, &binding.data, self.store.current_locale())
        })
    }

    /// Owning identity of the nth binding of a kind, for diagnostics.
    pub fn ref_owner(&self, kind: RefKind, index: usize) -> Option<&RefId> {
        match kind {
            RefKind::Assets => self.refs.asset_owner_at(index),
            RefKind::Messages | RefKind::All => self.refs.message_owner_at(index),
        }
    }

    pub fn ref_counts(&self) -> (usize, usize) {
        (self.refs.message_count(), self.refs.asset_count())
    }

    /// Re-resolve every binding of the requested kind(s) against the current
    /// locale and rewrite the bound slots. Exhaustive: a binding that fails
    /// to resolve logs and keeps its previous value, the pass continues.
    pub fn update_refs(&mut self, kind: RefKind) {
        let store = &self.store;
        let opts = &self.opts;
        self.refs.update_refs(
            kind,
            |key, data, plural| {
                match resolver::resolve_with_plural(store, opts, key, data, plural, "") {
                    Ok(value) => Some(value),
                    Err(err) => {
                        warn!(key, error = %err, "reference update kept previous value");
                        None
                    }
                }
            },
            |assets| choose_asset(store, assets),
        );
    }

    /// Update the plural value on one message binding and re-resolve it;
    /// with `also_update_all`, propagate to every binding sharing the same
    /// key and data. Returns false when the addressed binding is missing.
    pub fn update_plurals(
        &mut self,
        owner: Owner,
        path: &VarPath,
        value: i64,
        also_update_all: bool,
    ) -> bool {
        let store = &self.store;
        let opts = &self.opts;
        self.refs.update_plurals(owner, path, value, also_update_all, |key, data, plural| {
            match resolver::resolve_with_plural(store, opts, key, data, plural, "") {
                Ok(value) => Some(value),
                Err(err) => {
                    warn!(key, error = %err, "plural update kept previous value");
                    None
                }
            }
        })
    }

    /// Explicitly drop a binding. The engine never removes bindings on its
    /// own, so this is how callers clean up after destroyed owners.
    pub fn remove_ref(&mut self, owner: Owner, path: &VarPath) -> bool {
        self.refs.remove(owner, path)
    }

    // ─── Loader ─────────────────────────────────────────────────────────

    /// Advance the incremental loader by one tick (`None`) or `delta`
    /// seconds. The job is discarded once its queue drains.
    pub fn update(&mut self, delta: Option<f64>) -> Result<()> {
        self.update_with(&JsonFileProvider, delta)
    }

    pub fn update_with(
        &mut self,
        provider: &dyn FileContentProvider,
        delta: Option<f64>,
    ) -> Result<()> {
        let Some(loader) = self.loader.as_mut() else {
            return Ok(());
        };
        let result = loader.update(&mut self.store, provider, delta);
        if loader.is_ready() {
            debug!(steps = loader.step(), "locale loading complete; job discarded");
            self.loader = None;
        }
        result.map(|_| ())
    }

    /// Whether all configured locale files have been merged (trivially true
    /// when none were configured).
    pub fn is_ready(&self) -> bool {
        self.loader.as_ref().is_none_or(Loader::is_ready)
    }

    /// `Idle` when no job is active (none configured, or already finished).
    pub fn loader_state(&self) -> LoaderState {
        self.loader.as_ref().map_or(LoaderState::Idle, Loader::state)
    }

    // ─── Immediate file operations ──────────────────────────────────────

    /// Load files now, bypassing the incremental loader. An empty `locale`
    /// derives each file's locale from its stem (`langs/en.json` → `en`).
    pub fn load_messages(&mut self, files: &[PathBuf], locale: &str) -> Result<()> {
        self.load_messages_with(&JsonFileProvider, files, locale)
    }

    pub fn load_messages_with(
        &mut self,
        provider: &dyn FileContentProvider,
        files: &[PathBuf],
        locale: &str,
    ) -> Result<()> {
        for path in files {
            let locale = locale_for_file(path, locale);
            let content = provider.read_locale_file(path)?;
            merge_content(&mut self.store, &content, &locale, path);
        }
        Ok(())
    }

    /// Remove exactly the keys a previously loaded file contributed, by
    /// re-reading it and deleting its flattened key set.
    pub fn unload_messages(&mut self, files: &[PathBuf], locale: &str) -> Result<()> {
        self.unload_messages_with(&JsonFileProvider, files, locale)
    }

    pub fn unload_messages_with(
        &mut self,
        provider: &dyn FileContentProvider,
        files: &[PathBuf],
        locale: &str,
    ) -> Result<()> {
        for path in files {
            let locale = locale_for_file(path, locale);
            let content = provider.read_locale_file(path)?;
            let pairs = crate::store::flatten_pairs(&content, "");
            let keys: Vec<&str> = pairs.iter().map(|(key, _)| key.as_str()).collect();
            self.store.remove_messages(&keys, Some(&locale))?;
        }
        Ok(())
    }
}

fn locale_for_file(path: &Path, locale: &str) -> String {
    if locale.is_empty() {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string()
    } else {
        locale.to_string()
    }
}

fn choose_asset(store: &LocaleStore, assets: &HashMap<String, AssetHandle>) -> Option<AssetHandle> {
    assets
        .get(store.current_locale())
        .or_else(|| assets.get(store.default_locale()))
        .copied()
}
