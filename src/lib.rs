// SPDX-License-Identifier: PMPL-1.0-or-later

//! Polyglot — runtime localization resolution and caching.
//!
//! This crate provides the core engine for locale-aware message handling in
//! long-running interactive applications. Translations are flat key-value
//! catalogs (nested JSON is flattened on load); resolution layers plural
//! selection, linked-message expansion, and placeholder substitution over
//! them with automatic default-locale fallback.
//!
//! ENGINE PILLARS:
//! 1. **Store**: Per-locale catalogs of messages, hashed dictionaries, and
//!    drawing presets.
//! 2. **Resolver**: The message pipeline — plural form, linked `[key]`
//!    expansion with cycle detection, `{0}`/`{name}` substitution.
//! 3. **Cache**: Deterministic 53-bit fingerprints over (key, data, locale),
//!    holding resolved snapshots until explicit invalidation.
//! 4. **Refs**: Live bindings that re-resolve en masse on locale switches,
//!    so call sites bind once instead of re-querying.
//! 5. **Loader**: Interval-gated incremental file loading for startup
//!    latency control.

pub mod cache;
pub mod error;
pub mod global;
pub mod loader;
pub mod refs;
pub mod resolver;
pub mod store;
pub mod system;
pub mod types;

pub use error::{FileLoadError, I18nError, Result};
pub use system::I18n;
pub use types::{
    AssetHandle, I18nOptions, LoadInterval, LocaleInit, MessageData, Owner, RefKind, VarPath,
};
