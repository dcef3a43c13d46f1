// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error taxonomy for the localization engine.
//!
//! Only genuinely unrecoverable conditions are errors. Missing messages and
//! missing placeholder data are not: they degrade to the configured default
//! message and to literal placeholder text, because localization must never
//! crash rendering.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, I18nError>;

#[derive(Debug, Error)]
pub enum I18nError {
    /// `use_cache` was called with an id that was never created (or was
    /// removed). Callers are expected to `create_cache` first.
    #[error("no cache entry for id {id}")]
    CacheMiss { id: u64 },

    /// A linked message segment resolved back into one of its ancestors.
    #[error("cyclic linked message: '{key}' appears in its own chain ({chain})")]
    CyclicReference { key: String, chain: String },

    /// An operation explicitly addressed a locale that was never registered
    /// and for which fallback does not apply (e.g. removal, locale switch).
    #[error("locale not registered: {code}")]
    LocaleNotFound { code: String },

    /// Propagated from the file content provider.
    #[error("failed to load locale file {path}: {source}")]
    FileLoad {
        path: PathBuf,
        #[source]
        source: FileLoadError,
    },

    /// The default instance was used before `init_global` (or after
    /// `shutdown_global`).
    #[error("global i18n instance is not initialized")]
    GlobalNotInitialized,
}

impl I18nError {
    pub(crate) fn cyclic(key: &str, chain: &[String]) -> Self {
        let mut rendered = chain.join(" -> ");
        rendered.push_str(" -> ");
        rendered.push_str(key);
        Self::CyclicReference {
            key: key.to_string(),
            chain: rendered,
        }
    }

    pub(crate) fn locale_not_found(code: impl Into<String>) -> Self {
        Self::LocaleNotFound { code: code.into() }
    }
}

/// What went wrong while reading a locale file.
#[derive(Debug, Error)]
pub enum FileLoadError {
    #[error("file not found or unreadable: {0}")]
    NotFound(#[from] std::io::Error),

    #[error("invalid locale JSON: {0}")]
    ParseError(#[from] serde_json::Error),
}
