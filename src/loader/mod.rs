// SPDX-License-Identifier: PMPL-1.0-or-later

//! Incremental locale-file loader.
//!
//! A [`Loader`] spreads the cost of reading and merging N locale files over
//! repeated `update` calls from a tick-driven host: each call advances the
//! current step's clock by one tick (or by a real-time delta), and when the
//! clock reaches the step's configured interval the next queued file is read
//! through the [`FileContentProvider`], flattened, and merged into the locale
//! store. File reads are synchronous from the loader's perspective.
//!
//! Misconfiguration never drops files: if fewer steps were declared than
//! files queued, the remainder is merged immediately as a final catch-up, so
//! a locale is never left partially initialized.

use crate::error::{FileLoadError, I18nError, Result};
use crate::store::{flatten_pairs, LocaleStore};
use crate::types::LoadInterval;
use serde_json::Value;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Synchronous source of parsed locale file content.
///
/// The engine never touches the filesystem directly; this is the seam where
/// a host supplies bundled resources, test fixtures, or plain files.
pub trait FileContentProvider {
    fn read_locale_file(&self, path: &Path) -> Result<Value>;
}

/// Default provider: JSON files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileProvider;

impl FileContentProvider for JsonFileProvider {
    fn read_locale_file(&self, path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path).map_err(|err| I18nError::FileLoad {
            path: path.to_path_buf(),
            source: FileLoadError::NotFound(err),
        })?;
        serde_json::from_str(&content).map_err(|err| I18nError::FileLoad {
            path: path.to_path_buf(),
            source: FileLoadError::ParseError(err),
        })
    }
}

/// Loader lifecycle. `Idle` is the no-job state reported by a system without
/// a configured loader; a constructed job is `Loading` until its queue
/// empties, then `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    Loading,
    Ready,
}

/// One incremental loading job over a queue of (file, locale) pairs.
#[derive(Debug, Clone)]
pub struct Loader {
    queue: VecDeque<(PathBuf, String)>,
    interval: LoadInterval,
    /// Declared step count: queue length for a uniform cadence, the cadence
    /// array length otherwise.
    max_step: usize,
    /// Files merged so far.
    step: usize,
    /// Index of the current step within the cadence configuration.
    /// Invariant: never exceeds `max_step`.
    step_index: usize,
    /// Time accumulated toward the current step's interval, in ticks or
    /// seconds depending on how `update` is driven.
    elapsed: f64,
}

impl Loader {
    pub fn new(files: Vec<(PathBuf, String)>, interval: LoadInterval) -> Self {
        let max_step = match &interval {
            LoadInterval::Uniform(_) => files.len(),
            LoadInterval::PerStep(steps) => steps.len(),
        };
        Self {
            queue: files.into(),
            interval,
            max_step,
            step: 0,
            step_index: 0,
            elapsed: 0.0,
        }
    }

    pub fn state(&self) -> LoaderState {
        if self.queue.is_empty() {
            LoaderState::Ready
        } else {
            LoaderState::Loading
        }
    }

    /// Whether every queued file has been merged. A job constructed with
    /// zero files is ready immediately.
    pub fn is_ready(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    fn current_interval(&self) -> f64 {
        match &self.interval {
            LoadInterval::Uniform(interval) => *interval,
            // Past the declared cadence array the interval is zero; the
            // catch-up path below drains the queue anyway.
            LoadInterval::PerStep(steps) => steps.get(self.step_index).copied().unwrap_or(0.0),
        }
    }

    /// Advance the job by one tick (`delta == None`) or by `delta` seconds.
    ///
    /// At most one interval-gated file is merged per call, except that
    /// zero-interval steps resolve immediately and chain within the same
    /// call, and the catch-up path drains the whole queue at once.
    pub fn update(
        &mut self,
        store: &mut LocaleStore,
        provider: &dyn FileContentProvider,
        delta: Option<f64>,
    ) -> Result<LoaderState> {
        if self.queue.is_empty() {
            return Ok(LoaderState::Ready);
        }

        self.elapsed += delta.unwrap_or(1.0);
        while !self.queue.is_empty() && self.elapsed >= self.current_interval() {
            let gated = self.current_interval() > 0.0;
            self.load_next(store, provider)?;
            if gated {
                // Only one timed step per update; zero-interval steps chain.
                break;
            }
        }

        if self.step_index >= self.max_step && !self.queue.is_empty() {
            warn!(
                remaining = self.queue.len(),
                max_step = self.max_step,
                "loader declared fewer steps than files; merging remainder now"
            );
            while !self.queue.is_empty() {
                self.load_next(store, provider)?;
            }
        }

        Ok(self.state())
    }

    fn load_next(
        &mut self,
        store: &mut LocaleStore,
        provider: &dyn FileContentProvider,
    ) -> Result<()> {
        let Some((path, locale)) = self.queue.pop_front() else {
            return Ok(());
        };
        // The step is consumed whether or not the read succeeds; a broken
        // file must not wedge the queue.
        self.step += 1;
        self.step_index = (self.step_index + 1).min(self.max_step);
        self.elapsed = 0.0;

        let content = match provider.read_locale_file(&path) {
            Ok(content) => content,
            Err(err) => {
                store.mark_file_merged(&locale, &path);
                return Err(err);
            }
        };
        merge_content(store, &content, &locale, &path);
        Ok(())
    }
}

/// Flatten-merge parsed file content into a locale and clear the pending
/// record. Shared by the incremental path and immediate `load_messages`.
pub(crate) fn merge_content(store: &mut LocaleStore, content: &Value, locale: &str, path: &Path) {
    let pairs = flatten_pairs(content, "");
    debug!(file = %path.display(), locale, keys = pairs.len(), "merged locale file");
    store.add_messages(locale, pairs, "");
    store.mark_file_merged(locale, path);
}
