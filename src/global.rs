// SPDX-License-Identifier: PMPL-1.0-or-later

//! Optional process-default instance.
//!
//! Most applications localize through one system for their whole lifetime;
//! this module hosts that instance behind an explicit lifecycle so callers
//! don't thread an [`I18n`] value through every call site. The default
//! instance is thread-local state like any other instance — scoped instances
//! created directly via [`I18n::new`] never interact with it.

use crate::error::{I18nError, Result};
use crate::system::I18n;
use std::cell::RefCell;

thread_local! {
    static GLOBAL: RefCell<Option<I18n>> = const { RefCell::new(None) };
}

/// Install `i18n` as the default instance, replacing any previous one.
pub fn init_global(i18n: I18n) {
    GLOBAL.with(|slot| {
        *slot.borrow_mut() = Some(i18n);
    });
}

/// Whether a default instance is currently installed.
pub fn global_initialized() -> bool {
    GLOBAL.with(|slot| slot.borrow().is_some())
}

/// Run `f` against the default instance.
///
/// Operations routed here before [`init_global`] (or after
/// [`shutdown_global`]) fail with [`I18nError::GlobalNotInitialized`] rather
/// than panicking.
pub fn with_global<T>(f: impl FnOnce(&mut I18n) -> T) -> Result<T> {
    GLOBAL.with(|slot| {
        let mut slot = slot.borrow_mut();
        match slot.as_mut() {
            Some(i18n) => Ok(f(i18n)),
            None => Err(I18nError::GlobalNotInitialized),
        }
    })
}

/// Tear down the default instance, returning it if one was installed.
pub fn shutdown_global() -> Option<I18n> {
    GLOBAL.with(|slot| slot.borrow_mut().take())
}
