// SPDX-License-Identifier: PMPL-1.0-or-later

//! The read path: turn (key, data, locale) into a concrete string.
//!
//! Lookup order is the target locale first (hashed dictionary before the
//! message map when hashed mode is on), then the default locale, then the
//! configured default message. A missing translation is never an error —
//! rendering degrades instead of aborting.
//!
//! Template processing, in order: plural-form selection on the raw template,
//! linked-segment expansion (recursive, cycle-checked), then single-pass
//! placeholder substitution. Substitution never re-expands its own output.

use crate::error::{I18nError, Result};
use crate::store::LocaleStore;
use crate::types::{I18nOptions, MessageData};
use tracing::trace;

/// Resolve a message key. Empty `locale` means the store's current locale.
pub fn resolve(
    store: &LocaleStore,
    opts: &I18nOptions,
    key: &str,
    data: &MessageData,
    locale: &str,
) -> Result<String> {
    resolve_with_plural(store, opts, key, data, None, locale)
}

/// Resolve with an explicit plural value overriding any `Scalar` data.
/// Reference bindings use this when their plural value is updated without
/// touching the rest of their data snapshot.
pub fn resolve_with_plural(
    store: &LocaleStore,
    opts: &I18nOptions,
    key: &str,
    data: &MessageData,
    plural_override: Option<i64>,
    locale: &str,
) -> Result<String> {
    let mut chain = Vec::new();
    resolve_inner(store, opts, key, data, plural_override, locale, &mut chain)
}

fn resolve_inner(
    store: &LocaleStore,
    opts: &I18nOptions,
    key: &str,
    data: &MessageData,
    plural_override: Option<i64>,
    locale: &str,
    chain: &mut Vec<String>,
) -> Result<String> {
    let locale = store.effective_locale(locale);

    if chain.iter().any(|ancestor| ancestor == key) {
        return Err(I18nError::cyclic(key, chain));
    }

    let Some(template) = lookup(store, opts, key, locale) else {
        trace!(key, locale, "message missing in target and default locale");
        return Ok(opts.default_message.clone());
    };
    let template = template.to_string();

    let plural_value = plural_override.or_else(|| data.scalar());
    let selected = select_plural(&template, opts, plural_value);

    chain.push(key.to_string());
    let expanded = expand_linked(store, opts, &selected, data, locale, chain)?;
    chain.pop();

    Ok(substitute(&expanded, data))
}

/// Exact-match lookup across the fallback chain.
fn lookup<'a>(
    store: &'a LocaleStore,
    opts: &I18nOptions,
    key: &str,
    locale: &str,
) -> Option<&'a str> {
    let hashed_id = if opts.hashed {
        key.parse::<u64>().ok()
    } else {
        None
    };

    let default = store.default_locale();
    let mut candidates = vec![locale];
    if locale != default {
        candidates.push(default);
    }

    for code in candidates {
        if let Some(id) = hashed_id {
            if let Some(value) = store.dictionary(id, code) {
                return Some(value);
            }
        }
        if let Some(value) = store.message(key, code) {
            return Some(value);
        }
    }
    None
}

/// Pick one plural form out of a delimited template.
///
/// Forms are indexed from `plural_start_at`; the selection index is clamped
/// to the available range, so an out-of-range value selects the last (or
/// first) form rather than faulting. A plural template queried without a
/// numeric value is returned raw — visible in output, easy to spot.
fn select_plural(template: &str, opts: &I18nOptions, value: Option<i64>) -> String {
    if !template.contains(opts.plural_delimiter) {
        return template.to_string();
    }
    let Some(value) = value else {
        return template.to_string();
    };
    let forms: Vec<&str> = template.split(opts.plural_delimiter).collect();
    let last = (forms.len() - 1) as i64;
    let index = value.saturating_sub(opts.plural_start_at).clamp(0, last) as usize;
    forms[index].to_string()
}

/// Replace `[key]`-style linked segments with the resolution of the enclosed
/// key. Linked keys see the same data (so their placeholders fill) but no
/// plural override. An unterminated segment is copied literally.
fn expand_linked(
    store: &LocaleStore,
    opts: &I18nOptions,
    template: &str,
    data: &MessageData,
    locale: &str,
    chain: &mut Vec<String>,
) -> Result<String> {
    if !template.contains(opts.linked_start) {
        return Ok(template.to_string());
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find(opts.linked_start) {
        out.push_str(&rest[..start]);
        let after_start = &rest[start + opts.linked_start.len_utf8()..];
        match after_start.find(opts.linked_end) {
            Some(end) => {
                let inner_key = &after_start[..end];
                let resolved =
                    resolve_inner(store, opts, inner_key, data, None, locale, chain)?;
                out.push_str(&resolved);
                rest = &after_start[end + opts.linked_end.len_utf8()..];
            }
            None => {
                // No closing delimiter: keep the remainder literal.
                out.push(opts.linked_start);
                out.push_str(after_start);
                return Ok(out);
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// Single-pass `{0}` / `{field}` substitution. Missing data leaves the
/// literal placeholder untouched; replacements are never re-scanned.
fn substitute(template: &str, data: &MessageData) -> String {
    if !template.contains('{') {
        return template.to_string();
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after_brace = &rest[start + 1..];
        match after_brace.find('}') {
            Some(end) => {
                let token = &after_brace[..end];
                let replacement = placeholder_value(token, data);
                match replacement {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(token);
                        out.push('}');
                    }
                }
                rest = &after_brace[end + 1..];
            }
            None => {
                out.push('{');
                out.push_str(after_brace);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

fn placeholder_value(token: &str, data: &MessageData) -> Option<String> {
    if token.is_empty() {
        return None;
    }
    if token.bytes().all(|b| b.is_ascii_digit()) {
        let index: usize = token.parse().ok()?;
        return data.positional(index);
    }
    data.named(token).map(str::to_string)
}
