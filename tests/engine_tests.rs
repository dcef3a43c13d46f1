// SPDX-License-Identifier: PMPL-1.0-or-later

//! End-to-end engine tests against real locale files on disk.

use polyglot_i18n::{
    AssetHandle, I18n, I18nError, I18nOptions, LoadInterval, LocaleInit, MessageData, Owner,
    VarPath,
};
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_locale(dir: &TempDir, name: &str, content: &serde_json::Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(content).unwrap()).unwrap();
    path
}

fn fixture_dir() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let en = write_locale(
        &dir,
        "en.json",
        &json!({
            "hello": "Hello",
            "greet": "Hello, {0}!",
            "items": "no items|one item|{0} items",
            "welcome": "[hello] and welcome, {name}",
            "menu": { "file": { "open": "Open", "close": "Close" } }
        }),
    );
    let fr = write_locale(
        &dir,
        "fr.json",
        &json!({
            "hello": "Bonjour",
            "greet": "Bonjour, {0} !",
            "menu": { "file": { "open": "Ouvrir" } }
        }),
    );
    (dir, en, fr)
}

fn engine_from_files(en: PathBuf, fr: PathBuf, opts: I18nOptions) -> I18n {
    I18n::new(
        "en",
        &[
            LocaleInit::with_files("en", "English", [en]),
            LocaleInit::with_files("fr", "French", [fr]),
        ],
        opts,
    )
    .unwrap()
}

#[test]
fn full_flow_from_files_on_disk() {
    let (_dir, en, fr) = fixture_dir();
    let mut i18n = engine_from_files(en, fr, I18nOptions::default());
    assert!(i18n.is_ready());

    // Nested JSON arrives flattened onto dotted keys.
    assert_eq!(
        i18n.message("menu.file.open", &MessageData::None, "fr").unwrap(),
        "Ouvrir"
    );
    // Fallback: "close" exists only in English.
    assert_eq!(
        i18n.message("menu.file.close", &MessageData::None, "fr").unwrap(),
        "Close"
    );

    // Plural selection plus scalar substitution in one template.
    assert_eq!(
        i18n.message("items", &MessageData::Scalar(0), "en").unwrap(),
        "no items"
    );
    assert_eq!(
        i18n.message("items", &MessageData::Scalar(5), "en").unwrap(),
        "5 items"
    );

    // Linked expansion and named substitution together.
    let mut named = std::collections::BTreeMap::new();
    named.insert("name".to_string(), "Ada".to_string());
    assert_eq!(
        i18n.message("welcome", &MessageData::Named(named), "en").unwrap(),
        "Hello and welcome, Ada"
    );
}

#[test]
fn incremental_loading_spreads_files_over_updates() {
    let (_dir, en, fr) = fixture_dir();
    let mut opts = I18nOptions::default();
    opts.load_interval = Some(LoadInterval::Uniform(2.0));
    let mut i18n = engine_from_files(en, fr, opts);

    assert!(!i18n.is_ready());
    assert!(!i18n.message_exists("hello", "en"));

    i18n.update(None).unwrap();
    assert!(!i18n.message_exists("hello", "en"), "first tick is below the interval");
    i18n.update(None).unwrap();
    assert!(i18n.message_exists("hello", "en"));
    assert!(!i18n.message_exists("hello", "fr"), "one gated file per update");

    i18n.update(None).unwrap();
    i18n.update(None).unwrap();
    assert!(i18n.is_ready());
    assert!(i18n.message_exists("hello", "fr"));
}

#[test]
fn delta_time_loading_accumulates_seconds() {
    let (_dir, en, fr) = fixture_dir();
    let mut opts = I18nOptions::default();
    opts.load_interval = Some(LoadInterval::PerStep(vec![0.5, 0.5]));
    let mut i18n = engine_from_files(en, fr, opts);

    i18n.update(Some(0.3)).unwrap();
    assert!(!i18n.message_exists("hello", "en"));
    i18n.update(Some(0.3)).unwrap();
    assert!(i18n.message_exists("hello", "en"));
    i18n.update(Some(0.6)).unwrap();
    assert!(i18n.is_ready());
}

#[test]
fn missing_file_surfaces_a_load_error() {
    let dir = TempDir::new().unwrap();
    let result = I18n::new(
        "en",
        &[LocaleInit::with_files(
            "en",
            "English",
            [dir.path().join("absent.json")],
        )],
        I18nOptions::default(),
    );
    assert!(matches!(result, Err(I18nError::FileLoad { .. })));
}

#[test]
fn malformed_json_is_a_parse_error_naming_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    let err = I18n::new(
        "en",
        &[LocaleInit::with_files("en", "English", [path.clone()])],
        I18nOptions::default(),
    )
    .unwrap_err();
    match err {
        I18nError::FileLoad { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected FileLoad, got {other:?}"),
    }
}

#[test]
fn load_and_unload_messages_round_trip_on_disk() {
    let (_dir, en, fr) = fixture_dir();
    let mut i18n = engine_from_files(en, fr, I18nOptions::default());

    let dir = TempDir::new().unwrap();
    let extra = write_locale(&dir, "extra.json", &json!({"dlc": {"title": "Expansion"}}));

    i18n.load_messages(&[extra.clone()], "en").unwrap();
    assert!(i18n.message_exists("dlc.title", "en"));

    i18n.unload_messages(&[extra], "en").unwrap();
    assert!(!i18n.message_exists("dlc.title", "en"));
    assert!(i18n.message_exists("hello", "en"), "base catalog untouched");
}

#[test]
fn references_survive_locale_switches_and_dangling_owners() {
    let (_dir, en, fr) = fixture_dir();
    let mut i18n = engine_from_files(en, fr, I18nOptions::default());

    let title = VarPath::from("hud.title");
    i18n.create_ref_message(Owner::Instance(42), title.clone(), "hello", MessageData::None)
        .unwrap();

    let mut assets = HashMap::new();
    assets.insert("en".to_string(), AssetHandle(10));
    assets.insert("fr".to_string(), AssetHandle(20));
    i18n.create_ref_asset(Owner::Instance(42), VarPath::from("hud.flag"), assets);

    i18n.set_locale("fr", true).unwrap();
    assert_eq!(
        i18n.message_from_ref(Owner::Instance(42), &title),
        Some("Bonjour")
    );
    assert_eq!(
        i18n.asset_from_ref(Owner::Instance(42), &VarPath::from("hud.flag")),
        Some(AssetHandle(20))
    );

    // The host object is "destroyed"; nothing tells the engine. Further
    // passes keep resolving into the slot harmlessly.
    i18n.set_locale("en", true).unwrap();
    assert_eq!(
        i18n.message_from_ref(Owner::Instance(42), &title),
        Some("Hello")
    );

    assert!(i18n.remove_ref(Owner::Instance(42), &title));
    assert_eq!(i18n.message_from_ref(Owner::Instance(42), &title), None);
}

#[test]
fn plural_refresh_propagates_across_owners() {
    let (_dir, en, fr) = fixture_dir();
    let mut i18n = engine_from_files(en, fr, I18nOptions::default());

    let counter = VarPath::from("counter");
    i18n.create_ref_message(Owner::Global, counter.clone(), "items", MessageData::None)
        .unwrap();
    i18n.create_ref_message(
        Owner::Instance(1),
        VarPath::from("hud.counter"),
        "items",
        MessageData::None,
    )
    .unwrap();

    assert!(i18n.update_plurals(Owner::Global, &counter, 1, true));
    assert_eq!(i18n.message_from_ref(Owner::Global, &counter), Some("one item"));
    assert_eq!(
        i18n.message_from_ref(Owner::Instance(1), &VarPath::from("hud.counter")),
        Some("one item")
    );

    assert!(i18n.update_plurals(Owner::Global, &counter, 0, false));
    assert_eq!(i18n.message_from_ref(Owner::Global, &counter), Some("no items"));
    assert_eq!(
        i18n.message_from_ref(Owner::Instance(1), &VarPath::from("hud.counter")),
        Some("one item"),
        "without also_update_all the sibling keeps its value"
    );
}

#[test]
fn cache_ids_are_stable_across_instances() {
    let (_dir, en, fr) = fixture_dir();
    let (_dir2, en2, fr2) = fixture_dir();
    let mut a = engine_from_files(en, fr, I18nOptions::default());
    let b = engine_from_files(en2, fr2, I18nOptions::default());

    let data = MessageData::Scalar(3);
    let id = a.create_cache("items", &data, "en", None).unwrap();
    assert_eq!(id, b.cache_id("items", &data, "en"), "fingerprints are input-only");
    assert!(!b.cache_exists(id), "values never leak between instances");
    assert_eq!(a.use_cache(id).unwrap(), "3 items");
}

#[test]
fn use_caches_fails_on_first_missing_id() {
    let (_dir, en, fr) = fixture_dir();
    let mut i18n = engine_from_files(en, fr, I18nOptions::default());
    let id = i18n.create_cache("hello", &MessageData::None, "en", None).unwrap();

    let err = i18n.use_caches(&[id, 12345]).unwrap_err();
    assert!(matches!(err, I18nError::CacheMiss { id: 12345 }));
    assert_eq!(i18n.use_caches(&[id]).unwrap(), vec!["Hello"]);
}

#[test]
fn locale_listing_preserves_registration_order() {
    let (_dir, en, fr) = fixture_dir();
    let mut i18n = engine_from_files(en, fr, I18nOptions::default());
    i18n.add_locale("ja", "Japanese");

    let store = i18n.store();
    assert_eq!(store.locale_codes(), vec!["en", "fr", "ja"]);
    assert_eq!(store.locale_names(), vec!["English", "French", "Japanese"]);
}
