//! Embedded message catalogs.
//!
//! Catalogs are JSON key→template maps embedded at compile time with
//! `include_str!()`, so lookups never touch the filesystem. Both
//! catalogs cover every key the validation engine emits.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::Lang;

/// English catalog, parsed lazily from the embedded JSON.
///
/// # Panics
///
/// Panics if the embedded JSON is invalid, which can only happen when
/// the catalog file is edited incorrectly.
static EN: Lazy<HashMap<String, String>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../messages/en.json"))
        .expect("invalid en catalog JSON - this is a bug in bodyguard-i18n")
});

/// Korean catalog, parsed lazily from the embedded JSON.
static KO: Lazy<HashMap<String, String>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../messages/ko.json"))
        .expect("invalid ko catalog JSON - this is a bug in bodyguard-i18n")
});

/// The raw template for a key in the given language, if the catalog
/// has it.
pub(crate) fn template(lang: Lang, key: &str) -> Option<&'static str> {
    let catalog: &'static HashMap<String, String> = match lang {
        Lang::En => &EN,
        Lang::Ko => &KO,
    };
    catalog.get(key).map(String::as_str)
}
