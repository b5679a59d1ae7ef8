// Message catalogs and language selection for bodyguard
//
// Implements the MessageProvider seam with embedded English and Korean
// catalogs. Language is a per-value choice: resolve a Lang (e.g. from
// an Accept-Language header), build a Messages for it, and pass that
// wherever a message is rendered. There is no global language state,
// so concurrent requests in different languages cannot interfere.

mod catalog;

use bodyguard::MessageProvider;
use once_cell::sync::Lazy;
use regex::Regex;

/// `${name}` placeholder syntax of the catalog templates.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{(\w+)\}")
        .expect("placeholder pattern is a valid regex; if this fails it is a bug in bodyguard-i18n")
});

/// A supported catalog language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lang {
    #[default]
    En,
    Ko,
}

impl Lang {
    /// Resolve a language code (`ko`, `ko-KR`, `en-US`, ...); unknown
    /// codes resolve to English.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "ko" | "ko-kr" => Lang::Ko,
            "en" | "en-us" | "en-gb" => Lang::En,
            _ => Lang::En,
        }
    }

    /// Resolve the first language of an `Accept-Language` header. Only
    /// the code before the first comma is considered; quality weights
    /// are not parsed.
    pub fn from_accept_language(header: &str) -> Self {
        Lang::from_code(header.split(',').next().unwrap_or_default())
    }
}

/// Catalog-backed message provider for one language.
///
/// Cheap to construct and `Copy`; hold one per request or per process
/// as suits the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Messages {
    lang: Lang,
}

impl Messages {
    pub const fn new(lang: Lang) -> Self {
        Self { lang }
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }
}

impl MessageProvider for Messages {
    /// Resolve `key` to its template and substitute each `${name}`
    /// placeholder with the named parameter. A placeholder with no
    /// matching parameter renders as the placeholder name; an unknown
    /// key renders as the key itself. Never fails.
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String {
        let Some(template) = catalog::template(self.lang, key) else {
            return key.to_string();
        };
        PLACEHOLDER
            .replace_all(template, |caps: &regex::Captures<'_>| {
                let name = &caps[1];
                params
                    .iter()
                    .find(|(param, _)| *param == name)
                    .map(|(_, value)| value.clone())
                    .unwrap_or_else(|| name.to_string())
            })
            .into_owned()
    }
}
