//! Localized UI strings.
//!
//! Tables are embedded in the binary and parsed on demand into an owned
//! [`Translations`] value. The rest of the app only sees a [`Localizer`].

use std::collections::HashMap;
use std::sync::Arc;

/// Resolves a message key to display text.
pub type Localizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Language used when the requested one has no table.
pub const FALLBACK_LANGUAGE: &str = "en";

const EMBEDDED: &[(&str, &str)] = &[
    ("en", include_str!("../translations/en.json")),
    ("ru", include_str!("../translations/ru.json")),
];

/// Message table for one language.
#[derive(Clone, Debug, Default)]
pub struct Translations {
    language: String,
    entries: HashMap<String, String>,
}

impl Translations {
    /// Parse a flat JSON object of key/text pairs.
    pub fn parse(language: &str, json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            language: language.to_string(),
            entries: serde_json::from_str(json)?,
        })
    }

    /// Load an embedded table, falling back to English.
    ///
    /// Never fails: with no usable table every key resolves to itself.
    pub fn load(language: &str) -> Self {
        for candidate in [language, FALLBACK_LANGUAGE] {
            let Some((_, json)) = EMBEDDED.iter().find(|(lang, _)| *lang == candidate) else {
                continue;
            };
            match Self::parse(candidate, json) {
                Ok(table) => return table,
                Err(e) => log::warn!("broken translation table {candidate}: {e}"),
            }
        }
        log::warn!("no translations for {language}");
        Self::default()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Text for `key`, or the key itself when missing.
    pub fn get(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    pub fn into_localizer(self) -> Localizer {
        Arc::new(move |key: &str| self.get(key))
    }
}
