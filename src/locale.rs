use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts")]
use ts_rs::TS;

use crate::error::{Result, RuntimeError};

/// An opaque language tag such as `en` or `zh-Hans`, compared by exact equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct Locale(String);

impl Locale {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locale {
    fn from(tag: &str) -> Self {
        Self(tag.to_string())
    }
}

impl From<String> for Locale {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Locale {
    fn borrow(&self) -> &str {
        &self.0
    }
}

const NATIVE_NAMES: &[(&str, &str)] = &[
    ("de", "Deutsch"),
    ("en", "English"),
    ("en-GB", "English (United Kingdom)"),
    ("en-US", "English (United States)"),
    ("es", "Español"),
    ("fr", "Français"),
    ("it", "Italiano"),
    ("ja", "日本語"),
    ("ja-JP", "日本語 (日本)"),
    ("ko", "한국어"),
    ("pt", "Português"),
    ("pt-BR", "Português (Brasil)"),
    ("ru", "Русский"),
    ("zh", "中文"),
    ("zh-CN", "中文 (中国)"),
    ("zh-Hans", "简体中文"),
    ("zh-Hant", "繁體中文"),
    ("zh-TW", "中文 (台灣)"),
];

/// The built-in self-name of a well known tag.
pub fn builtin_native_name(tag: &str) -> Option<&'static str> {
    NATIVE_NAMES
        .binary_search_by(|(t, _)| t.cmp(&tag))
        .ok()
        .map(|i| NATIVE_NAMES[i].1)
}

/// The primary language subtag, `fr` of `fr-CA` or `zh_Hant_TW`.
pub fn language(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

/// The locales a project can serve, with optional self-names from the project file.
#[derive(Debug, Default, Clone)]
pub struct LocaleCatalog {
    locales: BTreeMap<Locale, Option<String>>,
}

impl LocaleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, locale: Locale, name: Option<String>) {
        self.locales.insert(locale, name);
    }

    pub fn contains(&self, locale: &str) -> bool {
        self.locales.contains_key(locale)
    }

    pub fn locales(&self) -> impl Iterator<Item = &Locale> {
        self.locales.keys()
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    /// Returns the first of `requested`, in the caller's preference order,
    /// that the catalog supports.
    pub fn choose<I, L>(&self, requested: I) -> Option<Locale>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        requested
            .into_iter()
            .find_map(|l| self.locales.get_key_value(l.as_ref()))
            .map(|(locale, _)| locale.clone())
    }

    /// The human readable self-name of a supported locale. Falls back to the
    /// built-in table, then to the name of its language subtag, then to the
    /// tag itself.
    pub fn native_name(&self, locale: &str) -> Result<String> {
        let (locale, name) = self
            .locales
            .get_key_value(locale)
            .ok_or_else(|| RuntimeError::UnknownLocale(Locale::from(locale)))?;

        Ok(match name {
            Some(name) => name.clone(),
            None => builtin_native_name(locale.as_str())
                .or_else(|| builtin_native_name(language(locale.as_str())))
                .unwrap_or(locale.as_str())
                .to_string(),
        })
    }
}

impl FromIterator<Locale> for LocaleCatalog {
    fn from_iter<T: IntoIterator<Item = Locale>>(iter: T) -> Self {
        Self {
            locales: iter.into_iter().map(|l| (l, None)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(tags: &[&str]) -> LocaleCatalog {
        tags.iter().copied().map(Locale::from).collect()
    }

    #[test]
    fn test_native_names_sorted() {
        assert!(NATIVE_NAMES.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(builtin_native_name("ja"), Some("日本語"));
        assert_eq!(builtin_native_name("xx"), None);
    }

    #[test]
    fn test_choose() {
        let catalog = catalog(&["en", "ja"]);
        assert_eq!(catalog.choose(["fr", "ja"]), Some(Locale::from("ja")));
        assert_eq!(catalog.choose(["en", "ja"]), Some(Locale::from("en")));
        assert_eq!(catalog.choose(["ja", "en"]), Some(Locale::from("ja")));
        assert_eq!(catalog.choose(["fr", "de"]), None);
        assert_eq!(catalog.choose(Vec::<String>::new()), None);
        // tags are compared exactly
        assert_eq!(catalog.choose(["en-US", "JA"]), None);
    }

    #[test]
    fn test_native_name() {
        let mut catalog = catalog(&["en", "ja", "tlh"]);
        catalog.insert(Locale::from("en"), Some("English (Game)".to_string()));

        assert_eq!(catalog.native_name("en").unwrap(), "English (Game)");
        assert_eq!(catalog.native_name("ja").unwrap(), "日本語");
        assert_eq!(catalog.native_name("tlh").unwrap(), "tlh");
        assert!(matches!(
            catalog.native_name("fr"),
            Err(RuntimeError::UnknownLocale(l)) if l.as_str() == "fr"
        ));
    }

    #[test]
    fn test_native_name_subtag() {
        let catalog = catalog(&["fr-CA", "de_DE", "zh-Hant", "tlh-Latn"]);

        assert_eq!(catalog.native_name("fr-CA").unwrap(), "Français");
        assert_eq!(catalog.native_name("de_DE").unwrap(), "Deutsch");
        // an exact entry wins over the language
        assert_eq!(catalog.native_name("zh-Hant").unwrap(), "繁體中文");
        assert_eq!(catalog.native_name("tlh-Latn").unwrap(), "tlh-Latn");
        assert_eq!(language("zh_Hant_TW"), "zh");
        assert_eq!(language("ja"), "ja");
    }
}
