use std::collections::HashMap;

use crate::error::{Result, RuntimeError};
use crate::locale::Locale;
use crate::store::ScriptStore;

/// Maps the asset ids referenced by steps to locations the asset delivery side can
/// fetch. Holds no asset data; locations are computed once when the project is loaded.
#[derive(Debug, Default, Clone)]
pub struct AssetResolver {
    locations: HashMap<String, String>,
}

/// An asset id referenced by a step but missing from the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingAsset<'a> {
    pub locale: &'a Locale,
    pub index: usize,
    pub id: &'a str,
}

impl AssetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, location: impl Into<String>) {
        self.locations.insert(id.into(), location.into());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.locations.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn resolve(&self, id: &str) -> Result<&str> {
        self.locations
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| RuntimeError::AssetNotFound(id.to_string()))
    }

    /// Resolves an optional reference; no reference stays `None`.
    pub fn resolve_opt(&self, id: Option<&str>) -> Result<Option<String>> {
        id.map(|id| self.resolve(id).map(str::to_string))
            .transpose()
    }

    /// Every asset reference in `store` without a location, ordered by locale then step.
    pub fn dangling<'a>(&self, store: &'a ScriptStore) -> Vec<DanglingAsset<'a>> {
        let mut locales = store.locales().collect::<Vec<_>>();
        locales.sort();

        let mut dangling = vec![];
        for locale in locales {
            let Some(script) = store.script(locale.as_str()) else {
                continue;
            };
            for (index, step) in script.steps().iter().enumerate() {
                for id in [step.background.as_deref(), step.music.as_deref()]
                    .into_iter()
                    .flatten()
                {
                    if !self.contains(id) {
                        dangling.push(DanglingAsset { locale, index, id });
                    }
                }
            }
        }
        dangling
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AssetResolver {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            locations: iter
                .into_iter()
                .map(|(id, location)| (id.into(), location.into()))
                .collect(),
        }
    }
}
