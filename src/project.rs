use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::path::PathBuf;

use anyhow::Context;
use log::{info, warn};
use serde::{Deserialize, Serialize};
#[cfg(feature = "ts")]
use ts_rs::TS;

use crate::asset::AssetResolver;
use crate::error::Result;
use crate::locale::{Locale, LocaleCatalog};
use crate::parser::parse_script;
use crate::store::{Script, ScriptStore};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct Info {
    pub title: String,
    pub author: String,
}

/// The project file, usually `project.json` at the project root.
///
/// ```json
/// {
///     "title": "Morning Bell",
///     "author": "Someone",
///     "scripts": { "en": "scripts/en.scena", "ja": "scripts/ja.scena" },
///     "names": { "en": "English" },
///     "assets": { "school": "bg/school.png", "theme": "bgm/theme.ogg" }
/// }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub title: String,
    #[serde(default)]
    pub author: String,
    /// script path of every supported locale
    pub scripts: BTreeMap<Locale, String>,
    /// native names overriding the built-in ones
    #[serde(default)]
    pub names: BTreeMap<Locale, String>,
    /// asset id to asset path
    #[serde(default)]
    pub assets: BTreeMap<String, String>,
}

/// Where the project files come from.
pub trait ProjectSource {
    /// Reads a file, `path` is relative to the project root.
    fn read(&self, path: &str) -> impl Future<Output = Result<Vec<u8>>>;

    /// The location the presentation layer fetches an asset path from.
    fn locate(&self, path: &str) -> String;
}

/// Project files in a directory of the local file system.
///
/// With the `tokio` feature files are read through `tokio::fs` and loading must
/// run inside a tokio runtime. Without it reads block the calling thread, which
/// suits [`Project::load_blocking`].
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ProjectSource for DirSource {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let path = self.root.join(path);
        #[cfg(feature = "tokio")]
        let data = tokio::fs::read(&path).await;
        #[cfg(not(feature = "tokio"))]
        let data = std::fs::read(&path);

        let data = data.with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(data)
    }

    fn locate(&self, path: &str) -> String {
        self.root.join(path).to_string_lossy().into_owned()
    }
}

/// Project files held in memory, for embedded projects and tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    base: String,
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    /// `base` is prepended to asset paths, e.g. `asset://localhost/`.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            files: HashMap::new(),
        }
    }

    pub fn insert(&mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), data.into());
    }

    pub fn with_file(mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }
}

impl ProjectSource for MemorySource {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let data = self
            .files
            .get(path)
            .cloned()
            .with_context(|| format!("File {path} not found"))?;
        Ok(data)
    }

    fn locate(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

/// A loaded project: info, locale catalog, scripts and asset table.
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct Project {
    info: Info,
    catalog: LocaleCatalog,
    store: ScriptStore,
    assets: AssetResolver,
}

impl Project {
    /// The catalog holds exactly the locales of `store`.
    pub fn new(info: Info, store: ScriptStore, assets: AssetResolver) -> Self {
        let catalog = store.locales().cloned().collect();
        Self {
            info,
            catalog,
            store,
            assets,
        }
    }

    /// Reads the project file at `config_path` and every script it names.
    pub async fn load<S: ProjectSource>(source: &S, config_path: &str) -> Result<Self> {
        let data = source.read(config_path).await?;
        let config: ProjectConfig = serde_json::from_slice(&data)
            .with_context(|| format!("Failed to parse project file {config_path}"))?;

        let mut store = ScriptStore::new();
        for (locale, path) in &config.scripts {
            let data = source.read(path).await?;
            let text = String::from_utf8(data)
                .with_context(|| format!("Script {path} is not valid UTF-8"))?;
            let story = parse_script(path, &text)?;
            store.insert(locale.clone(), Script::compile(&story)?);
        }

        let assets = config
            .assets
            .iter()
            .map(|(id, path)| (id.clone(), source.locate(path)))
            .collect();

        let mut project = Self::new(
            Info {
                title: config.title,
                author: config.author,
            },
            store,
            assets,
        );
        for (locale, name) in config.names {
            project.set_native_name(locale, name);
        }

        for dangling in project.assets.dangling(&project.store) {
            warn!(
                "Step {} of locale {} references missing asset {}",
                dangling.index, dangling.locale, dangling.id
            );
        }
        info!(
            "Loaded project {} with {} locale(s)",
            project.info.title,
            project.catalog.len()
        );

        Ok(project)
    }

    /// [`Project::load`] driven to completion on the current thread.
    pub fn load_blocking<S: ProjectSource>(source: &S, config_path: &str) -> Result<Self> {
        pollster::block_on(Self::load(source, config_path))
    }

    /// Overrides the self-name of a supported locale.
    pub fn set_native_name(&mut self, locale: Locale, name: String) {
        if self.catalog.contains(locale.as_str()) {
            self.catalog.insert(locale, Some(name));
        } else {
            warn!("Ignoring native name of locale {locale}, which has no script");
        }
    }

    pub fn info(&self) -> &Info {
        &self.info
    }

    pub fn catalog(&self) -> &LocaleCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &ScriptStore {
        &self.store
    }

    pub fn assets(&self) -> &AssetResolver {
        &self.assets
    }
}
