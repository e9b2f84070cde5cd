use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwapOption;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, RuntimeError};
use crate::locale::Locale;
use crate::project::{Info, Project};
use crate::runtime::{Action, RunRecord, Runtime};

/// The boundary the presentation layer talks to.
///
/// Read-only queries go straight to the loaded project, everything touching
/// the run is serialized through one lock.
#[derive(Debug, Default)]
pub struct Host {
    project: ArcSwapOption<Project>,
    runtime: Mutex<Option<Runtime>>,
}

#[derive(Deserialize)]
struct ChooseLocaleArgs {
    locales: Vec<Locale>,
}

#[derive(Deserialize)]
struct NativeNameArgs {
    loc: String,
}

#[derive(Deserialize)]
struct StartNewArgs {
    locale: String,
}

#[derive(Deserialize)]
struct SwitchArgs {
    i: usize,
}

#[derive(Deserialize)]
struct RestoreArgs {
    record: RunRecord,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the loaded project, dropping any active run.
    pub fn load(&self, project: Project) {
        let project = Arc::new(project);
        info!("Host serving project {}", project.info().title);

        let mut runtime = self.lock();
        self.project.store(Some(project.clone()));
        *runtime = Some(Runtime::new(project));
    }

    pub fn unload(&self) {
        let mut runtime = self.lock();
        self.project.store(None);
        *runtime = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.project.load().is_some()
    }

    fn project(&self) -> Result<Arc<Project>> {
        self.project.load_full().ok_or(RuntimeError::NotLoaded)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Runtime>> {
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_runtime<T>(&self, f: impl FnOnce(&mut Runtime) -> Result<T>) -> Result<T> {
        let mut runtime = self.lock();
        let runtime = runtime.as_mut().ok_or(RuntimeError::NotLoaded)?;
        f(runtime)
    }

    pub fn choose_locale<I, L>(&self, requested: I) -> Result<Option<Locale>>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        Ok(self.project()?.catalog().choose(requested))
    }

    pub fn locale_native_name(&self, locale: &str) -> Result<String> {
        self.project()?.catalog().native_name(locale)
    }

    pub fn info(&self) -> Result<Info> {
        Ok(self.project()?.info().clone())
    }

    pub fn start_new(&self, locale: &str) -> Result<()> {
        self.with_runtime(|runtime| runtime.start_new(locale))
    }

    pub fn next_run(&self) -> Result<bool> {
        self.with_runtime(Runtime::next_run)
    }

    pub fn current_run(&self) -> Result<Option<Action>> {
        self.with_runtime(|runtime| runtime.current_run())
    }

    pub fn switch(&self, i: usize) -> Result<()> {
        self.with_runtime(|runtime| runtime.switch(i))
    }

    pub fn history(&self) -> Result<Vec<Action>> {
        self.with_runtime(|runtime| runtime.history())
    }

    pub fn save(&self) -> Result<RunRecord> {
        self.with_runtime(|runtime| runtime.save())
    }

    pub fn restore(&self, record: RunRecord) -> Result<()> {
        self.with_runtime(|runtime| runtime.restore(record))
    }

    /// Runs a named command with JSON arguments and returns its JSON result.
    ///
    /// Commands without arguments ignore `args`.
    pub fn invoke(&self, command: &str, args: Value) -> Result<Value> {
        debug!("Invoking {command} with {args}");

        match command {
            "choose_locale" => {
                let args: ChooseLocaleArgs = parse_args(command, args)?;
                to_json(self.choose_locale(&args.locales)?)
            }
            "locale_native_name" => {
                let args: NativeNameArgs = parse_args(command, args)?;
                to_json(self.locale_native_name(&args.loc)?)
            }
            "info" => to_json(self.info()?),
            "start_new" => {
                let args: StartNewArgs = parse_args(command, args)?;
                to_json(self.start_new(&args.locale)?)
            }
            "next_run" => to_json(self.next_run()?),
            "current_run" => to_json(self.current_run()?),
            "switch" => {
                let args: SwitchArgs = parse_args(command, args)?;
                to_json(self.switch(args.i)?)
            }
            "history" => to_json(self.history()?),
            "save" => to_json(self.save()?),
            "restore" => {
                let args: RestoreArgs = parse_args(command, args)?;
                to_json(self.restore(args.record)?)
            }
            _ => Err(RuntimeError::UnknownCommand(command.to_string())),
        }
    }
}

fn parse_args<T: DeserializeOwned>(command: &str, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| RuntimeError::InvalidArguments {
        command: command.to_string(),
        message: e.to_string(),
    })
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value).map_err(anyhow::Error::from)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::asset::AssetResolver;
    use crate::store::{Script, ScriptStore, Step};

    use super::*;

    fn project() -> Project {
        let mut store = ScriptStore::new();
        store.insert(
            Locale::from("en"),
            Script::from_steps(
                "en",
                vec![Step {
                    line: "Hello.".to_string(),
                    ..Default::default()
                }],
            )
            .unwrap(),
        );
        Project::new(
            Info {
                title: "Morning Bell".to_string(),
                author: "Someone".to_string(),
            },
            store,
            AssetResolver::new(),
        )
    }

    #[test]
    fn test_not_loaded() {
        let host = Host::new();
        assert!(!host.is_loaded());
        assert!(matches!(host.info(), Err(RuntimeError::NotLoaded)));
        assert!(matches!(host.next_run(), Err(RuntimeError::NotLoaded)));
        assert!(matches!(
            host.invoke("current_run", Value::Null),
            Err(RuntimeError::NotLoaded)
        ));
    }

    #[test]
    fn test_load_unload() {
        let host = Host::new();
        host.load(project());
        host.start_new("en").unwrap();
        assert!(host.current_run().unwrap().is_some());

        // a reload starts without a run
        host.load(project());
        assert!(matches!(host.next_run(), Err(RuntimeError::NoActiveRun)));

        host.unload();
        assert!(!host.is_loaded());
        assert!(matches!(host.start_new("en"), Err(RuntimeError::NotLoaded)));
    }

    #[test]
    fn test_invoke_errors() {
        let host = Host::new();
        host.load(project());

        assert!(matches!(
            host.invoke("goto", Value::Null),
            Err(RuntimeError::UnknownCommand(command)) if command == "goto"
        ));
        assert!(matches!(
            host.invoke("start_new", json!({ "lang": "en" })),
            Err(RuntimeError::InvalidArguments { command, .. }) if command == "start_new"
        ));
        host.invoke("start_new", json!({ "locale": "en" })).unwrap();
        assert!(matches!(
            host.invoke("switch", json!({ "i": -1 })),
            Err(RuntimeError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn test_invoke_info() {
        let host = Host::new();
        host.load(project());
        assert_eq!(
            host.invoke("info", Value::Null).unwrap(),
            json!({ "title": "Morning Bell", "author": "Someone" })
        );
    }
}
