mod action;
mod record;
mod state;

use std::sync::Arc;

use log::{debug, info};

pub use self::action::{Action, ActionSwitch};
pub use self::record::RunRecord;
pub use self::state::{RunState, HISTORY_LIMIT};

use crate::error::{Result, RuntimeError};
use crate::locale::Locale;
use crate::project::{Info, Project};

/// Runtime drives at most one run over a loaded project.
///
/// The cursor always points at the step `current_run` serves. `next_run`
/// moves it forward and reports whether a step is left to serve, so a
/// presentation loop reads `current_run` first and then calls `next_run`.
#[derive(Debug, Clone)]
pub struct Runtime {
    project: Arc<Project>,
    run: Option<RunState>,
}

impl Runtime {
    pub fn new(project: Arc<Project>) -> Self {
        Self { project, run: None }
    }

    pub fn project(&self) -> &Arc<Project> {
        &self.project
    }

    pub fn info(&self) -> &Info {
        self.project.info()
    }

    pub fn choose_locale<I, L>(&self, requested: I) -> Option<Locale>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        self.project.catalog().choose(requested)
    }

    pub fn locale_native_name(&self, locale: &str) -> Result<String> {
        self.project.catalog().native_name(locale)
    }

    pub fn state(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Replaces any run with a new one at the first step of `locale`.
    pub fn start_new(&mut self, locale: &str) -> Result<()> {
        if !self.project.store().contains(locale) {
            return Err(RuntimeError::UnsupportedLocale(Locale::from(locale)));
        }

        let mut run = RunState::new(Locale::from(locale));
        run.enter(self.project.store());
        self.run = Some(run);
        info!("Started a new run in locale {locale}");
        Ok(())
    }

    /// Moves past the current step. Returns `false` once the run is exhausted,
    /// further calls stay there.
    pub fn next_run(&mut self) -> Result<bool> {
        let run = self.run.as_mut().ok_or(RuntimeError::NoActiveRun)?;
        let count = self.project.store().step_count(run.locale.as_str());

        if run.cursor < count {
            run.jump(run.cursor + 1, self.project.store());
            debug!("Advanced to step {} of {}", run.cursor, count);
        }

        Ok(run.cursor < count)
    }

    /// The current step with assets resolved, `None` when the run is
    /// exhausted or there is no run.
    pub fn current_run(&self) -> Result<Option<Action>> {
        let Some(run) = &self.run else {
            return Ok(None);
        };

        self.project
            .store()
            .step_at(run.locale.as_str(), run.cursor)
            .map(|step| Action::from_step(step, self.project.assets(), &run.variables))
            .transpose()
    }

    /// Chooses switch `i` of the current step and continues at its target.
    /// A switch whose condition does not hold counts as disabled.
    pub fn switch(&mut self, i: usize) -> Result<()> {
        let run = self.run.as_mut().ok_or(RuntimeError::NoActiveRun)?;
        let target = self
            .project
            .store()
            .step_at(run.locale.as_str(), run.cursor)
            .and_then(|step| step.switches.get(i))
            .filter(|switch| switch.is_enabled(&run.variables))
            .and_then(|switch| switch.target)
            .ok_or(RuntimeError::InvalidSwitch(i))?;

        debug!("Switch {i} at step {} continues at {target}", run.cursor);
        run.jump(target, self.project.store());
        run.last_switch = Some(i);
        Ok(())
    }

    pub fn last_switch(&self) -> Option<usize> {
        self.run.as_ref().and_then(|run| run.last_switch)
    }

    /// The steps already passed in this run, oldest first, at most
    /// [`HISTORY_LIMIT`] of them. Switches show as of the current variables.
    pub fn history(&self) -> Result<Vec<Action>> {
        let run = self.run.as_ref().ok_or(RuntimeError::NoActiveRun)?;
        let store = self.project.store();

        run.history
            .iter()
            .filter_map(|&index| store.step_at(run.locale.as_str(), index))
            .map(|step| Action::from_step(step, self.project.assets(), &run.variables))
            .collect()
    }

    pub fn save(&self) -> Result<RunRecord> {
        let run = self.run.as_ref().ok_or(RuntimeError::NoActiveRun)?;
        let script = self
            .project
            .store()
            .script(run.locale.as_str())
            .ok_or_else(|| RuntimeError::UnsupportedLocale(run.locale.clone()))?;

        Ok(RunRecord {
            locale: run.locale.clone(),
            cursor: run.cursor,
            last_switch: run.last_switch,
            history: run.history.iter().copied().collect(),
            variables: run.variables.clone(),
            fingerprint: script.fingerprint().to_string(),
        })
    }

    /// Replaces any run with a saved one taken against the same script.
    pub fn restore(&mut self, record: RunRecord) -> Result<()> {
        let script = self
            .project
            .store()
            .script(record.locale.as_str())
            .ok_or_else(|| RuntimeError::UnsupportedLocale(record.locale.clone()))?;

        // an exhausted run may sit right past the last step
        if record.fingerprint != script.fingerprint()
            || record.cursor > script.len()
            || record.history.iter().any(|&index| index >= script.len())
        {
            return Err(RuntimeError::StaleRecord(record.locale));
        }
        // the last switch must be one offered by a passed step
        if let Some(i) = record.last_switch {
            let offered = record.history.iter().any(|&index| {
                script
                    .step(index)
                    .is_some_and(|step| i < step.switches.len())
            });
            if !offered {
                return Err(RuntimeError::StaleRecord(record.locale));
            }
        }

        info!(
            "Restored a run in locale {} at step {}",
            record.locale, record.cursor
        );
        let skip = record.history.len().saturating_sub(HISTORY_LIMIT);
        self.run = Some(RunState {
            locale: record.locale,
            cursor: record.cursor,
            last_switch: record.last_switch,
            history: record.history.into_iter().skip(skip).collect(),
            variables: record.variables,
        });
        Ok(())
    }
}
