use std::collections::VecDeque;

use crate::locale::Locale;
use crate::store::{ScriptStore, Variables};

/// How many passed steps a run remembers; older ones are dropped first.
pub const HISTORY_LIMIT: usize = 1024;

/// The cursor of the active run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    pub locale: Locale,
    /// index of the step served by `current_run`
    pub cursor: usize,
    /// the switch chosen most recently
    pub last_switch: Option<usize>,
    /// steps already passed, oldest first
    pub history: VecDeque<usize>,
    pub variables: Variables,
}

impl RunState {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            cursor: 0,
            last_switch: None,
            history: VecDeque::new(),
            variables: Variables::new(),
        }
    }

    /// Applies the `@set` assignments of the step at the cursor.
    pub(crate) fn enter(&mut self, store: &ScriptStore) {
        let Some(step) = store.step_at(self.locale.as_str(), self.cursor) else {
            return;
        };
        for assignment in &step.assignments {
            self.variables
                .insert(assignment.name.clone(), assignment.value.clone());
        }
    }

    /// Leaves the current step for `to`.
    pub(crate) fn jump(&mut self, to: usize, store: &ScriptStore) {
        if self.history.len() >= HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(self.cursor);
        self.cursor = to;
        self.enter(store);
    }
}
