//! Per-run bookkeeping of which modules take part in a publish.
//!
//! Every module declared in `Central.toml` is marked before anything is
//! bundled. The pending list is only available once all of them are marked,
//! and only the pending ones contribute artifacts.

use std::collections::BTreeMap;
use std::fmt;

use centralpub_util::errors::PublishError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Pending,
    Skipped,
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("PENDING"),
            Self::Skipped => f.write_str("SKIPPED"),
        }
    }
}

/// Marks collected during one publish run, owned by that run.
#[derive(Debug, Default)]
pub struct PublishSession {
    modules: Vec<String>,
    states: BTreeMap<String, ModuleState>,
}

impl PublishSession {
    /// Start a session expecting a mark for each of `modules`.
    pub fn new<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modules: modules.into_iter().map(Into::into).collect(),
            states: BTreeMap::new(),
        }
    }

    /// Record the state of `module`. Marking a module twice keeps the last state.
    pub fn mark(&mut self, module: &str, state: ModuleState) -> miette::Result<()> {
        if !self.modules.iter().any(|m| m == module) {
            return Err(PublishError::Config {
                message: format!("Unknown module `{module}`"),
            }
            .into());
        }
        tracing::info!("Setting state {state} for {module}");
        self.states.insert(module.to_string(), state);
        Ok(())
    }

    pub fn state(&self, module: &str) -> Option<ModuleState> {
        self.states.get(module).copied()
    }

    /// Pending modules, in declaration order.
    ///
    /// Fails while any expected module is still unmarked.
    pub fn pending(&self) -> miette::Result<Vec<&str>> {
        let mut pending = Vec::new();
        for module in &self.modules {
            match self.state(module) {
                Some(ModuleState::Pending) => pending.push(module.as_str()),
                Some(ModuleState::Skipped) => {}
                None => {
                    return Err(PublishError::Generic {
                        message: format!("Module `{module}` has no publish state yet"),
                    }
                    .into())
                }
            }
        }
        Ok(pending)
    }
}
