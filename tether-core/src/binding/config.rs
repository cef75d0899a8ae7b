//! Executor configuration.

use serde::{Deserialize, Serialize};

/// Order in which an executor takes pending bindings off its queue.
///
/// Only the evaluation order of independent bindings differs; every target
/// is still computed at most once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainOrder {
    /// Oldest pending binding first.
    #[default]
    Fifo,
    /// Newest pending binding first.
    Lifo,
}

/// Settings for a [`BindingExecutor`](super::BindingExecutor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Queue discipline.
    pub drain_order: DrainOrder,

    /// Run immediately whenever a source changes or a binding is installed.
    ///
    /// With `false` the caller batches mutations and calls
    /// [`run`](super::BindingExecutor::run) itself. Between those calls the
    /// executor is not idle: every source written so far is already in the
    /// cache as settled, so [`cached`](super::BindingExecutor::cached) is
    /// non-zero, and a property written directly keeps that value for the
    /// next run instead of being recomputed by its own binding.
    pub auto_run: bool,
}

impl ExecutorConfig {
    /// Configuration for batch use: nothing runs until asked.
    pub fn manual() -> Self {
        Self {
            auto_run: false,
            ..Self::default()
        }
    }

    /// Set the queue discipline.
    pub fn with_drain_order(mut self, drain_order: DrainOrder) -> Self {
        self.drain_order = drain_order;
        self
    }

    /// Set whether changes trigger a run immediately.
    pub fn with_auto_run(mut self, auto_run: bool) -> Self {
        self.auto_run = auto_run;
        self
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            drain_order: DrainOrder::Fifo,
            auto_run: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_automatically_in_fifo_order() {
        let config = ExecutorConfig::default();
        assert!(config.auto_run);
        assert_eq!(config.drain_order, DrainOrder::Fifo);
    }

    #[test]
    fn builder_methods() {
        let config = ExecutorConfig::manual().with_drain_order(DrainOrder::Lifo);
        assert!(!config.auto_run);
        assert_eq!(config.drain_order, DrainOrder::Lifo);
        assert!(config.with_auto_run(true).auto_run);
    }
}
