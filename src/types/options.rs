use serde::{Deserialize, Serialize};

/// Knobs for one pass of [`run_with`](crate::run_with).
///
/// Deserializes with every field optional, so hosts can embed it in their own
/// configuration:
///
/// ```
/// use rulebook::RunOptions;
///
/// let options: RunOptions = serde_json::from_str(r#"{"stop_on_first_trigger": true}"#).unwrap();
/// assert!(options.stop_on_first_trigger);
/// assert!(!options.abort_on_rule_error);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Stop visiting rules after the first one that fires.
    pub stop_on_first_trigger: bool,
    /// Return rule-level failures (type mismatches, accessor and handler
    /// errors) as `Err` instead of recording them and moving on. A failing
    /// handler then also stops the rule's remaining actions.
    pub abort_on_rule_error: bool,
}

impl RunOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stop_on_first_trigger(mut self, stop: bool) -> Self {
        self.stop_on_first_trigger = stop;
        self
    }

    #[must_use]
    pub fn abort_on_rule_error(mut self, abort: bool) -> Self {
        self.abort_on_rule_error = abort;
        self
    }
}
