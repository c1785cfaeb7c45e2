use std::fmt;
use std::time::Duration;

use super::error::RuleError;

/// A rule that could not be decided, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFailure {
    /// Index of the rule in the order it was given.
    pub rule: usize,
    pub error: RuleError,
}

/// Detailed outcome of one pass, returned by [`run_with`](crate::run_with) and
/// [`RuleSet::run_detailed()`](super::RuleSet::run_detailed).
#[derive(Debug, Clone)]
#[must_use]
pub struct RunReport {
    fired: Vec<usize>,
    failures: Vec<RuleFailure>,
    visited: usize,
    duration: Duration,
}

impl RunReport {
    pub(crate) fn new(
        fired: Vec<usize>,
        failures: Vec<RuleFailure>,
        visited: usize,
        duration: Duration,
    ) -> Self {
        Self {
            fired,
            failures,
            visited,
            duration,
        }
    }

    /// Whether at least one rule fired. Same as the result of
    /// [`run_all`](crate::run_all).
    #[must_use]
    pub fn triggered(&self) -> bool {
        !self.fired.is_empty()
    }

    /// Indices of the rules that fired, in visiting order.
    #[must_use]
    pub fn fired(&self) -> &[usize] {
        &self.fired
    }

    /// Rules that failed with a data-dependent error and were treated as not
    /// triggered.
    #[must_use]
    pub fn failures(&self) -> &[RuleFailure] {
        &self.failures
    }

    /// How many rules were looked at before the pass ended.
    #[must_use]
    pub fn visited(&self) -> usize {
        self.visited
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "triggered: {}", self.triggered())?;
        let fired: Vec<String> = self.fired.iter().map(ToString::to_string).collect();
        write!(f, ", fired: [{}]", fired.join(", "))?;
        write!(f, ", failures: {}", self.failures.len())?;
        write!(f, ", visited: {}", self.visited)?;
        write!(f, ", duration: {:?}", self.duration)
    }
}
