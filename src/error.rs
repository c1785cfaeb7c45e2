use thiserror::Error;

use crate::RuleError;

/// Unified error type for loading rules from text or files.
///
/// Returned by [`parse_rules`](crate::parse_rules),
/// [`RuleSet::from_json()`](crate::RuleSet::from_json) and
/// [`RuleSet::from_file()`](crate::RuleSet::from_file).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
