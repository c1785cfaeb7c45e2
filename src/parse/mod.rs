mod tree;

use std::path::Path;

use crate::{Error, Rule};

/// Parse a JSON rule-set document: an array of `{conditions, actions}` objects.
///
/// The result is not yet checked against any variables or actions; see
/// [`RuleSet::from_json`](crate::RuleSet::from_json) for the validated path.
///
/// # Errors
///
/// [`Error::Json`] if the input is not JSON, [`Error::Rule`] with a
/// path-qualified [`MalformedRule`](crate::RuleError::MalformedRule) if it is
/// JSON of the wrong shape.
pub fn parse_rules(input: &str) -> Result<Vec<Rule>, Error> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    Ok(rules_from_value(&value)?)
}

/// Like [`parse_rules`], for an already parsed JSON document.
///
/// # Errors
///
/// Returns [`MalformedRule`](crate::RuleError::MalformedRule) naming the first
/// node that is not a valid rule or condition.
pub fn rules_from_value(value: &serde_json::Value) -> Result<Vec<Rule>, crate::RuleError> {
    tree::rules_from_json(value)
}

/// Read and parse a JSON rule-set file.
///
/// # Errors
///
/// [`Error::Io`] if the file cannot be read, otherwise as [`parse_rules`].
pub fn parse_rules_file(path: impl AsRef<Path>) -> Result<Vec<Rule>, Error> {
    let input = std::fs::read_to_string(path)?;
    parse_rules(&input)
}
