use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Condition, Value};

/// A condition tree plus the actions to run when it holds.
///
/// `conditions` is `None` only for rules built without a call to
/// [`RuleBuilder::when()`](super::ruleset::RuleBuilder::when) or parsed from JSON
/// without a `conditions` key. Such rules are rejected when a
/// [`RuleSet`](super::RuleSet) is built, and fail with
/// [`RuleError::MalformedRule`](super::RuleError::MalformedRule) if run unvalidated.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub conditions: Option<Condition>,
    pub actions: Vec<ActionInvocation>,
}

impl Rule {
    #[must_use]
    pub fn new(conditions: Condition) -> Self {
        Self {
            conditions: Some(conditions),
            actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn then(mut self, action: ActionInvocation) -> Self {
        self.actions.push(action);
        self
    }
}

/// `{name, params}`: one action to run when a rule triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionInvocation {
    pub name: String,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

impl ActionInvocation {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_owned(), value.into());
        self
    }
}
