use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use crate::operators;
use crate::{Condition, FieldType, Leaf, RuleError, Value, VariableProvider};

type Entry = Result<(FieldType, Value), RuleError>;

/// Per-pass memo over a [`VariableProvider`].
///
/// Each variable is computed at most once for the lifetime of the cache.
/// Failures are remembered too, so a broken accessor is not retried by later
/// leaves or rules in the same pass.
pub struct VariableCache<'p, P: VariableProvider + ?Sized> {
    provider: &'p P,
    values: HashMap<String, Entry>,
}

impl<'p, P: VariableProvider + ?Sized> VariableCache<'p, P> {
    #[must_use]
    pub fn new(provider: &'p P) -> Self {
        Self {
            provider,
            values: HashMap::new(),
        }
    }

    /// Field type and value of a declared variable, computing it on first use.
    ///
    /// # Errors
    ///
    /// [`RuleError::UnknownVariable`] if the provider does not declare `name`,
    /// [`RuleError::VariableEvaluation`] if its accessor failed.
    pub fn get(&mut self, name: &str) -> Result<(FieldType, &Value), RuleError> {
        if !self.values.contains_key(name) {
            let entry = self.compute(name);
            self.values.insert(name.to_owned(), entry);
        }
        match &self.values[name] {
            Ok((field_type, value)) => Ok((*field_type, value)),
            Err(e) => Err(e.clone()),
        }
    }

    fn compute(&self, name: &str) -> Entry {
        let decl = self
            .provider
            .declaration(name)
            .ok_or_else(|| RuleError::UnknownVariable {
                name: name.to_owned(),
            })?;
        let value = self
            .provider
            .value(name)
            .map_err(|e| RuleError::VariableEvaluation {
                name: name.to_owned(),
                message: e.to_string(),
            })?;
        trace!(variable = name, %value, "computed variable");
        Ok((decl.field_type, value))
    }

    /// Number of variables looked up so far, failed ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<P: VariableProvider + ?Sized> fmt::Debug for VariableCache<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableCache")
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

/// Evaluate a condition tree depth-first, left to right.
///
/// `all` stops at the first false child and `any` at the first true one; the
/// skipped children's variables are never computed.
///
/// # Errors
///
/// Propagates the first error hit by a visited leaf: an unknown variable, an
/// operator that is not legal for the variable's field type, a missing literal,
/// a type mismatch or an accessor failure.
pub fn evaluate<P: VariableProvider + ?Sized>(
    condition: &Condition,
    cache: &mut VariableCache<'_, P>,
) -> Result<bool, RuleError> {
    match condition {
        Condition::All(children) => {
            for child in children {
                if !evaluate(child, cache)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Condition::Any(children) => {
            for child in children {
                if evaluate(child, cache)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Condition::Leaf(leaf) => evaluate_leaf(leaf, cache),
    }
}

fn evaluate_leaf<P: VariableProvider + ?Sized>(
    leaf: &Leaf,
    cache: &mut VariableCache<'_, P>,
) -> Result<bool, RuleError> {
    let (field_type, value) = cache.get(&leaf.name)?;
    if leaf.operator.takes_literal() && leaf.value.is_none() {
        return Err(RuleError::malformed(
            leaf.name.as_str(),
            format!("operator '{}' requires a value", leaf.operator),
        ));
    }
    operators::apply(leaf.operator, field_type, value, leaf.value.as_ref())
}
