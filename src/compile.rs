use tracing::debug;

use crate::dispatch::prepare;
use crate::operators::{is_legal, validate_literal};
use crate::{Condition, Rule, RuleError, RuleSchema, RuleSet, RunOptions, Value, VariableDecl};

pub(crate) fn compile(
    rules: Vec<Rule>,
    options: RunOptions,
    schema: &RuleSchema,
) -> Result<RuleSet, RuleError> {
    validate_rules(&rules, schema)?;
    debug!(rules = rules.len(), "validated rule set");
    Ok(RuleSet { rules, options })
}

/// Check every rule against the declared variables and actions without running
/// anything.
///
/// # Errors
///
/// Returns the first problem found, with `MalformedRule` paths such as
/// `[0].conditions.all[1].value`.
pub fn validate_rules(rules: &[Rule], schema: &RuleSchema) -> Result<(), RuleError> {
    for (idx, rule) in rules.iter().enumerate() {
        check_rule(idx, rule, schema)?;
    }
    Ok(())
}

fn check_rule(idx: usize, rule: &Rule, schema: &RuleSchema) -> Result<(), RuleError> {
    let path = format!("[{idx}].conditions");
    let conditions = rule
        .conditions
        .as_ref()
        .ok_or_else(|| RuleError::malformed(path.as_str(), "rule has no condition tree"))?;
    check_condition(conditions, &path, schema)?;

    for invocation in &rule.actions {
        let decl = schema
            .action(&invocation.name)
            .ok_or_else(|| RuleError::UnknownAction {
                name: invocation.name.clone(),
            })?;
        prepare(decl, invocation)?;
    }
    Ok(())
}

fn check_condition(
    condition: &Condition,
    path: &str,
    schema: &RuleSchema,
) -> Result<(), RuleError> {
    match condition {
        Condition::All(children) => check_children(children, path, "all", schema),
        Condition::Any(children) => check_children(children, path, "any", schema),
        Condition::Leaf(leaf) => {
            let decl = schema
                .variable(&leaf.name)
                .ok_or_else(|| RuleError::UnknownVariable {
                    name: leaf.name.clone(),
                })?;
            if !is_legal(leaf.operator, decl.field_type) {
                return Err(RuleError::InvalidOperator {
                    operator: leaf.operator.name().to_owned(),
                    field_type: Some(decl.field_type),
                });
            }
            validate_literal(leaf.operator, decl.field_type, leaf.value.as_ref())
                .and_then(|()| check_options(decl, leaf.value.as_ref()))
                .map_err(|reason| RuleError::malformed(format!("{path}.value"), reason))
        }
    }
}

/// Every element of a select literal must be a declared option, or the leaf
/// could never match.
fn check_options(decl: &VariableDecl, literal: Option<&Value>) -> Result<(), String> {
    let Some(literal) = literal else {
        return Ok(());
    };
    if !decl.field_type.has_options() || decl.options.is_empty() {
        return Ok(());
    }
    let elements = literal
        .as_list()
        .unwrap_or_else(|| std::slice::from_ref(literal));
    for element in elements {
        match element.as_str() {
            Some(name) if decl.allows_option(name) => {}
            _ => return Err(format!("{element} is not an option of '{}'", decl.name)),
        }
    }
    Ok(())
}

fn check_children(
    children: &[Condition],
    path: &str,
    keyword: &str,
    schema: &RuleSchema,
) -> Result<(), RuleError> {
    for (i, child) in children.iter().enumerate() {
        check_condition(child, &format!("{path}.{keyword}[{i}]"), schema)?;
    }
    Ok(())
}
