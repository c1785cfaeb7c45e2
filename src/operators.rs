use regex::Regex;

use crate::types::{FieldType, Operator, RuleError, Value};

/// Tolerance for numeric comparisons.
pub const EPSILON: f64 = 0.000_001;

const NUMERIC: &[Operator] = &[
    Operator::EqualTo,
    Operator::NotEqualTo,
    Operator::GreaterThan,
    Operator::GreaterThanOrEqualTo,
    Operator::LessThan,
    Operator::LessThanOrEqualTo,
];

const STRING: &[Operator] = &[
    Operator::EqualTo,
    Operator::NotEqualTo,
    Operator::Contains,
    Operator::MatchesRegex,
    Operator::StartsWith,
    Operator::EndsWith,
    Operator::NonEmpty,
];

const BOOLEAN: &[Operator] = &[Operator::IsTrue, Operator::IsFalse, Operator::EqualTo];

const SELECT: &[Operator] = &[
    Operator::EqualTo,
    Operator::NotEqualTo,
    Operator::IsContainedBy,
];

const SELECT_MULTIPLE: &[Operator] = &[
    Operator::Contains,
    Operator::DoesNotContain,
    Operator::SharesAtLeastOneElementWith,
    Operator::SharesExactlyWith,
    Operator::SharesAllElementsWith,
    Operator::IsContainedBy,
    Operator::SharesNoElementsWith,
];

/// Operators legal for variables of `field_type`, in display order.
#[must_use]
pub fn operators_for(field_type: FieldType) -> &'static [Operator] {
    match field_type {
        FieldType::Numeric => NUMERIC,
        FieldType::String => STRING,
        FieldType::Boolean => BOOLEAN,
        FieldType::Select => SELECT,
        FieldType::SelectMultiple => SELECT_MULTIPLE,
    }
}

#[must_use]
pub fn is_legal(operator: Operator, field_type: FieldType) -> bool {
    operators_for(field_type).contains(&operator)
}

/// Compare a runtime value against a rule literal.
///
/// # Errors
///
/// - [`RuleError::InvalidOperator`] if `operator` is not legal for `field_type`.
/// - [`RuleError::MalformedRule`] if the operator needs a literal and none was
///   given, or a regex literal does not compile.
/// - [`RuleError::TypeMismatch`] if either operand has the wrong shape for the
///   field type.
pub fn apply(
    operator: Operator,
    field_type: FieldType,
    runtime: &Value,
    literal: Option<&Value>,
) -> Result<bool, RuleError> {
    if !is_legal(operator, field_type) {
        return Err(RuleError::InvalidOperator {
            operator: operator.name().to_owned(),
            field_type: Some(field_type),
        });
    }
    let required = || {
        literal.ok_or_else(|| {
            RuleError::malformed(operator.name(), "operator requires a comparison value")
        })
    };

    match field_type {
        FieldType::Numeric => compare_numeric(operator, runtime, required()?),
        FieldType::String => compare_string(operator, runtime, literal),
        FieldType::Boolean => compare_boolean(operator, runtime, literal),
        FieldType::Select => compare_select(operator, runtime, required()?),
        FieldType::SelectMultiple => compare_select_multiple(operator, runtime, required()?),
    }
}

fn number(value: &Value, expected: &str) -> Result<f64, RuleError> {
    value
        .as_number()
        .ok_or_else(|| RuleError::type_mismatch(expected, value.kind()))
}

fn compare_numeric(
    operator: Operator,
    runtime: &Value,
    literal: &Value,
) -> Result<bool, RuleError> {
    let a = number(runtime, "numeric value")?;
    let b = number(literal, "numeric literal")?;
    let eq = (a - b).abs() <= EPSILON;
    let gt = a - b > EPSILON;
    let lt = b - a > EPSILON;
    Ok(match operator {
        Operator::EqualTo => eq,
        Operator::NotEqualTo => !eq,
        Operator::GreaterThan => gt,
        Operator::GreaterThanOrEqualTo => gt || eq,
        Operator::LessThan => lt,
        Operator::LessThanOrEqualTo => lt || eq,
        _ => unreachable!("operator legality checked by apply"),
    })
}

fn compare_string(
    operator: Operator,
    runtime: &Value,
    literal: Option<&Value>,
) -> Result<bool, RuleError> {
    let s = runtime
        .as_str()
        .ok_or_else(|| RuleError::type_mismatch("string value", runtime.kind()))?;
    if operator == Operator::NonEmpty {
        return Ok(!s.is_empty());
    }
    let literal = literal.ok_or_else(|| {
        RuleError::malformed(operator.name(), "operator requires a comparison value")
    })?;
    let other = literal
        .as_str()
        .ok_or_else(|| RuleError::type_mismatch("string literal", literal.kind()))?;
    Ok(match operator {
        Operator::EqualTo => s == other,
        Operator::NotEqualTo => s != other,
        Operator::Contains => s.contains(other),
        Operator::StartsWith => s.starts_with(other),
        Operator::EndsWith => s.ends_with(other),
        Operator::MatchesRegex => {
            let regex = Regex::new(other).map_err(|e| {
                RuleError::malformed(operator.name(), format!("invalid regex '{other}': {e}"))
            })?;
            regex.is_match(s)
        }
        _ => unreachable!("operator legality checked by apply"),
    })
}

fn compare_boolean(
    operator: Operator,
    runtime: &Value,
    literal: Option<&Value>,
) -> Result<bool, RuleError> {
    let b = runtime
        .as_bool()
        .ok_or_else(|| RuleError::type_mismatch("boolean value", runtime.kind()))?;
    match operator {
        Operator::IsTrue => Ok(b),
        Operator::IsFalse => Ok(!b),
        Operator::EqualTo => {
            let literal = literal.ok_or_else(|| {
                RuleError::malformed(operator.name(), "operator requires a comparison value")
            })?;
            let other = literal
                .as_bool()
                .ok_or_else(|| RuleError::type_mismatch("boolean literal", literal.kind()))?;
            Ok(b == other)
        }
        _ => unreachable!("operator legality checked by apply"),
    }
}

fn compare_select(operator: Operator, runtime: &Value, literal: &Value) -> Result<bool, RuleError> {
    if runtime.as_list().is_some() {
        return Err(RuleError::type_mismatch("single select value", "list"));
    }
    Ok(match operator {
        Operator::EqualTo => runtime.loose_eq(literal),
        Operator::NotEqualTo => !runtime.loose_eq(literal),
        Operator::IsContainedBy => member(runtime, as_elements(literal)),
        _ => unreachable!("operator legality checked by apply"),
    })
}

fn compare_select_multiple(
    operator: Operator,
    runtime: &Value,
    literal: &Value,
) -> Result<bool, RuleError> {
    let items = runtime
        .as_list()
        .ok_or_else(|| RuleError::type_mismatch("list value", runtime.kind()))?;
    let other = as_elements(literal);
    let shares_any = || other.iter().any(|v| member(v, items));
    let has_all = || other.iter().all(|v| member(v, items));
    let within = || items.iter().all(|v| member(v, other));
    Ok(match operator {
        Operator::Contains => has_all(),
        Operator::DoesNotContain => !has_all(),
        Operator::SharesAtLeastOneElementWith => shares_any(),
        Operator::SharesExactlyWith => has_all() && within(),
        Operator::SharesAllElementsWith => has_all(),
        Operator::IsContainedBy => within(),
        Operator::SharesNoElementsWith => !shares_any(),
        _ => unreachable!("operator legality checked by apply"),
    })
}

/// A list literal as its elements; any other literal as a one-element slice.
fn as_elements(literal: &Value) -> &[Value] {
    match literal {
        Value::List(items) => items,
        other => std::slice::from_ref(other),
    }
}

fn member(needle: &Value, haystack: &[Value]) -> bool {
    haystack.iter().any(|v| v.loose_eq(needle))
}

/// Check a rule literal before any subject is seen.
///
/// Operators that take no literal accept anything, including nothing.
///
/// # Errors
///
/// Returns a human-readable reason when the literal is missing or has a shape
/// the operator can never accept.
pub fn validate_literal(
    operator: Operator,
    field_type: FieldType,
    literal: Option<&Value>,
) -> Result<(), String> {
    if !operator.takes_literal() {
        return Ok(());
    }
    let Some(literal) = literal else {
        return Err(format!("operator '{operator}' requires a value"));
    };
    let wrong = |expected: &str| Err(format!("expected {expected}, got {}", literal.kind()));

    match (field_type, operator) {
        (FieldType::Numeric, _) => {
            if literal.as_number().is_none() {
                return wrong("a numeric value");
            }
        }
        (FieldType::String, Operator::MatchesRegex) => match literal.as_str() {
            Some(pattern) => {
                Regex::new(pattern).map_err(|e| format!("invalid regex '{pattern}': {e}"))?;
            }
            None => return wrong("a regex string"),
        },
        (FieldType::String, _) => {
            if literal.as_str().is_none() {
                return wrong("a string");
            }
        }
        (FieldType::Boolean, _) => {
            if literal.as_bool().is_none() {
                return wrong("a boolean");
            }
        }
        (FieldType::Select, Operator::IsContainedBy) => {
            if literal.as_list().is_none() {
                return wrong("a list");
            }
        }
        (FieldType::Select, _) => {
            if literal.as_list().is_some() {
                return wrong("a single option");
            }
        }
        (FieldType::SelectMultiple, _) => {
            if as_elements(literal).iter().any(|v| v.as_list().is_some()) {
                return Err("nested lists are not allowed".to_owned());
            }
        }
    }
    Ok(())
}
