use crate::types::{ActionInvocation, ActionProvider, Params};
use crate::{ActionDecl, FieldType, ParamDecl, RuleError, Value};

/// Validate an invocation against its declaration and coerce every parameter
/// to its declared field type.
///
/// Every declared parameter must be supplied; there are no defaults. Names
/// that are not declared are rejected.
///
/// # Errors
///
/// [`RuleError::InvalidActionParameter`] naming the first offending parameter.
pub fn prepare(decl: &ActionDecl, invocation: &ActionInvocation) -> Result<Params, RuleError> {
    let invalid = |param: &str, reason: String| RuleError::InvalidActionParameter {
        action: decl.name.clone(),
        param: param.to_owned(),
        reason,
    };

    if let Some(extra) = invocation
        .params
        .keys()
        .find(|k| decl.params.iter().all(|p| &p.name != *k))
    {
        return Err(invalid(extra, "not a declared parameter".to_owned()));
    }

    let mut values = Vec::with_capacity(decl.params.len());
    for param in &decl.params {
        let raw = invocation
            .params
            .get(&param.name)
            .ok_or_else(|| invalid(&param.name, "missing".to_owned()))?;
        let value = coerce(param, raw).map_err(|reason| invalid(&param.name, reason))?;
        values.push((param.name.clone(), value));
    }
    Ok(Params::new(values))
}

fn coerce(param: &ParamDecl, raw: &Value) -> Result<Value, String> {
    let wrong = |expected: &str| format!("expected {expected}, got {}", raw.kind());
    match param.field_type {
        FieldType::Numeric => match raw {
            Value::Int(_) | Value::Float(_) => Ok(raw.clone()),
            Value::String(s) => {
                let s = s.trim();
                if let Ok(v) = s.parse::<i64>() {
                    return Ok(Value::Int(v));
                }
                match s.parse::<f64>() {
                    Ok(v) if v.is_finite() => Ok(Value::Float(v)),
                    _ => Err(format!("'{s}' is not a number")),
                }
            }
            Value::Bool(_) | Value::List(_) => Err(wrong("a number")),
        },
        FieldType::String => match raw {
            Value::String(_) => Ok(raw.clone()),
            _ => Err(wrong("a string")),
        },
        FieldType::Boolean => match raw {
            Value::Bool(_) => Ok(raw.clone()),
            _ => Err(wrong("a boolean")),
        },
        FieldType::Select => {
            if raw.as_list().is_some() {
                return Err(wrong("a single option"));
            }
            check_option(param, raw)?;
            Ok(raw.clone())
        }
        FieldType::SelectMultiple => {
            let items = raw.as_list().ok_or_else(|| wrong("a list"))?;
            for item in items {
                check_option(param, item)?;
            }
            Ok(raw.clone())
        }
    }
}

fn check_option(param: &ParamDecl, value: &Value) -> Result<(), String> {
    if param.options.is_empty() {
        return Ok(());
    }
    match value.as_str() {
        Some(name) if param.allows_option(name) => Ok(()),
        _ => Err(format!("{value} is not one of the declared options")),
    }
}

/// Look up, validate and invoke one action.
///
/// # Errors
///
/// [`RuleError::UnknownAction`] if the provider does not declare the action,
/// [`RuleError::InvalidActionParameter`] if its parameters do not validate,
/// [`RuleError::ActionFailed`] if the handler returns an error.
pub fn dispatch<A: ActionProvider + ?Sized>(
    actions: &mut A,
    invocation: &ActionInvocation,
) -> Result<(), RuleError> {
    let decl = actions
        .declaration(&invocation.name)
        .ok_or_else(|| RuleError::UnknownAction {
            name: invocation.name.clone(),
        })?;
    let params = prepare(decl, invocation)?;
    invoke(actions, &invocation.name, &params)
}

pub(crate) fn invoke<A: ActionProvider + ?Sized>(
    actions: &mut A,
    name: &str,
    params: &Params,
) -> Result<(), RuleError> {
    actions
        .invoke(name, params)
        .map_err(|e| RuleError::ActionFailed {
            action: name.to_owned(),
            message: e.to_string(),
        })
}
