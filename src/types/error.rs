use thiserror::Error;

use super::FieldType;

/// Error type returned by host accessors and action handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can go wrong while validating or running rules.
///
/// Structural variants ([`is_structural`](Self::is_structural)) describe a rule
/// set that does not fit the declared variables and actions. They are caught
/// when a [`RuleSet`](crate::RuleSet) is built. The remaining variants depend on
/// subject data and are contained to the rule that hit them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },

    #[error("unknown action '{name}'")]
    UnknownAction { name: String },

    #[error("{}", describe_invalid_operator(.operator, .field_type))]
    InvalidOperator {
        operator: String,
        field_type: Option<FieldType>,
    },

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("malformed rule at {path}: {reason}")]
    MalformedRule { path: String, reason: String },

    #[error("invalid parameter '{param}' for action '{action}': {reason}")]
    InvalidActionParameter {
        action: String,
        param: String,
        reason: String,
    },

    #[error("variable '{name}' failed to evaluate: {message}")]
    VariableEvaluation { name: String, message: String },

    #[error("action '{action}' failed: {message}")]
    ActionFailed { action: String, message: String },

    #[error("duplicate declaration '{name}'")]
    DuplicateDeclaration { name: String },
}

impl RuleError {
    /// Whether this error means the rules do not fit the declared variables and
    /// actions, as opposed to a problem with one subject's data.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            RuleError::UnknownVariable { .. }
                | RuleError::UnknownAction { .. }
                | RuleError::InvalidOperator { .. }
                | RuleError::MalformedRule { .. }
                | RuleError::DuplicateDeclaration { .. }
        )
    }

    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        RuleError::MalformedRule {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        RuleError::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

fn describe_invalid_operator(operator: &str, field_type: &Option<FieldType>) -> String {
    match field_type {
        Some(ft) => format!("operator '{operator}' is not valid for {ft} variables"),
        None => format!("unknown operator '{operator}'"),
    }
}
