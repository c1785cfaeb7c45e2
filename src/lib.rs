//! Declarative business rules over typed variables and actions.
//!
//! Hosts declare what can be inspected on a subject ([`VariableSet`]) and what
//! can be done to it ([`ActionSet`]). Rules arrive as JSON condition trees or
//! from [`RuleSetBuilder`], are validated against the resulting
//! [`RuleSchema`], and run once per subject with [`RuleSet::run`] or
//! [`run_all`].

mod compile;
mod dispatch;
mod engine;
mod error;
mod evaluate;
mod operators;
mod parse;
mod types;

pub use compile::validate_rules;
pub use dispatch::{dispatch, prepare};
pub use engine::{run_all, run_with};
pub use error::Error;
pub use evaluate::{evaluate, VariableCache};
pub use operators::{apply, is_legal, operators_for, validate_literal, EPSILON};
pub use parse::{parse_rules, parse_rules_file, rules_from_value};
pub use types::{
    all, any, export_rule_data, pretty_label, var, ActionDecl, ActionInvocation, ActionProvider,
    ActionSet, ActionSetBuilder, BoxError, Condition, FieldType, Leaf, Operator, OperatorInfo,
    ParamDecl, Params, Rule, RuleBuilder, RuleError, RuleFailure, RuleSchema, RuleSet,
    RuleSetBuilder, RunOptions, RunReport, SelectOption, SubjectVariables, TargetActions, Value,
    VariableDecl, VariableExpr, VariableProvider, VariableSet, VariableSetBuilder,
};
