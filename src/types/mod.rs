mod actions;
mod condition;
mod decl;
mod error;
mod field_type;
mod operator;
mod options;
mod rule;
mod ruleset;
mod run_report;
mod schema;
mod value;
mod variables;

pub use actions::{ActionProvider, ActionSet, ActionSetBuilder, Params, TargetActions};
pub use condition::{all, any, var, Condition, Leaf, VariableExpr};
pub use decl::{pretty_label, ActionDecl, ParamDecl, SelectOption, VariableDecl};
pub use error::{BoxError, RuleError};
pub use field_type::FieldType;
pub use operator::Operator;
pub use options::RunOptions;
pub use rule::{ActionInvocation, Rule};
pub use ruleset::{RuleBuilder, RuleSet, RuleSetBuilder};
pub use run_report::{RuleFailure, RunReport};
pub use schema::{export_rule_data, OperatorInfo, RuleSchema};
pub use value::Value;
pub use variables::{SubjectVariables, VariableProvider, VariableSet, VariableSetBuilder};
