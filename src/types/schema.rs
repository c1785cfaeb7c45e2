use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::actions::ActionSet;
use super::decl::{ActionDecl, VariableDecl};
use super::variables::VariableSet;
use super::{FieldType, Operator};

/// Operator metadata as shown to rule authors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorInfo {
    pub name: Operator,
    pub label: String,
    /// Kind of literal the operator compares against; `None` for operators
    /// that take no literal.
    pub input_type: Option<FieldType>,
}

/// Everything a rule may refer to: declared variables, declared actions and
/// the operators legal for each field type.
///
/// Produced by [`export_rule_data`] for authoring tools, and used by
/// [`RuleSet`](super::RuleSet) to validate rules before they run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSchema {
    pub variables: Vec<VariableDecl>,
    pub actions: Vec<ActionDecl>,
    pub variable_type_operators: BTreeMap<FieldType, Vec<OperatorInfo>>,
}

impl RuleSchema {
    #[must_use]
    pub fn new(variables: &[VariableDecl], actions: &[ActionDecl]) -> Self {
        let variable_type_operators = FieldType::ALL
            .into_iter()
            .map(|ft| {
                let ops = crate::operators::operators_for(ft)
                    .iter()
                    .map(|&op| OperatorInfo {
                        name: op,
                        label: op.label(),
                        input_type: op.input_type(ft),
                    })
                    .collect();
                (ft, ops)
            })
            .collect();
        Self {
            variables: variables.to_vec(),
            actions: actions.to_vec(),
            variable_type_operators,
        }
    }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&VariableDecl> {
        self.variables.iter().find(|v| v.name == name)
    }

    #[must_use]
    pub fn action(&self, name: &str) -> Option<&ActionDecl> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Pretty-printed JSON document for authoring tools.
    ///
    /// # Errors
    ///
    /// Only fails if serialization itself fails, which a well-formed schema
    /// never does.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Describe a variable table and an action table for rule authors.
#[must_use]
pub fn export_rule_data<S, T>(variables: &VariableSet<S>, actions: &ActionSet<T>) -> RuleSchema {
    RuleSchema::new(variables.declarations(), actions.declarations())
}
