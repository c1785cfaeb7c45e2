use std::fmt;
use std::path::Path;

use super::actions::ActionProvider;
use super::condition::Condition;
use super::error::RuleError;
use super::options::RunOptions;
use super::rule::{ActionInvocation, Rule};
use super::run_report::RunReport;
use super::schema::RuleSchema;
use super::variables::VariableProvider;

/// Builder for constructing a [`RuleSet`].
///
/// Rules are defined via closures and validated against a [`RuleSchema`] into
/// an immutable, thread-safe rule set.
///
/// # Example
///
/// ```
/// use rulebook::{
///     all, var, ActionDecl, ActionInvocation, ParamDecl, RuleSchema, RuleSetBuilder, VariableDecl,
/// };
///
/// let schema = RuleSchema::new(
///     &[VariableDecl::numeric("current_inventory"), VariableDecl::numeric("expiration_days")],
///     &[ActionDecl::new("put_on_sale").param(ParamDecl::numeric("sale_percentage"))],
/// );
///
/// let ruleset = RuleSetBuilder::new()
///     .rule(|r| {
///         r.when(all([
///             var("current_inventory").greater_than(20),
///             var("expiration_days").less_than(5),
///         ]))
///         .then(ActionInvocation::new("put_on_sale").param("sale_percentage", 0.25))
///     })
///     .compile(&schema)
///     .unwrap();
/// assert_eq!(ruleset.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    rules: Vec<Rule>,
    options: RunOptions,
}

/// Intermediate builder passed to the rule definition closure.
#[derive(Debug)]
pub struct RuleBuilder {
    conditions: Option<Condition>,
    actions: Vec<ActionInvocation>,
}

impl RuleSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a rule. The closure must call `.when(condition)`.
    ///
    /// If `.when()` is not called, compilation fails with
    /// [`RuleError::MalformedRule`].
    #[must_use]
    pub fn rule(mut self, f: impl FnOnce(RuleBuilder) -> RuleBuilder) -> Self {
        let builder = f(RuleBuilder {
            conditions: None,
            actions: Vec::new(),
        });
        self.rules.push(Rule {
            conditions: builder.conditions,
            actions: builder.actions,
        });
        self
    }

    /// Append rules that were built or parsed elsewhere.
    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    #[must_use]
    pub fn options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn stop_on_first_trigger(mut self, stop: bool) -> Self {
        self.options.stop_on_first_trigger = stop;
        self
    }

    /// Validate the rules against `schema` and freeze them.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleError`] found: unknown variables or actions,
    /// operators not legal for a variable's type, bad literals or parameters,
    /// rules without conditions.
    pub fn compile(self, schema: &RuleSchema) -> Result<RuleSet, RuleError> {
        crate::compile::compile(self.rules, self.options, schema)
    }
}

impl RuleBuilder {
    /// Set the condition tree for this rule.
    #[must_use]
    pub fn when(mut self, conditions: Condition) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Add an action to run when the conditions hold. Actions run in the order
    /// they are added.
    #[must_use]
    pub fn then(mut self, action: ActionInvocation) -> Self {
        self.actions.push(action);
        self
    }
}

/// A validated, immutable rule set. Thread-safe and designed to live behind
/// `Arc`.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub(crate) rules: Vec<Rule>,
    pub(crate) options: RunOptions,
}

impl RuleSet {
    /// Parse a JSON rule-set document and validate it against `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`Error`](crate::Error) on malformed JSON or any validation
    /// failure. One bad rule rejects the whole set.
    pub fn from_json(input: &str, schema: &RuleSchema) -> Result<Self, crate::Error> {
        let rules = crate::parse::parse_rules(input)?;
        Ok(crate::compile::compile(rules, RunOptions::default(), schema)?)
    }

    /// Read a JSON rule-set file and validate it against `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`Error`](crate::Error) on I/O, JSON or validation failure.
    pub fn from_file(path: impl AsRef<Path>, schema: &RuleSchema) -> Result<Self, crate::Error> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json(&input, schema)
    }

    /// Write the rules back out in the shape [`from_json`](Self::from_json)
    /// reads.
    ///
    /// # Errors
    ///
    /// Only fails if serialization itself fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.rules)
    }

    #[must_use]
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run the rules against one subject with the stored options.
    ///
    /// Returns whether at least one rule fired.
    ///
    /// # Errors
    ///
    /// See [`run_with`](crate::run_with).
    pub fn run<V, A>(&self, variables: &V, actions: &mut A) -> Result<bool, RuleError>
    where
        V: VariableProvider + ?Sized,
        A: ActionProvider + ?Sized,
    {
        self.run_detailed(variables, actions)
            .map(|report| report.triggered())
    }

    /// Run the rules against one subject and report which fired, which failed
    /// and how long it took.
    ///
    /// # Errors
    ///
    /// See [`run_with`](crate::run_with).
    pub fn run_detailed<V, A>(&self, variables: &V, actions: &mut A) -> Result<RunReport, RuleError>
    where
        V: VariableProvider + ?Sized,
        A: ActionProvider + ?Sized,
    {
        crate::engine::run_with(&self.rules, variables, actions, &self.options)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleSet({} rules)", self.rules.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{var, ActionDecl, VariableDecl};

    fn schema() -> RuleSchema {
        RuleSchema::new(
            &[VariableDecl::numeric("x")],
            &[ActionDecl::new("first"), ActionDecl::new("second")],
        )
    }

    #[test]
    fn builder_collects_rules() {
        let builder = RuleSetBuilder::new()
            .rule(|r| {
                r.when(var("x").greater_than(1_i64))
                    .then(ActionInvocation::new("first"))
                    .then(ActionInvocation::new("second"))
            })
            .rule(|r| r.when(var("x").less_than(0_i64)))
            .stop_on_first_trigger(true);

        assert_eq!(builder.rules.len(), 2);
        assert_eq!(builder.rules[0].actions.len(), 2);
        assert!(builder.rules[1].actions.is_empty());
        assert!(builder.options.stop_on_first_trigger);

        let ruleset = builder.compile(&schema()).unwrap();
        assert_eq!(ruleset.len(), 2);
        assert!(ruleset.options().stop_on_first_trigger);
        assert_eq!(ruleset.to_string(), "RuleSet(2 rules)");
    }

    #[test]
    fn builder_rule_without_when_returns_error() {
        let result = RuleSetBuilder::new()
            .rule(|r| r.then(ActionInvocation::new("first")))
            .compile(&schema());
        assert!(matches!(result, Err(RuleError::MalformedRule { .. })));
    }

    #[test]
    fn from_json_validates() {
        let ok = RuleSet::from_json(
            r#"[{"conditions": {"name": "x", "operator": "equal_to", "value": 1}}]"#,
            &schema(),
        )
        .unwrap();
        assert_eq!(ok.len(), 1);

        let err = RuleSet::from_json(
            r#"[{"conditions": {"name": "y", "operator": "equal_to", "value": 1}}]"#,
            &schema(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Rule(RuleError::UnknownVariable { .. })
        ));
    }

    #[test]
    fn to_json_reads_back() {
        let ruleset = RuleSetBuilder::new()
            .rule(|r| r.when(var("x").equal_to(3_i64)).then(ActionInvocation::new("first")))
            .compile(&schema())
            .unwrap();
        let json = ruleset.to_json().unwrap();
        let back = RuleSet::from_json(&json, &schema()).unwrap();
        assert_eq!(back.rules(), ruleset.rules());
    }

    #[test]
    fn with_options_replaces_options() {
        let ruleset = RuleSetBuilder::new()
            .compile(&schema())
            .unwrap()
            .with_options(RunOptions::new().abort_on_rule_error(true));
        assert!(ruleset.is_empty());
        assert!(ruleset.options().abort_on_rule_error);
    }
}
