use std::time::Instant;

use tracing::{debug, debug_span, trace, warn};

use crate::dispatch::{invoke, prepare};
use crate::evaluate::{evaluate, VariableCache};
use crate::types::{ActionProvider, Params, RuleFailure};
use crate::{Rule, RuleError, RunOptions, RunReport, VariableProvider};

/// Run every rule against one subject, in order, and report whether any fired.
///
/// A rule fires when its condition tree holds; its actions then run in the
/// order they are listed. With `stop_on_first_trigger`, rules after the first
/// one that fires are not looked at.
///
/// Variables are computed at most once for the whole pass. Rules that fail
/// because of subject data (an accessor error, a type mismatch, a bad action
/// parameter) are logged and count as not fired. A handler that returns an
/// error is logged and reported, but its rule still counts as fired and the
/// rule's remaining actions still run.
///
/// # Errors
///
/// Returns the first structural error (see [`RuleError::is_structural`]): the
/// rules reference something the providers do not declare, or a rule has no
/// condition tree.
///
/// # Example
///
/// ```
/// use rulebook::{run_all, var, ActionDecl, ActionInvocation, ActionSet, Rule, VariableSet};
///
/// struct Product {
///     inventory: i64,
///     on_sale: bool,
/// }
///
/// let variables = VariableSet::<Product>::builder()
///     .numeric("current_inventory", |p| p.inventory)
///     .build()
///     .unwrap();
/// let actions = ActionSet::<Product>::builder()
///     .action(ActionDecl::new("put_on_sale"), |p, _| {
///         p.on_sale = true;
///         Ok(())
///     })
///     .build()
///     .unwrap();
///
/// let rules = [Rule::new(var("current_inventory").greater_than(20))
///     .then(ActionInvocation::new("put_on_sale"))];
///
/// let snapshot = Product { inventory: 30, on_sale: false };
/// let mut product = Product { inventory: 30, on_sale: false };
/// let fired = run_all(
///     &rules,
///     &variables.bind(&snapshot),
///     &mut actions.bind(&mut product),
///     false,
/// )
/// .unwrap();
/// assert!(fired);
/// assert!(product.on_sale);
/// ```
pub fn run_all<V, A>(
    rules: &[Rule],
    variables: &V,
    actions: &mut A,
    stop_on_first_trigger: bool,
) -> Result<bool, RuleError>
where
    V: VariableProvider + ?Sized,
    A: ActionProvider + ?Sized,
{
    let options = RunOptions::new().stop_on_first_trigger(stop_on_first_trigger);
    run_with(rules, variables, actions, &options).map(|report| report.triggered())
}

/// Like [`run_all`], with full options and a [`RunReport`] of what happened.
///
/// # Errors
///
/// Structural errors always abort the pass. With
/// [`abort_on_rule_error`](RunOptions::abort_on_rule_error) set, so does the
/// first rule-level error.
pub fn run_with<V, A>(
    rules: &[Rule],
    variables: &V,
    actions: &mut A,
    options: &RunOptions,
) -> Result<RunReport, RuleError>
where
    V: VariableProvider + ?Sized,
    A: ActionProvider + ?Sized,
{
    let start = Instant::now();
    let _span = debug_span!("run_all", rules = rules.len()).entered();

    let mut cache = VariableCache::new(variables);
    let mut fired = Vec::new();
    let mut failures = Vec::new();
    let mut visited = 0;

    for (idx, rule) in rules.iter().enumerate() {
        visited += 1;
        match prepare_rule(idx, rule, &mut cache, &*actions) {
            Ok(Some(prepared)) => {
                for (invocation, params) in rule.actions.iter().zip(&prepared) {
                    if let Err(error) = invoke(actions, &invocation.name, params) {
                        if options.abort_on_rule_error {
                            return Err(error);
                        }
                        warn!(rule = idx, action = %invocation.name, %error, "action failed");
                        failures.push(RuleFailure { rule: idx, error });
                    }
                }
                debug!(rule = idx, actions = rule.actions.len(), "rule fired");
                fired.push(idx);
                if options.stop_on_first_trigger {
                    break;
                }
            }
            Ok(None) => trace!(rule = idx, "rule did not match"),
            Err(e) if e.is_structural() || options.abort_on_rule_error => return Err(e),
            Err(error) => {
                warn!(rule = idx, %error, "rule failed, treating as not triggered");
                failures.push(RuleFailure { rule: idx, error });
            }
        }
    }

    Ok(RunReport::new(fired, failures, visited, start.elapsed()))
}

/// Evaluate one rule and, when it matches, validate every action it lists.
/// Returns the prepared parameters in action order, or `None` if the rule
/// does not match.
fn prepare_rule<V, A>(
    idx: usize,
    rule: &Rule,
    cache: &mut VariableCache<'_, V>,
    actions: &A,
) -> Result<Option<Vec<Params>>, RuleError>
where
    V: VariableProvider + ?Sized,
    A: ActionProvider + ?Sized,
{
    let Some(conditions) = &rule.conditions else {
        return Err(RuleError::malformed(
            format!("[{idx}].conditions"),
            "rule has no condition tree",
        ));
    };
    if !evaluate(conditions, cache)? {
        return Ok(None);
    }

    // Nothing runs unless every action of the rule validates.
    let mut prepared = Vec::with_capacity(rule.actions.len());
    for invocation in &rule.actions {
        let decl = actions
            .declaration(&invocation.name)
            .ok_or_else(|| RuleError::UnknownAction {
                name: invocation.name.clone(),
            })?;
        prepared.push(prepare(decl, invocation)?);
    }
    Ok(Some(prepared))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{all, any, var, ActionDecl, ActionInvocation, ActionSet, ParamDecl, VariableSet};

    struct Product {
        current_inventory: i64,
        expiration_days: i64,
    }

    #[derive(Default)]
    struct Log(Vec<String>);

    fn variables() -> VariableSet<Product> {
        VariableSet::builder()
            .numeric("current_inventory", |p: &Product| p.current_inventory)
            .numeric("expiration_days", |p: &Product| p.expiration_days)
            .build()
            .unwrap()
    }

    fn actions() -> ActionSet<Log> {
        ActionSet::builder()
            .action(
                ActionDecl::new("put_on_sale").param(ParamDecl::numeric("sale_percentage")),
                |log: &mut Log, params: &Params| {
                    let pct = params.number("sale_percentage").unwrap_or_default();
                    log.0.push(format!("put_on_sale({pct})"));
                    Ok(())
                },
            )
            .action(ActionDecl::new("order_more"), |log: &mut Log, _| {
                log.0.push("order_more".into());
                Ok(())
            })
            .action(ActionDecl::new("fail"), |_, _| Err("boom".into()))
            .build()
            .unwrap()
    }

    fn product() -> Product {
        Product {
            current_inventory: 30,
            expiration_days: 3,
        }
    }

    fn run(rules: &[Rule], options: &RunOptions) -> (Result<RunReport, RuleError>, Vec<String>) {
        let (variables, actions, subject) = (variables(), actions(), product());
        let mut log = Log::default();
        let result = run_with(
            rules,
            &variables.bind(&subject),
            &mut actions.bind(&mut log),
            options,
        );
        (result, log.0)
    }

    #[test]
    fn fires_actions_in_order() {
        let rules = [Rule::new(all([
            var("current_inventory").greater_than(20_i64),
            var("expiration_days").less_than(5_i64),
        ]))
        .then(ActionInvocation::new("put_on_sale").param("sale_percentage", 0.25))
        .then(ActionInvocation::new("order_more"))];

        let (result, log) = run(&rules, &RunOptions::default());
        let report = result.unwrap();
        assert!(report.triggered());
        assert_eq!(report.fired(), &[0]);
        assert_eq!(log, ["put_on_sale(0.25)", "order_more"]);
    }

    #[test]
    fn stop_on_first_trigger() {
        let rules = [
            Rule::new(all([])).then(ActionInvocation::new("order_more")),
            Rule::new(all([])).then(ActionInvocation::new("order_more")),
        ];
        let (result, log) = run(&rules, &RunOptions::new().stop_on_first_trigger(true));
        let report = result.unwrap();
        assert_eq!(report.fired(), &[0]);
        assert_eq!(report.visited(), 1);
        assert_eq!(log.len(), 1);

        let (result, log) = run(&rules, &RunOptions::default());
        assert_eq!(result.unwrap().fired(), &[0, 1]);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn nothing_fires() {
        let rules = [Rule::new(any([])).then(ActionInvocation::new("order_more"))];
        let (result, log) = run(&rules, &RunOptions::default());
        assert!(!result.unwrap().triggered());
        assert!(log.is_empty());
    }

    #[test]
    fn invalid_params_skip_every_action_of_the_rule() {
        let rules = [
            Rule::new(all([]))
                .then(ActionInvocation::new("order_more"))
                .then(ActionInvocation::new("put_on_sale").param("sale_percentage", "lots")),
            Rule::new(all([])).then(ActionInvocation::new("order_more")),
        ];
        let (result, log) = run(&rules, &RunOptions::default());
        let report = result.unwrap();
        assert_eq!(report.fired(), &[1]);
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].rule, 0);
        assert_eq!(log, ["order_more"]);
    }

    #[test]
    fn failing_handler_still_fires_the_rule() {
        let rules = [Rule::new(all([]))
            .then(ActionInvocation::new("put_on_sale").param("sale_percentage", 0.25))
            .then(ActionInvocation::new("fail"))
            .then(ActionInvocation::new("order_more"))];
        let (result, log) = run(&rules, &RunOptions::default());
        let report = result.unwrap();
        assert!(report.triggered());
        assert_eq!(report.fired(), &[0]);
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].rule, 0);
        assert_eq!(
            report.failures()[0].error,
            RuleError::ActionFailed {
                action: "fail".into(),
                message: "boom".into(),
            }
        );
        assert_eq!(log, ["put_on_sale(0.25)", "order_more"]);
    }

    #[test]
    fn failing_handler_aborts_when_asked() {
        let rules = [Rule::new(all([]))
            .then(ActionInvocation::new("fail"))
            .then(ActionInvocation::new("order_more"))];
        let (result, log) = run(&rules, &RunOptions::new().abort_on_rule_error(true));
        assert!(matches!(result, Err(RuleError::ActionFailed { .. })));
        assert!(log.is_empty());
    }

    #[test]
    fn structural_errors_abort() {
        let rules = [Rule::new(var("nope").equal_to(1_i64))];
        let (result, _) = run(&rules, &RunOptions::default());
        assert!(matches!(result, Err(RuleError::UnknownVariable { .. })));

        let rules = [Rule::new(all([])).then(ActionInvocation::new("nope"))];
        let (result, _) = run(&rules, &RunOptions::default());
        assert!(matches!(result, Err(RuleError::UnknownAction { .. })));
    }

    #[test]
    fn rule_without_conditions_is_malformed() {
        let rules = [
            Rule::new(all([])),
            Rule {
                conditions: None,
                actions: vec![],
            },
        ];
        let (result, _) = run(&rules, &RunOptions::default());
        assert_eq!(
            result.unwrap_err(),
            RuleError::MalformedRule {
                path: "[1].conditions".into(),
                reason: "rule has no condition tree".into(),
            }
        );
    }

    #[test]
    fn run_all_returns_bool() {
        let rules = [Rule::new(var("expiration_days").less_than(5_i64))];
        let (variables, actions, subject) = (variables(), actions(), product());
        let mut log = Log::default();
        let fired = run_all(
            &rules,
            &variables.bind(&subject),
            &mut actions.bind(&mut log),
            true,
        )
        .unwrap();
        assert!(fired);
    }
}
