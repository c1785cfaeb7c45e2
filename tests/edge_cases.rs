use std::collections::HashMap;

use rulebook::{
    all, any, parse_rules, run_all, run_with, var, ActionDecl, ActionInvocation, ActionSet,
    BoxError, FieldType, Rule, RuleError, RuleSchema, RuleSet, RunOptions, Value, VariableDecl,
    VariableProvider, VariableSet,
};

/// A host type that implements the provider trait directly.
struct Record {
    decls: Vec<VariableDecl>,
    fields: HashMap<String, Value>,
}

impl Record {
    fn new(fields: &[(&str, FieldType, Value)]) -> Self {
        Self {
            decls: fields
                .iter()
                .map(|(name, ft, _)| VariableDecl::new(name, *ft))
                .collect(),
            fields: fields
                .iter()
                .map(|(name, _, value)| ((*name).to_owned(), value.clone()))
                .collect(),
        }
    }
}

impl VariableProvider for Record {
    fn declarations(&self) -> &[VariableDecl] {
        &self.decls
    }

    fn value(&self, name: &str) -> Result<Value, BoxError> {
        self.fields
            .get(name)
            .cloned()
            .ok_or_else(|| format!("no field '{name}'").into())
    }
}

fn counter() -> ActionSet<u32> {
    ActionSet::builder()
        .action(ActionDecl::new("count"), |n: &mut u32, _| {
            *n += 1;
            Ok(())
        })
        .build()
        .unwrap()
}

fn run_record(
    rules: &[Rule],
    record: &Record,
    options: &RunOptions,
) -> (Result<usize, RuleError>, u32) {
    let actions = counter();
    let mut count = 0;
    let result = run_with(rules, record, &mut actions.bind(&mut count), options)
        .map(|report| report.failures().len());
    (result, count)
}

fn count_rule(condition: rulebook::Condition) -> Rule {
    Rule::new(condition).then(ActionInvocation::new("count"))
}

#[test]
fn undeclared_variable_is_an_error_not_false() {
    let record = Record::new(&[("x", FieldType::Numeric, Value::Int(1))]);
    let rules = [count_rule(var("y").equal_to(1_i64))];
    let (result, count) = run_record(&rules, &record, &RunOptions::default());
    assert_eq!(
        result,
        Err(RuleError::UnknownVariable { name: "y".into() })
    );
    assert_eq!(count, 0);
}

#[test]
fn undeclared_variable_inside_negative_branch_still_errors() {
    let record = Record::new(&[("x", FieldType::Numeric, Value::Int(1))]);
    let rules = [count_rule(any([var("x").equal_to(2_i64), var("y").equal_to(1_i64)]))];
    let (result, _) = run_record(&rules, &record, &RunOptions::default());
    assert!(matches!(result, Err(RuleError::UnknownVariable { .. })));
}

#[test]
fn type_mismatch_fails_only_that_rule() {
    let record = Record::new(&[
        ("inventory", FieldType::Numeric, Value::from("plenty")),
        ("flag", FieldType::Boolean, Value::Bool(true)),
    ]);
    let rules = [
        count_rule(var("inventory").greater_than(20_i64)),
        count_rule(var("flag").is_true()),
    ];
    let (result, count) = run_record(&rules, &record, &RunOptions::default());
    assert_eq!(result, Ok(1));
    assert_eq!(count, 1);

    let options = RunOptions::new().abort_on_rule_error(true);
    let (result, count) = run_record(&rules, &record, &options);
    assert!(matches!(result, Err(RuleError::TypeMismatch { .. })));
    assert_eq!(count, 0);
}

#[test]
fn failing_accessor_does_not_stop_later_rules() {
    struct Subject;
    let variables = VariableSet::<Subject>::builder()
        .try_variable(VariableDecl::numeric("expiration_days"), |_| {
            Err("orders service unavailable".into())
        })
        .boolean("active", |_| true)
        .build()
        .unwrap();
    let actions = counter();
    let rules = [
        count_rule(var("expiration_days").less_than(5_i64)),
        count_rule(var("expiration_days").greater_than(5_i64)),
        count_rule(var("active").is_true()),
    ];

    let mut count = 0;
    let report = run_with(
        &rules,
        &variables.bind(&Subject),
        &mut actions.bind(&mut count),
        &RunOptions::default(),
    )
    .unwrap();

    assert_eq!(report.fired(), &[2]);
    assert_eq!(report.failures().len(), 2);
    assert_eq!(
        report.failures()[1].error,
        RuleError::VariableEvaluation {
            name: "expiration_days".into(),
            message: "orders service unavailable".into(),
        }
    );
    assert_eq!(count, 1);
}

#[test]
fn empty_groups() {
    let record = Record::new(&[]);
    let (_, count) = run_record(&[count_rule(all([]))], &record, &RunOptions::default());
    assert_eq!(count, 1);
    let (_, count) = run_record(&[count_rule(any([]))], &record, &RunOptions::default());
    assert_eq!(count, 0);
    let (_, count) = run_record(
        &[count_rule(all([any([]), all([])]))],
        &record,
        &RunOptions::default(),
    );
    assert_eq!(count, 0);
}

#[test]
fn no_rules_never_trigger() {
    let record = Record::new(&[]);
    let actions = counter();
    let mut count = 0;
    let fired = run_all(&[], &record, &mut actions.bind(&mut count), true).unwrap();
    assert!(!fired);
}

#[test]
fn empty_object_conditions_rejected_at_parse() {
    let err = parse_rules(r#"[{"conditions": {}, "actions": []}]"#).unwrap_err();
    assert!(matches!(
        err,
        rulebook::Error::Rule(RuleError::MalformedRule { path, .. }) if path == "[0].conditions"
    ));
}

#[test]
fn unknown_operator_rejected_at_parse() {
    let err = parse_rules(
        r#"[{"conditions": {"name": "x", "operator": "roughly_equal_to", "value": 1}}]"#,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "unknown operator 'roughly_equal_to'");
}

#[test]
fn illegal_operator_rejected_at_load() {
    let schema = RuleSchema::new(&[VariableDecl::boolean("flag")], &[]);
    let err = RuleSet::from_json(
        r#"[{"conditions": {"name": "flag", "operator": "greater_than", "value": 1}}]"#,
        &schema,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "operator 'greater_than' is not valid for boolean variables"
    );
}

#[test]
fn text_is_an_alias_for_string() {
    let decl: VariableDecl = serde_json::from_str(
        r#"{"name": "job_title", "label": "Job Title", "field_type": "text"}"#,
    )
    .unwrap();
    assert_eq!(decl.field_type, FieldType::String);
}

#[test]
fn numeric_strings_compare_as_numbers() {
    let record = Record::new(&[("inventory", FieldType::Numeric, Value::from(" 30 "))]);
    let (_, count) = run_record(
        &[count_rule(var("inventory").greater_than(20.5))],
        &record,
        &RunOptions::default(),
    );
    assert_eq!(count, 1);
}

#[test]
fn integer_and_float_elements_match_in_sets() {
    let record = Record::new(&[(
        "sizes",
        FieldType::SelectMultiple,
        Value::from(vec![1_i64, 2, 3]),
    )]);
    let (_, count) = run_record(
        &[count_rule(var("sizes").contains(2.0))],
        &record,
        &RunOptions::default(),
    );
    assert_eq!(count, 1);
}

#[test]
fn duplicate_variable_declarations_rejected() {
    let result = VariableSet::<()>::builder()
        .boolean("active", |()| true)
        .numeric("active", |()| 1_i64)
        .build();
    assert_eq!(
        result.map(|_| ()),
        Err(RuleError::DuplicateDeclaration {
            name: "active".into()
        })
    );
}
