use std::sync::LazyLock;

use rulebook::{
    export_rule_data, ActionDecl, ActionSet, BoxError, ParamDecl, Params, RuleSchema, RuleSet,
    VariableSet,
};

#[derive(Debug, Clone)]
struct Product {
    current_inventory: i64,
    price: f64,
    expiration_days: Option<i64>,
    month: &'static str,
    related: Vec<&'static str>,
    stock_state: String,
    orders: Vec<i64>,
    emails: Vec<String>,
}

impl Product {
    fn new(current_inventory: i64, expiration_days: Option<i64>) -> Self {
        Self {
            current_inventory,
            price: 100.0,
            expiration_days,
            month: "December",
            related: vec![],
            stock_state: "available".into(),
            orders: vec![],
            emails: vec![],
        }
    }
}

static VARIABLES: LazyLock<VariableSet<Product>> = LazyLock::new(|| {
    VariableSet::builder()
        .numeric("current_inventory", |p: &Product| p.current_inventory)
        // No pending orders means nothing is about to expire.
        .numeric("expiration_days", |p: &Product| p.expiration_days.unwrap_or(999))
        .string("current_month", |p: &Product| p.month)
        .select_multiple(
            "goes_well_with",
            ["christmas_tree", "gift_wrap", "ornaments"],
            |p: &Product| p.related.clone(),
        )
        .build()
        .unwrap()
});

fn set_price(p: &mut Product, params: &Params) -> Result<(), BoxError> {
    let pct = params
        .number("sale_percentage")
        .ok_or("no sale_percentage")?;
    p.price *= 1.0 - pct;
    Ok(())
}

static ACTIONS: LazyLock<ActionSet<Product>> = LazyLock::new(|| {
    ActionSet::builder()
        .action(
            ActionDecl::new("put_on_sale").param(ParamDecl::numeric("sale_percentage")),
            set_price,
        )
        .action(
            ActionDecl::new("order_more").param(ParamDecl::numeric("number_to_order")),
            |p: &mut Product, params: &Params| {
                #[allow(clippy::cast_possible_truncation)]
                let n = params.number("number_to_order").ok_or("no quantity")? as i64;
                p.orders.push(n);
                Ok(())
            },
        )
        .action(
            ActionDecl::new("change_stock_state").param(ParamDecl::select(
                "stock_state",
                ["available", "last_items", "out_of_stock"],
            )),
            |p: &mut Product, params: &Params| {
                params
                    .string("stock_state")
                    .ok_or("no stock_state")?
                    .clone_into(&mut p.stock_state);
                Ok(())
            },
        )
        .action(ActionDecl::new("send_low_stock_email"), |p: &mut Product, _| {
            p.emails.push("low stock".into());
            Ok(())
        })
        .build()
        .unwrap()
});

fn schema() -> RuleSchema {
    export_rule_data(&*VARIABLES, &*ACTIONS)
}

const RULES: &str = r#"[
    {
        "conditions": {"all": [
            {"name": "expiration_days", "operator": "less_than", "value": 5},
            {"name": "current_inventory", "operator": "greater_than", "value": 20}
        ]},
        "actions": [
            {"name": "put_on_sale", "params": {"sale_percentage": 0.25}}
        ]
    },
    {
        "conditions": {"any": [
            {"name": "current_inventory", "operator": "less_than", "value": 5}
        ]},
        "actions": [
            {"name": "order_more", "params": {"number_to_order": 40}},
            {"name": "send_low_stock_email"}
        ]
    },
    {
        "conditions": {"all": [
            {"name": "current_month", "operator": "equal_to", "value": "December"},
            {"name": "goes_well_with", "operator": "contains", "value": "christmas_tree"},
            {"name": "current_inventory", "operator": "less_than_or_equal_to", "value": 10}
        ]},
        "actions": [
            {"name": "change_stock_state", "params": {"stock_state": "last_items"}}
        ]
    }
]"#;

fn run(rules: &RuleSet, product: &mut Product) -> bool {
    let snapshot = product.clone();
    rules
        .run(&VARIABLES.bind(&snapshot), &mut ACTIONS.bind(product))
        .unwrap()
}

#[test]
fn overstocked_expiring_product_goes_on_sale() {
    let rules = RuleSet::from_json(RULES, &schema()).unwrap();
    let mut product = Product::new(30, Some(3));

    assert!(run(&rules, &mut product));
    assert!((product.price - 75.0).abs() < 1e-9);
    assert!(product.orders.is_empty());
    assert_eq!(product.stock_state, "available");
}

#[test]
fn low_stock_orders_more_and_emails() {
    let rules = RuleSet::from_json(RULES, &schema()).unwrap();
    let mut product = Product::new(2, None);

    assert!(run(&rules, &mut product));
    assert_eq!(product.orders, [40]);
    assert_eq!(product.emails, ["low stock"]);
    assert!((product.price - 100.0).abs() < 1e-9);
}

#[test]
fn missing_orders_default_to_distant_expiration() {
    let rules = RuleSet::from_json(RULES, &schema()).unwrap();
    let mut product = Product::new(30, None);

    assert!(!run(&rules, &mut product));
    assert!((product.price - 100.0).abs() < 1e-9);
}

#[test]
fn holiday_items_become_last_items() {
    let rules = RuleSet::from_json(RULES, &schema()).unwrap();
    let mut product = Product::new(8, None);
    product.related = vec!["christmas_tree", "ornaments"];

    assert!(run(&rules, &mut product));
    assert_eq!(product.stock_state, "last_items");
}

#[test]
fn every_matching_rule_fires_by_default() {
    let rules = RuleSet::from_json(RULES, &schema()).unwrap();
    let mut product = Product::new(3, None);
    product.related = vec!["christmas_tree"];

    let snapshot = product.clone();
    let report = rules
        .run_detailed(&VARIABLES.bind(&snapshot), &mut ACTIONS.bind(&mut product))
        .unwrap();
    assert_eq!(report.fired(), &[1, 2]);
    assert_eq!(report.visited(), 3);
    assert_eq!(product.orders, [40]);
    assert_eq!(product.stock_state, "last_items");
}

#[test]
fn schema_exports_select_options() {
    let schema = schema();
    let json = serde_json::to_value(&schema).unwrap();
    assert_eq!(json["variables"][3]["name"], "goes_well_with");
    assert_eq!(
        json["variables"][3]["options"][0]["label"],
        "Christmas Tree"
    );
    assert_eq!(json["actions"][2]["params"][0]["field_type"], "select");
}

#[test]
fn unknown_action_in_rules_is_rejected_at_load() {
    let err = RuleSet::from_json(
        r#"[{"conditions": {"all": []}, "actions": [{"name": "send_low_stock_sms"}]}]"#,
        &schema(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "unknown action 'send_low_stock_sms'");
}
