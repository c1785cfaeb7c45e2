use rulebook::{export_rule_data, ActionDecl, ActionSet, ParamDecl, Params, RuleSet, VariableSet};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct Product {
    id: u32,
    current_inventory: i64,
    price: f64,
    /// Days until each pending order expires.
    orders: Vec<i64>,
    related_products: Vec<&'static str>,
    stock_state: &'static str,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let variables = VariableSet::<Product>::builder()
        .numeric("current_inventory", |p| p.current_inventory)
        .numeric("expiration_days", |p| {
            p.orders.iter().copied().min().unwrap_or(999)
        })
        .string("current_month", |_| "December")
        .select_multiple(
            "goes_well_with",
            ["christmas_tree", "gift_wrap", "ornaments"],
            |p| p.related_products.clone(),
        )
        .build()
        .expect("duplicate variable");

    let actions = ActionSet::<Product>::builder()
        .action(
            ActionDecl::new("put_on_sale").param(ParamDecl::numeric("sale_percentage")),
            |p, params: &Params| {
                let pct = params.number("sale_percentage").unwrap_or_default();
                p.price *= 1.0 - pct;
                println!("  product {}: on sale, new price {:.2}", p.id, p.price);
                Ok(())
            },
        )
        .action(
            ActionDecl::new("order_more").param(ParamDecl::numeric("number_to_order")),
            |p, params: &Params| {
                let n = params.number("number_to_order").unwrap_or_default();
                println!("  product {}: ordering {n} more", p.id);
                Ok(())
            },
        )
        .action(
            ActionDecl::new("change_stock_state").param(ParamDecl::select(
                "stock_state",
                ["available", "last_items", "out_of_stock"],
            )),
            |p, params: &Params| {
                p.stock_state = match params.string("stock_state") {
                    Some("last_items") => "last_items",
                    Some("out_of_stock") => "out_of_stock",
                    _ => "available",
                };
                println!("  product {}: stock state {}", p.id, p.stock_state);
                Ok(())
            },
        )
        .action(ActionDecl::new("send_low_stock_email"), |p, _| {
            println!("  product {}: low stock email sent", p.id);
            Ok(())
        })
        .action(ActionDecl::new("send_low_stock_sms"), |p, _| {
            println!("  product {}: low stock sms sent", p.id);
            Ok(())
        })
        .build()
        .expect("duplicate action");

    let schema = export_rule_data(&variables, &actions);
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/rules/products.json");
    let rules = RuleSet::from_file(path, &schema).expect("failed to load rules");
    println!("{rules}");

    let mut products = vec![
        Product {
            id: 1,
            current_inventory: 30,
            price: 20.0,
            orders: vec![3, 12],
            related_products: vec![],
            stock_state: "available",
        },
        Product {
            id: 2,
            current_inventory: 2,
            price: 15.0,
            orders: vec![],
            related_products: vec!["christmas_tree"],
            stock_state: "available",
        },
        Product {
            id: 3,
            current_inventory: 50,
            price: 9.5,
            orders: vec![30],
            related_products: vec!["gift_wrap"],
            stock_state: "available",
        },
    ];

    for product in &mut products {
        println!("product {}:", product.id);
        let snapshot = product.clone();
        let report = rules
            .run_detailed(&variables.bind(&snapshot), &mut actions.bind(product))
            .expect("rules do not match declarations");
        println!("  {report}");
    }
}
