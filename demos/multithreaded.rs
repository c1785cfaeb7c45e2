use std::sync::{Arc, LazyLock};
use std::thread;

use rulebook::{
    all, export_rule_data, var, ActionDecl, ActionInvocation, ActionSet, ParamDecl, RuleSetBuilder,
    VariableSet,
};

#[derive(Clone)]
struct Product {
    current_inventory: i64,
    expiration_days: i64,
    price: f64,
}

static VARIABLES: LazyLock<VariableSet<Product>> = LazyLock::new(|| {
    VariableSet::builder()
        .numeric("current_inventory", |p: &Product| p.current_inventory)
        .numeric("expiration_days", |p: &Product| p.expiration_days)
        .build()
        .expect("duplicate variable")
});

static ACTIONS: LazyLock<ActionSet<Product>> = LazyLock::new(|| {
    ActionSet::builder()
        .action(
            ActionDecl::new("put_on_sale").param(ParamDecl::numeric("sale_percentage")),
            |p: &mut Product, params| {
                p.price *= 1.0 - params.number("sale_percentage").unwrap_or_default();
                Ok(())
            },
        )
        .build()
        .expect("duplicate action")
});

fn main() {
    let ruleset = Arc::new(
        RuleSetBuilder::new()
            .rule(|r| {
                r.when(all([
                    var("current_inventory").greater_than(20_i64),
                    var("expiration_days").less_than(5_i64),
                ]))
                .then(ActionInvocation::new("put_on_sale").param("sale_percentage", 0.25))
            })
            .compile(&export_rule_data(&*VARIABLES, &*ACTIONS))
            .expect("failed to compile ruleset"),
    );

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let rs = Arc::clone(&ruleset);
            thread::spawn(move || {
                // Each thread owns its subject; the rule set and tables are shared.
                let snapshot = Product {
                    current_inventory: 10 + 10 * i64::from(i),
                    expiration_days: 2 + i64::from(i),
                    price: 100.0,
                };
                let mut product = snapshot.clone();
                let fired = rs
                    .run(&VARIABLES.bind(&snapshot), &mut ACTIONS.bind(&mut product))
                    .expect("rules do not match declarations");
                println!("Thread {i}: fired={fired}, price={:.2}", product.price);
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}
