use rulebook::{export_rule_data, ActionDecl, ActionSet, ParamDecl, VariableSet};

struct Product {
    current_inventory: i64,
}

fn main() {
    let variables = VariableSet::<Product>::builder()
        .numeric("current_inventory", |p| p.current_inventory)
        .numeric("expiration_days", |_| 999_i64)
        .select_multiple("goes_well_with", ["christmas_tree", "gift_wrap", "ornaments"], |_| {
            Vec::<String>::new()
        })
        .build()
        .expect("duplicate variable");

    let actions = ActionSet::<Product>::builder()
        .action(
            ActionDecl::new("put_on_sale").param(ParamDecl::numeric("sale_percentage")),
            |_, _| Ok(()),
        )
        .action(
            ActionDecl::new("change_stock_state").param(ParamDecl::select(
                "stock_state",
                ["available", "last_items", "out_of_stock"],
            )),
            |_, _| Ok(()),
        )
        .build()
        .expect("duplicate action");

    // Everything an authoring tool needs to offer variables, operators and actions.
    let schema = export_rule_data(&variables, &actions);
    let json = schema.to_json().expect("schema is always serializable");
    println!("{json}");
}
