use rulebook::{
    export_rule_data, ActionDecl, ActionSet, ParamDecl, Params, RuleSet, RunOptions, VariableSet,
};
use tracing_subscriber::EnvFilter;

struct Profile {
    email: Option<&'static str>,
    name: Option<&'static str>,
    business_unit: &'static str,
    job_title: &'static str,
    personal_interests: &'static str,
}

struct Outbox {
    default_recipient: Option<&'static str>,
    sent: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let variables = VariableSet::<Profile>::builder()
        .string("profile_email", |p| p.email.unwrap_or_default())
        .string("profile_name", |p| p.name.unwrap_or_default())
        .string("business_unit", |p| p.business_unit)
        .string("job_title", |p| p.job_title)
        .string("personal_interests", |p| p.personal_interests)
        .select_multiple(
            "interest_tags",
            ["Technology", "Travel", "Leadership", "Strategy"],
            |p| {
                p.personal_interests
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            },
        )
        .build()
        .expect("duplicate variable");

    let actions = ActionSet::<Outbox>::builder()
        .action(
            ActionDecl::new("send_targeted_email")
                .param(ParamDecl::string("recipient_email"))
                .param(ParamDecl::string("recipient_name"))
                .param(ParamDecl::string("campaign_id")),
            |outbox, params: &Params| {
                let to = params
                    .string("recipient_email")
                    .filter(|s| !s.is_empty())
                    .or(outbox.default_recipient)
                    .ok_or("profile has no email address")?;
                let name = params.string("recipient_name").unwrap_or("Valued Contact");
                let campaign = params.string("campaign_id").unwrap_or_default();
                println!("  email to {name} <{to}> for campaign {campaign}");
                outbox.sent += 1;
                Ok(())
            },
        )
        .build()
        .expect("duplicate action");

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/rules/profiles.json");
    let rules = RuleSet::from_file(path, &export_rule_data(&variables, &actions))
        .expect("failed to load rules")
        .with_options(RunOptions::new().stop_on_first_trigger(true));

    let profiles = [
        Profile {
            email: Some("ada@example.com"),
            name: Some("Ada"),
            business_unit: "Engineering",
            job_title: "Staff Engineer",
            personal_interests: "Technology, Travel",
        },
        Profile {
            email: Some("grace@example.com"),
            name: Some("Grace"),
            business_unit: "Operations",
            job_title: "Head of Logistics",
            personal_interests: "Strategy",
        },
        Profile {
            email: None,
            name: Some("Nobody"),
            business_unit: "Engineering",
            job_title: "Intern",
            personal_interests: "Technology",
        },
    ];

    for profile in &profiles {
        println!("{}:", profile.name.unwrap_or("unknown"));
        let mut outbox = Outbox {
            default_recipient: profile.email,
            sent: 0,
        };
        let report = rules
            .run_detailed(&variables.bind(profile), &mut actions.bind(&mut outbox))
            .expect("rules do not match declarations");
        println!("  {report}, emails sent: {}", outbox.sent);
    }
}
