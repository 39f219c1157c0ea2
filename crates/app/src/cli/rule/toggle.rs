use clap::{ArgAction, Args};
use cohort::rules::RuleId;
use cohort_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct ToggleRuleArgs {
    #[arg(long)]
    id: RuleId,

    /// New active flag
    #[arg(long, action = ArgAction::Set)]
    active: bool,
}

#[derive(Debug, Args)]
pub(crate) struct ToggleAllRulesArgs {
    /// New active flag for every rule
    #[arg(long, action = ArgAction::Set)]
    active: bool,
}

pub(crate) async fn run(ctx: &AppContext, args: ToggleRuleArgs) -> Result<(), String> {
    ctx.rules
        .set_rule_active(args.id, args.active)
        .await
        .map_err(|error| format!("failed to toggle rule {}: {error}", args.id))?;

    println!("rule {} active: {}", args.id, args.active);

    Ok(())
}

pub(crate) async fn run_all(ctx: &AppContext, args: ToggleAllRulesArgs) -> Result<(), String> {
    let changed = ctx
        .rules
        .set_all_rules_active(args.active)
        .await
        .map_err(|error| format!("failed to toggle rules: {error}"))?;

    println!("{changed} rule(s) now active: {}", args.active);

    Ok(())
}
