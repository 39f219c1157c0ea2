use clap::Args;
use cohort::rules::RuleId;
use cohort_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct DeleteRuleArgs {
    #[arg(long)]
    id: RuleId,
}

#[derive(Debug, Args)]
pub(crate) struct DeleteAllRulesArgs {
    /// Confirm removal of every rule
    #[arg(long)]
    yes: bool,
}

pub(crate) async fn run(ctx: &AppContext, args: DeleteRuleArgs) -> Result<(), String> {
    ctx.rules
        .delete_rule(args.id)
        .await
        .map_err(|error| format!("failed to delete rule {}: {error}", args.id))?;

    println!("deleted rule {}", args.id);

    Ok(())
}

pub(crate) async fn run_all(ctx: &AppContext, args: DeleteAllRulesArgs) -> Result<(), String> {
    if !args.yes {
        return Err("refusing to delete every rule without --yes".to_string());
    }

    let deleted = ctx
        .rules
        .delete_all_rules()
        .await
        .map_err(|error| format!("failed to delete rules: {error}"))?;

    println!("deleted {deleted} rule(s)");

    Ok(())
}
