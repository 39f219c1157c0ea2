use clap::Args;
use cohort::rules::RuleId;
use cohort_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct ReorderRulesArgs {
    /// Rule ids in their new display order, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    order: Vec<RuleId>,
}

pub(crate) async fn run(ctx: &AppContext, args: ReorderRulesArgs) -> Result<(), String> {
    let count = args.order.len();

    ctx.rules
        .reorder_rules(args.order)
        .await
        .map_err(|error| format!("failed to reorder rules: {error}"))?;

    println!("reordered {count} rule(s)");

    Ok(())
}
