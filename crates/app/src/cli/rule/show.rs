use clap::Args;
use cohort::rules::RuleId;
use cohort_app::context::AppContext;
use jiff::Timestamp;

use super::print_rule;

#[derive(Debug, Args)]
pub(crate) struct ShowRuleArgs {
    #[arg(long)]
    id: RuleId,
}

pub(crate) async fn run(ctx: &AppContext, args: ShowRuleArgs) -> Result<(), String> {
    let record = ctx
        .rules
        .get_rule(args.id)
        .await
        .map_err(|error| format!("failed to load rule {}: {error}", args.id))?;

    print_rule(&record, Timestamp::now());

    Ok(())
}
