use clap::Args;
use cohort::rules::RuleId;
use cohort_app::{context::AppContext, domain::rules::data::RuleUpdate};
use jiff::Timestamp;

use super::{RuleFieldArgs, print_rule};

#[derive(Debug, Args)]
pub(crate) struct UpdateRuleArgs {
    #[arg(long)]
    id: RuleId,

    #[command(flatten)]
    fields: RuleFieldArgs,
}

pub(crate) async fn run(ctx: &AppContext, args: UpdateRuleArgs) -> Result<(), String> {
    let record = ctx
        .rules
        .update_rule(
            args.id,
            RuleUpdate {
                group: args.fields.group,
                discount_type: args.fields.discount_type,
                discount_value: args.fields.value,
                products: args.fields.products,
                categories: args.fields.categories,
            },
        )
        .await
        .map_err(|error| format!("failed to update rule {}: {error}", args.id))?;

    print_rule(&record, Timestamp::now());

    Ok(())
}
