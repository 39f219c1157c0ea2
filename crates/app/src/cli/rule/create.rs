use clap::Args;
use cohort_app::{context::AppContext, domain::rules::data::NewRule};
use jiff::Timestamp;

use super::{RuleFieldArgs, print_rule};

#[derive(Debug, Args)]
pub(crate) struct CreateRuleArgs {
    #[command(flatten)]
    fields: RuleFieldArgs,

    /// Create the rule switched off
    #[arg(long)]
    inactive: bool,

    /// Activation instant (RFC 3339)
    #[arg(long)]
    start: Option<Timestamp>,

    /// Expiry instant (RFC 3339)
    #[arg(long)]
    end: Option<Timestamp>,
}

pub(crate) async fn run(ctx: &AppContext, args: CreateRuleArgs) -> Result<(), String> {
    let now = Timestamp::now();

    let record = ctx
        .rules
        .create_rule(
            NewRule {
                group: args.fields.group,
                discount_type: args.fields.discount_type,
                discount_value: args.fields.value,
                products: args.fields.products,
                categories: args.fields.categories,
                is_active: !args.inactive,
                start: args.start,
                end: args.end,
            },
            now,
        )
        .await
        .map_err(|error| format!("failed to create rule: {error}"))?;

    print_rule(&record, now);

    Ok(())
}
