use clap::Args;
use cohort::rules::RuleId;
use cohort_app::context::AppContext;
use jiff::Timestamp;

#[derive(Debug, Args)]
pub(crate) struct ScheduleRuleArgs {
    #[arg(long)]
    id: RuleId,

    /// Activation instant (RFC 3339); omit to clear
    #[arg(long)]
    start: Option<Timestamp>,

    /// Expiry instant (RFC 3339); omit to clear
    #[arg(long)]
    end: Option<Timestamp>,
}

pub(crate) async fn run(ctx: &AppContext, args: ScheduleRuleArgs) -> Result<(), String> {
    let status = ctx
        .rules
        .update_schedule(args.id, args.start, args.end, Timestamp::now())
        .await
        .map_err(|error| format!("failed to schedule rule {}: {error}", args.id))?;

    println!("rule {} is {}", args.id, status.as_str());

    Ok(())
}
